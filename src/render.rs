//! Output formats for snapshots

use std::io::Write;

use crate::error::Result;
use crate::snapshot::Snapshot;
use crate::types::PortCounter;

/// How snapshots are printed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Fixed width `Connect UsedPorts AvailablePorts` table, refreshed every interval
    #[default]
    Table,
    /// Prometheus exposition lines, printed once
    Prometheus,
}

impl OutputFormat {
    /// Prometheus output is a one-shot scrape
    #[must_use]
    pub const fn is_one_shot(self) -> bool {
        matches!(self, Self::Prometheus)
    }

    /// Write whatever precedes the first snapshot
    ///
    /// # Errors
    /// Returns an error if writing fails
    pub fn write_header<W: Write>(self, out: &mut W) -> Result<()> {
        if self == Self::Table {
            writeln!(
                out,
                "{:<98} {:<10} {:<5}",
                "Connect", "UsedPorts", "AvailablePorts"
            )?;
        }
        Ok(())
    }

    /// Write one snapshot
    ///
    /// # Errors
    /// Returns an error if writing fails
    pub fn write_snapshot<W: Write>(self, out: &mut W, snapshot: &Snapshot) -> Result<()> {
        for counter in snapshot {
            match self {
                Self::Table => write_table_row(out, counter)?,
                Self::Prometheus => write_metric_lines(out, counter)?,
            }
        }
        Ok(())
    }
}

fn write_table_row<W: Write>(out: &mut W, counter: &PortCounter) -> std::io::Result<()> {
    writeln!(
        out,
        "{:<98} {:<10} {:<5}",
        counter.connect_id, counter.used_ports, counter.available_ports
    )
}

fn write_metric_lines<W: Write>(out: &mut W, counter: &PortCounter) -> std::io::Result<()> {
    writeln!(
        out,
        "tcp_used_ports_total{{connect=\"{}\"}} {}",
        counter.connect_id, counter.used_ports
    )?;
    writeln!(
        out,
        "tcp_available_ports_total{{connect=\"{}\"}} {}",
        counter.connect_id, counter.available_ports
    )
}
