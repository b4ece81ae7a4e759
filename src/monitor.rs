//! Periodic snapshots
//!
//! Snapshots run back to back on the calling thread: the next one starts
//! `interval` after the previous one was written, never while it is running.

use std::io::Write;
use std::thread;
use std::time::Duration;

use log::debug;

use crate::error::Result;
use crate::render::OutputFormat;
use crate::snapshot::{Config, Snapshot};
use crate::source::ProcSource;

/// Default delay between snapshots
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(3);

/// Takes and prints snapshots until stopped or a snapshot fails
pub struct PortMonitor<S> {
    config: Config,
    source: S,
    interval: Duration,
    format: OutputFormat,
}

impl<S: ProcSource> PortMonitor<S> {
    /// Create a new monitor with default settings
    #[must_use]
    pub const fn new(config: Config, source: S) -> Self {
        Self {
            config,
            source,
            interval: DEFAULT_INTERVAL,
            format: OutputFormat::Table,
        }
    }

    /// Set the delay between snapshots
    #[must_use]
    pub const fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Set the output format
    #[must_use]
    pub const fn format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Print snapshots forever, or once for one-shot formats
    ///
    /// # Errors
    /// Returns the first snapshot or write failure
    pub fn run<W: Write>(&self, out: &mut W) -> Result<()> {
        self.run_limited(out, None)
    }

    /// Like [`run`](Self::run), but stop after `limit` snapshots if given
    ///
    /// # Errors
    /// Returns the first snapshot or write failure
    pub fn run_limited<W: Write>(&self, out: &mut W, limit: Option<usize>) -> Result<()> {
        self.format.write_header(out)?;

        let mut taken = 0usize;
        loop {
            let snapshot = Snapshot::take(&self.config, &self.source)?;
            self.format.write_snapshot(out, &snapshot)?;
            out.flush()?;
            taken += 1;
            debug!("snapshot {taken}: {} tuples", snapshot.len());

            if self.format.is_one_shot() || limit.is_some_and(|limit| taken >= limit) {
                return Ok(());
            }
            thread::sleep(self.interval);
        }
    }
}
