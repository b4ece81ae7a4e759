//! One point-in-time reading of port usage across address families

use log::debug;

use crate::error::Result;
use crate::select::select_top_n;
use crate::socket::{scan_table, top_counters};
use crate::source::ProcSource;
use crate::types::{AddressFamily, PortCounter};

/// Default number of tuples reported per snapshot
pub const DEFAULT_TOP_N: usize = 10;

/// What a snapshot covers. Built once and shared by every snapshot taken.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    families: Vec<AddressFamily>,
    top_n: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    /// Both families, ten tuples
    #[must_use]
    pub fn new() -> Self {
        Self {
            families: AddressFamily::ALL.to_vec(),
            top_n: DEFAULT_TOP_N,
        }
    }

    /// Number of tuples to report
    #[must_use]
    pub const fn top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    /// Families to scan, in order
    #[must_use]
    pub fn families(mut self, families: impl Into<Vec<AddressFamily>>) -> Self {
        self.families = families.into();
        self
    }

    #[must_use]
    pub fn family_list(&self) -> &[AddressFamily] {
        &self.families
    }

    #[must_use]
    pub const fn result_count(&self) -> usize {
        self.top_n
    }
}

/// The tuples closest to ephemeral port exhaustion, fewest available first
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    counters: Vec<PortCounter>,
}

impl Snapshot {
    /// Read the range and every configured table from `source` and keep the
    /// `top_n` tuples with the fewest available ports.
    ///
    /// Each table is reduced to its own `top_n` first, with listening ports
    /// charged to that subset; the per-family results are then concatenated
    /// and selected again. Tuples from different families are never merged,
    /// even if they print the same.
    ///
    /// # Errors
    /// Any read or parse failure aborts the whole snapshot
    pub fn take<S: ProcSource + ?Sized>(config: &Config, source: &S) -> Result<Self> {
        let range = source.local_port_range()?;
        debug!("local port range {range}, pool size {}", range.pool_size());

        let mut counters = Vec::new();
        for &family in &config.families {
            let table = source.socket_table(family)?;
            let scan = scan_table(table.reader, &table.path, family, &range)?;
            counters.extend(top_counters(scan, config.top_n, &range)?);
        }

        let selected = select_top_n(&mut counters, config.top_n, |c| c.available_ports);
        counters.truncate(selected);

        Ok(Self { counters })
    }

    /// Wrap counters that are already selected and ordered
    #[must_use]
    pub fn from_counters(counters: Vec<PortCounter>) -> Self {
        Self { counters }
    }

    #[must_use]
    pub fn counters(&self) -> &[PortCounter] {
        &self.counters
    }

    #[must_use]
    pub fn into_counters(self) -> Vec<PortCounter> {
        self.counters
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.counters.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PortCounter> {
        self.counters.iter()
    }
}

impl<'a> IntoIterator for &'a Snapshot {
    type Item = &'a PortCounter;
    type IntoIter = std::slice::Iter<'a, PortCounter>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
