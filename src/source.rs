//! Where snapshots read the range file and socket tables from

use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::range::{EphemeralRange, LOCAL_PORT_RANGE_PATH};
use crate::types::AddressFamily;

/// Default procfs mount point
pub const DEFAULT_PROC_ROOT: &str = "/proc";

/// An opened kernel socket table
pub struct SocketTable {
    /// Path used in error messages
    pub path: String,
    pub reader: Box<dyn BufRead>,
}

impl SocketTable {
    #[must_use]
    pub fn new(path: impl Into<String>, reader: Box<dyn BufRead>) -> Self {
        Self {
            path: path.into(),
            reader,
        }
    }
}

impl std::fmt::Debug for SocketTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SocketTable")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// Provider of the inputs one snapshot needs
#[cfg_attr(test, mockall::automock)]
pub trait ProcSource {
    /// Read the local ephemeral port range
    ///
    /// # Errors
    /// Returns an error if the range cannot be read or is malformed
    fn local_port_range(&self) -> Result<EphemeralRange>;

    /// Open the TCP socket table for `family`
    ///
    /// # Errors
    /// Returns [`Error::TableOpen`] if the table cannot be opened
    fn socket_table(&self, family: AddressFamily) -> Result<SocketTable>;
}

/// Reads everything from a procfs mount
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcFs {
    root: PathBuf,
}

impl Default for ProcFs {
    fn default() -> Self {
        Self::new(DEFAULT_PROC_ROOT)
    }
}

impl ProcFs {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn range_path(&self) -> PathBuf {
        self.root.join(LOCAL_PORT_RANGE_PATH)
    }

    #[must_use]
    pub fn table_path(&self, family: AddressFamily) -> PathBuf {
        self.root.join("net").join(family.table_name())
    }
}

impl ProcSource for ProcFs {
    fn local_port_range(&self) -> Result<EphemeralRange> {
        let path = self.range_path();
        let content = fs::read_to_string(&path)
            .map_err(|e| Error::config_read(path.display().to_string(), e))?;
        content.parse()
    }

    fn socket_table(&self, family: AddressFamily) -> Result<SocketTable> {
        let path = self.table_path(family);
        let display = path.display().to_string();
        let file = File::open(&path).map_err(|e| Error::table_open(display.clone(), e))?;
        Ok(SocketTable::new(display, Box::new(BufReader::new(file))))
    }
}
