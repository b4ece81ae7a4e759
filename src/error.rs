use std::io;
use std::num::ParseIntError;
use thiserror::Error;

/// The error type for port usage snapshots.
///
/// Every variant is terminal for the snapshot that raised it: nothing is
/// retried and no partial result is produced.
#[derive(Error, Debug)]
pub enum Error {
    /// The ephemeral range source could not be opened or read
    #[error("Failed to read local port range from {path}: {source}")]
    ConfigRead {
        path: String,
        #[source]
        source: io::Error,
    },

    /// The ephemeral range source did not hold exactly two integers
    #[error("Invalid local port range: {content:?}")]
    ConfigFormat { content: String },

    /// The ephemeral range start is greater than its end
    #[error("Invalid local port range: start {start} is greater than end {end}")]
    ConfigRange { start: u16, end: u16 },

    /// Address family other than 4 or 6
    #[error("Unsupported address family {0}, only 4 or 6 are supported")]
    UnsupportedFamily(i64),

    /// The kernel socket table could not be opened or read
    #[error("Failed to open {path}: {source}")]
    TableOpen {
        path: String,
        #[source]
        source: io::Error,
    },

    /// A socket table row could not be parsed
    #[error("Error parsing {path}: {reason}")]
    TableFormat { path: String, reason: String },

    /// Decoded address bytes were neither 4 nor 16 long
    #[error("Unable to parse IP {hex}: decoded to {len} bytes")]
    AddressFormat { hex: String, len: usize },

    /// Address field was not valid hex
    #[error("Cannot parse socket field {hex:?}: {source}")]
    HexDecode {
        hex: String,
        #[source]
        source: hex::FromHexError,
    },

    /// I/O error while writing rendered output
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Create a new range read error
    pub fn config_read(path: impl Into<String>, source: io::Error) -> Self {
        Self::ConfigRead {
            path: path.into(),
            source,
        }
    }

    /// Create a new range format error
    pub fn config_format(content: impl Into<String>) -> Self {
        Self::ConfigFormat {
            content: content.into(),
        }
    }

    /// Create a new socket table open error
    pub fn table_open(path: impl Into<String>, source: io::Error) -> Self {
        Self::TableOpen {
            path: path.into(),
            source,
        }
    }

    /// Create a new socket table format error
    pub fn table_format(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::TableFormat {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a table format error for a hex port that failed to parse
    pub fn bad_port(path: impl Into<String>, port: &str, err: &ParseIntError) -> Self {
        Self::table_format(path, format!("invalid hex port {port:?}: {err}"))
    }
}

/// A specialized `Result` type for port usage operations.
pub type Result<T> = std::result::Result<T, Error>;
