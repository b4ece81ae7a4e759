use crate::error::{Error, Result};

#[cfg(feature = "serde-support")]
use serde::{Deserialize, Serialize};

/// Address family of a kernel TCP socket table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub enum AddressFamily {
    /// `/proc/net/tcp`
    V4,
    /// `/proc/net/tcp6`
    V6,
}

impl AddressFamily {
    /// Both families, in the order they are scanned
    pub const ALL: [Self; 2] = [Self::V4, Self::V6];

    /// Resolve a numeric IP version (4 or 6)
    ///
    /// # Errors
    /// Returns [`Error::UnsupportedFamily`] for any other value
    pub fn from_version(version: i64) -> Result<Self> {
        match version {
            4 => Ok(Self::V4),
            6 => Ok(Self::V6),
            other => Err(Error::UnsupportedFamily(other)),
        }
    }

    /// Families selected by a command-line style version switch,
    /// where anything other than 4 or 6 means both.
    #[must_use]
    pub fn select(version: i64) -> Vec<Self> {
        Self::from_version(version).map_or_else(|_| Self::ALL.to_vec(), |family| vec![family])
    }

    #[must_use]
    pub const fn version(self) -> u8 {
        match self {
            Self::V4 => 4,
            Self::V6 => 6,
        }
    }

    /// File name of the table under `<procfs>/net`
    #[must_use]
    pub const fn table_name(self) -> &'static str {
        match self {
            Self::V4 => "tcp",
            Self::V6 => "tcp6",
        }
    }

    /// The unspecified address as the kernel writes it in this table
    #[must_use]
    pub const fn wildcard_ip(self) -> &'static str {
        match self {
            Self::V4 => "00000000",
            Self::V6 => "00000000000000000000000000000000",
        }
    }
}

impl TryFrom<i64> for AddressFamily {
    type Error = Error;

    fn try_from(version: i64) -> Result<Self> {
        Self::from_version(version)
    }
}

impl std::fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "IPv{}", self.version())
    }
}

/// TCP state as encoded in the `st` column of `/proc/net/tcp`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub enum SocketState {
    /// Socket is listening for connections
    Listen,
    /// Socket has an established connection
    Established,
    /// Socket is in the process of connecting
    Connecting,
    /// Socket is closing
    Closing,
    /// Socket is closed
    Closed,
    /// Unknown state code, kept verbatim
    Unknown(String),
}

impl SocketState {
    /// Decode the two hex digit state code used by the kernel tables
    #[must_use]
    pub fn from_proc_code(code: &str) -> Self {
        match u8::from_str_radix(code, 16) {
            Ok(0x01) => Self::Established,
            Ok(0x02 | 0x03 | 0x0C) => Self::Connecting,
            Ok(0x04 | 0x05 | 0x06 | 0x08 | 0x09 | 0x0B) => Self::Closing,
            Ok(0x07) => Self::Closed,
            Ok(0x0A) => Self::Listen,
            _ => Self::Unknown(code.to_string()),
        }
    }

    /// Listening sockets reserve a port but never form a connection tuple
    #[must_use]
    pub const fn is_listen(&self) -> bool {
        matches!(self, Self::Listen)
    }
}

impl std::fmt::Display for SocketState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Listen => write!(f, "LISTEN"),
            Self::Established => write!(f, "ESTABLISHED"),
            Self::Connecting => write!(f, "CONNECTING"),
            Self::Closing => write!(f, "CLOSING"),
            Self::Closed => write!(f, "CLOSED"),
            Self::Unknown(state) => write!(f, "{state}"),
        }
    }
}

/// Port usage of one connection tuple `localIP->remoteIP:remotePort`
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct PortCounter {
    /// Human readable tuple, e.g. `127.0.0.1->127.0.0.1:22`
    pub connect_id: String,
    /// Local ports held by this tuple, shared listeners included
    pub used_ports: u64,
    /// Ephemeral ports still free for this tuple
    pub available_ports: i64,
}

impl PortCounter {
    #[must_use]
    pub fn new(connect_id: impl Into<String>, used_ports: u64, available_ports: i64) -> Self {
        Self {
            connect_id: connect_id.into(),
            used_ports,
            available_ports,
        }
    }

    /// True once no ephemeral port is left for another connection to this tuple
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        self.available_ports <= 0
    }
}
