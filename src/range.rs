//! Local ephemeral port range
//!
//! Linux exposes the range the kernel draws unspecified local ports from as
//! two whitespace separated integers in `/proc/sys/net/ipv4/ip_local_port_range`.

use std::str::FromStr;

use crate::error::{Error, Result};

#[cfg(feature = "serde-support")]
use serde::{Deserialize, Serialize};

/// Path of the range file relative to the procfs root
pub const LOCAL_PORT_RANGE_PATH: &str = "sys/net/ipv4/ip_local_port_range";

/// Inclusive local port range used for ephemeral allocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct EphemeralRange {
    start: u16,
    end: u16,
}

impl EphemeralRange {
    /// Create a range from its two bounds
    ///
    /// # Errors
    /// Returns [`Error::ConfigRange`] if `start` is greater than `end`
    pub fn new(start: u16, end: u16) -> Result<Self> {
        if start > end {
            return Err(Error::ConfigRange { start, end });
        }
        Ok(Self { start, end })
    }

    #[must_use]
    pub const fn start(&self) -> u16 {
        self.start
    }

    #[must_use]
    pub const fn end(&self) -> u16 {
        self.end
    }

    /// Number of ports a tuple starts out with.
    ///
    /// This is `end - start`, one less than the number of ports in the
    /// inclusive range, even though `end` itself counts as in range.
    #[must_use]
    pub const fn pool_size(&self) -> i64 {
        self.end as i64 - self.start as i64
    }

    /// Whether `port` is inside `[start, end]`
    #[must_use]
    pub const fn contains(&self, port: u16) -> bool {
        port >= self.start && port <= self.end
    }
}

impl FromStr for EphemeralRange {
    type Err = Error;

    fn from_str(content: &str) -> Result<Self> {
        let fields: Vec<&str> = content.split_whitespace().collect();
        if fields.len() != 2 {
            return Err(Error::config_format(content));
        }

        let start = fields[0]
            .parse::<u16>()
            .map_err(|_| Error::config_format(content))?;
        let end = fields[1]
            .parse::<u16>()
            .map_err(|_| Error::config_format(content))?;

        Self::new(start, end)
    }
}

impl std::fmt::Display for EphemeralRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}
