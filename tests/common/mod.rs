//! Shared fixtures: a throwaway procfs tree holding only the files portstat reads

#![allow(dead_code)]

use std::fs;

use portstat::{AddressFamily, ProcFs};
use tempfile::TempDir;

pub const HEADER_V4: &str = "  sl  local_address rem_address   st tx_queue rx_queue tr tm->when retrnsmt   uid  timeout inode";
pub const HEADER_V6: &str = "  sl  local_address                         remote_address                        st tx_queue rx_queue tr tm->when retrnsmt   uid  timeout inode";

/// A socket table row with the given addresses and state code
pub fn row(local: &str, remote: &str, state: &str) -> String {
    format!(
        "   0: {local} {remote} {state} 00000000:00000000 00:00000000 00000000  1000        0 54321 1 0000000000000000 20 4 30 10 -1"
    )
}

pub struct FixtureProc {
    dir: TempDir,
}

impl FixtureProc {
    /// Create a tree whose range file holds `range`
    pub fn new(range: &str) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create fixture dir");
        fs::create_dir_all(dir.path().join("sys/net/ipv4")).expect("Failed to create sys/net");
        fs::create_dir_all(dir.path().join("net")).expect("Failed to create net");
        fs::write(dir.path().join("sys/net/ipv4/ip_local_port_range"), range)
            .expect("Failed to write port range");
        Self { dir }
    }

    /// Write the socket table for `family`
    pub fn table(self, family: AddressFamily, header: &str, rows: &[String]) -> Self {
        let mut content = String::from(header);
        content.push('\n');
        for r in rows {
            content.push_str(r);
            content.push('\n');
        }
        fs::write(self.dir.path().join("net").join(family.table_name()), content)
            .expect("Failed to write socket table");
        self
    }

    pub fn source(&self) -> ProcFs {
        ProcFs::new(self.dir.path())
    }
}
