//! Single pass scan of one kernel TCP socket table
//!
//! Rows look like
//!
//! ```text
//!   sl  local_address rem_address   st tx_queue rx_queue tr tm->when retrnsmt   uid  timeout inode
//!    0: 0100007F:0CEA 00000000:0000 0A 00000000:00000000 00:00000000 00000000  1000        0 38914 ...
//! ```
//!
//! Listening sockets are indexed by local IP so the aggregation step can
//! charge their ports to every outbound tuple leaving that IP. All other rows
//! are counted per `localIP->remoteIP:remotePort`, local port excluded.

use std::collections::{HashMap, HashSet};
use std::io::BufRead;

use log::{debug, trace};

use crate::codec::parse_port;
use crate::error::{Error, Result};
use crate::range::EphemeralRange;
use crate::types::{AddressFamily, SocketState};

/// Rows with fewer whitespace separated fields are rejected
pub const MIN_FIELDS: usize = 12;

/// Identity of an outbound tuple, still in kernel hex form
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectionKey {
    /// e.g. `0100007F`
    pub local_ip: String,
    /// e.g. `0100007F:0016`
    pub remote_address: String,
}

impl std::fmt::Display for ConnectionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}->{}", self.local_ip, self.remote_address)
    }
}

/// Counts for one tuple as seen in the table, before listeners are folded in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCounter {
    pub key: ConnectionKey,
    pub used_ports: u64,
    pub available_ports: i64,
}

/// Tuples in discovery order with a key index into them.
///
/// Iteration order is first-seen order, which is what selection relies on to
/// break ties.
#[derive(Debug, Default, Clone)]
pub struct ConnectionTable {
    counters: Vec<RawCounter>,
    index: HashMap<ConnectionKey, usize>,
}

impl ConnectionTable {
    /// Record one socket row for `key` and return its counter
    fn observe(&mut self, key: ConnectionKey, pool_size: i64) -> &mut RawCounter {
        if let Some(&i) = self.index.get(&key) {
            let counter = &mut self.counters[i];
            counter.used_ports += 1;
            return counter;
        }

        let i = self.counters.len();
        self.index.insert(key.clone(), i);
        self.counters.push(RawCounter {
            key,
            used_ports: 1,
            available_ports: pool_size,
        });
        &mut self.counters[i]
    }

    #[must_use]
    pub fn get(&self, key: &ConnectionKey) -> Option<&RawCounter> {
        self.index.get(key).map(|&i| &self.counters[i])
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.counters.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RawCounter> {
        self.counters.iter()
    }

    /// Counters in discovery order
    #[must_use]
    pub fn into_counters(self) -> Vec<RawCounter> {
        self.counters
    }
}

/// Everything one table scan produced, scoped to one address family
#[derive(Debug, Clone)]
pub struct TableScan {
    pub path: String,
    pub family: AddressFamily,
    pub connections: ConnectionTable,
    /// `IP:port` of every listening socket, in kernel hex form
    pub listen_sockets: HashSet<String>,
    /// Listening ports per local hex IP, in table order
    pub listen_ports: HashMap<String, Vec<u16>>,
}

impl TableScan {
    fn new(path: &str, family: AddressFamily) -> Self {
        Self {
            path: path.to_string(),
            family,
            connections: ConnectionTable::default(),
            listen_sockets: HashSet::new(),
            listen_ports: HashMap::new(),
        }
    }

    /// Ports listened on by `local_ip`, empty if none
    #[must_use]
    pub fn listen_ports_for(&self, local_ip: &str) -> &[u16] {
        self.listen_ports
            .get(local_ip)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// Split `HEXIP:HEXPORT`
pub(crate) fn split_address<'a>(path: &str, address: &'a str) -> Result<(&'a str, &'a str)> {
    let mut parts = address.split(':');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(ip), Some(port), None) => Ok((ip, port)),
        _ => Err(Error::table_format(
            path,
            format!("address {address:?} is not of the form IP:port"),
        )),
    }
}

/// Scan a socket table, discarding its header line
///
/// # Errors
/// Returns [`Error::TableFormat`] for a malformed row and
/// [`Error::TableOpen`] if reading the table fails part way through
pub fn scan_table<R: BufRead>(
    reader: R,
    path: &str,
    family: AddressFamily,
    range: &EphemeralRange,
) -> Result<TableScan> {
    let pool_size = range.pool_size();
    let mut scan = TableScan::new(path, family);
    let mut lines = reader.lines();

    // header
    if let Some(header) = lines.next() {
        header.map_err(|e| Error::table_open(path, e))?;
    }

    for line in lines {
        let line = line.map_err(|e| Error::table_open(path, e))?;
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < MIN_FIELDS {
            return Err(Error::table_format(
                path,
                format!("less than {MIN_FIELDS} columns found {line:?}"),
            ));
        }
        let local_address = fields[1];
        let remote_address = fields[2];
        let state = SocketState::from_proc_code(fields[3]);

        if scan.listen_sockets.contains(local_address) {
            trace!("{path}: skipping {local_address}, already seen as listener");
            continue;
        }

        let (local_ip, local_port) = split_address(path, local_address)?;

        let wildcard = format!("{}:{}", family.wildcard_ip(), local_port);
        if scan.listen_sockets.contains(&wildcard) {
            trace!("{path}: skipping {local_address}, covered by listener {wildcard}");
            continue;
        }

        let port = parse_port(local_port).map_err(|e| Error::bad_port(path, local_port, &e))?;

        if state.is_listen() {
            scan.listen_sockets.insert(local_address.to_string());
            scan.listen_ports
                .entry(local_ip.to_string())
                .or_default()
                .push(port);
            continue;
        }

        split_address(path, remote_address)?;
        let key = ConnectionKey {
            local_ip: local_ip.to_string(),
            remote_address: remote_address.to_string(),
        };
        let counter = scan.connections.observe(key, pool_size);
        if range.contains(port) {
            counter.available_ports -= 1;
        }
    }

    debug!(
        "{path}: {} connection tuples, {} listening sockets",
        scan.connections.len(),
        scan.listen_sockets.len()
    );

    Ok(scan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const HEADER: &str = "  sl  local_address rem_address   st tx_queue rx_queue tr tm->when retrnsmt   uid  timeout inode";

    fn row(local: &str, remote: &str, state: &str) -> String {
        format!(
            "   0: {local} {remote} {state} 00000000:00000000 00:00000000 00000000  1000        0 12345 1 0000000000000000 20 4 30 10 -1"
        )
    }

    fn table(rows: &[String]) -> String {
        let mut content = String::from(HEADER);
        for r in rows {
            content.push('\n');
            content.push_str(r);
        }
        content.push('\n');
        content
    }

    fn scan(content: &str, family: AddressFamily, range: &EphemeralRange) -> Result<TableScan> {
        scan_table(Cursor::new(content.to_string()), "/proc/net/tcp", family, range)
    }

    fn key(local_ip: &str, remote: &str) -> ConnectionKey {
        ConnectionKey {
            local_ip: local_ip.to_string(),
            remote_address: remote.to_string(),
        }
    }

    fn kernel_range() -> EphemeralRange {
        EphemeralRange::new(32768, 60999).unwrap()
    }

    #[test]
    fn test_counts_sockets_per_tuple() {
        let content = table(&[
            row("84AAA8C0:9C40", "84AAA8C0:0016", "01"),
            row("84AAA8C0:9C41", "84AAA8C0:0016", "01"),
            row("0100007F:9C42", "0100007F:0016", "06"),
        ]);
        let result = scan(&content, AddressFamily::V4, &kernel_range()).unwrap();

        assert_eq!(result.connections.len(), 2);
        let first = result
            .connections
            .get(&key("84AAA8C0", "84AAA8C0:0016"))
            .unwrap();
        assert_eq!(first.used_ports, 2);
        assert_eq!(first.available_ports, 28229);

        let second = result
            .connections
            .get(&key("0100007F", "0100007F:0016"))
            .unwrap();
        assert_eq!(second.used_ports, 1);
        assert_eq!(second.available_ports, 28230);
    }

    #[test]
    fn test_discovery_order() {
        let content = table(&[
            row("0100007F:9C40", "0200007F:0050", "01"),
            row("0100007F:9C41", "0300007F:0050", "01"),
            row("0100007F:9C42", "0200007F:0050", "01"),
        ]);
        let result = scan(&content, AddressFamily::V4, &kernel_range()).unwrap();
        let keys: Vec<String> = result.connections.iter().map(|c| c.key.to_string()).collect();
        assert_eq!(
            keys,
            vec!["0100007F->0200007F:0050", "0100007F->0300007F:0050"]
        );
    }

    #[test]
    fn test_listen_rows_are_indexed_not_counted() {
        let content = table(&[
            row("0100007F:1F90", "00000000:0000", "0A"),
            row("0100007F:8000", "00000000:0000", "0A"),
            row("0100007F:9C40", "0200007F:0050", "01"),
        ]);
        let result = scan(&content, AddressFamily::V4, &kernel_range()).unwrap();

        assert_eq!(result.connections.len(), 1);
        assert!(result.listen_sockets.contains("0100007F:1F90"));
        assert_eq!(result.listen_ports_for("0100007F"), &[8080, 32768]);
        assert!(result.listen_ports_for("0200007F").is_empty());
        assert!(result
            .connections
            .iter()
            .all(|c| !c.key.remote_address.starts_with("00000000")));
    }

    #[test]
    fn test_wildcard_listener_hides_accepted_side() {
        let content = table(&[
            row("00000000:0016", "00000000:0000", "0A"),
            row("84AAA8C0:0016", "84AAA8C0:9C40", "01"),
            row("84AAA8C0:9C40", "84AAA8C0:0016", "01"),
        ]);
        let result = scan(&content, AddressFamily::V4, &kernel_range()).unwrap();

        assert_eq!(result.connections.len(), 1);
        assert!(result
            .connections
            .get(&key("84AAA8C0", "84AAA8C0:9C40"))
            .is_none());
        let outbound = result
            .connections
            .get(&key("84AAA8C0", "84AAA8C0:0016"))
            .unwrap();
        assert_eq!(outbound.used_ports, 1);
    }

    #[test]
    fn test_repeated_listener_row_skipped() {
        let content = table(&[
            row("0100007F:1F90", "00000000:0000", "0A"),
            row("0100007F:1F90", "0100007F:9C40", "01"),
        ]);
        let result = scan(&content, AddressFamily::V4, &kernel_range()).unwrap();
        assert!(result.connections.is_empty());
        assert_eq!(result.listen_ports_for("0100007F"), &[8080]);
    }

    #[test]
    fn test_ipv6_wildcard() {
        let wildcard = AddressFamily::V6.wildcard_ip();
        let local = "0000000000000000FFFF00000100007F";
        let content = table(&[
            row(&format!("{wildcard}:0016"), &format!("{wildcard}:0000"), "0A"),
            row(
                &format!("{local}:0016"),
                &format!("{local}:9C40"),
                "01",
            ),
            row(
                &format!("{local}:9C40"),
                &format!("{local}:0016"),
                "01",
            ),
        ]);
        let result = scan(&content, AddressFamily::V6, &kernel_range()).unwrap();
        assert_eq!(result.connections.len(), 1);
        assert_eq!(result.family, AddressFamily::V6);
    }

    #[test]
    fn test_ports_outside_range_do_not_reduce_availability() {
        let range = EphemeralRange::new(40000, 40001).unwrap();
        let content = table(&[
            row("0100007F:9C3F", "0200007F:0050", "01"),
            row("0100007F:9C40", "0200007F:0050", "01"),
            row("0100007F:9C41", "0200007F:0050", "01"),
            row("0100007F:9C42", "0200007F:0050", "01"),
        ]);
        let result = scan(&content, AddressFamily::V4, &range).unwrap();
        let counter = result
            .connections
            .get(&key("0100007F", "0200007F:0050"))
            .unwrap();
        assert_eq!(counter.used_ports, 4);
        // pool of one, both 40000 and 40001 are in range
        assert_eq!(counter.available_ports, -1);
    }

    #[test]
    fn test_header_only() {
        let result = scan(HEADER, AddressFamily::V4, &kernel_range()).unwrap();
        assert!(result.connections.is_empty());
        let result = scan("", AddressFamily::V4, &kernel_range()).unwrap();
        assert!(result.connections.is_empty());
    }

    #[test]
    fn test_short_row_rejected() {
        let short = "   0: 0100007F:9C40 0200007F:0050 01 00000000:00000000 00:00000000 00000000  1000        0 12345 1";
        let content = table(&[short.to_string()]);
        let err = scan(&content, AddressFamily::V4, &kernel_range()).unwrap_err();
        assert!(matches!(err, Error::TableFormat { .. }));
    }

    #[test]
    fn test_malformed_addresses_rejected() {
        for (local, remote) in [
            ("0100007F", "0200007F:0050"),
            ("0100007F:9C40:01", "0200007F:0050"),
            ("0100007F:9C40", "0200007F"),
        ] {
            let content = table(&[row(local, remote, "01")]);
            let err = scan(&content, AddressFamily::V4, &kernel_range()).unwrap_err();
            assert!(matches!(err, Error::TableFormat { .. }), "{local} {remote}");
        }
    }

    #[test]
    fn test_bad_local_port_rejected() {
        let content = table(&[row("0100007F:XYZW", "0200007F:0050", "01")]);
        let err = scan(&content, AddressFamily::V4, &kernel_range()).unwrap_err();
        assert!(matches!(err, Error::TableFormat { .. }));
    }
}
