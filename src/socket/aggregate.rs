//! Turn one table scan into reportable counters
//!
//! A listening socket holds its port for every outbound tuple leaving the same
//! local IP, so each selected tuple is charged for those ports too. The charge
//! is applied after the per-table selection, to the selected tuples only:
//! a tuple whose raw count ranks outside the first `top_n` is never
//! reconsidered even if its listeners would have moved it inside. Folding
//! before selecting would change which tuples are reported.

use log::warn;

use crate::codec::{decode_ip, display_ip, parse_port};
use crate::error::{Error, Result};
use crate::range::EphemeralRange;
use crate::select::select_top_n;
use crate::socket::table::{split_address, ConnectionKey, RawCounter, TableScan};
use crate::types::PortCounter;

/// Render a hex tuple as `localIP->remoteIP:remotePort`
///
/// # Errors
/// Returns a decode error for a malformed address or
/// [`Error::TableFormat`] for a malformed remote port
pub fn decode_connect_id(path: &str, key: &ConnectionKey) -> Result<String> {
    let local_ip = decode_ip(&key.local_ip)?;
    let (remote_ip, remote_port) = split_address(path, &key.remote_address)?;
    let remote_ip = decode_ip(remote_ip)?;
    let remote_port =
        parse_port(remote_port).map_err(|e| Error::bad_port(path, remote_port, &e))?;

    Ok(format!(
        "{}->{}:{}",
        display_ip(&local_ip),
        display_ip(&remote_ip),
        remote_port
    ))
}

/// Charge the listening ports of `counter`'s local IP to it
fn fold_listeners(counter: &mut RawCounter, listen_ports: &[u16], range: &EphemeralRange) {
    counter.used_ports += listen_ports.len() as u64;
    let in_range = listen_ports.iter().filter(|&&port| range.contains(port)).count();
    counter.available_ports -= in_range as i64;
}

/// Select the `top_n` tuples of one table with the fewest available ports,
/// then fold in shared listening ports and decode their identifiers.
///
/// # Errors
/// Returns an error if a selected tuple's addresses cannot be decoded
pub fn top_counters(
    scan: TableScan,
    top_n: usize,
    range: &EphemeralRange,
) -> Result<Vec<PortCounter>> {
    let TableScan {
        path,
        connections,
        listen_ports,
        ..
    } = scan;

    let mut raw = connections.into_counters();
    let selected = select_top_n(&mut raw, top_n, |c| c.available_ports);
    raw.truncate(selected);

    raw.into_iter()
        .map(|mut counter| {
            if let Some(ports) = listen_ports.get(&counter.key.local_ip) {
                fold_listeners(&mut counter, ports, range);
            }
            let connect_id = decode_connect_id(&path, &counter.key)?;
            if counter.available_ports <= 0 {
                warn!(
                    "{connect_id}: ephemeral ports exhausted ({} left)",
                    counter.available_ports
                );
            }
            Ok(PortCounter::new(
                connect_id,
                counter.used_ports,
                counter.available_ports,
            ))
        })
        .collect()
}
