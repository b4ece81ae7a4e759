//! Kernel TCP socket table parsing
//!
//! [`table`] walks `/proc/net/tcp` or `/proc/net/tcp6` once and counts ports
//! per connection tuple; [`aggregate`] picks the tuples closest to exhaustion
//! and charges them for listeners sharing their local IP.

pub mod aggregate;
pub mod table;

pub use aggregate::{decode_connect_id, top_counters};
pub use table::{scan_table, ConnectionKey, ConnectionTable, RawCounter, TableScan};
