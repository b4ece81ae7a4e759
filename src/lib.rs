#![cfg_attr(docsrs, feature(doc_cfg))]

//! # portstat
//!
//! Estimates, per outbound TCP connection tuple, how close the local
//! ephemeral port pool is to exhaustion, by reading the kernel socket tables
//! once per snapshot.
//!
//! A tuple is `localIP->remoteIP:remotePort`. The kernel needs a distinct
//! local port for every socket of a tuple, so each in-range local port held
//! by the tuple, or by a listener on the same local IP, takes one port out of
//! the pool that tuple can still use. When that count reaches zero, new
//! connections to the same destination fail with "cannot assign requested
//! address".
//!
//! ## Quick Start
//!
//! ```no_run
//! use portstat::{Config, ProcFs, Snapshot};
//!
//! let snapshot = Snapshot::take(&Config::new().top_n(5), &ProcFs::default())?;
//! for counter in &snapshot {
//!     println!(
//!         "{} used={} available={}",
//!         counter.connect_id, counter.used_ports, counter.available_ports
//!     );
//! }
//! # Ok::<(), portstat::Error>(())
//! ```
//!
//! ## Features
//!
//! - `serde-support` - Enable serialization support for the public data types

mod error;
mod types;

pub mod codec;
pub mod monitor;
pub mod range;
pub mod render;
pub mod select;
pub mod snapshot;
pub mod socket;
pub mod source;

// Re-export core types
pub use error::{Error, Result};
pub use types::{AddressFamily, PortCounter, SocketState};

pub use monitor::PortMonitor;
pub use range::EphemeralRange;
pub use render::OutputFormat;
pub use snapshot::{Config, Snapshot};
pub use source::{ProcFs, ProcSource, SocketTable};
