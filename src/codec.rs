//! Hex address codec for `/proc/net/tcp{,6}`
//!
//! The kernel prints each 32-bit word of an address in host byte order, so on
//! little-endian machines `127.0.0.1` shows up as `0100007F`. IPv6 addresses
//! are four such words back to back.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::num::ParseIntError;

use crate::error::{Error, Result};

/// Reverse every 4-byte word in place
fn swap_words(bytes: &mut [u8]) {
    for word in bytes.chunks_exact_mut(4) {
        word.reverse();
    }
}

/// Decode a kernel hex address into an IP address
///
/// # Errors
/// Returns [`Error::HexDecode`] if `hex_ip` is not valid hex, and
/// [`Error::AddressFormat`] if it does not decode to 4 or 16 bytes
pub fn decode_ip(hex_ip: &str) -> Result<IpAddr> {
    let mut bytes = hex::decode(hex_ip).map_err(|source| Error::HexDecode {
        hex: hex_ip.to_string(),
        source,
    })?;
    swap_words(&mut bytes);

    match bytes.len() {
        4 => Ok(IpAddr::V4(Ipv4Addr::new(
            bytes[0], bytes[1], bytes[2], bytes[3],
        ))),
        16 => {
            let mut octets = [0u8; 16];
            octets.copy_from_slice(&bytes);
            Ok(IpAddr::V6(Ipv6Addr::from(octets)))
        }
        len => Err(Error::AddressFormat {
            hex: hex_ip.to_string(),
            len,
        }),
    }
}

/// Encode an IP address the way the kernel prints it
#[must_use]
pub fn encode_ip(ip: &IpAddr) -> String {
    let mut bytes = match ip {
        IpAddr::V4(v4) => v4.octets().to_vec(),
        IpAddr::V6(v6) => v6.octets().to_vec(),
    };
    swap_words(&mut bytes);
    hex::encode_upper(bytes)
}

/// Parse a hex port such as `0016`
///
/// # Errors
/// Returns the underlying parse error if `hex_port` is not a valid `u16`
pub fn parse_port(hex_port: &str) -> std::result::Result<u16, ParseIntError> {
    u16::from_str_radix(hex_port, 16)
}

/// Text form of an address for connect identifiers.
///
/// IPv4-mapped IPv6 addresses print as plain dotted quads, so a
/// dual-stack socket reads the same as its IPv4 counterpart.
#[must_use]
pub fn display_ip(ip: &IpAddr) -> String {
    ip.to_canonical().to_string()
}
