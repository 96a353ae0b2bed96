//! Line-oriented ingestion of textual IPv4 addresses.
//!
//! Each input line is filtered through [`parse_address`]; anything that is
//! not a 4-byte IPv4 literal is skipped, so only valid addresses reach the
//! set.

use serde::Serialize;
use std::io::{BufRead, BufReader, Read};
use std::net::{Ipv4Addr, Ipv6Addr};

use crate::pager::{IpBitmap, StripedIpBitmap};
use crate::Result;

/// Something addresses can be inserted into.
pub trait AddressSink {
    /// Insert an address. Returns `true` if it was not already present.
    fn insert_address(&mut self, addr: u32) -> bool;
}

impl AddressSink for IpBitmap {
    fn insert_address(&mut self, addr: u32) -> bool {
        self.insert(addr)
    }
}

impl AddressSink for &StripedIpBitmap {
    fn insert_address(&mut self, addr: u32) -> bool {
        self.insert(addr)
    }
}

/// Counters for one ingestion pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestStats {
    /// Lines holding a valid address (duplicates included)
    pub accepted: u64,
    /// Lines that were skipped
    pub rejected: u64,
}

impl IngestStats {
    /// Add another pass's counters to this one.
    pub fn merge(&mut self, other: IngestStats) {
        self.accepted += other.accepted;
        self.rejected += other.rejected;
    }
}

/// Parse one line into an address.
///
/// Surrounding newlines, carriage returns and quotes are stripped, then
/// whitespace. Dotted-quad literals are accepted, as are IPv4-mapped IPv6
/// literals (`::ffff:a.b.c.d`), which carry a 4-byte address. Everything
/// else yields `None`.
///
/// # Examples
/// ```
/// use ipexist::parse_address;
///
/// assert_eq!(parse_address("10.0.0.1"), Some(0x0A000001));
/// assert_eq!(parse_address("\"192.168.1.1\"\r\n"), Some(0xC0A80101));
/// assert_eq!(parse_address("2001:db8::1"), None);
/// assert_eq!(parse_address("10.0.0.0/8"), None);
/// ```
pub fn parse_address(line: &str) -> Option<u32> {
    let text = line
        .trim_matches(|c: char| matches!(c, '\n' | '\r' | '"' | '\''))
        .trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(v4) = text.parse::<Ipv4Addr>() {
        return Some(u32::from(v4));
    }

    text.parse::<Ipv6Addr>()
        .ok()?
        .to_ipv4_mapped()
        .map(u32::from)
}

/// Read addresses line by line from `reader` into `sink`.
///
/// Lines that are not valid UTF-8 are rejected like any other malformed
/// line. A final line without a trailing newline is still processed. Read
/// failures abort the pass.
pub fn ingest<R, S>(reader: R, sink: &mut S, report_rejects: bool) -> Result<IngestStats>
where
    R: Read,
    S: AddressSink + ?Sized,
{
    let mut reader = BufReader::new(reader);
    let mut line = Vec::new();
    let mut stats = IngestStats::default();

    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            break;
        }

        let text = String::from_utf8_lossy(&line);
        match parse_address(&text) {
            Some(addr) => {
                sink.insert_address(addr);
                stats.accepted += 1;
            }
            None => {
                stats.rejected += 1;
                if report_rejects {
                    log::debug!("Failed to handle {:?}", text.trim_end());
                }
            }
        }
    }

    Ok(stats)
}
