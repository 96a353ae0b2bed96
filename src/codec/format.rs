//! Set file format constants and header.

use crate::pager::PAGE_BYTES;
use crate::{Error, Result};

/// Magic bytes for identifying set files.
pub const MAGIC: [u8; 8] = *b"IPBITMAP";

/// Current format version.
pub const FORMAT_VERSION: u16 = 1;

/// Header size in bytes: magic + version + page count.
pub const HEADER_SIZE: usize = 8 + 2 + 4;

/// Size of one page record: page index + bitmap.
pub const RECORD_SIZE: usize = 2 + PAGE_BYTES;

/// Largest possible number of page records.
pub const MAX_PAGES: usize = 1 << 16;

/// Exact encoded size of a set with `page_count` pages.
pub fn encoded_len(page_count: usize) -> u64 {
    HEADER_SIZE as u64 + page_count as u64 * RECORD_SIZE as u64
}

/// File header (14 bytes, big-endian fields).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetHeader {
    /// Magic bytes: "IPBITMAP"
    pub magic: [u8; 8],
    /// Format version
    pub version: u16,
    /// Number of page records that follow
    pub page_count: u32,
}

impl SetHeader {
    pub fn new(page_count: u32) -> Self {
        Self {
            magic: MAGIC,
            version: FORMAT_VERSION,
            page_count,
        }
    }

    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut out = [0u8; HEADER_SIZE];
        out[0..8].copy_from_slice(&self.magic);
        out[8..10].copy_from_slice(&self.version.to_be_bytes());
        out[10..14].copy_from_slice(&self.page_count.to_be_bytes());
        out
    }

    pub fn from_bytes(bytes: &[u8; HEADER_SIZE]) -> Self {
        let mut magic = [0u8; 8];
        magic.copy_from_slice(&bytes[0..8]);
        Self {
            magic,
            version: u16::from_be_bytes([bytes[8], bytes[9]]),
            page_count: u32::from_be_bytes([bytes[10], bytes[11], bytes[12], bytes[13]]),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.magic != MAGIC {
            return Err(Error::InvalidMagic { found: self.magic });
        }
        if self.version != FORMAT_VERSION {
            return Err(Error::UnsupportedVersion(self.version));
        }
        Ok(())
    }
}
