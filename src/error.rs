//! Error types for ipexist.

use thiserror::Error;

/// Error type for ipexist operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Stream does not start with the set file magic bytes
    #[error("not a recognized set file: bad magic bytes {found:02x?}")]
    InvalidMagic { found: [u8; 8] },

    /// Format version this build cannot read
    #[error("unsupported format version: {0}")]
    UnsupportedVersion(u16),

    /// Stream ended before the declared content was read
    #[error("truncated stream at offset {offset}: expected {expected} bytes, got {actual}")]
    Truncated {
        offset: u64,
        expected: usize,
        actual: usize,
    },

    /// Page records are not in strictly ascending index order
    #[error("page order violation at offset {offset}: index {index:#06x} follows {previous:#06x}")]
    OrderViolation {
        offset: u64,
        previous: u16,
        index: u16,
    },

    /// Page record with no bits set
    #[error("empty page {index:#06x} at offset {offset}")]
    EmptyPage { offset: u64, index: u16 },

    /// Bytes left over after the last page record
    #[error("trailing data: expected {expected} bytes, got {actual}")]
    TrailingData { expected: u64, actual: u64 },

    /// Underlying sink failed while encoding
    #[error("write failed at offset {offset}: {source}")]
    EncodeIo {
        offset: u64,
        #[source]
        source: std::io::Error,
    },

    /// Underlying source failed while decoding
    #[error("read failed at offset {offset}: {source}")]
    DecodeIo {
        offset: u64,
        #[source]
        source: std::io::Error,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Whether this error means the input is not a valid set file.
    ///
    /// Sink/source failures and configuration errors return `false`.
    pub fn is_corrupt_input(&self) -> bool {
        matches!(
            self,
            Error::InvalidMagic { .. }
                | Error::UnsupportedVersion(_)
                | Error::Truncated { .. }
                | Error::OrderViolation { .. }
                | Error::EmptyPage { .. }
                | Error::TrailingData { .. }
        )
    }
}

/// Result type alias for ipexist operations.
pub type Result<T> = std::result::Result<T, Error>;
