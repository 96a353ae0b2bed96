//! Human- and machine-readable description of a set.

use serde::Serialize;

use crate::codec::{content_digest, encoded_len};
use crate::pager::FrozenIpBitmap;
use crate::Result;

/// Summary of a set as it would be stored on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SetSummary {
    /// Number of materialized pages
    pub pages: usize,
    /// Number of distinct addresses
    pub cardinality: u64,
    /// Encoded size in bytes
    pub encoded_bytes: u64,
    /// SHA-256 of the encoding, lowercase hex
    pub sha256: String,
}

impl SetSummary {
    /// Summarize a set.
    pub fn of(set: &FrozenIpBitmap) -> Self {
        Self {
            pages: set.page_count(),
            cardinality: set.cardinality(),
            encoded_bytes: encoded_len(set.page_count()),
            sha256: hex_digest(&content_digest(set)),
        }
    }

    /// Render as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))
    }
}

/// Lowercase hex rendering of a digest.
pub fn hex_digest(digest: &[u8]) -> String {
    hex::encode(digest)
}
