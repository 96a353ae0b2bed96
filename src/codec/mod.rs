//! Binary file format for persisted address sets.
//!
//! # File Structure
//!
//! ```text
//! +------------------------+
//! |  MAGIC "IPBITMAP"      |  8 bytes
//! +------------------------+
//! |  VERSION (u16 BE)      |  2 bytes
//! +------------------------+
//! |  PAGE COUNT n (u32 BE) |  4 bytes
//! +------------------------+
//! |  PAGE INDEX (u16 BE)   |  2 bytes    \
//! +------------------------+              > repeated n times,
//! |  PAGE BITMAP           |  8192 bytes /  ascending page index
//! +------------------------+
//! ```
//!
//! A file holding `n` pages is exactly `14 + n * 8194` bytes. Pages are
//! written in strictly ascending index order, so two encodings of the same
//! set are byte-identical and can be compared by [`content_digest`].

mod format;
mod reader;
mod writer;

#[cfg(test)]
mod tests;

pub use format::*;
pub use reader::{decode, decode_from_slice, load};
pub use writer::{encode, encode_to_vec, save};

use sha2::{Digest, Sha256};

use crate::pager::FrozenIpBitmap;

/// SHA-256 of the canonical encoding of `set`.
///
/// Equal sets always produce equal digests, whatever order their addresses
/// were inserted in. The digest equals the SHA-256 of the bytes [`encode`]
/// would write.
pub fn content_digest(set: &FrozenIpBitmap) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(SetHeader::new(set.page_count() as u32).to_bytes());
    for (index, bitmap) in set.pages() {
        hasher.update(index.to_be_bytes());
        hasher.update(bitmap);
    }
    hasher.finalize().into()
}
