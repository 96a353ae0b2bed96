//! Fixed-size bitmap page covering 65536 consecutive addresses.

use std::fmt;

/// Number of addresses covered by one page.
pub const PAGE_BITS: usize = 1 << 16;

/// Size of one page bitmap in bytes.
pub const PAGE_BYTES: usize = PAGE_BITS / 8;

/// A flat 8 KiB bit vector.
///
/// Bit `i` lives in byte `i / 8` at position `i % 8` (LSB-first), which is
/// also the on-disk layout, so a page is written and read verbatim.
#[derive(Clone, PartialEq, Eq)]
pub struct Page {
    bits: Box<[u8; PAGE_BYTES]>,
}

impl Page {
    /// Create an all-zero page.
    pub fn new() -> Self {
        Self {
            bits: Box::new([0u8; PAGE_BYTES]),
        }
    }

    /// Create a page from a raw bitmap.
    pub fn from_bytes(bytes: &[u8; PAGE_BYTES]) -> Self {
        Self {
            bits: Box::new(*bytes),
        }
    }

    /// Set a bit. Returns `true` if it was previously clear.
    #[inline]
    pub fn set(&mut self, bit: u16) -> bool {
        let (byte, mask) = locate(bit);
        let was_clear = self.bits[byte] & mask == 0;
        self.bits[byte] |= mask;
        was_clear
    }

    /// Test a bit.
    #[inline]
    pub fn test(&self, bit: u16) -> bool {
        let (byte, mask) = locate(bit);
        self.bits[byte] & mask != 0
    }

    /// Number of set bits.
    pub fn count_ones(&self) -> u32 {
        self.bits
            .chunks_exact(8)
            .map(|chunk| {
                let mut word = [0u8; 8];
                word.copy_from_slice(chunk);
                u64::from_le_bytes(word).count_ones()
            })
            .sum()
    }

    /// Whether no bit is set.
    pub fn is_empty(&self) -> bool {
        self.bits.iter().all(|b| *b == 0)
    }

    /// Raw bitmap bytes.
    pub fn as_bytes(&self) -> &[u8; PAGE_BYTES] {
        &self.bits
    }

    /// Iterate set bit positions in ascending order.
    pub fn iter_bits(&self) -> impl Iterator<Item = u16> + '_ {
        self.bits
            .iter()
            .enumerate()
            .filter(|(_, byte)| **byte != 0)
            .flat_map(|(i, byte)| {
                (0..8u16)
                    .filter(move |pos| *byte & (1u8 << pos) != 0)
                    .map(move |pos| (i as u16) * 8 + pos)
            })
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Page")
            .field("count", &self.count_ones())
            .finish()
    }
}

#[inline]
fn locate(bit: u16) -> (usize, u8) {
    ((bit >> 3) as usize, 1u8 << (bit & 7))
}
