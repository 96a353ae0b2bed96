//! Sparse paged bitmap over the IPv4 address space.
//!
//! The 2^32 address space is split into 65536 pages of 65536 addresses each.
//! A page is keyed by the upper 16 bits of an address and only materialized
//! once an address inside it is inserted, so memory grows with the number of
//! distinct /16 blocks touched rather than with the size of the universe.
//!
//! ```text
//!   address  0x0A000001
//!            |--||--|
//!            page bit
//!           0x0A00 0x0001
//! ```
//!
//! [`IpBitmap`] is the mutable builder. [`IpBitmap::freeze`] turns it into a
//! [`FrozenIpBitmap`], the read-only snapshot that the codec encodes and
//! decodes. [`StripedIpBitmap`] is a lock-striped builder for concurrent
//! ingestion.

mod frozen;
mod page;
mod striped;

pub use frozen::{FrozenIpBitmap, Pages};
pub use page::{Page, PAGE_BITS, PAGE_BYTES};
pub use striped::StripedIpBitmap;

use ahash::AHashMap;
use std::net::Ipv4Addr;

/// Page index of an address (upper 16 bits).
#[inline]
pub fn page_index(addr: u32) -> u16 {
    (addr >> 16) as u16
}

/// Bit index of an address within its page (lower 16 bits).
#[inline]
pub fn bit_index(addr: u32) -> u16 {
    (addr & 0xFFFF) as u16
}

/// Rebuild an address from its page and bit index.
#[inline]
pub fn join(page: u16, bit: u16) -> u32 {
    ((page as u32) << 16) | bit as u32
}

/// Mutable set of IPv4 addresses.
///
/// # Examples
/// ```
/// use ipexist::IpBitmap;
///
/// let mut set = IpBitmap::new();
/// set.insert(0x0A000001);
/// set.insert_ipv4("10.0.0.2".parse().unwrap());
///
/// assert!(set.contains(0x0A000002));
/// assert_eq!(set.cardinality(), 2);
/// assert_eq!(set.page_count(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct IpBitmap {
    pages: AHashMap<u16, Page>,
    cardinality: u64,
}

impl IpBitmap {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_parts(pages: AHashMap<u16, Page>, cardinality: u64) -> Self {
        Self { pages, cardinality }
    }

    /// Insert an address. Returns `true` if it was not already present.
    pub fn insert(&mut self, addr: u32) -> bool {
        let added = self
            .pages
            .entry(page_index(addr))
            .or_default()
            .set(bit_index(addr));
        if added {
            self.cardinality += 1;
        }
        added
    }

    /// Insert an [`Ipv4Addr`].
    pub fn insert_ipv4(&mut self, addr: Ipv4Addr) -> bool {
        self.insert(u32::from(addr))
    }

    /// Check whether an address is present.
    pub fn contains(&self, addr: u32) -> bool {
        self.pages
            .get(&page_index(addr))
            .is_some_and(|page| page.test(bit_index(addr)))
    }

    /// Check whether an [`Ipv4Addr`] is present.
    pub fn contains_ipv4(&self, addr: Ipv4Addr) -> bool {
        self.contains(u32::from(addr))
    }

    /// Number of distinct addresses present.
    pub fn cardinality(&self) -> u64 {
        self.cardinality
    }

    /// Number of materialized pages.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Whether the set holds no addresses.
    pub fn is_empty(&self) -> bool {
        self.cardinality == 0
    }

    /// Iterate `(page_index, bitmap)` pairs in ascending page order.
    pub fn pages(&self) -> impl Iterator<Item = (u16, &[u8; PAGE_BYTES])> + '_ {
        let mut order: Vec<u16> = self.pages.keys().copied().collect();
        order.sort_unstable();
        order
            .into_iter()
            .filter_map(move |index| self.pages.get(&index).map(|p| (index, p.as_bytes())))
    }

    /// Finish construction and take a read-only snapshot.
    pub fn freeze(self) -> FrozenIpBitmap {
        FrozenIpBitmap::from_table(self.pages, self.cardinality)
    }
}

impl Extend<u32> for IpBitmap {
    fn extend<I: IntoIterator<Item = u32>>(&mut self, iter: I) {
        for addr in iter {
            self.insert(addr);
        }
    }
}

impl FromIterator<u32> for IpBitmap {
    fn from_iter<I: IntoIterator<Item = u32>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}
