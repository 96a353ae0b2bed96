//! Read-only snapshot of a set, the unit of encoding.

use ahash::AHashMap;
use std::net::Ipv4Addr;

use super::{bit_index, join, page_index, IpBitmap, Page, PAGE_BYTES};

/// Immutable set of IPv4 addresses.
///
/// Produced by [`IpBitmap::freeze`], [`StripedIpBitmap::freeze`](super::StripedIpBitmap::freeze)
/// or by decoding. Keeps the page indices pre-sorted so encoding walks them
/// in ascending order without sorting.
#[derive(Debug, Clone, Default)]
pub struct FrozenIpBitmap {
    pages: AHashMap<u16, Page>,
    order: Vec<u16>,
    cardinality: u64,
}

impl FrozenIpBitmap {
    pub(crate) fn from_table(pages: AHashMap<u16, Page>, cardinality: u64) -> Self {
        let mut order: Vec<u16> = pages.keys().copied().collect();
        order.sort_unstable();
        Self {
            pages,
            order,
            cardinality,
        }
    }

    /// Build from pages already in strictly ascending index order.
    pub(crate) fn from_sorted(records: Vec<(u16, Page)>) -> Self {
        let mut pages = AHashMap::with_capacity(records.len());
        let mut order = Vec::with_capacity(records.len());
        let mut cardinality = 0u64;

        for (index, page) in records {
            debug_assert!(order.last().map_or(true, |prev| *prev < index));
            cardinality += page.count_ones() as u64;
            order.push(index);
            pages.insert(index, page);
        }

        Self {
            pages,
            order,
            cardinality,
        }
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
        self.order.len()
    }

    /// Whether the set holds no addresses.
    pub fn is_empty(&self) -> bool {
        self.cardinality == 0
    }

    /// Get one page by index.
    pub fn page(&self, index: u16) -> Option<&Page> {
        self.pages.get(&index)
    }

    /// Iterate `(page_index, bitmap)` pairs in ascending page order.
    ///
    /// The iterator is cheap to clone, so a walk can be restarted.
    pub fn pages(&self) -> Pages<'_> {
        Pages {
            order: self.order.iter(),
            table: &self.pages,
        }
    }

    /// Iterate all member addresses in ascending order.
    pub fn addresses(&self) -> impl Iterator<Item = u32> + '_ {
        self.order.iter().flat_map(move |index| {
            let index = *index;
            self.pages[&index].iter_bits().map(move |bit| join(index, bit))
        })
    }

    /// Turn the snapshot back into a mutable builder.
    pub fn thaw(self) -> IpBitmap {
        IpBitmap::from_parts(self.pages, self.cardinality)
    }
}

impl PartialEq for FrozenIpBitmap {
    fn eq(&self, other: &Self) -> bool {
        self.order == other.order
            && self
                .order
                .iter()
                .all(|index| self.pages.get(index) == other.pages.get(index))
    }
}

impl Eq for FrozenIpBitmap {}

/// Ascending iterator over the pages of a [`FrozenIpBitmap`].
#[derive(Clone)]
pub struct Pages<'a> {
    order: std::slice::Iter<'a, u16>,
    table: &'a AHashMap<u16, Page>,
}

impl<'a> Iterator for Pages<'a> {
    type Item = (u16, &'a [u8; PAGE_BYTES]);

    fn next(&mut self) -> Option<Self::Item> {
        let index = *self.order.next()?;
        self.table.get(&index).map(|page| (index, page.as_bytes()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.order.size_hint()
    }
}

impl ExactSizeIterator for Pages<'_> {}
