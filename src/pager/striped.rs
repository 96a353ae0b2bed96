//! Lock-striped builder for ingesting from several threads.

use ahash::AHashMap;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

use super::{bit_index, page_index, FrozenIpBitmap, Page};

/// Number of lock stripes. Pages map to stripes by index modulo this value.
const STRIPE_COUNT: usize = 64;

/// Concurrent set builder.
///
/// Inserts into pages that live in different stripes never contend. The
/// builder is consumed by [`freeze`](Self::freeze), so no insert can be in
/// flight once a snapshot exists.
///
/// # Examples
/// ```
/// use ipexist::StripedIpBitmap;
///
/// let set = StripedIpBitmap::new();
/// std::thread::scope(|s| {
///     s.spawn(|| set.insert(0x0A000001));
///     s.spawn(|| set.insert(0xC0A80001));
/// });
/// let frozen = set.freeze();
/// assert_eq!(frozen.cardinality(), 2);
/// ```
pub struct StripedIpBitmap {
    stripes: Box<[RwLock<AHashMap<u16, Page>>]>,
    cardinality: AtomicU64,
}

impl StripedIpBitmap {
    /// Create an empty builder.
    pub fn new() -> Self {
        let stripes = (0..STRIPE_COUNT)
            .map(|_| RwLock::new(AHashMap::new()))
            .collect::<Vec<_>>()
            .into_boxed_slice();
        Self {
            stripes,
            cardinality: AtomicU64::new(0),
        }
    }

    #[inline]
    fn stripe(&self, page: u16) -> &RwLock<AHashMap<u16, Page>> {
        &self.stripes[page as usize % STRIPE_COUNT]
    }

    /// Insert an address. Returns `true` if it was not already present.
    pub fn insert(&self, addr: u32) -> bool {
        let page = page_index(addr);
        let added = self
            .stripe(page)
            .write()
            .entry(page)
            .or_default()
            .set(bit_index(addr));
        if added {
            self.cardinality.fetch_add(1, Ordering::Relaxed);
        }
        added
    }

    /// Check whether an address is present.
    pub fn contains(&self, addr: u32) -> bool {
        let page = page_index(addr);
        self.stripe(page)
            .read()
            .get(&page)
            .is_some_and(|p| p.test(bit_index(addr)))
    }

    /// Number of distinct addresses inserted so far.
    pub fn cardinality(&self) -> u64 {
        self.cardinality.load(Ordering::Relaxed)
    }

    /// Stop accepting inserts and take a read-only snapshot.
    pub fn freeze(self) -> FrozenIpBitmap {
        let mut table = AHashMap::new();
        for stripe in self.stripes.into_vec() {
            table.extend(stripe.into_inner());
        }
        FrozenIpBitmap::from_table(table, self.cardinality.into_inner())
    }
}

impl Default for StripedIpBitmap {
    fn default() -> Self {
        Self::new()
    }
}
