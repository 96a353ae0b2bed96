//! Write-read tests for the set file format.
//!
//! These cover membership preservation, determinism, the size law and the
//! failure modes of corrupt input.

use super::*;
use crate::pager::{FrozenIpBitmap, IpBitmap, PAGE_BYTES};
use crate::Error;

/// Helper to encode a set and decode it back
fn write_and_read(set: &FrozenIpBitmap) -> FrozenIpBitmap {
    let data = encode_to_vec(set).expect("Failed to encode set");
    decode_from_slice(&data).expect("Failed to decode set")
}

/// Small xorshift generator so tests are reproducible without extra crates.
struct XorShift(u32);

impl XorShift {
    fn next(&mut self) -> u32 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.0 = x;
        x
    }
}

/// Addresses clustered into a handful of /16 blocks, like real block lists.
fn clustered(count: usize, seed: u32) -> Vec<u32> {
    let mut rng = XorShift(seed);
    let blocks: Vec<u32> = (0..12).map(|_| rng.next() & 0xFFFF_0000).collect();
    (0..count)
        .map(|_| blocks[rng.next() as usize % blocks.len()] | (rng.next() & 0xFFFF))
        .collect()
}

// ============================================================================
// Round-trip Tests
// ============================================================================

#[test]
fn test_roundtrip_preserves_membership() {
    let addrs = clustered(5_000, 0x1234_5678);
    let original: IpBitmap = addrs.iter().copied().collect();
    let original = original.freeze();

    let decoded = write_and_read(&original);

    for addr in &addrs {
        assert!(decoded.contains(*addr), "missing {:#010x}", addr);
    }

    let mut rng = XorShift(0xDEAD_BEEF);
    for _ in 0..5_000 {
        let probe = rng.next();
        assert_eq!(decoded.contains(probe), original.contains(probe));
    }

    assert_eq!(decoded.cardinality(), original.cardinality());
    assert_eq!(decoded, original);
}

#[test]
fn test_roundtrip_empty_set() {
    let decoded = write_and_read(&IpBitmap::new().freeze());
    assert!(decoded.is_empty());
    assert!(!decoded.contains(0));
    assert!(!decoded.contains(u32::MAX));
}

#[test]
fn test_roundtrip_full_page() {
    let set: IpBitmap = (0x0A00_0000..=0x0A00_FFFF).collect();
    let decoded = write_and_read(&set.freeze());

    assert_eq!(decoded.cardinality(), 65_536);
    assert_eq!(decoded.page_count(), 1);
    assert!(decoded.contains(0x0A00_0000));
    assert!(decoded.contains(0x0A00_FFFF));
    assert!(!decoded.contains(0x09FF_FFFF));
    assert!(!decoded.contains(0x0A01_0000));
}

#[test]
fn test_decoded_set_can_be_extended() {
    let set: IpBitmap = [0x0A000001].into_iter().collect();
    let mut thawed = write_and_read(&set.freeze()).thaw();
    thawed.insert(0x0A000002);

    let data = encode_to_vec(&thawed.freeze()).unwrap();
    let decoded = decode_from_slice(&data).unwrap();
    assert_eq!(decoded.cardinality(), 2);
}

// ============================================================================
// Determinism and Size Tests
// ============================================================================

#[test]
fn test_insertion_order_does_not_change_bytes() {
    let addrs = clustered(2_000, 42);
    let mut reversed = addrs.clone();
    reversed.reverse();

    let forward: IpBitmap = addrs.into_iter().collect();
    let backward: IpBitmap = reversed.into_iter().collect();

    let a = encode_to_vec(&forward.freeze()).unwrap();
    let b = encode_to_vec(&backward.freeze()).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_content_digest_matches_for_equal_sets() {
    let a: IpBitmap = [3, 1, 2].into_iter().collect();
    let b: IpBitmap = [2, 3, 1, 1].into_iter().collect();
    let c: IpBitmap = [1, 2].into_iter().collect();

    let da = content_digest(&a.freeze());
    let db = content_digest(&b.freeze());
    let dc = content_digest(&c.freeze());
    assert_eq!(da, db);
    assert_ne!(da, dc);
}

#[test]
fn test_content_digest_hashes_encoded_bytes() {
    use sha2::{Digest, Sha256};

    for addrs in [vec![], vec![0x0A000001], clustered(3_000, 99)] {
        let set: IpBitmap = addrs.into_iter().collect();
        let frozen = set.freeze();
        let data = encode_to_vec(&frozen).unwrap();
        let expected: [u8; 32] = Sha256::digest(&data).into();
        assert_eq!(content_digest(&frozen), expected);
    }
}

#[test]
fn test_size_law() {
    for pages in [0usize, 1, 2, 17] {
        let set: IpBitmap = (0..pages as u32).map(|p| (p << 16) | 0x00FF).collect();
        let data = encode_to_vec(&set.freeze()).unwrap();
        assert_eq!(data.len() as u64, 14 + pages as u64 * 8194);
        assert_eq!(data.len() as u64, encoded_len(pages));
    }
}

#[test]
fn test_two_addresses_example() {
    let mut set = IpBitmap::new();
    set.insert(0x0A000001); // 10.0.0.1
    set.insert(0x0A000002); // 10.0.0.2
    assert_eq!(set.cardinality(), 2);

    let frozen = set.freeze();
    let pages: Vec<(u16, &[u8; PAGE_BYTES])> = frozen.pages().collect();
    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].0, 0x0A00);
    assert_eq!(
        pages[0].1.iter().map(|b| b.count_ones()).sum::<u32>(),
        2
    );

    let data = encode_to_vec(&frozen).unwrap();
    assert_eq!(data.len(), 8208);
}

// ============================================================================
// Boundary Tests
// ============================================================================

#[test]
fn test_boundary_addresses_roundtrip() {
    let set: IpBitmap = [0x0000_0000, 0xFFFF_FFFF].into_iter().collect();
    let data = encode_to_vec(&set.freeze()).unwrap();

    // First record: page 0x0000 with bit 0 in its first byte.
    assert_eq!(&data[14..16], &[0x00, 0x00]);
    assert_eq!(data[16], 0x01);

    // Second record: page 0xFFFF with bit 65535 in its last byte.
    let second = HEADER_SIZE + RECORD_SIZE;
    assert_eq!(&data[second..second + 2], &[0xFF, 0xFF]);
    assert_eq!(*data.last().unwrap(), 0x80);

    let decoded = decode_from_slice(&data).unwrap();
    assert!(decoded.contains(0x0000_0000));
    assert!(decoded.contains(0xFFFF_FFFF));
    assert!(!decoded.contains(0x0000_0001));
    assert!(!decoded.contains(0xFFFF_FFFE));
    assert!(!decoded.contains(0x0000_FFFF));
    assert!(!decoded.contains(0xFFFF_0000));
}

// ============================================================================
// Corruption Tests
// ============================================================================

#[test]
fn test_truncated_by_one_byte() {
    let set: IpBitmap = [0x0A000001, 0x0A000002].into_iter().collect();
    let mut data = encode_to_vec(&set.freeze()).unwrap();
    data.pop();

    match decode_from_slice(&data) {
        Err(Error::Truncated {
            offset,
            expected,
            actual,
        }) => {
            assert_eq!(offset, 16);
            assert_eq!(expected, PAGE_BYTES);
            assert_eq!(actual, PAGE_BYTES - 1);
        }
        other => panic!("expected Truncated, got {:?}", other),
    }
}

#[test]
fn test_every_truncation_fails() {
    let set: IpBitmap = [0x01000000, 0x02000000].into_iter().collect();
    let data = encode_to_vec(&set.freeze()).unwrap();

    // Cut inside the header, at each record boundary and inside each bitmap.
    for len in [0, 7, 8, 13, 14, 15, 16, 100, 8208, 8209, 8210, data.len() - 1] {
        let err = decode_from_slice(&data[..len]).unwrap_err();
        assert!(
            matches!(err, Error::Truncated { .. }),
            "len {}: unexpected {:?}",
            len,
            err
        );
    }
}

#[test]
fn test_corrupt_magic() {
    let mut data = encode_to_vec(&IpBitmap::new().freeze()).unwrap();
    data[0] = 0xFF;

    let err = decode_from_slice(&data).unwrap_err();
    assert!(matches!(err, Error::InvalidMagic { .. }));
    assert!(err.is_corrupt_input());
}

#[test]
fn test_descending_records_rejected() {
    let set: IpBitmap = [0x01000000, 0x02000000].into_iter().collect();
    let mut data = encode_to_vec(&set.freeze()).unwrap();

    // Swap the two page indices.
    let second = HEADER_SIZE + RECORD_SIZE;
    data[14..16].copy_from_slice(&[0x02, 0x00]);
    data[second..second + 2].copy_from_slice(&[0x01, 0x00]);

    assert!(matches!(
        decode_from_slice(&data),
        Err(Error::OrderViolation {
            previous: 0x0200,
            index: 0x0100,
            ..
        })
    ));
}

// ============================================================================
// File Tests
// ============================================================================

#[test]
fn test_save_and_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("set.ipe");

    let addrs = clustered(1_000, 7);
    let set: IpBitmap = addrs.iter().copied().collect();
    let frozen = set.freeze();

    let written = save(&frozen, &path).unwrap();
    assert_eq!(written, encoded_len(frozen.page_count()));

    let loaded = load(&path).unwrap();
    assert_eq!(loaded, frozen);
    for addr in addrs {
        assert!(loaded.contains(addr));
    }
}

#[test]
fn test_save_replaces_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("set.ipe");

    let big: IpBitmap = [0x01000000, 0x02000000, 0x03000000].into_iter().collect();
    save(&big.freeze(), &path).unwrap();

    let small: IpBitmap = [0x01000000].into_iter().collect();
    save(&small.freeze(), &path).unwrap();

    assert_eq!(std::fs::metadata(&path).unwrap().len(), 8208);
    assert_eq!(load(&path).unwrap().cardinality(), 1);
}
