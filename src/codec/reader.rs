//! Set file decoder.

use memmap2::Mmap;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use super::format::*;
use crate::pager::{FrozenIpBitmap, Page, PAGE_BYTES};
use crate::{Error, Result};

/// Source wrapper that tracks the read position, for error reporting.
struct OffsetReader<R> {
    inner: R,
    offset: u64,
}

impl<R: Read> OffsetReader<R> {
    fn new(inner: R) -> Self {
        Self { inner, offset: 0 }
    }

    /// Fill `buf` completely or fail with the offset of the field.
    fn fill(&mut self, buf: &mut [u8]) -> Result<()> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => {
                    return Err(Error::Truncated {
                        offset: self.offset,
                        expected: buf.len(),
                        actual: filled,
                    })
                }
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(source) => {
                    return Err(Error::DecodeIo {
                        offset: self.offset + filled as u64,
                        source,
                    })
                }
            }
        }
        self.offset += buf.len() as u64;
        Ok(())
    }
}

/// Decode a set from `reader`.
///
/// Reads exactly one encoded set and leaves anything after it unread. Any
/// error aborts the whole decode; no partial set is returned.
pub fn decode<R: Read>(reader: R) -> Result<FrozenIpBitmap> {
    let mut input = OffsetReader::new(reader);

    // Check the magic before reading further so foreign files are reported
    // as such rather than as truncated.
    let mut raw = [0u8; HEADER_SIZE];
    input.fill(&mut raw[..8])?;
    if raw[..8] != MAGIC {
        let mut found = [0u8; 8];
        found.copy_from_slice(&raw[..8]);
        return Err(Error::InvalidMagic { found });
    }
    input.fill(&mut raw[8..])?;
    let header = SetHeader::from_bytes(&raw);
    header.validate()?;

    let count = header.page_count as usize;
    let mut records = Vec::with_capacity(count.min(MAX_PAGES));
    let mut previous: Option<u16> = None;
    let mut bitmap = [0u8; PAGE_BYTES];

    for _ in 0..count {
        let record_offset = input.offset;

        let mut index = [0u8; 2];
        input.fill(&mut index)?;
        let index = u16::from_be_bytes(index);
        if let Some(previous) = previous {
            if index <= previous {
                return Err(Error::OrderViolation {
                    offset: record_offset,
                    previous,
                    index,
                });
            }
        }

        input.fill(&mut bitmap)?;
        let page = Page::from_bytes(&bitmap);
        if page.is_empty() {
            return Err(Error::EmptyPage {
                offset: record_offset,
                index,
            });
        }

        records.push((index, page));
        previous = Some(index);
    }

    Ok(FrozenIpBitmap::from_sorted(records))
}

/// Decode a set that must span the whole buffer.
pub fn decode_from_slice(data: &[u8]) -> Result<FrozenIpBitmap> {
    let set = decode(data)?;
    let expected = encoded_len(set.page_count());
    if data.len() as u64 != expected {
        return Err(Error::TrailingData {
            expected,
            actual: data.len() as u64,
        });
    }
    Ok(set)
}

/// Load a set file through a memory map.
pub fn load(path: impl AsRef<Path>) -> Result<FrozenIpBitmap> {
    let file = File::open(path.as_ref())?;

    // Empty mappings are not portable; a file this short cannot hold a
    // header anyway.
    if file.metadata()?.len() < HEADER_SIZE as u64 {
        let mut data = Vec::new();
        (&file).read_to_end(&mut data)?;
        return decode_from_slice(&data);
    }

    // The map is only read while `file` is open and dropped before returning.
    let mmap = unsafe { Mmap::map(&file)? };
    decode_from_slice(&mmap)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::encode_to_vec;
    use crate::IpBitmap;

    /// Source that fails after handing out `limit` bytes.
    struct FailingSource<'a> {
        data: &'a [u8],
        limit: usize,
    }

    impl Read for FailingSource<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.limit == 0 {
                return Err(io::Error::new(io::ErrorKind::TimedOut, "timed out"));
            }
            let n = buf.len().min(self.limit).min(self.data.len());
            buf[..n].copy_from_slice(&self.data[..n]);
            self.data = &self.data[n..];
            self.limit -= n;
            Ok(n)
        }
    }

    fn two_page_file() -> Vec<u8> {
        let set: IpBitmap = [0x0A000001, 0xC0A80101].into_iter().collect();
        encode_to_vec(&set.freeze()).unwrap()
    }

    #[test]
    fn test_read_empty_set() {
        let data = encode_to_vec(&IpBitmap::new().freeze()).unwrap();
        let set = decode_from_slice(&data).unwrap();
        assert!(set.is_empty());
        assert_eq!(set.page_count(), 0);
    }

    #[test]
    fn test_foreign_file_is_invalid_magic() {
        let result = decode(&b"192.168.1.1\n10.0.0.1\n"[..]);
        assert!(matches!(result, Err(Error::InvalidMagic { .. })));
    }

    #[test]
    fn test_short_file_is_truncated() {
        let result = decode(&b"IPBIT"[..]);
        assert!(matches!(
            result,
            Err(Error::Truncated {
                offset: 0,
                expected: 8,
                actual: 5
            })
        ));
    }

    #[test]
    fn test_unsupported_version() {
        let mut data = two_page_file();
        data[9] = 7;
        assert!(matches!(
            decode(&data[..]),
            Err(Error::UnsupportedVersion(7))
        ));
    }

    #[test]
    fn test_order_violation() {
        let mut data = two_page_file();
        // Second record index (0xC0A8) rewritten to repeat the first (0x0A00).
        let second = HEADER_SIZE + RECORD_SIZE;
        data[second..second + 2].copy_from_slice(&[0x0A, 0x00]);

        match decode(&data[..]) {
            Err(Error::OrderViolation {
                offset,
                previous,
                index,
            }) => {
                assert_eq!(offset, second as u64);
                assert_eq!(previous, 0x0A00);
                assert_eq!(index, 0x0A00);
            }
            other => panic!("expected OrderViolation, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_page_rejected() {
        let mut data = two_page_file();
        let bitmap = HEADER_SIZE + 2;
        data[bitmap..bitmap + PAGE_BYTES].fill(0);
        assert!(matches!(
            decode(&data[..]),
            Err(Error::EmptyPage {
                offset: 14,
                index: 0x0A00
            })
        ));
    }

    #[test]
    fn test_page_count_beyond_data() {
        let mut data = two_page_file();
        data[10..14].copy_from_slice(&3u32.to_be_bytes());
        assert!(matches!(
            decode(&data[..]),
            Err(Error::Truncated { expected: 2, actual: 0, .. })
        ));
    }

    #[test]
    fn test_trailing_data() {
        let mut data = two_page_file();
        data.push(0);

        // Streams stop after the last record...
        assert!(decode(&data[..]).is_ok());
        // ...but a whole-buffer decode rejects leftovers.
        assert!(matches!(
            decode_from_slice(&data),
            Err(Error::TrailingData { .. })
        ));
    }

    #[test]
    fn test_source_failure_reports_offset() {
        let data = two_page_file();
        let source = FailingSource {
            data: &data,
            limit: 20,
        };
        match decode(source) {
            Err(Error::DecodeIo { offset, source }) => {
                assert_eq!(offset, 20);
                assert_eq!(source.kind(), io::ErrorKind::TimedOut);
            }
            other => panic!("expected DecodeIo, got {:?}", other),
        }
    }

    #[test]
    fn test_load_small_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.ipe");
        std::fs::write(&path, b"").unwrap();
        assert!(matches!(load(&path), Err(Error::Truncated { .. })));
    }
}
