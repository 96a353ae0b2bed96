//! Set file encoder.

use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use tempfile::NamedTempFile;

use super::format::*;
use crate::pager::FrozenIpBitmap;
use crate::{Error, Result};

/// Sink wrapper that remembers how far it got, for error reporting.
struct OffsetWriter<W> {
    inner: W,
    offset: u64,
}

impl<W: Write> OffsetWriter<W> {
    fn new(inner: W) -> Self {
        Self { inner, offset: 0 }
    }

    fn put(&mut self, mut bytes: &[u8]) -> Result<()> {
        while !bytes.is_empty() {
            match self.inner.write(bytes) {
                Ok(0) => {
                    return Err(Error::EncodeIo {
                        offset: self.offset,
                        source: io::Error::from(io::ErrorKind::WriteZero),
                    })
                }
                Ok(n) => {
                    bytes = &bytes[n..];
                    self.offset += n as u64;
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(source) => {
                    return Err(Error::EncodeIo {
                        offset: self.offset,
                        source,
                    })
                }
            }
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.inner.flush().map_err(|source| Error::EncodeIo {
            offset: self.offset,
            source,
        })
    }
}

/// Encode a set into `writer`.
///
/// Returns the number of bytes written, always `encoded_len(set.page_count())`.
/// On error the sink holds a partial file that must be discarded.
pub fn encode<W: Write>(set: &FrozenIpBitmap, writer: W) -> Result<u64> {
    let mut out = OffsetWriter::new(writer);

    out.put(&SetHeader::new(set.page_count() as u32).to_bytes())?;
    for (index, bitmap) in set.pages() {
        out.put(&index.to_be_bytes())?;
        out.put(bitmap)?;
    }
    out.flush()?;

    Ok(out.offset)
}

/// Encode a set into a new buffer.
pub fn encode_to_vec(set: &FrozenIpBitmap) -> Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(encoded_len(set.page_count()) as usize);
    encode(set, &mut buf)?;
    Ok(buf)
}

/// Encode a set to `path`, replacing it atomically.
///
/// The file is written to a temporary sibling and renamed into place only
/// after a successful encode, so a failed write never leaves a partial file
/// at `path`.
pub fn save(set: &FrozenIpBitmap, path: impl AsRef<Path>) -> Result<u64> {
    let path = path.as_ref();
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut temp = NamedTempFile::new_in(dir)?;
    let written = encode(set, BufWriter::new(temp.as_file_mut()))?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| Error::Io(e.error))?;

    Ok(written)
}
