//! Text-to-set build pipeline.

use std::panic;
use std::thread::{self, ScopedJoinHandle};

use crate::codec;
use crate::config::{BuildOptions, InputSource};
use crate::ingest::{ingest, IngestStats};
use crate::pager::{FrozenIpBitmap, IpBitmap, StripedIpBitmap};
use crate::summary::hex_digest;
use crate::Result;

/// Outcome of a successful build.
#[derive(Debug, Clone)]
pub struct BuildReport {
    /// Line counters over all inputs
    pub stats: IngestStats,
    /// Number of pages written
    pub page_count: usize,
    /// Number of distinct addresses written
    pub cardinality: u64,
    /// Size of the output file
    pub bytes_written: u64,
    /// SHA-256 of the output file
    pub digest: [u8; 32],
}

impl BuildReport {
    /// Digest as lowercase hex.
    pub fn digest_hex(&self) -> String {
        hex_digest(&self.digest)
    }
}

/// Ingest every input, then write the set to the output file.
///
/// The output is replaced atomically; on failure any previous file at that
/// path is left untouched.
pub fn build(options: &BuildOptions) -> Result<BuildReport> {
    options.validate()?;

    let (set, stats) = match options.inputs.as_slice() {
        [single] => ingest_single(single, options.debug)?,
        inputs => ingest_parallel(inputs, options.debug)?,
    };

    log::info!("Processed {} IPs", stats.accepted);
    if stats.rejected > 0 {
        log::info!("Skipped {} lines", stats.rejected);
    }

    let bytes_written = codec::save(&set, &options.output)?;
    let digest = codec::content_digest(&set);

    log::info!(
        "Wrote {} ({} pages, {} addresses, {} bytes)",
        options.output.display(),
        set.page_count(),
        set.cardinality(),
        bytes_written
    );

    Ok(BuildReport {
        stats,
        page_count: set.page_count(),
        cardinality: set.cardinality(),
        bytes_written,
        digest,
    })
}

fn ingest_single(input: &InputSource, debug: bool) -> Result<(FrozenIpBitmap, IngestStats)> {
    let mut set = IpBitmap::new();
    let stats = ingest(input.open()?, &mut set, debug)?;
    log::debug!("{}: {} accepted, {} rejected", input, stats.accepted, stats.rejected);
    Ok((set.freeze(), stats))
}

fn ingest_parallel(
    inputs: &[InputSource],
    debug: bool,
) -> Result<(FrozenIpBitmap, IngestStats)> {
    let set = StripedIpBitmap::new();

    let results: Vec<Result<IngestStats>> = thread::scope(|s| {
        let handles: Vec<_> = inputs
            .iter()
            .map(|input| {
                let set = &set;
                s.spawn(move || -> Result<IngestStats> {
                    let mut sink = set;
                    let stats = ingest(input.open()?, &mut sink, debug)?;
                    log::debug!(
                        "{}: {} accepted, {} rejected",
                        input,
                        stats.accepted,
                        stats.rejected
                    );
                    Ok(stats)
                })
            })
            .collect();

        handles.into_iter().map(join_worker).collect()
    });

    let mut total = IngestStats::default();
    for result in results {
        total.merge(result?);
    }

    Ok((set.freeze(), total))
}

/// Join a worker, re-raising its panic on the calling thread.
fn join_worker<T>(handle: ScopedJoinHandle<'_, T>) -> T {
    handle
        .join()
        .unwrap_or_else(|payload| panic::resume_unwind(payload))
}
