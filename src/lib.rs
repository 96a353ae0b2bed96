//! ipexist - Compact, persistable IPv4 membership sets.
//!
//! This crate builds a set of IPv4 addresses, writes it to a small binary
//! file and answers "is address X in the set" after reloading it.
//!
//! # Features
//!
//! - **Sparse paging**: the address space is split into 65536 pages of 8 KiB,
//!   and only pages holding at least one address are kept in memory or on disk
//! - **O(1) insert and lookup**: flat bit vectors, no tree walking
//! - **Deterministic files**: pages are stored in ascending order, so equal
//!   sets produce byte-identical files
//! - **Concurrent ingestion**: a lock-striped builder for multi-threaded loads
//! - **Memory-mapped loading** of set files
//!
//! # Quick Start
//!
//! ```
//! use ipexist::{codec, IpBitmap};
//!
//! let mut set = IpBitmap::new();
//! set.insert_ipv4("10.0.0.1".parse().unwrap());
//! set.insert_ipv4("10.0.0.2".parse().unwrap());
//!
//! // Freeze before encoding: a frozen set can no longer change.
//! let frozen = set.freeze();
//! let bytes = codec::encode_to_vec(&frozen)?;
//! assert_eq!(bytes.len(), 14 + 8194);
//!
//! let loaded = codec::decode_from_slice(&bytes)?;
//! assert!(loaded.contains(0x0A000002));
//! assert!(!loaded.contains(0x0A000003));
//! # Ok::<(), ipexist::Error>(())
//! ```
//!
//! # Building From Text
//!
//! ```ignore
//! use ipexist::{build, BuildOptions, InputSource};
//!
//! let options = BuildOptions::new(InputSource::parse("blocklist.txt"), "blocklist.ipe");
//! let report = build(&options)?;
//! println!("Processed {} IPs", report.stats.accepted);
//! ```

mod build;
mod config;
mod error;
mod ingest;
mod summary;

pub mod codec;
pub mod pager;

// Re-export core types
pub use error::{Error, Result};
pub use pager::{FrozenIpBitmap, IpBitmap, Page, StripedIpBitmap};

// Re-export ingestion and build pipeline
pub use build::{build, BuildReport};
pub use config::{BuildOptions, InputSource, DEFAULT_OUTPUT};
pub use ingest::{ingest, parse_address, AddressSink, IngestStats};

// Re-export summary
pub use summary::{hex_digest, SetSummary};
