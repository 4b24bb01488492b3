//! SQLite-backed cache for generated PDFs.
//!
//! This module provides a persistent, deterministic-keyed cache using SQLite
//! with async access via tokio-rusqlite. It supports:
//!
//! - Keys derived from (url, page size) using SHA-256
//! - Automatic schema migrations that tolerate concurrent first opens
//! - WAL mode for concurrent access
//! - Display counters in a small key-value table
//!
//! There is no eviction: entries live until the database file is removed.

pub mod connection;
pub mod entries;
pub mod hash;
pub mod migrations;
pub mod stats;
pub mod store;

pub use crate::Error;

pub use connection::CacheDb;
pub use entries::{CacheEntry, CacheEntryMeta};
pub use hash::compute_cache_key;
pub use stats::ConversionStats;
pub use store::PdfStore;
