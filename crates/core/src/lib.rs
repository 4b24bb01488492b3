//! Core types and shared functionality for pagepress.
//!
//! This crate provides:
//! - PDF cache implementation with SQLite backend
//! - Request validation (URL, page size)
//! - Download filename derivation
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod filename;
pub mod request;

pub use cache::{CacheDb, CacheEntry, CacheEntryMeta, ConversionStats, PdfStore, compute_cache_key};
pub use config::{AppConfig, BrowserMode, ConfigError, Transport};
pub use error::Error;
pub use filename::generate_filename_from_url;
pub use request::{PageSize, PdfRequest};
