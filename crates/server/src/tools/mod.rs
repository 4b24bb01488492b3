//! MCP tool implementations.
//!
//! This module contains all tools exposed by the pagepress server.

pub mod cache;
pub mod pdf_convert;
pub mod stats;

pub use cache::{CacheGetParams, get_impl};
pub use pdf_convert::{PdfConvertParams, convert_impl};
pub use stats::stats_impl;
