//! Cache-first URL to PDF conversion.
//!
//! One conversion runs strictly in sequence: validate, look up, render on a
//! miss, store, return. The store is best-effort on both sides: a failed
//! read is treated as a miss and a failed write is logged and dropped.
//!
//! Concurrent misses for the same key are not coalesced; each renders and
//! the last write wins.

use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use pagepress_core::{CacheEntry, Error, PageSize, PdfRequest, PdfStore, compute_cache_key, generate_filename_from_url};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::render::PdfRenderer;

/// Where a conversion's bytes came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Cache,
    Network,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Cache => "cache",
            Source::Network => "network",
        }
    }
}

/// A finished conversion.
#[derive(Debug, Clone)]
pub struct Conversion {
    pub url: Url,
    pub page_size: PageSize,
    pub cache_key: String,
    pub source: Source,
    pub bytes: Bytes,
    /// Download name without extension.
    pub filename: String,
}

/// Coordinates the cache lookup and the single render call.
#[derive(Clone)]
pub struct Converter {
    store: Arc<dyn PdfStore>,
    renderer: Arc<dyn PdfRenderer>,
}

impl Converter {
    pub fn new(store: Arc<dyn PdfStore>, renderer: Arc<dyn PdfRenderer>) -> Self {
        Self { store, renderer }
    }

    /// Convert raw user input.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidInput` before any I/O if the URL or page size is malformed
    /// - `Error::ServerConfig` if the renderer lacks required configuration
    /// - `Error::RenderFailed` if the renderer could not produce a PDF
    pub async fn convert(&self, url: &str, page_size: &str) -> Result<Conversion, Error> {
        let request = PdfRequest::parse(url, page_size)?;
        self.convert_request(request).await
    }

    /// Convert an already validated request.
    pub async fn convert_request(&self, request: PdfRequest) -> Result<Conversion, Error> {
        let PdfRequest { url, page_size } = request;
        let cache_key = compute_cache_key(url.as_str(), page_size);
        let filename = generate_filename_from_url(url.as_str());

        match self.store.get(&cache_key).await {
            Ok(Some(entry)) => {
                tracing::debug!(url = %url, page_size = %page_size, cache_key = %cache_key, "cache hit");
                return Ok(Conversion {
                    url,
                    page_size,
                    cache_key,
                    source: Source::Cache,
                    bytes: Bytes::from(entry.payload),
                    filename,
                });
            }
            Ok(None) => tracing::debug!(url = %url, page_size = %page_size, "cache miss"),
            Err(e) => tracing::warn!(url = %url, error = %e, "cache read failed, rendering instead"),
        }

        let start = Instant::now();
        let bytes = self.renderer.render_pdf(&url, page_size).await.map_err(Error::from)?;
        tracing::info!(
            url = %url,
            page_size = %page_size,
            bytes = bytes.len(),
            render_ms = start.elapsed().as_millis() as u64,
            "rendered PDF"
        );

        let entry = CacheEntry::new(url.as_str(), page_size, bytes.to_vec());
        if let Err(e) = self.store.put(&entry).await {
            tracing::warn!(url = %url, error = %e, "failed to cache PDF");
        }

        Ok(Conversion { url, page_size, cache_key, source: Source::Network, bytes, filename })
    }
}
