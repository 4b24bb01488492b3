//! Render collaborators that turn a URL into PDF bytes.
//!
//! Two implementations sit behind [`PdfRenderer`]:
//!
//! - [`HttpRenderer`] posts to a pagepress HTTP proxy (`POST /api/pdf`).
//! - `BrowserRenderer` (feature `render`) drives a hosted or local Chromium
//!   over CDP via chromiumoxide.
//!
//! Every implementation must return a complete document or an error, never a
//! partial body.

#[cfg(feature = "render")]
pub mod browser;
pub mod http;

use std::sync::Arc;

use bytes::Bytes;
use pagepress_core::{AppConfig, PageSize};
use thiserror::Error;
use url::Url;

#[cfg(feature = "render")]
pub use browser::{BrowserRenderer, BrowserTarget};
pub use http::{HttpRenderer, PdfProxyError, PdfProxyRequest};

/// Leading bytes of every PDF document.
const PDF_MAGIC: &[u8] = b"%PDF-";

/// Errors that can occur while rendering a page to PDF.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Required configuration (e.g. the provider token) is missing.
    #[error("missing configuration: {0}")]
    MissingConfig(String),

    /// Failed to launch or connect to the browser.
    #[error("browser connection failed: {0}")]
    Connect(String),

    /// Failed to navigate to the URL.
    #[error("navigation failed: {0}")]
    Navigation(String),

    /// The browser could not print the page.
    #[error("print failed: {0}")]
    Print(String),

    /// The whole render exceeded its time budget.
    #[error("render timeout after {0}ms")]
    Timeout(u64),

    /// The proxy or provider answered with an error payload.
    #[error("provider error ({status}): {message}")]
    Provider { status: u16, message: String },

    /// The response body is not a PDF document.
    #[error("invalid PDF: {0}")]
    InvalidPdf(String),

    /// Network error.
    #[error("network error: {0}")]
    Network(Arc<reqwest::Error>),
}

impl From<reqwest::Error> for RenderError {
    fn from(err: reqwest::Error) -> Self {
        RenderError::Network(Arc::new(err))
    }
}

impl From<RenderError> for pagepress_core::Error {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::MissingConfig(msg) => pagepress_core::Error::ServerConfig(msg),
            RenderError::Provider { message, .. } => pagepress_core::Error::RenderFailed(message),
            other => pagepress_core::Error::RenderFailed(other.to_string()),
        }
    }
}

/// Renderer trait for printing a page to PDF.
#[async_trait::async_trait]
pub trait PdfRenderer: Send + Sync {
    /// Render `url` at `page_size`, returning the complete PDF document.
    async fn render_pdf(&self, url: &Url, page_size: PageSize) -> Result<Bytes, RenderError>;
}

/// Reject bodies that are not PDF documents.
pub(crate) fn ensure_pdf(bytes: Bytes) -> Result<Bytes, RenderError> {
    if bytes.starts_with(PDF_MAGIC) {
        Ok(bytes)
    } else {
        let preview = String::from_utf8_lossy(&bytes[..bytes.len().min(32)]).into_owned();
        Err(RenderError::InvalidPdf(format!("{} bytes starting with {preview:?}", bytes.len())))
    }
}

/// Pick the renderer the configuration asks for.
///
/// A configured `render_endpoint` wins; otherwise pages are printed by a
/// browser directly.
///
/// # Errors
///
/// Returns `RenderError::Connect` if the HTTP client cannot be built, or
/// `RenderError::MissingConfig` when neither a proxy nor browser rendering is
/// available.
pub fn renderer_from_config(config: &AppConfig) -> Result<Arc<dyn PdfRenderer>, RenderError> {
    if let Some(endpoint) = &config.render_endpoint {
        tracing::debug!(endpoint = %endpoint, "rendering through HTTP proxy");
        return Ok(Arc::new(HttpRenderer::new(endpoint, config.timeout(), &config.user_agent)?));
    }

    #[cfg(feature = "render")]
    {
        Ok(Arc::new(BrowserRenderer::from_config(config)))
    }

    #[cfg(not(feature = "render"))]
    {
        Err(RenderError::MissingConfig(
            "render_endpoint is not set and browser rendering is not compiled in".into(),
        ))
    }
}
