//! Client for the pagepress HTTP proxy.
//!
//! ### Wire format
//!
//! - **Endpoint**: `POST {base}/api/pdf`
//! - **Request**: `{ "url": "...", "pageSize": "a4" | "letter" | "custom" }`
//! - **Success**: `200`, `Content-Type: application/pdf`, complete document body
//! - **Failure**: non-2xx with `{ "error": "<CODE>", "message": "..." }`

use std::time::Duration;

use bytes::Bytes;
use pagepress_core::PageSize;
use reqwest::header;
use serde::{Deserialize, Serialize};
use url::Url;

use super::{PdfRenderer, RenderError, ensure_pdf};

/// Path of the conversion route, relative to the proxy base URL.
pub const PDF_ROUTE: &str = "api/pdf";

/// Error code the proxy uses for missing server-side configuration.
pub const SERVER_CONFIG_CODE: &str = "SERVER_CONFIG_ERROR";

/// Request body accepted by the proxy.
///
/// Fields stay raw strings so the proxy can answer malformed values with its
/// own `INVALID_INPUT` payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfProxyRequest {
    pub url: String,
    pub page_size: String,
}

/// Structured error payload returned by the proxy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PdfProxyError {
    pub error: String,
    pub message: String,
}

/// Renderer that delegates to a pagepress HTTP proxy.
#[derive(Debug, Clone)]
pub struct HttpRenderer {
    http: reqwest::Client,
    endpoint: Url,
}

impl HttpRenderer {
    /// Create a renderer for the proxy at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns `RenderError::MissingConfig` if `base_url` is not a URL, or
    /// `RenderError::Connect` if the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration, user_agent: &str) -> Result<Self, RenderError> {
        let mut base =
            Url::parse(base_url).map_err(|e| RenderError::MissingConfig(format!("invalid render_endpoint: {e}")))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let endpoint = base
            .join(PDF_ROUTE)
            .map_err(|e| RenderError::MissingConfig(format!("invalid render_endpoint: {e}")))?;

        let http = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .use_rustls_tls()
            .build()
            .map_err(|e| RenderError::Connect(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, endpoint })
    }

    /// Full URL of the conversion route.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait::async_trait]
impl PdfRenderer for HttpRenderer {
    async fn render_pdf(&self, url: &Url, page_size: PageSize) -> Result<Bytes, RenderError> {
        let body = PdfProxyRequest { url: url.to_string(), page_size: page_size.as_str().to_string() };

        tracing::debug!(endpoint = %self.endpoint, url = %url, page_size = %page_size, "requesting PDF from proxy");

        let response = self
            .http
            .post(self.endpoint.clone())
            .header(header::ACCEPT, "application/pdf")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let bytes = response.bytes().await.unwrap_or_default();
            return Err(match serde_json::from_slice::<PdfProxyError>(&bytes) {
                Ok(payload) if payload.error == SERVER_CONFIG_CODE => RenderError::MissingConfig(payload.message),
                Ok(payload) => RenderError::Provider { status: status.as_u16(), message: payload.message },
                Err(_) => RenderError::Provider {
                    status: status.as_u16(),
                    message: format!("proxy returned HTTP {}", status.as_u16()),
                },
            });
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        if !content_type.starts_with("application/pdf") {
            return Err(RenderError::InvalidPdf(format!("unexpected content type {content_type:?}")));
        }

        let bytes = response.bytes().await?;
        ensure_pdf(bytes)
    }
}
