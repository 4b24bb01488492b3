//! HTTP proxy handler.
//!
//! A single stateless route that validates the request on its own, prints
//! the page through the browser renderer and streams the PDF back. Caching
//! is the caller's concern.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::header,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use pagepress_client::{PdfProxyRequest, PdfRenderer};
use pagepress_core::{AppConfig, Error, PdfRequest, generate_filename_from_url};
use serde::Serialize;
use tower_http::trace::TraceLayer;

use crate::error::ApiError;

/// Shared state for the proxy routes.
#[derive(Clone)]
pub struct AppState {
    pub renderer: Arc<dyn PdfRenderer>,
}

impl AppState {
    /// Build state that prints pages with the configured browser.
    ///
    /// `render_endpoint` is ignored here: the proxy is the endpoint.
    #[cfg(feature = "render")]
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        if config.render_endpoint.is_some() {
            tracing::warn!("render_endpoint is ignored by the HTTP transport");
        }
        if config.require_provider_token().is_err() && config.browser == pagepress_core::BrowserMode::Hosted {
            tracing::warn!("provider token is not set; conversions will fail with SERVER_CONFIG_ERROR");
        }
        Ok(Self { renderer: Arc::new(pagepress_client::BrowserRenderer::from_config(config)) })
    }

    #[cfg(not(feature = "render"))]
    pub fn from_config(_config: &AppConfig) -> anyhow::Result<Self> {
        anyhow::bail!("the HTTP transport needs the `render` feature")
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Build the proxy router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/pdf", post(generate_pdf))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Bind `addr` and serve until the process is stopped.
pub async fn serve(addr: &str, state: AppState) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr, "Starting pagepress HTTP proxy");
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn health() -> impl IntoResponse {
    Json(HealthResponse { status: "ok", version: env!("CARGO_PKG_VERSION") })
}

async fn generate_pdf(
    State(state): State<AppState>, body: Result<Json<PdfProxyRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(body) = body.map_err(|e| Error::InvalidInput(e.body_text()))?;
    let request = PdfRequest::parse(&body.url, &body.page_size)?;
    let filename = generate_filename_from_url(request.url.as_str());

    let bytes = state
        .renderer
        .render_pdf(&request.url, request.page_size)
        .await
        .map_err(Error::from)?;

    tracing::info!(url = %request.url, page_size = %request.page_size, bytes = bytes.len(), "served PDF");

    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{filename}.pdf\"")),
    ];
    Ok((headers, bytes).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use bytes::Bytes;
    use pagepress_client::{PdfProxyError, RenderError};
    use pagepress_core::PageSize;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;
    use url::Url;

    const FAKE_PDF: &[u8] = b"%PDF-1.7\nproxy\n%%EOF";

    struct StubRenderer {
        calls: AtomicUsize,
        outcome: fn() -> Result<Bytes, RenderError>,
    }

    #[async_trait::async_trait]
    impl PdfRenderer for StubRenderer {
        async fn render_pdf(&self, _url: &Url, _page_size: PageSize) -> Result<Bytes, RenderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.outcome)()
        }
    }

    fn app(outcome: fn() -> Result<Bytes, RenderError>) -> (Router, Arc<StubRenderer>) {
        let renderer = Arc::new(StubRenderer { calls: AtomicUsize::new(0), outcome });
        (router(AppState { renderer: renderer.clone() }), renderer)
    }

    fn post_json(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/pdf")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn error_body(response: Response) -> PdfProxyError {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _) = app(|| Ok(Bytes::from_static(FAKE_PDF)));
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_generate_pdf_success() {
        let (app, renderer) = app(|| Ok(Bytes::from_static(FAKE_PDF)));
        let response = app
            .oneshot(post_json(r#"{"url":"https://www.example.com/docs/intro","pageSize":"a4"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"example.com-docs-intro.pdf\""
        );
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], FAKE_PDF);
        assert_eq!(renderer.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalid_url_is_400() {
        let (app, renderer) = app(|| Ok(Bytes::from_static(FAKE_PDF)));
        let response = app.oneshot(post_json(r#"{"url":"not-a-url","pageSize":"a4"}"#)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error_body(response).await.error, "INVALID_INPUT");
        assert_eq!(renderer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_invalid_page_size_is_400() {
        let (app, _) = app(|| Ok(Bytes::from_static(FAKE_PDF)));
        let response = app
            .oneshot(post_json(r#"{"url":"https://example.com","pageSize":"xlarge"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_malformed_body_is_400() {
        let (app, _) = app(|| Ok(Bytes::from_static(FAKE_PDF)));
        let response = app.oneshot(post_json(r#"{"url": 42}"#)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_missing_token_is_500() {
        let (app, _) = app(|| Err(RenderError::MissingConfig("provider token is not configured".into())));
        let response = app
            .oneshot(post_json(r#"{"url":"https://example.com","pageSize":"letter"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error_body(response).await.error, "SERVER_CONFIG_ERROR");
    }

    #[tokio::test]
    async fn test_render_failure_is_502_with_message() {
        let (app, _) = app(|| Err(RenderError::Navigation("net::ERR_NAME_NOT_RESOLVED".into())));
        let response = app
            .oneshot(post_json(r#"{"url":"https://nope.invalid","pageSize":"custom"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = error_body(response).await;
        assert_eq!(body.error, "RENDER_FAILED");
        assert!(body.message.contains("ERR_NAME_NOT_RESOLVED"));
    }
}
