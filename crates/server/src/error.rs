//! HTTP error responses for the proxy handler.
//!
//! Input errors are 400, missing server configuration is 500 and render
//! failures are 502, all with a `{ "error", "message" }` body.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use pagepress_client::PdfProxyError;
use pagepress_client::render::http::SERVER_CONFIG_CODE;
use pagepress_core::Error;

/// Wrapper that turns a core error into an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError(err)
    }
}

impl ApiError {
    /// Status code and stable error code for the wrapped error.
    pub fn classify(&self) -> (StatusCode, &'static str) {
        match &self.0 {
            Error::InvalidInput(_) => (StatusCode::BAD_REQUEST, "INVALID_INPUT"),
            Error::ServerConfig(_) => (StatusCode::INTERNAL_SERVER_ERROR, SERVER_CONFIG_CODE),
            Error::RenderFailed(_) => (StatusCode::BAD_GATEWAY, "RENDER_FAILED"),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.classify();

        let message = match &self.0 {
            Error::InvalidInput(msg) | Error::RenderFailed(msg) => msg.clone(),
            Error::ServerConfig(msg) => {
                tracing::error!("server configuration error: {msg}");
                "The PDF service is not configured correctly".to_string()
            }
            other => {
                tracing::error!("internal error: {other}");
                "An internal error occurred".to_string()
            }
        };

        if status == StatusCode::BAD_GATEWAY {
            tracing::warn!("render failed: {message}");
        }

        (status, Json(PdfProxyError { error: code.to_string(), message })).into_response()
    }
}
