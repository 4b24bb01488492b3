//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use std::net::SocketAddr;

use crate::config::{AppConfig, BrowserMode};
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `user_agent` is empty
    /// - `render_endpoint` is set but not an http(s) URL
    /// - `provider_endpoint` is not a ws(s) URL
    /// - `http_addr` is not a socket address
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_ms < 100 {
            return Err(ConfigError::Invalid { field: "timeout_ms".into(), reason: "must be at least 100ms".into() });
        }
        if self.timeout_ms > 300_000 {
            return Err(ConfigError::Invalid {
                field: "timeout_ms".into(),
                reason: "must not exceed 5 minutes (300000ms)".into(),
            });
        }

        if self.user_agent.is_empty() {
            return Err(ConfigError::Invalid { field: "user_agent".into(), reason: "must not be empty".into() });
        }

        if let Some(endpoint) = &self.render_endpoint {
            check_scheme("render_endpoint", endpoint, &["http", "https"])?;
        }

        check_scheme("provider_endpoint", &self.provider_endpoint, &["ws", "wss"])?;

        if self.http_addr.parse::<SocketAddr>().is_err() {
            return Err(ConfigError::Invalid {
                field: "http_addr".into(),
                reason: format!("not a socket address: {}", self.http_addr),
            });
        }

        if self.render_endpoint.is_some() && self.browser == BrowserMode::Local {
            tracing::warn!("Both render_endpoint and browser=local are set; render_endpoint takes precedence");
        }

        Ok(())
    }
}

fn check_scheme(field: &str, value: &str, allowed: &[&str]) -> Result<(), ConfigError> {
    let parsed = url::Url::parse(value)
        .map_err(|e| ConfigError::Invalid { field: field.into(), reason: format!("invalid URL: {e}") })?;

    if !allowed.contains(&parsed.scheme()) {
        return Err(ConfigError::Invalid {
            field: field.into(),
            reason: format!("scheme must be one of {}", allowed.join(", ")),
        });
    }

    Ok(())
}
