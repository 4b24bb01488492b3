//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (PAGEPRESS_*)
//! 2. TOML config file (if PAGEPRESS_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Default CDP WebSocket endpoint of the hosted browser provider.
pub const DEFAULT_PROVIDER_ENDPOINT: &str = "wss://production-sfo.browserless.io";

/// Where the browser that prints pages comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserMode {
    /// Connect to the hosted provider over CDP (requires `provider_token`).
    #[default]
    Hosted,
    /// Launch a local headless Chromium.
    Local,
}

/// Which surface the server binary exposes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    /// MCP over stdin/stdout.
    #[default]
    Stdio,
    /// HTTP proxy handler on `http_addr`.
    Http,
}

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (PAGEPRESS_*)
/// 2. TOML config file (if PAGEPRESS_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to SQLite cache database.
    ///
    /// Set via PAGEPRESS_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Directory generated PDFs are written to.
    ///
    /// Set via PAGEPRESS_OUTPUT_DIR environment variable.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// User-Agent string for HTTP requests.
    ///
    /// Set via PAGEPRESS_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Upper bound for one whole render in milliseconds.
    ///
    /// Set via PAGEPRESS_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Upper bound for waiting on `<img>` elements after load, in milliseconds.
    ///
    /// Set via PAGEPRESS_IMAGE_WAIT_MS environment variable.
    #[serde(default = "default_image_wait_ms")]
    pub image_wait_ms: u64,

    /// Base URL of a pagepress HTTP proxy. When set, renders go through it
    /// instead of talking to a browser directly.
    ///
    /// Set via PAGEPRESS_RENDER_ENDPOINT environment variable.
    #[serde(default)]
    pub render_endpoint: Option<String>,

    /// Hosted provider or local Chromium.
    ///
    /// Set via PAGEPRESS_BROWSER environment variable.
    #[serde(default)]
    pub browser: BrowserMode,

    /// CDP WebSocket endpoint of the hosted browser provider.
    ///
    /// Set via PAGEPRESS_PROVIDER_ENDPOINT environment variable.
    #[serde(default = "default_provider_endpoint")]
    pub provider_endpoint: String,

    /// Secret access token for the hosted browser provider.
    ///
    /// Set via PAGEPRESS_PROVIDER_TOKEN environment variable.
    /// Required only when a render actually reaches the provider.
    #[serde(default, skip_serializing)]
    pub provider_token: Option<String>,

    /// Surface exposed by the server binary.
    ///
    /// Set via PAGEPRESS_TRANSPORT environment variable.
    #[serde(default)]
    pub transport: Transport,

    /// Bind address for the HTTP transport.
    ///
    /// Set via PAGEPRESS_HTTP_ADDR environment variable.
    #[serde(default = "default_http_addr")]
    pub http_addr: String,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./pagepress-cache.sqlite")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_user_agent() -> String {
    "pagepress/0.1".into()
}

fn default_timeout_ms() -> u64 {
    60_000
}

fn default_image_wait_ms() -> u64 {
    10_000
}

fn default_provider_endpoint() -> String {
    DEFAULT_PROVIDER_ENDPOINT.into()
}

fn default_http_addr() -> String {
    "127.0.0.1:3000".into()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            output_dir: default_output_dir(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            image_wait_ms: default_image_wait_ms(),
            render_endpoint: None,
            browser: BrowserMode::default(),
            provider_endpoint: default_provider_endpoint(),
            provider_token: None,
            transport: Transport::default(),
            http_addr: default_http_addr(),
        }
    }
}

impl AppConfig {
    /// Render timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Image wait bound as Duration, never longer than the render timeout.
    pub fn image_wait(&self) -> Duration {
        Duration::from_millis(self.image_wait_ms.min(self.timeout_ms))
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `PAGEPRESS_`
    /// 2. TOML file from `PAGEPRESS_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Self::figment()
            .extract()
            .map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("PAGEPRESS_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment.merge(
            Env::prefixed("PAGEPRESS_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        )
    }

    /// Provider token, for deferred validation at render time.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if the token is unset or blank.
    pub fn require_provider_token(&self) -> Result<&str, ConfigError> {
        self.provider_token
            .as_deref()
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| ConfigError::Missing {
                field: "provider_token".into(),
                hint: "Set PAGEPRESS_PROVIDER_TOKEN environment variable".into(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.db_path, PathBuf::from("./pagepress-cache.sqlite"));
        assert_eq!(config.user_agent, "pagepress/0.1");
        assert_eq!(config.timeout_ms, 60_000);
        assert_eq!(config.image_wait_ms, 10_000);
        assert_eq!(config.browser, BrowserMode::Hosted);
        assert_eq!(config.transport, Transport::Stdio);
        assert_eq!(config.provider_endpoint, DEFAULT_PROVIDER_ENDPOINT);
        assert!(config.render_endpoint.is_none());
        assert!(config.provider_token.is_none());
    }

    #[test]
    fn test_timeout_duration() {
        let config = AppConfig::default();
        assert_eq!(config.timeout(), Duration::from_millis(60_000));
        assert_eq!(config.image_wait(), Duration::from_millis(10_000));
    }

    #[test]
    fn test_image_wait_capped_by_timeout() {
        let config = AppConfig { timeout_ms: 2_000, image_wait_ms: 10_000, ..Default::default() };
        assert_eq!(config.image_wait(), Duration::from_millis(2_000));

        let shorter = AppConfig { timeout_ms: 2_000, image_wait_ms: 500, ..Default::default() };
        assert_eq!(shorter.image_wait(), Duration::from_millis(500));
    }

    #[test]
    fn test_require_provider_token_missing() {
        let config = AppConfig::default();
        assert!(matches!(config.require_provider_token(), Err(ConfigError::Missing { .. })));

        let blank = AppConfig { provider_token: Some("  ".into()), ..Default::default() };
        assert!(matches!(blank.require_provider_token(), Err(ConfigError::Missing { .. })));
    }

    #[test]
    fn test_require_provider_token_present() {
        let config = AppConfig { provider_token: Some("secret".into()), ..Default::default() };
        assert_eq!(config.require_provider_token().unwrap(), "secret");
    }

    #[test]
    fn test_token_never_serialized() {
        let config = AppConfig { provider_token: Some("secret".into()), ..Default::default() };
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("secret"));
    }

    #[test]
    fn test_load_layers_env_over_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("pagepress.toml", "timeout_ms = 5000\nbrowser = \"local\"\nuser_agent = \"from-file\"")?;
            jail.set_env("PAGEPRESS_CONFIG_FILE", "pagepress.toml");
            jail.set_env("PAGEPRESS_USER_AGENT", "from-env");
            jail.set_env("PAGEPRESS_PROVIDER_TOKEN", "tok");
            jail.set_env("PAGEPRESS_TRANSPORT", "http");

            let config = AppConfig::load().expect("config loads");
            assert_eq!(config.timeout_ms, 5000);
            assert_eq!(config.image_wait(), Duration::from_millis(5000));
            assert_eq!(config.browser, BrowserMode::Local);
            assert_eq!(config.user_agent, "from-env");
            assert_eq!(config.provider_token.as_deref(), Some("tok"));
            assert_eq!(config.transport, Transport::Http);
            Ok(())
        });
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("PAGEPRESS_TIMEOUT_MS", "10");
            assert!(matches!(AppConfig::load(), Err(ConfigError::Invalid { field, .. }) if field == "timeout_ms"));
            Ok(())
        });
    }
}
