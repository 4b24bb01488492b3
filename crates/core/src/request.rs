//! Conversion request validation.
//!
//! Both the orchestrator and the HTTP proxy handler run every request through
//! [`PdfRequest::parse`] before touching the store or the network.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::Error;

/// Paper size used when printing a page to PDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum PageSize {
    A4,
    Letter,
    /// No fixed dimensions; the page's own CSS `@page` size wins.
    Custom,
}

impl PageSize {
    pub const ALL: [PageSize; 3] = [PageSize::A4, PageSize::Letter, PageSize::Custom];

    /// Wire name of the page size.
    pub fn as_str(&self) -> &'static str {
        match self {
            PageSize::A4 => "a4",
            PageSize::Letter => "letter",
            PageSize::Custom => "custom",
        }
    }

    /// Paper (width, height) in inches, or `None` for [`PageSize::Custom`].
    pub fn paper_inches(&self) -> Option<(f64, f64)> {
        match self {
            PageSize::A4 => Some((8.27, 11.69)),
            PageSize::Letter => Some((8.5, 11.0)),
            PageSize::Custom => None,
        }
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PageSize {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "a4" => Ok(PageSize::A4),
            "letter" => Ok(PageSize::Letter),
            "custom" => Ok(PageSize::Custom),
            other => Err(Error::InvalidInput(format!(
                "unsupported page size: {other} (expected a4, letter or custom)"
            ))),
        }
    }
}

/// A validated conversion request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfRequest {
    pub url: Url,
    pub page_size: PageSize,
}

impl PdfRequest {
    /// Validate raw user input.
    ///
    /// The URL must be absolute with an `http` or `https` scheme and a host.
    /// Unlike fetch-style canonicalization, no scheme is assumed.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` for a malformed URL or unknown page size.
    pub fn parse(url: &str, page_size: &str) -> Result<Self, Error> {
        let url = parse_target_url(url)?;
        let page_size = page_size.parse()?;
        Ok(Self { url, page_size })
    }
}

fn parse_target_url(input: &str) -> Result<Url, Error> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidInput("url cannot be empty".into()));
    }

    let parsed = Url::parse(trimmed).map_err(|e| Error::InvalidInput(format!("invalid url {trimmed:?}: {e}")))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(Error::InvalidInput(format!("unsupported scheme: {scheme}"))),
    }

    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(Error::InvalidInput(format!("url has no host: {trimmed}")));
    }

    Ok(parsed)
}
