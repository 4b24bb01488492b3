//! Headless browser PDF printing via chromiumoxide.
//!
//! Each render opens its own browser session (a CDP WebSocket to the hosted
//! provider, or a locally launched Chromium), prints one page, and closes the
//! session again.

use std::time::{Duration, Instant};

use bytes::Bytes;
use chromiumoxide::Page;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::page::PrintToPdfParams;
use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
use futures_util::StreamExt;
use pagepress_core::{AppConfig, BrowserMode, PageSize};
use tokio::task::JoinHandle;
use url::Url;

use super::{PdfRenderer, RenderError, ensure_pdf};

/// Printable margin on all four sides: 20 CSS px at 96 px per inch.
const MARGIN_INCHES: f64 = 20.0 / 96.0;

/// Resolves once every `<img>` has either loaded or errored.
const WAIT_FOR_IMAGES: &str = r#"
Promise.all(
  Array.from(document.images)
    .filter((img) => !img.complete)
    .map((img) => new Promise((resolve) => {
      img.addEventListener("load", resolve, { once: true });
      img.addEventListener("error", resolve, { once: true });
    }))
).then(() => document.images.length)
"#;

/// Where the browser comes from.
#[derive(Debug, Clone)]
pub enum BrowserTarget {
    /// Hosted provider reached over a CDP WebSocket.
    Hosted { endpoint: String, token: Option<String> },
    /// Locally launched headless Chromium.
    Local,
}

/// Renderer that prints pages with a real browser.
#[derive(Debug, Clone)]
pub struct BrowserRenderer {
    target: BrowserTarget,
    timeout: Duration,
    image_wait: Duration,
}

impl BrowserRenderer {
    pub fn new(target: BrowserTarget, timeout: Duration, image_wait: Duration) -> Self {
        Self { target, timeout, image_wait }
    }

    /// Build a renderer from application configuration.
    ///
    /// A missing provider token is not an error here; it surfaces as
    /// `RenderError::MissingConfig` when a render actually needs it.
    pub fn from_config(config: &AppConfig) -> Self {
        let target = match config.browser {
            BrowserMode::Hosted => BrowserTarget::Hosted {
                endpoint: config.provider_endpoint.clone(),
                token: config.require_provider_token().ok().map(str::to_string),
            },
            BrowserMode::Local => BrowserTarget::Local,
        };
        Self::new(target, config.timeout(), config.image_wait())
    }

    /// Open a browser session and spawn its CDP event loop.
    async fn open(&self) -> Result<(Browser, JoinHandle<()>), RenderError> {
        let (browser, mut handler) = match &self.target {
            BrowserTarget::Hosted { endpoint, token } => {
                let ws_url = hosted_ws_url(endpoint, token.as_deref())?;
                tracing::debug!(host = ws_url.host_str().unwrap_or_default(), "connecting to hosted browser");
                Browser::connect(ws_url.to_string())
                    .await
                    .map_err(|e| RenderError::Connect(e.to_string()))?
            }
            BrowserTarget::Local => {
                tracing::debug!("launching local headless browser");
                Browser::launch(BrowserConfig::builder().build().map_err(RenderError::Connect)?)
                    .await
                    .map_err(|e| RenderError::Connect(e.to_string()))?
            }
        };

        let events = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("browser handler event error: {e}");
                    break;
                }
            }
        });

        Ok((browser, events))
    }

    /// One browser session: connect, print, close.
    async fn render_session(&self, url: &Url, page_size: PageSize) -> Result<Bytes, RenderError> {
        let (mut browser, events) = self.open().await?;
        let events = AbortOnDrop(events);

        let result = self.print(&browser, url, page_size).await;

        browser.close().await.ok();
        drop(events);
        result
    }

    async fn print(&self, browser: &Browser, url: &Url, page_size: PageSize) -> Result<Bytes, RenderError> {
        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| RenderError::Navigation(e.to_string()))?;

        page.goto(url.as_str())
            .await
            .map_err(|e| RenderError::Navigation(e.to_string()))?;

        self.wait_for_images(&page).await;

        let pdf = page
            .pdf(print_params(page_size))
            .await
            .map_err(|e| RenderError::Print(e.to_string()))?;

        page.close().await.ok();
        ensure_pdf(Bytes::from(pdf))
    }

    /// Bounded wait for images; a slow image never fails the render.
    async fn wait_for_images(&self, page: &Page) {
        let params = match EvaluateParams::builder()
            .expression(WAIT_FOR_IMAGES)
            .await_promise(true)
            .return_by_value(true)
            .build()
        {
            Ok(params) => params,
            Err(e) => {
                tracing::warn!("skipping image wait: {e}");
                return;
            }
        };

        match tokio::time::timeout(self.image_wait, page.evaluate_expression(params)).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => tracing::debug!("image wait script failed: {e}"),
            Err(_) => tracing::debug!(wait_ms = self.image_wait.as_millis() as u64, "image wait elapsed"),
        }
    }
}

#[async_trait::async_trait]
impl PdfRenderer for BrowserRenderer {
    async fn render_pdf(&self, url: &Url, page_size: PageSize) -> Result<Bytes, RenderError> {
        let start = Instant::now();

        // connect, print and close all count against the one budget
        let bytes = tokio::time::timeout(self.timeout, self.render_session(url, page_size))
            .await
            .map_err(|_| RenderError::Timeout(self.timeout.as_millis() as u64))??;

        tracing::debug!(
            url = %url,
            page_size = %page_size,
            bytes = bytes.len(),
            render_ms = start.elapsed().as_millis() as u64,
            "printed page"
        );
        Ok(bytes)
    }
}

/// Stops the CDP event loop when the session is dropped, including mid-render on timeout.
struct AbortOnDrop(JoinHandle<()>);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// CDP WebSocket URL with the access token attached.
fn hosted_ws_url(endpoint: &str, token: Option<&str>) -> Result<Url, RenderError> {
    let token = token.ok_or_else(|| {
        RenderError::MissingConfig("provider token is not configured (set PAGEPRESS_PROVIDER_TOKEN)".into())
    })?;

    let mut url = Url::parse(endpoint).map_err(|e| RenderError::MissingConfig(format!("invalid provider_endpoint: {e}")))?;
    url.query_pairs_mut().append_pair("token", token);
    Ok(url)
}

/// Print settings: backgrounds on, fixed margins, requested paper.
fn print_params(page_size: PageSize) -> PrintToPdfParams {
    let mut params = PrintToPdfParams {
        print_background: Some(true),
        margin_top: Some(MARGIN_INCHES),
        margin_bottom: Some(MARGIN_INCHES),
        margin_left: Some(MARGIN_INCHES),
        margin_right: Some(MARGIN_INCHES),
        ..Default::default()
    };

    match page_size.paper_inches() {
        Some((width, height)) => {
            params.paper_width = Some(width);
            params.paper_height = Some(height);
        }
        None => params.prefer_css_page_size = Some(true),
    }

    params
}
