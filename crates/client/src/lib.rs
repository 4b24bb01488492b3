//! Client code for pagepress.
//!
//! This crate provides the render collaborators (HTTP proxy client and
//! headless browser printing) and the cache-first conversion flow shared by
//! the server and CLI.

pub mod convert;
pub mod render;

pub use convert::{Conversion, Converter, Source};
#[cfg(feature = "render")]
pub use render::{BrowserRenderer, BrowserTarget};
pub use render::{HttpRenderer, PdfProxyError, PdfProxyRequest, PdfRenderer, RenderError, renderer_from_config};
