//! pdf_convert tool implementation.
//!
//! Converts a URL to PDF through the cache-first flow and writes the result
//! to disk under its derived filename.

use std::path::{Path, PathBuf};

use pagepress_client::{Converter, Source};
use pagepress_core::{CacheDb, Error, PageSize};
use rmcp::{ErrorData as McpError, model::*};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Input parameters for pdf_convert tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PdfConvertParams {
    /// Absolute http(s) URL of the page to print.
    pub url: String,

    /// Paper size: "a4" (default), "letter" or "custom".
    #[serde(default = "default_page_size")]
    pub page_size: String,

    /// Directory to write the PDF into (default: configured output_dir).
    #[serde(default)]
    pub output_dir: Option<String>,
}

fn default_page_size() -> String {
    "a4".into()
}

/// Output structure for pdf_convert tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PdfConvertOutput {
    /// The normalized URL that was printed.
    pub url: String,
    /// Paper size used.
    pub page_size: PageSize,
    /// Cache key of the (url, page size) pair.
    pub cache_key: String,
    /// Whether the PDF came from the local cache or a fresh render.
    pub source: Source,
    /// Where the PDF was written.
    pub path: String,
    /// Size of the PDF in bytes.
    pub bytes: usize,
}

/// Implementation of the pdf_convert tool.
pub async fn convert_impl(
    converter: &Converter, db: &CacheDb, default_dir: &Path, params: PdfConvertParams,
) -> Result<CallToolResult, McpError> {
    let conversion = converter.convert(&params.url, &params.page_size).await?;

    let dir = params
        .output_dir
        .map(PathBuf::from)
        .unwrap_or_else(|| default_dir.to_path_buf());
    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|e| Error::Io(format!("cannot create {}: {e}", dir.display())))?;

    let path = dir.join(format!("{}.pdf", conversion.filename));
    tokio::fs::write(&path, &conversion.bytes)
        .await
        .map_err(|e| Error::Io(format!("cannot write {}: {e}", path.display())))?;

    if let Err(e) = db.record_conversion(conversion.source == Source::Cache).await {
        tracing::warn!("failed to update conversion counters: {e}");
    }

    let output = PdfConvertOutput {
        url: conversion.url.to_string(),
        page_size: conversion.page_size,
        cache_key: conversion.cache_key,
        source: conversion.source,
        path: path.display().to_string(),
        bytes: conversion.bytes.len(),
    };

    Ok(CallToolResult::success(vec![Content::text(
        serde_json::to_string_pretty(&output).unwrap_or_default(),
    )]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use pagepress_client::{PdfRenderer, RenderError};
    use std::sync::Arc;
    use url::Url;

    const FAKE_PDF: &[u8] = b"%PDF-1.7\ntool\n%%EOF";

    struct StaticRenderer;

    #[async_trait::async_trait]
    impl PdfRenderer for StaticRenderer {
        async fn render_pdf(&self, _url: &Url, _page_size: PageSize) -> Result<Bytes, RenderError> {
            Ok(Bytes::from_static(FAKE_PDF))
        }
    }

    fn parse_output(result: &CallToolResult) -> PdfConvertOutput {
        let content_val = serde_json::to_value(&result.content[0]).unwrap();
        let text = content_val
            .get("text")
            .and_then(|v| v.as_str())
            .expect("Expected text field in content");
        serde_json::from_str(text).unwrap()
    }

    #[tokio::test]
    async fn test_convert_writes_file_and_counts() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let converter = Converter::new(Arc::new(db.clone()), Arc::new(StaticRenderer));
        let dir = tempfile::tempdir().unwrap();

        let params = PdfConvertParams {
            url: "https://www.example.com/foo/bar/".into(),
            page_size: "letter".into(),
            output_dir: None,
        };
        let result = convert_impl(&converter, &db, dir.path(), params.clone()).await.unwrap();
        let output = parse_output(&result);

        assert_eq!(output.source, Source::Network);
        assert_eq!(output.bytes, FAKE_PDF.len());
        let written = std::fs::read(dir.path().join("example.com-foo-bar.pdf")).unwrap();
        assert_eq!(written, FAKE_PDF);

        let again = parse_output(&convert_impl(&converter, &db, dir.path(), params).await.unwrap());
        assert_eq!(again.source, Source::Cache);

        let stats = db.conversion_stats().await.unwrap();
        assert_eq!(stats.conversions, 2);
        assert_eq!(stats.cache_hits, 1);
    }

    #[tokio::test]
    async fn test_convert_custom_output_dir() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let converter = Converter::new(Arc::new(db.clone()), Arc::new(StaticRenderer));
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("pdfs").join("today");

        let params = PdfConvertParams {
            url: "https://example.com".into(),
            page_size: default_page_size(),
            output_dir: Some(nested.display().to_string()),
        };
        convert_impl(&converter, &db, dir.path(), params).await.unwrap();

        assert!(nested.join("example.com.pdf").exists());
    }

    #[tokio::test]
    async fn test_convert_invalid_input() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let converter = Converter::new(Arc::new(db.clone()), Arc::new(StaticRenderer));
        let dir = tempfile::tempdir().unwrap();

        let params = PdfConvertParams { url: "not-a-url".into(), page_size: "a4".into(), output_dir: None };
        let err = convert_impl(&converter, &db, dir.path(), params).await.unwrap_err();
        assert_eq!(err.code.0, -32602);
    }
}
