//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.
use std::path::PathBuf;

use crate::tools::{CacheGetParams, PdfConvertParams, convert_impl, get_impl, stats_impl};

use pagepress_client::Converter;
use pagepress_core::CacheDb;
use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};

/// The main MCP server handler for pagepress.
#[derive(Clone)]
pub struct McpPdfServer {
    tool_router: ToolRouter<Self>,
    db: CacheDb,
    converter: Converter,
    output_dir: PathBuf,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl McpPdfServer {
    /// Create a new server handler.
    pub fn new(db: CacheDb, converter: Converter, output_dir: PathBuf) -> Self {
        Self { tool_router: Self::tool_router(), db, converter, output_dir }
    }

    /// Convert a URL to PDF.
    ///
    /// Served from the local cache when the same URL and page size were converted before;
    /// otherwise the page is printed by the headless browser and cached.
    #[tool(
        description = "Convert a web page to PDF. Returns the file path, cache key and whether the PDF came from cache or network."
    )]
    async fn pdf_convert(&self, params: Parameters<PdfConvertParams>) -> Result<CallToolResult, McpError> {
        convert_impl(&self.converter, &self.db, &self.output_dir, params.0).await
    }

    #[tool(description = "Get metadata for a cached PDF by its cache key.")]
    async fn cache_get(&self, params: Parameters<CacheGetParams>) -> Result<CallToolResult, McpError> {
        get_impl(&self.db, params.0).await
    }

    #[tool(description = "Report how many conversions were served and how many came from cache.")]
    async fn pdf_stats(&self) -> Result<CallToolResult, McpError> {
        stats_impl(&self.db).await
    }
}

impl ServerHandler for McpPdfServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "pagepress".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            instructions: Some("Convert web pages to PDF. Repeat conversions of the same URL and page size are served from a local cache.".into()),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}
