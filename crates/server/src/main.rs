//! pagepress server entry point.
//!
//! Boots either the MCP server on stdio or the HTTP PDF proxy, depending on
//! the configured transport. Logging goes to stderr to avoid interfering with
//! the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::Result;
use pagepress_client::{Converter, renderer_from_config};
use pagepress_core::{AppConfig, CacheDb, Transport};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;

mod error;
mod handler;
mod http;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;

    match config.transport {
        Transport::Stdio => serve_stdio(&config).await,
        Transport::Http => http::serve(&config.http_addr, http::AppState::from_config(&config)?).await,
    }
}

async fn serve_stdio(config: &AppConfig) -> Result<()> {
    tracing::info!(db_path = %config.db_path.display(), "Starting pagepress server on stdio transport");

    let db = CacheDb::open(&config.db_path).await?;
    let renderer = renderer_from_config(config)?;
    let converter = Converter::new(Arc::new(db.clone()), renderer);

    let handler = handler::McpPdfServer::new(db, converter, config.output_dir.clone());
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;

    Ok(())
}
