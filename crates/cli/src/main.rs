//! pagepress command-line entry point.
//!
//! Converts one URL per invocation through the same cache-first flow as the
//! MCP server, sharing its configuration and cache database.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pagepress_client::{Conversion, Converter, Source, renderer_from_config};
use pagepress_core::{AppConfig, CacheDb, PageSize};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pagepress")]
#[command(about = "Convert web pages to PDF with a local cache", long_about = None)]
struct Cli {
    /// Cache database (overrides PAGEPRESS_DB_PATH)
    #[arg(long)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a URL to PDF
    Convert {
        /// Absolute http(s) URL to print
        url: String,

        /// Paper size: a4, letter or custom
        #[arg(short, long, default_value = "a4")]
        page_size: String,

        /// Output directory (default: configured output_dir)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Show conversion counters and cache size
    Stats,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = AppConfig::load()?;
    if let Some(db) = cli.db {
        config.db_path = db;
    }

    let db = CacheDb::open(&config.db_path)
        .await
        .with_context(|| format!("opening cache at {}", config.db_path.display()))?;

    match cli.command {
        Commands::Convert { url, page_size, out } => {
            let renderer = renderer_from_config(&config)?;
            let converter = Converter::new(Arc::new(db.clone()), renderer);
            let conversion = converter.convert(&url, &page_size).await?;

            let dir = out.unwrap_or_else(|| config.output_dir.clone());
            let path = output_path(&dir, &conversion);
            write_pdf(&path, &conversion).await?;

            if let Err(e) = db.record_conversion(conversion.source == Source::Cache).await {
                tracing::warn!("failed to update conversion counters: {e}");
            }

            println!(
                "{} ({}, {} bytes, {})",
                path.display(),
                conversion.page_size,
                conversion.bytes.len(),
                conversion.source.as_str()
            );
        }
        Commands::Stats => {
            let stats = db.conversion_stats().await?;
            let entries = db.entry_count().await?;
            println!("conversions:    {}", stats.conversions);
            println!("cache hits:     {}", stats.cache_hits);
            println!("cached entries: {entries}");
            println!("page sizes:     {}", PageSize::ALL.map(|p| p.as_str()).join(", "));
        }
    }

    Ok(())
}

fn output_path(dir: &Path, conversion: &Conversion) -> PathBuf {
    dir.join(format!("{}.pdf", conversion.filename))
}

async fn write_pdf(path: &Path, conversion: &Conversion) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    tokio::fs::write(path, &conversion.bytes)
        .await
        .with_context(|| format!("writing {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_output_path_uses_derived_filename() {
        let conversion = Conversion {
            url: "https://www.example.com/a/b".parse().unwrap(),
            page_size: PageSize::A4,
            cache_key: "k".into(),
            source: Source::Network,
            bytes: Default::default(),
            filename: "example.com-a-b".into(),
        };
        assert_eq!(output_path(Path::new("out"), &conversion), PathBuf::from("out/example.com-a-b.pdf"));
    }

    #[test]
    fn test_parse_convert() {
        let cli = Cli::try_parse_from(["pagepress", "convert", "https://example.com", "-p", "letter"]).unwrap();
        match cli.command {
            Commands::Convert { url, page_size, out } => {
                assert_eq!(url, "https://example.com");
                assert_eq!(page_size, "letter");
                assert!(out.is_none());
            }
            Commands::Stats => panic!("expected convert"),
        }
    }
}
