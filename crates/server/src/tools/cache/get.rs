//! cache_get tool implementation.
//!
//! Looks up a cached PDF by key and returns its metadata (not the payload).

use pagepress_core::{CacheDb, CacheEntryMeta, Error};
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetParams {
    /// The cache key (as returned by pdf_convert).
    pub cache_key: String,
}

/// Output from the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetOutput {
    /// The cached entry's metadata.
    pub entry: CacheEntryMeta,
}

/// Implementation of the cache_get tool.
pub async fn get_impl(cache: &CacheDb, params: CacheGetParams) -> Result<CallToolResult, McpError> {
    let entry = cache
        .get_entry(&params.cache_key)
        .await?
        .ok_or_else(|| Error::CacheMiss(params.cache_key.clone()))?;

    let output = CacheGetOutput { entry: entry.meta() };
    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize entry: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}
