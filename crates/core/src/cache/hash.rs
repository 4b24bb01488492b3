//! Deterministic cache key generation.

use sha2::{Digest, Sha256};

use crate::request::PageSize;

/// Compute the cache key for a (url, page size) pair.
///
/// The preimage is `url|page_size`. A literal pipe cannot appear unescaped in
/// a valid URL, so distinct pairs never share a preimage.
pub fn compute_cache_key(url: &str, page_size: PageSize) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    hasher.update(b"|");
    hasher.update(page_size.as_str().as_bytes());
    hex::encode(hasher.finalize())
}
