//! The store seam the conversion flow depends on.

use super::connection::CacheDb;
use super::entries::CacheEntry;
use crate::Error;

/// Durable key-value persistence for generated PDFs.
///
/// `get` reports a missing key as `Ok(None)`; failures are
/// `Error::StoreRead` / `Error::StoreWrite` and callers treat them as
/// non-fatal.
#[async_trait::async_trait]
pub trait PdfStore: Send + Sync {
    async fn get(&self, cache_key: &str) -> Result<Option<CacheEntry>, Error>;

    async fn put(&self, entry: &CacheEntry) -> Result<(), Error>;
}

#[async_trait::async_trait]
impl PdfStore for CacheDb {
    async fn get(&self, cache_key: &str) -> Result<Option<CacheEntry>, Error> {
        self.get_entry(cache_key).await
    }

    async fn put(&self, entry: &CacheEntry) -> Result<(), Error> {
        self.put_entry(entry).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::PageSize;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_cache_db_as_trait_object() {
        let store: Arc<dyn PdfStore> = Arc::new(CacheDb::open_in_memory().await.unwrap());
        let entry = CacheEntry::new("https://example.com/", PageSize::A4, b"%PDF-1.4".to_vec());

        assert!(store.get(&entry.cache_key).await.unwrap().is_none());
        store.put(&entry).await.unwrap();
        assert_eq!(store.get(&entry.cache_key).await.unwrap(), Some(entry));
    }
}
