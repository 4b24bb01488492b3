//! Cached PDF entries.
//!
//! The store is append/overwrite only: there is deliberately no delete here.

use super::connection::CacheDb;
use super::hash::compute_cache_key;
use crate::Error;
use crate::request::PageSize;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;
use tokio_rusqlite::rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};

/// A generated PDF keyed by (url, page size).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub cache_key: String,
    pub url: String,
    pub page_size: PageSize,
    pub payload: Vec<u8>,
    /// Epoch milliseconds.
    pub created_at: i64,
}

/// Entry metadata without the payload.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct CacheEntryMeta {
    pub cache_key: String,
    pub url: String,
    pub page_size: PageSize,
    pub created_at: i64,
    pub size_bytes: usize,
}

impl CacheEntry {
    /// Build a fresh entry stamped with the current time.
    pub fn new(url: impl Into<String>, page_size: PageSize, payload: Vec<u8>) -> Self {
        let url = url.into();
        Self {
            cache_key: compute_cache_key(&url, page_size),
            url,
            page_size,
            payload,
            created_at: chrono::Utc::now().timestamp_millis(),
        }
    }

    pub fn meta(&self) -> CacheEntryMeta {
        CacheEntryMeta {
            cache_key: self.cache_key.clone(),
            url: self.url.clone(),
            page_size: self.page_size,
            created_at: self.created_at,
            size_bytes: self.payload.len(),
        }
    }
}

impl ToSql for PageSize {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for PageSize {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let s = value.as_str()?;
        s.parse().map_err(|_| FromSqlError::Other(format!("unknown page size {s:?}").into()))
    }
}

impl CacheDb {
    /// Insert or replace a cached entry.
    ///
    /// A later put with the same key fully replaces the earlier entry.
    ///
    /// # Errors
    ///
    /// Returns `Error::StoreWrite` if the upsert fails.
    pub async fn put_entry(&self, entry: &CacheEntry) -> Result<(), Error> {
        let entry = entry.clone();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO pdf_cache (cache_key, url, page_size, payload, created_at)
                    VALUES (?1, ?2, ?3, ?4, ?5)
                    ON CONFLICT(cache_key) DO UPDATE SET
                        url = excluded.url,
                        page_size = excluded.page_size,
                        payload = excluded.payload,
                        created_at = excluded.created_at",
                    params![&entry.cache_key, &entry.url, &entry.page_size, &entry.payload, entry.created_at],
                )?;
                Ok(())
            })
            .await
            .map_err(|e| Error::from(e).into_write())
    }

    /// Get an entry by cache key.
    ///
    /// Returns None if the key doesn't exist in the cache.
    ///
    /// # Errors
    ///
    /// Returns `Error::StoreRead` on any underlying failure.
    pub async fn get_entry(&self, cache_key: &str) -> Result<Option<CacheEntry>, Error> {
        let cache_key = cache_key.to_string();
        self.conn
            .call(move |conn| -> Result<Option<CacheEntry>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT cache_key, url, page_size, payload, created_at
                    FROM pdf_cache WHERE cache_key = ?1",
                )?;

                let result = stmt.query_row(params![cache_key], |row| {
                    Ok(CacheEntry {
                        cache_key: row.get(0)?,
                        url: row.get(1)?,
                        page_size: row.get(2)?,
                        payload: row.get(3)?,
                        created_at: row.get(4)?,
                    })
                });

                match result {
                    Ok(entry) => Ok(Some(entry)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(|e| Error::from(e).into_read())
    }

    /// Number of cached entries.
    pub async fn entry_count(&self) -> Result<u64, Error> {
        self.conn
            .call(|conn| -> Result<u64, Error> {
                let count: i64 = conn.query_row("SELECT COUNT(*) FROM pdf_cache", [], |row| row.get(0))?;
                Ok(count as u64)
            })
            .await
            .map_err(|e| Error::from(e).into_read())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FAKE_PDF: &[u8] = b"%PDF-1.7\n%fake\n%%EOF";

    #[tokio::test]
    async fn test_put_and_get() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let entry = CacheEntry::new("https://example.com/", PageSize::A4, FAKE_PDF.to_vec());

        db.put_entry(&entry).await.unwrap();

        let retrieved = db.get_entry(&entry.cache_key).await.unwrap().unwrap();
        assert_eq!(retrieved.payload, entry.payload);
        assert_eq!(retrieved.page_size, PageSize::A4);
        assert_eq!(retrieved, entry);
    }

    #[tokio::test]
    async fn test_get_missing() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let result = db.get_entry("nonexistent").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let first = CacheEntry::new("https://example.com/", PageSize::Letter, b"%PDF-old".to_vec());
        let mut second = CacheEntry::new("https://example.com/", PageSize::Letter, b"%PDF-new".to_vec());
        second.created_at = first.created_at + 1;

        db.put_entry(&first).await.unwrap();
        db.put_entry(&second).await.unwrap();

        assert_eq!(db.entry_count().await.unwrap(), 1);
        let retrieved = db.get_entry(&first.cache_key).await.unwrap().unwrap();
        assert_eq!(retrieved.payload, b"%PDF-new");
        assert_eq!(retrieved.created_at, second.created_at);
    }

    #[tokio::test]
    async fn test_page_sizes_are_separate_entries() {
        let db = CacheDb::open_in_memory().await.unwrap();
        for size in PageSize::ALL {
            db.put_entry(&CacheEntry::new("https://example.com/", size, FAKE_PDF.to_vec()))
                .await
                .unwrap();
        }
        assert_eq!(db.entry_count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_unknown_page_size_is_read_error() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.conn
            .call(|conn| {
                conn.execute(
                    "INSERT INTO pdf_cache (cache_key, url, page_size, payload, created_at)
                     VALUES ('bad', 'https://example.com/', 'tabloid', x'00', 0)",
                    [],
                )
            })
            .await
            .unwrap();

        let result = db.get_entry("bad").await;
        assert!(matches!(result, Err(Error::StoreRead(_))));
    }

    #[test]
    fn test_meta_omits_payload() {
        let entry = CacheEntry::new("https://example.com/", PageSize::Custom, FAKE_PDF.to_vec());
        let meta = entry.meta();
        assert_eq!(meta.size_bytes, FAKE_PDF.len());
        assert_eq!(meta.cache_key, entry.cache_key);
    }
}
