//! Display-only conversion counters kept in the `kv` table.

use super::connection::CacheDb;
use crate::Error;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;

const CONVERSIONS: &str = "conversions";
const CACHE_HITS: &str = "cache_hits";

/// Running totals shown to the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ConversionStats {
    pub conversions: u64,
    pub cache_hits: u64,
}

impl CacheDb {
    /// Count one finished conversion, and one cache hit if it was served locally.
    pub async fn record_conversion(&self, cache_hit: bool) -> Result<(), Error> {
        self.conn
            .call(move |conn| -> Result<(), Error> {
                let mut stmt = conn.prepare(
                    "INSERT INTO kv (key, value) VALUES (?1, 1)
                    ON CONFLICT(key) DO UPDATE SET value = value + 1",
                )?;
                stmt.execute(params![CONVERSIONS])?;
                if cache_hit {
                    stmt.execute(params![CACHE_HITS])?;
                }
                Ok(())
            })
            .await
            .map_err(|e| Error::from(e).into_write())
    }

    /// Current counter values; missing counters read as zero.
    pub async fn conversion_stats(&self) -> Result<ConversionStats, Error> {
        self.conn
            .call(|conn| -> Result<ConversionStats, Error> {
                let mut stmt = conn.prepare("SELECT COALESCE((SELECT value FROM kv WHERE key = ?1), 0)")?;
                let conversions: i64 = stmt.query_row(params![CONVERSIONS], |row| row.get(0))?;
                let cache_hits: i64 = stmt.query_row(params![CACHE_HITS], |row| row.get(0))?;
                Ok(ConversionStats { conversions: conversions as u64, cache_hits: cache_hits as u64 })
            })
            .await
            .map_err(|e| Error::from(e).into_read())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_stats() {
        let db = CacheDb::open_in_memory().await.unwrap();
        assert_eq!(db.conversion_stats().await.unwrap(), ConversionStats::default());
    }

    #[tokio::test]
    async fn test_record_conversions() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.record_conversion(false).await.unwrap();
        db.record_conversion(true).await.unwrap();
        db.record_conversion(true).await.unwrap();

        let stats = db.conversion_stats().await.unwrap();
        assert_eq!(stats, ConversionStats { conversions: 3, cache_hits: 2 });
    }
}
