//! Unified error types for pagepress.
//!
//! Every variant renders with a stable uppercase code prefix so callers
//! (MCP clients, the HTTP proxy, the CLI) can tell failures apart.

use rmcp::model::{ErrorCode, ErrorData as McpError};
use tokio_rusqlite::rusqlite;

/// Unified error types for pagepress.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed URL or unrecognized page size. Rejected before any I/O.
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// Required server-side configuration (e.g. provider token) is missing.
    #[error("SERVER_CONFIG_ERROR: {0}")]
    ServerConfig(String),

    /// The render collaborator could not produce a PDF.
    #[error("RENDER_FAILED: {0}")]
    RenderFailed(String),

    /// The persistent store could not be opened or initialized.
    #[error("STORE_UNAVAILABLE: {0}")]
    StoreUnavailable(String),

    /// A point lookup against the store failed.
    #[error("STORE_READ_ERROR: {0}")]
    StoreRead(String),

    /// An upsert against the store failed.
    #[error("STORE_WRITE_ERROR: {0}")]
    StoreWrite(String),

    /// No cache entry exists for the given key.
    #[error("CACHE_MISS: {0}")]
    CacheMiss(String),

    /// Database operation failed.
    #[error("CACHE_ERROR: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("CACHE_ERROR: migration failed: {0}")]
    MigrationFailed(String),

    /// Writing a generated document to disk failed.
    #[error("IO_ERROR: {0}")]
    Io(String),
}

impl Error {
    /// Reclassify a low-level database failure as a read failure.
    pub(crate) fn into_read(self) -> Self {
        match self {
            Error::Database(e) => Error::StoreRead(e.to_string()),
            other => other,
        }
    }

    /// Reclassify a low-level database failure as a write failure.
    pub(crate) fn into_write(self) -> Self {
        match self {
            Error::Database(e) => Error::StoreWrite(e.to_string()),
            other => other,
        }
    }

    /// Reclassify any open/migration failure as the store being unavailable.
    pub(crate) fn into_unavailable(self) -> Self {
        match self {
            Error::StoreUnavailable(_) => self,
            other => Error::StoreUnavailable(other.to_string()),
        }
    }

    /// Whether this error belongs to the local persistence layer.
    pub fn is_store_error(&self) -> bool {
        matches!(
            self,
            Error::StoreUnavailable(_)
                | Error::StoreRead(_)
                | Error::StoreWrite(_)
                | Error::Database(_)
                | Error::MigrationFailed(_)
        )
    }
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}

impl From<Error> for McpError {
    fn from(err: Error) -> Self {
        let (code, message) = match &err {
            Error::InvalidInput(msg) => (-32602, msg.clone()),
            Error::CacheMiss(msg) => (-32001, msg.clone()),
            Error::StoreUnavailable(_) | Error::StoreRead(_) | Error::StoreWrite(_) => (-32002, err.to_string()),
            Error::Database(e) => (-32002, e.to_string()),
            Error::MigrationFailed(msg) => (-32002, msg.clone()),
            Error::RenderFailed(msg) => (-32012, msg.clone()),
            Error::ServerConfig(msg) => (-32013, msg.clone()),
            Error::Io(msg) => (-32014, msg.clone()),
        };

        McpError { code: ErrorCode(code), message: message.into(), data: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::CacheMiss("abc123".to_string());
        assert!(err.to_string().contains("CACHE_MISS"));
        assert!(err.to_string().contains("abc123"));

        let err = Error::ServerConfig("provider token not set".to_string());
        assert!(err.to_string().starts_with("SERVER_CONFIG_ERROR"));
    }

    #[test]
    fn test_error_to_mcp_error() {
        let err = Error::CacheMiss("abc123".to_string());
        let mcp_err: McpError = err.into();
        assert_eq!(mcp_err.code.0, -32001);

        let mcp_err: McpError = Error::InvalidInput("bad url".into()).into();
        assert_eq!(mcp_err.code.0, -32602);
        assert_eq!(mcp_err.message, "bad url");
    }

    #[test]
    fn test_reclassify_database_errors() {
        let db_err = || Error::Database(tokio_rusqlite::Error::ConnectionClosed);
        assert!(matches!(db_err().into_read(), Error::StoreRead(_)));
        assert!(matches!(db_err().into_write(), Error::StoreWrite(_)));
        assert!(matches!(db_err().into_unavailable(), Error::StoreUnavailable(_)));

        let untouched = Error::InvalidInput("x".into()).into_read();
        assert!(matches!(untouched, Error::InvalidInput(_)));
    }

    #[test]
    fn test_is_store_error() {
        assert!(Error::StoreRead("x".into()).is_store_error());
        assert!(!Error::RenderFailed("x".into()).is_store_error());
    }
}
