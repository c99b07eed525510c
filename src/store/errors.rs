//! Storage error types

use thiserror::Error;

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors from the underlying SQLite store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The database engine rejected or failed an operation
    #[error("database error: {0}")]
    Database(String),

    /// The connection mutex was poisoned by a panicking holder
    #[error("storage lock poisoned")]
    LockPoisoned,

    /// A stored blob could not be (de)serialized
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A stored timestamp or blob was not in the expected shape
    #[error("corrupt stored data: {0}")]
    Corrupt(String),
}

impl StorageError {
    /// HTTP status equivalent for the embedding request layer.
    pub fn status_code(&self) -> u16 {
        500
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Database(e.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code_is_server_error() {
        assert_eq!(StorageError::LockPoisoned.status_code(), 500);
        assert_eq!(StorageError::Database("boom".into()).status_code(), 500);
    }

    #[test]
    fn test_display_includes_cause() {
        let err = StorageError::Database("no such table: records".into());
        assert!(err.to_string().contains("no such table"));
    }
}
