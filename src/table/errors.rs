//! Table/column error types

use thiserror::Error;

use crate::observability::Logger;
use crate::store::StorageError;

/// Result type for table and column operations
pub type TableResult<T> = Result<T, TableError>;

/// Errors from the table and column stores.
#[derive(Debug, Error)]
pub enum TableError {
    /// Referenced table does not exist
    #[error("table '{0}' not found")]
    NotFound(String),

    /// Underlying store operation failed
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl TableError {
    /// HTTP status equivalent for the embedding request layer.
    pub fn status_code(&self) -> u16 {
        match self {
            TableError::NotFound(_) => 404,
            TableError::Storage(e) => e.status_code(),
        }
    }

    /// Logs storage failures before surfacing them. NotFound is a normal
    /// outcome and stays quiet.
    pub(crate) fn logged(self, op: &'static str) -> Self {
        if let TableError::Storage(err) = &self {
            Logger::error("STORAGE_ERROR", &[("op", op), ("error", &err.to_string())]);
        }
        self
    }
}

impl From<rusqlite::Error> for TableError {
    fn from(e: rusqlite::Error) -> Self {
        TableError::Storage(e.into())
    }
}

impl From<serde_json::Error> for TableError {
    fn from(e: serde_json::Error) -> Self {
        TableError::Storage(e.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(TableError::NotFound("t1".into()).status_code(), 404);
        assert_eq!(
            TableError::Storage(StorageError::LockPoisoned).status_code(),
            500
        );
    }

    #[test]
    fn test_not_found_names_the_table() {
        assert!(TableError::NotFound("t1".into()).to_string().contains("t1"));
    }
}
