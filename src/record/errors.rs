//! Record error types

use thiserror::Error;

use crate::observability::Logger;
use crate::store::StorageError;

/// Result type for record operations
pub type RecordResult<T> = Result<T, RecordError>;

/// Errors from the record store.
#[derive(Debug, Error)]
pub enum RecordError {
    /// Referenced record does not exist
    #[error("record '{0}' not found")]
    NotFound(String),

    /// A numeric comparison filter got a non-numeric value
    #[error("filter on '{column_id}' needs a numeric value, got '{value}'")]
    NonNumericBound { column_id: String, value: String },

    /// Underlying store operation failed
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl RecordError {
    /// HTTP status equivalent for the embedding request layer.
    pub fn status_code(&self) -> u16 {
        match self {
            RecordError::NotFound(_) => 404,
            RecordError::NonNumericBound { .. } => 400,
            RecordError::Storage(e) => e.status_code(),
        }
    }

    /// Logs storage failures before surfacing them.
    pub(crate) fn logged(self, op: &'static str) -> Self {
        if let RecordError::Storage(err) = &self {
            Logger::error("STORAGE_ERROR", &[("op", op), ("error", &err.to_string())]);
        }
        self
    }
}

impl From<rusqlite::Error> for RecordError {
    fn from(e: rusqlite::Error) -> Self {
        RecordError::Storage(e.into())
    }
}

impl From<serde_json::Error> for RecordError {
    fn from(e: serde_json::Error) -> Self {
        RecordError::Storage(e.into())
    }
}

/// A validation failure addressed to a specific column, produced by the
/// intake boundary. The message names the column so the request layer can
/// render it next to the field.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("\"{column_name}\": {reason}")]
pub struct FieldError {
    /// Offending column id
    pub column_id: String,
    /// Offending column name, for display
    pub column_name: String,
    /// Human-readable reason
    pub reason: String,
}

impl FieldError {
    /// HTTP status equivalent for the embedding request layer.
    pub fn status_code(&self) -> u16 {
        400
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(RecordError::NotFound("r1".into()).status_code(), 404);
        assert_eq!(
            RecordError::NonNumericBound {
                column_id: "c".into(),
                value: "x".into()
            }
            .status_code(),
            400
        );
        assert_eq!(
            RecordError::Storage(StorageError::LockPoisoned).status_code(),
            500
        );
    }

    #[test]
    fn test_field_error_names_column() {
        let err = FieldError {
            column_id: "c1".into(),
            column_name: "Email".into(),
            reason: "'x' is not a valid email address".into(),
        };
        let message = err.to_string();
        assert!(message.contains("Email"));
        assert!(message.contains("not a valid email"));
    }
}
