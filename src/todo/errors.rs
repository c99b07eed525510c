//! Todo error types

use thiserror::Error;

use crate::observability::Logger;
use crate::store::StorageError;

/// Result type for todo operations
pub type TodoResult<T> = Result<T, TodoError>;

/// Errors from the todo store.
#[derive(Debug, Error)]
pub enum TodoError {
    /// Title was empty after trimming
    #[error("title is required")]
    TitleRequired,

    /// Description was empty after trimming
    #[error("description is required")]
    DescriptionRequired,

    /// Underlying store operation failed
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl TodoError {
    /// HTTP status equivalent for the embedding request layer.
    pub fn status_code(&self) -> u16 {
        match self {
            TodoError::TitleRequired | TodoError::DescriptionRequired => 400,
            TodoError::Storage(e) => e.status_code(),
        }
    }

    /// Logs storage failures before surfacing them.
    pub(crate) fn logged(self, op: &'static str) -> Self {
        if let TodoError::Storage(err) = &self {
            Logger::error("STORAGE_ERROR", &[("op", op), ("error", &err.to_string())]);
        }
        self
    }
}

impl From<rusqlite::Error> for TodoError {
    fn from(e: rusqlite::Error) -> Self {
        TodoError::Storage(e.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(TodoError::TitleRequired.status_code(), 400);
        assert_eq!(
            TodoError::Storage(StorageError::LockPoisoned).status_code(),
            500
        );
    }
}
