//! Profile error types

use thiserror::Error;

use crate::observability::Logger;
use crate::store::StorageError;

/// Result type for profile operations
pub type ProfileResult<T> = Result<T, ProfileError>;

/// Errors from the profile store.
#[derive(Debug, Error)]
pub enum ProfileError {
    /// Referenced user does not exist
    #[error("user '{0}' not found")]
    NotFound(String),

    /// Username was empty after trimming
    #[error("username is required")]
    UsernameRequired,

    /// Username already belongs to a different user
    #[error("username '{0}' is already taken")]
    UsernameTaken(String),

    /// Underlying store operation failed
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ProfileError {
    /// HTTP status equivalent for the embedding request layer.
    pub fn status_code(&self) -> u16 {
        match self {
            ProfileError::NotFound(_) => 404,
            ProfileError::UsernameRequired | ProfileError::UsernameTaken(_) => 400,
            ProfileError::Storage(e) => e.status_code(),
        }
    }

    /// Logs storage failures before surfacing them.
    pub(crate) fn logged(self, op: &'static str) -> Self {
        if let ProfileError::Storage(err) = &self {
            Logger::error("STORAGE_ERROR", &[("op", op), ("error", &err.to_string())]);
        }
        self
    }
}

impl From<rusqlite::Error> for ProfileError {
    fn from(e: rusqlite::Error) -> Self {
        ProfileError::Storage(e.into())
    }
}
