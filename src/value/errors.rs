//! Validation error types

use thiserror::Error;

/// Result type for validation operations
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Per-field coercion/constraint failures.
///
/// Messages are user-facing: the embedding request layer shows them next
/// to the offending column.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Value could not be parsed as a number
    #[error("'{0}' is not a valid number")]
    NotANumber(String),

    /// Rating outside the configured bounds
    #[error("rating must be between {min} and {max}, got {value}")]
    RatingOutOfRange { value: i64, min: i64, max: i64 },

    /// Value could not be parsed as a date
    #[error("'{0}' is not a valid date")]
    InvalidDate(String),

    /// Value is not a member of the configured options
    #[error("'{0}' is not one of the configured options")]
    NotAnOption(String),

    /// One or more list members are not configured options
    #[error("values not allowed: {}", .0.join(", "))]
    OptionsNotAllowed(Vec<String>),

    /// Value does not look like an email address
    #[error("'{0}' is not a valid email address")]
    InvalidEmail(String),

    /// Value does not parse as a URL
    #[error("'{0}' is not a valid URL")]
    InvalidUrl(String),
}

impl ValidationError {
    /// HTTP status equivalent for the embedding request layer.
    pub fn status_code(&self) -> u16 {
        400
    }
}
