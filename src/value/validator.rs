//! Per-type value validation and defaulting
//!
//! `validate_value` is the write-time boundary: raw caller input goes in,
//! a tagged [`Value`] of the column's documented target type comes out,
//! or a [`ValidationError`] naming the problem. Types without a rule pass
//! through unchanged.

use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use regex::Regex;

use super::errors::{ValidationError, ValidationResult};
use super::types::{ColumnConfig, ColumnType, Value};

/// Rating bounds used when config supplies none.
const DEFAULT_MIN_RATING: i64 = 0;
const DEFAULT_MAX_RATING: i64 = 100;

/// Conservative `local@domain.tld` shape; no whitespace, exactly one `@`,
/// at least one dot after it.
fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles")
    })
}

/// Validates and coerces a raw value for a column.
///
/// # Errors
///
/// Returns [`ValidationError`] when the value cannot be coerced to the
/// column's type or violates its config constraints.
pub fn validate_value(
    column_type: ColumnType,
    raw: &Value,
    config: &ColumnConfig,
) -> ValidationResult<Value> {
    match column_type {
        ColumnType::Number => {
            let n = raw
                .as_f64()
                .ok_or_else(|| ValidationError::NotANumber(raw.to_display_string()))?;
            Ok(Value::Number(n))
        }

        ColumnType::Rating => {
            let n = raw
                .as_f64()
                .ok_or_else(|| ValidationError::NotANumber(raw.to_display_string()))?;
            let rating = n.trunc() as i64;
            let min = config.min_rating.unwrap_or(DEFAULT_MIN_RATING);
            let max = config.max_rating.unwrap_or(DEFAULT_MAX_RATING);
            if rating < min || rating > max {
                return Err(ValidationError::RatingOutOfRange {
                    value: rating,
                    min,
                    max,
                });
            }
            Ok(Value::Number(rating as f64))
        }

        ColumnType::Checkbox => Ok(Value::Bool(raw.is_truthy())),

        ColumnType::Date => {
            // Empty input is an unset date, not an error.
            if raw.is_empty() {
                return Ok(Value::Null);
            }
            let text = raw
                .as_str()
                .ok_or_else(|| ValidationError::InvalidDate(raw.to_display_string()))?;
            let normalized =
                parse_date(text).ok_or_else(|| ValidationError::InvalidDate(text.to_string()))?;
            Ok(Value::Date(normalized))
        }

        ColumnType::Select => {
            if let Some(options) = &config.options {
                let member = raw.as_str().map_or(false, |s| options.iter().any(|o| o == s));
                if !member {
                    return Err(ValidationError::NotAnOption(raw.to_display_string()));
                }
            }
            Ok(raw.clone())
        }

        ColumnType::Multiselect => {
            let selected = match raw {
                Value::StringList(items) => items.clone(),
                Value::Null => Vec::new(),
                scalar => vec![scalar.to_display_string()],
            };
            if let Some(options) = &config.options {
                let invalid: Vec<String> = selected
                    .iter()
                    .filter(|v| !options.contains(v))
                    .cloned()
                    .collect();
                if !invalid.is_empty() {
                    return Err(ValidationError::OptionsNotAllowed(invalid));
                }
            }
            Ok(Value::StringList(selected))
        }

        ColumnType::Email => {
            if let Some(text) = non_empty_str(raw) {
                if !email_pattern().is_match(text) {
                    return Err(ValidationError::InvalidEmail(text.to_string()));
                }
            }
            Ok(raw.clone())
        }

        ColumnType::Url => {
            if let Some(text) = non_empty_str(raw) {
                if url::Url::parse(text).is_err() {
                    return Err(ValidationError::InvalidUrl(text.to_string()));
                }
            }
            Ok(raw.clone())
        }

        // text, phone, priority, status, relation: no coercion rule.
        ColumnType::Text
        | ColumnType::Phone
        | ColumnType::Priority
        | ColumnType::Status
        | ColumnType::Relation => Ok(raw.clone()),
    }
}

/// Returns the default value for a column: the configured default when
/// present, else the type's zero value.
pub fn default_value(column_type: ColumnType, config: &ColumnConfig) -> Value {
    if let Some(v) = &config.default_value {
        return v.clone();
    }

    match column_type {
        ColumnType::Text
        | ColumnType::Email
        | ColumnType::Url
        | ColumnType::Phone
        | ColumnType::Priority
        | ColumnType::Status
        | ColumnType::Relation => Value::Text(String::new()),
        ColumnType::Number | ColumnType::Rating => Value::Number(0.0),
        ColumnType::Checkbox => Value::Bool(false),
        ColumnType::Date => Value::Null,
        ColumnType::Select => config
            .options
            .as_ref()
            .and_then(|options| options.first())
            .map(|first| Value::Text(first.clone()))
            .unwrap_or_else(|| Value::Text(String::new())),
        ColumnType::Multiselect => Value::StringList(Vec::new()),
    }
}

/// Checks a column configuration for the given type.
///
/// Returns a list of user-facing problems; an empty list means the config
/// is acceptable. Never fails.
pub fn validate_config(column_type: ColumnType, config: &ColumnConfig) -> Vec<String> {
    let mut errors = Vec::new();

    match column_type {
        ColumnType::Select | ColumnType::Multiselect => {
            let missing = config.options.as_ref().map_or(true, |o| o.is_empty());
            if missing {
                errors.push("options are required for select and multiselect columns".to_string());
            }
        }
        ColumnType::Rating => {
            if let (Some(_), Some(max)) = (config.min_rating, config.max_rating) {
                if !(1..=10).contains(&max) {
                    errors.push("maximum rating must be between 1 and 10".to_string());
                }
            }
        }
        _ => {}
    }

    errors
}

/// The string content of a value when it is a non-empty string.
fn non_empty_str(raw: &Value) -> Option<&str> {
    raw.as_str().filter(|s| !s.is_empty())
}

/// Parses one of the accepted date shapes and normalizes to RFC 3339 UTC
/// with millisecond precision.
fn parse_date(text: &str) -> Option<String> {
    let parsed = DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S")
                .ok()
                .map(|naive| naive.and_utc())
        })
        .or_else(|| {
            let date = NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()?;
            Some(date.and_hms_opt(0, 0, 0)?.and_utc())
        })?;

    Some(parsed.to_rfc3339_opts(SecondsFormat::Millis, true))
}
