//! Record intake boundary
//!
//! The one sanctioned path from raw caller input into a stored value map.
//! Walks the table's columns: required columns must have a non-empty
//! value; present values go through per-type validation; absent optional
//! values take the column's default. Failures are addressed to the
//! offending column so the request layer can render them per field.

use std::collections::BTreeMap;

use crate::table::Column;
use crate::value::{default_value, validate_value, RecordValues, Value};

use super::errors::FieldError;

/// Builds a validated value map for the given columns from raw input
/// keyed by column id.
///
/// # Errors
///
/// Returns a [`FieldError`] naming the first offending column: a missing
/// required value, or a value its column's type rejects.
pub fn compose_values(
    columns: &[Column],
    raw: &BTreeMap<String, Value>,
) -> Result<RecordValues, FieldError> {
    let mut values = RecordValues::new();

    for column in columns {
        match raw.get(&column.id) {
            Some(input) if !input.is_empty() => {
                let validated =
                    validate_value(column.column_type, input, &column.config).map_err(|e| {
                        FieldError {
                            column_id: column.id.clone(),
                            column_name: column.name.clone(),
                            reason: e.to_string(),
                        }
                    })?;
                values.insert(column.id.clone(), validated);
            }
            _ => {
                if column.is_required {
                    return Err(FieldError {
                        column_id: column.id.clone(),
                        column_name: column.name.clone(),
                        reason: "a value is required".into(),
                    });
                }
                values.insert(
                    column.id.clone(),
                    default_value(column.column_type, &column.config),
                );
            }
        }
    }

    Ok(values)
}
