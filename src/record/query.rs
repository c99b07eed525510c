//! Typed filter/sort expressions
//!
//! Filters and sorts are built from typed parts (column id, operator,
//! [`Value`] literal) and translated into SQL fragments whose every
//! dynamic piece is a bound parameter: the JSON path and the comparison
//! literal alike. There is no API that accepts a raw SQL string, so
//! caller values cannot reach query text by construction.

use rusqlite::types::Value as SqlValue;

use crate::value::Value;

use super::errors::{RecordError, RecordResult};

/// Filter operators over a record's JSON field.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterOp {
    /// Exact match against the extracted field
    Equals(Value),
    /// Case-sensitive substring match
    Contains(Value),
    /// Case-sensitive prefix match
    StartsWith(Value),
    /// Numeric comparison after casting the extracted field to REAL
    GreaterThan(Value),
    /// Numeric comparison after casting the extracted field to REAL
    LessThan(Value),
    /// Field is null or the empty string
    IsEmpty,
    /// Field is neither null nor the empty string
    IsNotEmpty,
}

/// One filter over one column. Filters on a query are ANDed.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column_id: String,
    pub op: FilterOp,
}

impl Filter {
    pub fn new(column_id: impl Into<String>, op: FilterOp) -> Self {
        Self {
            column_id: column_id.into(),
            op,
        }
    }

    pub fn equals(column_id: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(column_id, FilterOp::Equals(value.into()))
    }

    pub fn contains(column_id: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(column_id, FilterOp::Contains(value.into()))
    }

    pub fn starts_with(column_id: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(column_id, FilterOp::StartsWith(value.into()))
    }

    pub fn greater_than(column_id: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(column_id, FilterOp::GreaterThan(value.into()))
    }

    pub fn less_than(column_id: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(column_id, FilterOp::LessThan(value.into()))
    }

    pub fn is_empty(column_id: impl Into<String>) -> Self {
        Self::new(column_id, FilterOp::IsEmpty)
    }

    pub fn is_not_empty(column_id: impl Into<String>) -> Self {
        Self::new(column_id, FilterOp::IsNotEmpty)
    }

    /// Renders the predicate as a SQL fragment, pushing its parameters.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::NonNumericBound`] for a numeric comparison
    /// with a literal that has no numeric interpretation.
    pub(crate) fn predicate_sql(&self, params: &mut Vec<SqlValue>) -> RecordResult<String> {
        const FIELD: &str = "json_extract(\"values\", ?)";

        match &self.op {
            FilterOp::Equals(value) => {
                params.push(json_path(&self.column_id));
                params.push(to_sql_literal(value));
                Ok(format!("{FIELD} = ?"))
            }
            FilterOp::Contains(value) => {
                params.push(json_path(&self.column_id));
                params.push(SqlValue::Text(format!("%{}%", value.to_display_string())));
                Ok(format!("{FIELD} LIKE ?"))
            }
            FilterOp::StartsWith(value) => {
                params.push(json_path(&self.column_id));
                params.push(SqlValue::Text(format!("{}%", value.to_display_string())));
                Ok(format!("{FIELD} LIKE ?"))
            }
            FilterOp::GreaterThan(value) => {
                let bound = self.numeric_bound(value)?;
                params.push(json_path(&self.column_id));
                params.push(SqlValue::Real(bound));
                Ok(format!("CAST({FIELD} AS REAL) > ?"))
            }
            FilterOp::LessThan(value) => {
                let bound = self.numeric_bound(value)?;
                params.push(json_path(&self.column_id));
                params.push(SqlValue::Real(bound));
                Ok(format!("CAST({FIELD} AS REAL) < ?"))
            }
            FilterOp::IsEmpty => {
                params.push(json_path(&self.column_id));
                params.push(json_path(&self.column_id));
                Ok(format!("({FIELD} IS NULL OR {FIELD} = '')"))
            }
            FilterOp::IsNotEmpty => {
                params.push(json_path(&self.column_id));
                params.push(json_path(&self.column_id));
                Ok(format!("({FIELD} IS NOT NULL AND {FIELD} != '')"))
            }
        }
    }

    fn numeric_bound(&self, value: &Value) -> RecordResult<f64> {
        value.as_f64().ok_or_else(|| RecordError::NonNumericBound {
            column_id: self.column_id.clone(),
            value: value.to_display_string(),
        })
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// SQL keyword for the direction. Static text, never caller data.
    fn as_sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// One sort key over one column. Multiple keys apply left to right.
#[derive(Debug, Clone, PartialEq)]
pub struct Sort {
    pub column_id: String,
    pub direction: SortDirection,
}

impl Sort {
    pub fn asc(column_id: impl Into<String>) -> Self {
        Self {
            column_id: column_id.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(column_id: impl Into<String>) -> Self {
        Self {
            column_id: column_id.into(),
            direction: SortDirection::Desc,
        }
    }

    /// Renders the sort key as an ORDER BY term, pushing its path
    /// parameter.
    pub(crate) fn order_sql(&self, params: &mut Vec<SqlValue>) -> String {
        params.push(json_path(&self.column_id));
        format!("json_extract(\"values\", ?) {}", self.direction.as_sql())
    }
}

/// JSON path addressing one column id inside the `values` blob. Quoted so
/// ids containing `-` address correctly.
fn json_path(column_id: &str) -> SqlValue {
    SqlValue::Text(format!("$.\"{}\"", column_id))
}

/// Converts a typed literal into a SQL parameter value.
fn to_sql_literal(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Text(s) | Value::Date(s) => SqlValue::Text(s.clone()),
        Value::Number(n) => SqlValue::Real(*n),
        Value::Bool(b) => SqlValue::Integer(*b as i64),
        Value::StringList(items) => {
            SqlValue::Text(serde_json::to_string(items).unwrap_or_default())
        }
    }
}
