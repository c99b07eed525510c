//! Column type and cell value definitions
//!
//! Supported column types:
//! - text, email, url, phone: free-form strings
//! - number: 64-bit float
//! - rating: integer constrained by config bounds
//! - checkbox: boolean
//! - date: ISO-8601 string, or null when unset
//! - select: one string constrained to configured options
//! - multiselect: a list of strings constrained to configured options
//! - priority, status, relation: strings interpreted by the UI layer

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A record's values: column id to typed cell value.
pub type RecordValues = BTreeMap<String, Value>;

/// Column data types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Text,
    Number,
    Date,
    Select,
    Multiselect,
    Checkbox,
    Url,
    Email,
    Phone,
    Rating,
    Priority,
    Status,
    Relation,
}

impl ColumnType {
    /// Returns the type name used in storage and error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Text => "text",
            ColumnType::Number => "number",
            ColumnType::Date => "date",
            ColumnType::Select => "select",
            ColumnType::Multiselect => "multiselect",
            ColumnType::Checkbox => "checkbox",
            ColumnType::Url => "url",
            ColumnType::Email => "email",
            ColumnType::Phone => "phone",
            ColumnType::Rating => "rating",
            ColumnType::Priority => "priority",
            ColumnType::Status => "status",
            ColumnType::Relation => "relation",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ColumnType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(ColumnType::Text),
            "number" => Ok(ColumnType::Number),
            "date" => Ok(ColumnType::Date),
            "select" => Ok(ColumnType::Select),
            "multiselect" => Ok(ColumnType::Multiselect),
            "checkbox" => Ok(ColumnType::Checkbox),
            "url" => Ok(ColumnType::Url),
            "email" => Ok(ColumnType::Email),
            "phone" => Ok(ColumnType::Phone),
            "rating" => Ok(ColumnType::Rating),
            "priority" => Ok(ColumnType::Priority),
            "status" => Ok(ColumnType::Status),
            "relation" => Ok(ColumnType::Relation),
            other => Err(format!("unknown column type '{}'", other)),
        }
    }
}

/// Number formatting hint carried in column config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumberFormat {
    Integer,
    Decimal,
    Currency,
    Percentage,
}

/// Type-specific column settings, stored as a JSON blob alongside the
/// column definition. Every field is optional; an empty config is valid
/// for every type (though `validate_config` flags the combinations the
/// UI cannot render).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnConfig {
    /// Allowed values for select/multiselect columns
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    /// Formatting hint for number columns
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<NumberFormat>,
    /// Whether date columns carry a time component
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_time: Option<bool>,
    /// Lower bound for rating columns
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_rating: Option<i64>,
    /// Upper bound for rating columns
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_rating: Option<i64>,
    /// Display colors keyed by option value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub option_colors: Option<BTreeMap<String, String>>,
    /// Default cell value for the column
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
}

/// A typed cell value.
///
/// Values serialize as plain JSON scalars/arrays so the stored blob stays
/// an ordinary `{column id: value}` object. The tag is recovered from the
/// JSON shape on the way back in; strings in RFC 3339 shape classify as
/// dates, everything beyond that is the caller's interpretation with
/// column metadata in hand.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Absent value (dates without input, cleared cells)
    Null,
    /// Free-form string (text, email, url, phone, select members, ...)
    Text(String),
    /// Numeric value; ratings are whole numbers stored as f64
    Number(f64),
    /// Checkbox state
    Bool(bool),
    /// ISO-8601 timestamp produced by date validation
    Date(String),
    /// Multiselect members
    StringList(Vec<String>),
}

impl Value {
    /// Reconstructs a tagged value from its stored JSON shape.
    pub fn from_json(raw: serde_json::Value) -> Result<Self, String> {
        match raw {
            serde_json::Value::Null => Ok(Value::Null),
            serde_json::Value::Bool(b) => Ok(Value::Bool(b)),
            serde_json::Value::Number(n) => n
                .as_f64()
                .map(Value::Number)
                .ok_or_else(|| format!("unrepresentable number {}", n)),
            serde_json::Value::String(s) => {
                if chrono::DateTime::parse_from_rfc3339(&s).is_ok() {
                    Ok(Value::Date(s))
                } else {
                    Ok(Value::Text(s))
                }
            }
            serde_json::Value::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        serde_json::Value::String(s) => out.push(s),
                        other => return Err(format!("unsupported list element: {}", other)),
                    }
                }
                Ok(Value::StringList(out))
            }
            serde_json::Value::Object(_) => Err("nested objects are not valid cell values".into()),
        }
    }

    /// The string content of text-like values.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) | Value::Date(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric content: numbers directly, strings via parsing.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Text(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    /// Truthiness for checkbox coercion: empty string, zero, and null are
    /// false; everything else is true.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0,
            Value::Text(s) => !s.is_empty(),
            Value::Date(_) => true,
            Value::StringList(_) => true,
        }
    }

    /// Whether the value counts as "no input": null or empty string.
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Returns the value type name for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Text(_) => "text",
            Value::Number(_) => "number",
            Value::Bool(_) => "bool",
            Value::Date(_) => "date",
            Value::StringList(_) => "list",
        }
    }

    /// Human-readable rendering, used for CSV cells and error messages.
    /// Whole numbers drop the trailing `.0`.
    pub fn to_display_string(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Text(s) | Value::Date(s) => s.clone(),
            Value::Number(n) => {
                if n.fract() == 0.0 && n.is_finite() && n.abs() < 9_007_199_254_740_992.0 {
                    format!("{}", *n as i64)
                } else {
                    n.to_string()
                }
            }
            Value::Bool(b) => b.to_string(),
            Value::StringList(items) => items.join(","),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Text(s) | Value::Date(s) => serializer.serialize_str(s),
            Value::Number(n) => serializer.serialize_f64(*n),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::StringList(items) => items.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = serde_json::Value::deserialize(deserializer)?;
        Value::from_json(raw).map_err(serde::de::Error::custom)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Vec<String>> for Value {
    fn from(items: Vec<String>) -> Self {
        Value::StringList(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_column_type_round_trip() {
        for ty in [
            ColumnType::Text,
            ColumnType::Number,
            ColumnType::Multiselect,
            ColumnType::Rating,
            ColumnType::Relation,
        ] {
            assert_eq!(ty.as_str().parse::<ColumnType>().unwrap(), ty);
        }
    }

    #[test]
    fn test_column_type_serde_lowercase() {
        assert_eq!(
            serde_json::to_string(&ColumnType::Multiselect).unwrap(),
            "\"multiselect\""
        );
        let ty: ColumnType = serde_json::from_str("\"checkbox\"").unwrap();
        assert_eq!(ty, ColumnType::Checkbox);
    }

    #[test]
    fn test_value_serializes_as_plain_json() {
        let mut values = RecordValues::new();
        values.insert("a".into(), Value::Text("hello".into()));
        values.insert("b".into(), Value::Number(5.0));
        values.insert("c".into(), Value::Bool(true));
        values.insert("d".into(), Value::Null);
        values.insert("e".into(), Value::StringList(vec!["x".into(), "y".into()]));

        let raw = serde_json::to_value(&values).unwrap();
        assert_eq!(
            raw,
            json!({"a": "hello", "b": 5.0, "c": true, "d": null, "e": ["x", "y"]})
        );
    }

    #[test]
    fn test_value_from_json_shapes() {
        assert_eq!(Value::from_json(json!(null)).unwrap(), Value::Null);
        assert_eq!(Value::from_json(json!(true)).unwrap(), Value::Bool(true));
        assert_eq!(Value::from_json(json!(2.5)).unwrap(), Value::Number(2.5));
        assert_eq!(
            Value::from_json(json!("plain")).unwrap(),
            Value::Text("plain".into())
        );
        assert_eq!(
            Value::from_json(json!("2026-08-06T00:00:00.000Z")).unwrap(),
            Value::Date("2026-08-06T00:00:00.000Z".into())
        );
        assert_eq!(
            Value::from_json(json!(["a", "b"])).unwrap(),
            Value::StringList(vec!["a".into(), "b".into()])
        );
    }

    #[test]
    fn test_value_rejects_objects() {
        assert!(Value::from_json(json!({"nested": 1})).is_err());
        assert!(Value::from_json(json!([1, 2])).is_err());
    }

    #[test]
    fn test_truthiness() {
        assert!(!Value::Null.is_truthy());
        assert!(!Value::Text(String::new()).is_truthy());
        assert!(!Value::Number(0.0).is_truthy());
        assert!(Value::Text("no".into()).is_truthy());
        assert!(Value::Number(-1.0).is_truthy());
        assert!(Value::StringList(vec![]).is_truthy());
    }

    #[test]
    fn test_display_string_trims_whole_numbers() {
        assert_eq!(Value::Number(5.0).to_display_string(), "5");
        assert_eq!(Value::Number(5.5).to_display_string(), "5.5");
        assert_eq!(Value::Bool(false).to_display_string(), "false");
        assert_eq!(
            Value::StringList(vec!["a".into(), "b".into()]).to_display_string(),
            "a,b"
        );
    }

    #[test]
    fn test_config_round_trip() {
        let config = ColumnConfig {
            options: Some(vec!["red".into(), "blue".into()]),
            max_rating: Some(5),
            default_value: Some(Value::Text("red".into())),
            ..ColumnConfig::default()
        };
        let text = serde_json::to_string(&config).unwrap();
        let back: ColumnConfig = serde_json::from_str(&text).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_empty_config_deserializes() {
        let config: ColumnConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, ColumnConfig::default());
    }
}
