//! Typed values and the validation engine
//!
//! The single boundary between untyped caller input and stored data.
//! Every cell value is a tagged [`Value`]; the validation engine converts
//! raw input into the tagged form per column type, derives defaults, and
//! checks column configurations. Pure functions, no I/O.

mod errors;
mod types;
mod validator;

pub use errors::{ValidationError, ValidationResult};
pub use types::{ColumnConfig, ColumnType, NumberFormat, RecordValues, Value};
pub use validator::{default_value, validate_config, validate_value};
