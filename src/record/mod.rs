//! Records: schemaless JSON values over typed columns
//!
//! A record's `values` map is a loosely-validated bag keyed by column id.
//! Write-time validation lives in the intake boundary
//! ([`compose_values`]); the store itself accepts any value map, and
//! nothing enforces required columns at read time. Filter and sort
//! requests translate into parameterized `json_extract` predicates; no
//! caller value is ever interpolated into query text.

mod errors;
mod export;
mod intake;
mod query;
mod records;

pub use errors::{FieldError, RecordError, RecordResult};
pub use export::{export_csv, export_filename};
pub use intake::compose_values;
pub use query::{Filter, FilterOp, Sort, SortDirection};
pub use records::{Record, RecordStore, TableStats};
