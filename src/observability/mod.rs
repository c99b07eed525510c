//! Observability subsystem for gridbase
//!
//! Structured single-line JSON logging with deterministic field ordering.
//! Logging is synchronous and read-only: it never influences store
//! behavior, and a failed write to the log sink is ignored.

mod logger;

pub use logger::{Logger, Severity};
