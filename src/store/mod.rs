//! Storage handle for gridbase
//!
//! One explicitly constructed SQLite connection handle, passed to every
//! store at construction time. The handle owns schema bootstrap (with
//! `ON DELETE CASCADE` on the ownership edges), pragma setup, and the
//! transaction scope used by multi-statement writes.

mod errors;
mod handle;
mod ids;
pub(crate) mod time;

pub use errors::{StorageError, StorageResult};
pub use handle::Store;
pub use ids::generate_id;
