//! User profiles
//!
//! Lookup and profile mutation for pre-authenticated users. Password
//! hashing is the embedding application's concern; this store only keeps
//! the opaque hash it is given.

mod errors;
mod users;

pub use errors::{ProfileError, ProfileResult};
pub use users::{ProfileStore, User};
