//! Profile store

use rusqlite::{params, OptionalExtension};
use serde::{Deserialize, Serialize};

use crate::store::{generate_id, Store};

use super::errors::{ProfileError, ProfileResult};

/// A user account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub age: Option<i64>,
    /// Opaque hash produced by the embedding application; never leaves
    /// the process in serialized form.
    #[serde(skip_serializing)]
    pub password_hash: String,
}

/// Store for user profiles.
pub struct ProfileStore<'a> {
    store: &'a Store,
}

impl<'a> ProfileStore<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Creates a user with a unique username and an externally-produced
    /// password hash.
    pub fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        age: Option<i64>,
    ) -> ProfileResult<String> {
        let username = username.trim();
        if username.is_empty() {
            return Err(ProfileError::UsernameRequired);
        }

        let result: ProfileResult<String> = (|| {
            let conn = self.store.conn()?;
            let taken: Option<String> = conn
                .query_row(
                    "SELECT id FROM users WHERE username = ?1",
                    params![username],
                    |row| row.get(0),
                )
                .optional()?;
            if taken.is_some() {
                return Err(ProfileError::UsernameTaken(username.to_string()));
            }

            let id = generate_id();
            conn.execute(
                "INSERT INTO users (id, username, age, password_hash) VALUES (?1, ?2, ?3, ?4)",
                params![id, username, age, password_hash],
            )?;
            Ok(id)
        })();
        result.map_err(|e| e.logged("user.create"))
    }

    /// Fetches one user, or `None` when it does not exist.
    pub fn get_user(&self, user_id: &str) -> ProfileResult<Option<User>> {
        let conn = self.store.conn()?;
        let user = conn
            .query_row(
                "SELECT id, username, age, password_hash FROM users WHERE id = ?1",
                params![user_id],
                |row| {
                    Ok(User {
                        id: row.get(0)?,
                        username: row.get(1)?,
                        age: row.get(2)?,
                        password_hash: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(user)
    }

    /// Changes a user's username. Rejects a name already held by a
    /// *different* user; re-submitting the current name is fine.
    pub fn update_username(&self, user_id: &str, username: &str) -> ProfileResult<()> {
        let username = username.trim();
        if username.is_empty() {
            return Err(ProfileError::UsernameRequired);
        }

        let result: ProfileResult<()> = (|| {
            let conn = self.store.conn()?;
            let taken: Option<String> = conn
                .query_row(
                    "SELECT id FROM users WHERE username = ?1 AND id != ?2",
                    params![username, user_id],
                    |row| row.get(0),
                )
                .optional()?;
            if taken.is_some() {
                return Err(ProfileError::UsernameTaken(username.to_string()));
            }

            let updated = conn.execute(
                "UPDATE users SET username = ?1 WHERE id = ?2",
                params![username, user_id],
            )?;
            if updated == 0 {
                return Err(ProfileError::NotFound(user_id.to_string()));
            }
            Ok(())
        })();
        result.map_err(|e| e.logged("user.update_username"))
    }

    /// Replaces a user's stored password hash.
    pub fn update_password_hash(&self, user_id: &str, password_hash: &str) -> ProfileResult<()> {
        let result: ProfileResult<()> = (|| {
            let conn = self.store.conn()?;
            let updated = conn.execute(
                "UPDATE users SET password_hash = ?1 WHERE id = ?2",
                params![password_hash, user_id],
            )?;
            if updated == 0 {
                return Err(ProfileError::NotFound(user_id.to_string()));
            }
            Ok(())
        })();
        result.map_err(|e| e.logged("user.update_password_hash"))
    }
}
