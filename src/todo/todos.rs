//! Todo store
//!
//! Per-user todos: title and description are required (trimmed before
//! storage), completion flips server-side so concurrent toggles cannot
//! lose each other's reads. Listing degrades to an empty collection on
//! storage failure; the page still renders.

use chrono::{DateTime, Utc};
use rusqlite::params;
use serde::{Deserialize, Serialize};

use crate::observability::Logger;
use crate::store::time::{fmt_timestamp, parse_timestamp};
use crate::store::{generate_id, StorageError, Store};

use super::errors::{TodoError, TodoResult};

/// A todo item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Todo {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub description: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Store for todos.
pub struct TodoStore<'a> {
    store: &'a Store,
}

impl<'a> TodoStore<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Creates a todo. Title and description are trimmed and must be
    /// non-empty.
    pub fn create_todo(
        &self,
        user_id: &str,
        title: &str,
        description: &str,
    ) -> TodoResult<String> {
        let title = title.trim();
        let description = description.trim();
        if title.is_empty() {
            return Err(TodoError::TitleRequired);
        }
        if description.is_empty() {
            return Err(TodoError::DescriptionRequired);
        }

        let result: TodoResult<String> = (|| {
            let id = generate_id();
            let now = fmt_timestamp(Utc::now());
            let conn = self.store.conn()?;
            conn.execute(
                "INSERT INTO todos (id, user_id, title, description, completed,
                                    created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, 0, ?5, ?6)",
                params![id, user_id, title, description, now, now],
            )?;
            Ok(id)
        })();
        result.map_err(|e| e.logged("todo.create"))
    }

    /// Lists a user's todos in insertion order.
    ///
    /// Storage failures on this read path degrade to an empty list.
    pub fn list_todos(&self, user_id: &str) -> Vec<Todo> {
        match self.try_list_todos(user_id) {
            Ok(todos) => todos,
            Err(e) => {
                Logger::warn(
                    "TODO_LIST_DEGRADED",
                    &[("user_id", user_id), ("error", &e.to_string())],
                );
                Vec::new()
            }
        }
    }

    fn try_list_todos(&self, user_id: &str) -> Result<Vec<Todo>, StorageError> {
        let conn = self.store.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, user_id, title, description, completed, created_at, updated_at
             FROM todos WHERE user_id = ?1",
        )?;
        let rows = stmt.query_map(params![user_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, bool>(4)?,
                row.get::<_, String>(5)?,
                row.get::<_, String>(6)?,
            ))
        })?;

        let mut todos = Vec::new();
        for row in rows {
            let (id, user_id, title, description, completed, created_at, updated_at) = row?;
            todos.push(Todo {
                id,
                user_id,
                title,
                description,
                completed,
                created_at: parse_timestamp(&created_at)?,
                updated_at: parse_timestamp(&updated_at)?,
            });
        }
        Ok(todos)
    }

    /// Flips a todo's completion state. The negation happens in the
    /// statement itself, not on a value read earlier. Toggling a missing
    /// id is a no-op.
    pub fn toggle_todo(&self, todo_id: &str) -> TodoResult<()> {
        let result: TodoResult<()> = (|| {
            let conn = self.store.conn()?;
            conn.execute(
                "UPDATE todos SET completed = NOT completed, updated_at = ?1 WHERE id = ?2",
                params![fmt_timestamp(Utc::now()), todo_id],
            )?;
            Ok(())
        })();
        result.map_err(|e| e.logged("todo.toggle"))
    }

    /// Deletes a todo. Deleting an already-deleted id is a no-op.
    pub fn delete_todo(&self, todo_id: &str) -> TodoResult<()> {
        let result: TodoResult<()> = (|| {
            let conn = self.store.conn()?;
            conn.execute("DELETE FROM todos WHERE id = ?1", params![todo_id])?;
            Ok(())
        })();
        result.map_err(|e| e.logged("todo.delete"))
    }
}
