//! Table store
//!
//! CRUD over tables. `create_table` seeds the table's default columns in
//! the same transaction, so a failure in any column insert leaves no
//! half-created table behind.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

use crate::observability::Logger;
use crate::store::time::{fmt_timestamp, parse_timestamp};
use crate::store::{generate_id, StorageError, Store};
use crate::value::{ColumnConfig, ColumnType};

use super::columns::insert_column;
use super::errors::{TableError, TableResult};

/// A user-owned table definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A column to create alongside a new table. Array position becomes the
/// column's `order`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSeed {
    pub name: String,
    pub column_type: ColumnType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<ColumnConfig>,
}

impl ColumnSeed {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            config: None,
        }
    }

    pub fn with_config(mut self, config: ColumnConfig) -> Self {
        self.config = Some(config);
        self
    }
}

/// Partial update for a table. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TableUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Store for table definitions.
pub struct TableStore<'a> {
    store: &'a Store,
}

impl<'a> TableStore<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Creates a table and its default columns in one transaction.
    ///
    /// Without an explicit column list the table gets a single text
    /// column named "Name". Seed order becomes column order.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::Storage`] when any insert fails; nothing is
    /// committed in that case.
    pub fn create_table(
        &self,
        user_id: &str,
        name: &str,
        description: Option<&str>,
        default_columns: Option<Vec<ColumnSeed>>,
    ) -> TableResult<String> {
        let table_id = generate_id();
        let now = Utc::now();
        let seeds = default_columns
            .unwrap_or_else(|| vec![ColumnSeed::new("Name", ColumnType::Text)]);
        let fallback_config = ColumnConfig::default();

        self.store
            .with_transaction(|tx| {
                tx.execute(
                    "INSERT INTO tables (id, name, description, user_id, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![
                        table_id,
                        name,
                        description,
                        user_id,
                        fmt_timestamp(now),
                        fmt_timestamp(now)
                    ],
                )?;

                for (index, seed) in seeds.iter().enumerate() {
                    insert_column(
                        tx,
                        &table_id,
                        &seed.name,
                        seed.column_type,
                        index as i64,
                        seed.config.as_ref().unwrap_or(&fallback_config),
                        now,
                    )?;
                }
                Ok(())
            })
            .map_err(|e| TableError::from(e).logged("table.create"))?;

        Logger::info(
            "TABLE_CREATED",
            &[("table_id", table_id.as_str()), ("user_id", user_id)],
        );
        Ok(table_id)
    }

    /// Lists a user's tables, most recently updated first.
    ///
    /// Storage failures on this read path degrade to an empty list; the
    /// page still renders without its table list.
    pub fn get_user_tables(&self, user_id: &str) -> Vec<Table> {
        match self.try_get_user_tables(user_id) {
            Ok(tables) => tables,
            Err(e) => {
                Logger::warn(
                    "TABLE_LIST_DEGRADED",
                    &[("user_id", user_id), ("error", &e.to_string())],
                );
                Vec::new()
            }
        }
    }

    fn try_get_user_tables(&self, user_id: &str) -> Result<Vec<Table>, StorageError> {
        let conn = self.store.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, description, user_id, created_at, updated_at
             FROM tables WHERE user_id = ?1 ORDER BY updated_at DESC",
        )?;
        let rows = stmt.query_map(params![user_id], row_to_raw_table)?;

        let mut tables = Vec::new();
        for row in rows {
            tables.push(raw_to_table(row?)?);
        }
        Ok(tables)
    }

    /// Fetches a single table.
    pub fn get_table(&self, table_id: &str) -> TableResult<Option<Table>> {
        let conn = self.store.conn()?;
        fetch_table(&conn, table_id).map_err(TableError::from)
    }

    /// Applies a partial update and refreshes the update timestamp.
    pub fn update_table(&self, table_id: &str, update: &TableUpdate) -> TableResult<()> {
        self.try_update_table(table_id, update)
            .map_err(|e| e.logged("table.update"))
    }

    fn try_update_table(&self, table_id: &str, update: &TableUpdate) -> TableResult<()> {
        let mut assignments: Vec<&str> = Vec::new();
        let mut values: Vec<rusqlite::types::Value> = Vec::new();

        if let Some(name) = &update.name {
            assignments.push("name = ?");
            values.push(name.clone().into());
        }
        if let Some(description) = &update.description {
            assignments.push("description = ?");
            values.push(description.clone().into());
        }
        assignments.push("updated_at = ?");
        values.push(fmt_timestamp(Utc::now()).into());
        values.push(table_id.to_string().into());

        let sql = format!(
            "UPDATE tables SET {} WHERE id = ?",
            assignments.join(", ")
        );
        let conn = self.store.conn()?;
        conn.execute(&sql, rusqlite::params_from_iter(values))?;
        Ok(())
    }

    /// Deletes a table. Columns and records go with it via the storage
    /// engine's cascade. Deleting an already-deleted id is a no-op.
    pub fn delete_table(&self, table_id: &str) -> TableResult<()> {
        let result: TableResult<usize> = (|| {
            let conn = self.store.conn()?;
            Ok(conn.execute("DELETE FROM tables WHERE id = ?1", params![table_id])?)
        })();

        match result {
            Ok(deleted) => {
                if deleted > 0 {
                    Logger::info("TABLE_DELETED", &[("table_id", table_id)]);
                }
                Ok(())
            }
            Err(e) => Err(e.logged("table.delete")),
        }
    }
}

type RawTable = (String, String, Option<String>, String, String, String);

pub(crate) fn row_to_raw_table(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawTable> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
    ))
}

pub(crate) fn raw_to_table(raw: RawTable) -> Result<Table, StorageError> {
    let (id, name, description, user_id, created_at, updated_at) = raw;
    Ok(Table {
        id,
        name,
        description,
        user_id,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}

/// Fetches a table row over an already-held connection.
pub(crate) fn fetch_table(
    conn: &Connection,
    table_id: &str,
) -> Result<Option<Table>, StorageError> {
    let raw = conn
        .query_row(
            "SELECT id, name, description, user_id, created_at, updated_at
             FROM tables WHERE id = ?1",
            params![table_id],
            row_to_raw_table,
        )
        .optional()?;

    raw.map(raw_to_table).transpose()
}
