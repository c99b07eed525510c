//! Column store
//!
//! CRUD over column definitions. `order` is advisory: it only sorts
//! columns for display, ties break by insertion. The create path assigns
//! one past the current maximum. Deleting a column leaves its values in
//! existing records; they become orphaned but harmless.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

use crate::store::time::{fmt_timestamp, parse_timestamp};
use crate::store::{generate_id, StorageError, Store};
use crate::value::{ColumnConfig, ColumnType};

use super::errors::{TableError, TableResult};
use super::tables::{fetch_table, Table};

/// A typed column definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub id: String,
    pub table_id: String,
    pub name: String,
    pub column_type: ColumnType,
    pub order: i64,
    pub is_required: bool,
    pub config: ColumnConfig,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A table together with its ordered columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableWithColumns {
    pub table: Table,
    pub columns: Vec<Column>,
}

/// Partial update for a column. Absent fields are left untouched; the
/// update timestamp always refreshes.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ColumnUpdate {
    pub name: Option<String>,
    pub column_type: Option<ColumnType>,
    pub config: Option<ColumnConfig>,
    pub order: Option<i64>,
    pub is_required: Option<bool>,
}

/// Store for column definitions.
pub struct ColumnStore<'a> {
    store: &'a Store,
}

impl<'a> ColumnStore<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Adds a column to a table.
    ///
    /// When `order` is omitted it becomes one greater than the table's
    /// current maximum, or 0 for the first column.
    pub fn add_column(
        &self,
        table_id: &str,
        name: &str,
        column_type: ColumnType,
        order: Option<i64>,
        config: Option<&ColumnConfig>,
    ) -> TableResult<String> {
        self.try_add_column(table_id, name, column_type, order, config)
            .map_err(|e| e.logged("column.add"))
    }

    fn try_add_column(
        &self,
        table_id: &str,
        name: &str,
        column_type: ColumnType,
        order: Option<i64>,
        config: Option<&ColumnConfig>,
    ) -> TableResult<String> {
        let conn = self.store.conn()?;
        let order = match order {
            Some(o) => o,
            None => next_order(&conn, table_id)?,
        };
        let fallback = ColumnConfig::default();
        let id = insert_column(
            &conn,
            table_id,
            name,
            column_type,
            order,
            config.unwrap_or(&fallback),
            Utc::now(),
        )?;
        Ok(id)
    }

    /// Applies a partial update and refreshes the update timestamp.
    pub fn update_column(&self, column_id: &str, update: &ColumnUpdate) -> TableResult<()> {
        self.try_update_column(column_id, update)
            .map_err(|e| e.logged("column.update"))
    }

    fn try_update_column(&self, column_id: &str, update: &ColumnUpdate) -> TableResult<()> {
        let mut assignments: Vec<&str> = Vec::new();
        let mut values: Vec<rusqlite::types::Value> = Vec::new();

        if let Some(name) = &update.name {
            assignments.push("name = ?");
            values.push(name.clone().into());
        }
        if let Some(column_type) = update.column_type {
            assignments.push("column_type = ?");
            values.push(column_type.as_str().to_string().into());
        }
        if let Some(config) = &update.config {
            assignments.push("config = ?");
            values.push(serde_json::to_string(config)?.into());
        }
        if let Some(order) = update.order {
            assignments.push("\"order\" = ?");
            values.push(order.into());
        }
        if let Some(is_required) = update.is_required {
            assignments.push("is_required = ?");
            values.push((is_required as i64).into());
        }
        assignments.push("updated_at = ?");
        values.push(fmt_timestamp(Utc::now()).into());
        values.push(column_id.to_string().into());

        let sql = format!(
            "UPDATE columns SET {} WHERE id = ?",
            assignments.join(", ")
        );
        let conn = self.store.conn()?;
        conn.execute(&sql, rusqlite::params_from_iter(values))?;
        Ok(())
    }

    /// Removes a column definition. Record values stored under the column
    /// id are not stripped. Deleting an already-deleted id is a no-op.
    pub fn delete_column(&self, column_id: &str) -> TableResult<()> {
        let result: TableResult<()> = (|| {
            let conn = self.store.conn()?;
            conn.execute("DELETE FROM columns WHERE id = ?1", params![column_id])?;
            Ok(())
        })();
        result.map_err(|e| e.logged("column.delete"))
    }

    /// Fetches a single column definition.
    pub fn get_column(&self, column_id: &str) -> TableResult<Option<Column>> {
        let conn = self.store.conn()?;
        let raw = conn
            .query_row(
                "SELECT id, table_id, name, column_type, \"order\", is_required, config,
                        created_at, updated_at
                 FROM columns WHERE id = ?1",
                params![column_id],
                row_to_raw_column,
            )
            .optional()?;
        raw.map(raw_to_column)
            .transpose()
            .map_err(TableError::from)
    }

    /// Fetches a table together with its columns, ascending by `order`
    /// (ties by insertion), configs deserialized.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::NotFound`] when the table does not exist.
    pub fn get_table_with_columns(&self, table_id: &str) -> TableResult<TableWithColumns> {
        let conn = self.store.conn()?;

        let table =
            fetch_table(&conn, table_id)?.ok_or_else(|| TableError::NotFound(table_id.into()))?;

        let mut stmt = conn.prepare(
            "SELECT id, table_id, name, column_type, \"order\", is_required, config,
                    created_at, updated_at
             FROM columns WHERE table_id = ?1 ORDER BY \"order\" ASC, rowid ASC",
        )?;
        let rows = stmt.query_map(params![table_id], row_to_raw_column)?;

        let mut columns = Vec::new();
        for row in rows {
            columns.push(raw_to_column(row?)?);
        }

        Ok(TableWithColumns { table, columns })
    }
}

/// Inserts a column row over an already-held connection. Shared with the
/// table store so table creation can seed columns inside its transaction.
pub(crate) fn insert_column(
    conn: &Connection,
    table_id: &str,
    name: &str,
    column_type: ColumnType,
    order: i64,
    config: &ColumnConfig,
    now: DateTime<Utc>,
) -> Result<String, StorageError> {
    let id = generate_id();
    conn.execute(
        "INSERT INTO columns (id, table_id, name, column_type, \"order\", is_required, config,
                              created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6, ?7, ?8)",
        params![
            id,
            table_id,
            name,
            column_type.as_str(),
            order,
            serde_json::to_string(config)?,
            fmt_timestamp(now),
            fmt_timestamp(now)
        ],
    )?;
    Ok(id)
}

/// Next auto-assigned order for a table: `MAX(order) + 1`, or 0 when the
/// table has no columns.
fn next_order(conn: &Connection, table_id: &str) -> Result<i64, StorageError> {
    let max: Option<i64> = conn.query_row(
        "SELECT MAX(\"order\") FROM columns WHERE table_id = ?1",
        params![table_id],
        |row| row.get(0),
    )?;
    Ok(max.map_or(0, |m| m + 1))
}

type RawColumn = (
    String,
    String,
    String,
    String,
    i64,
    bool,
    String,
    String,
    String,
);

fn row_to_raw_column(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawColumn> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
        row.get(8)?,
    ))
}

fn raw_to_column(raw: RawColumn) -> Result<Column, StorageError> {
    let (id, table_id, name, column_type, order, is_required, config, created_at, updated_at) =
        raw;
    Ok(Column {
        id,
        table_id,
        name,
        column_type: column_type
            .parse()
            .map_err(StorageError::Corrupt)?,
        order,
        is_required,
        config: serde_json::from_str(&config)?,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}

#[cfg(test)]
mod tests {
    use super::super::tables::TableStore;
    use super::*;
    use crate::value::Value;

    fn setup() -> (Store, String) {
        let store = Store::open_in_memory().unwrap();
        let table_id = TableStore::new(&store)
            .create_table("u1", "Inventory", None, Some(vec![]))
            .unwrap();
        (store, table_id)
    }

    #[test]
    fn test_auto_order_starts_at_zero_and_increments() {
        let (store, table_id) = setup();
        let columns = ColumnStore::new(&store);

        let a = columns
            .add_column(&table_id, "A", ColumnType::Text, None, None)
            .unwrap();
        let b = columns
            .add_column(&table_id, "B", ColumnType::Number, None, None)
            .unwrap();
        let c = columns
            .add_column(&table_id, "C", ColumnType::Date, None, None)
            .unwrap();

        assert_eq!(columns.get_column(&a).unwrap().unwrap().order, 0);
        assert_eq!(columns.get_column(&b).unwrap().unwrap().order, 1);
        assert_eq!(columns.get_column(&c).unwrap().unwrap().order, 2);
    }

    #[test]
    fn test_explicit_order_respected() {
        let (store, table_id) = setup();
        let columns = ColumnStore::new(&store);

        let id = columns
            .add_column(&table_id, "Pinned", ColumnType::Text, Some(42), None)
            .unwrap();
        assert_eq!(columns.get_column(&id).unwrap().unwrap().order, 42);

        // Auto-order continues past the explicit value.
        let next = columns
            .add_column(&table_id, "After", ColumnType::Text, None, None)
            .unwrap();
        assert_eq!(columns.get_column(&next).unwrap().unwrap().order, 43);
    }

    #[test]
    fn test_config_round_trips_through_storage() {
        let (store, table_id) = setup();
        let columns = ColumnStore::new(&store);

        let config = ColumnConfig {
            options: Some(vec!["todo".into(), "doing".into(), "done".into()]),
            default_value: Some(Value::Text("todo".into())),
            ..ColumnConfig::default()
        };
        let id = columns
            .add_column(&table_id, "State", ColumnType::Select, None, Some(&config))
            .unwrap();

        let loaded = columns.get_column(&id).unwrap().unwrap();
        assert_eq!(loaded.config, config);
        assert_eq!(loaded.column_type, ColumnType::Select);
        assert!(!loaded.is_required);
    }

    #[test]
    fn test_update_column_merges_fields() {
        let (store, table_id) = setup();
        let columns = ColumnStore::new(&store);
        let id = columns
            .add_column(&table_id, "Score", ColumnType::Number, None, None)
            .unwrap();

        let update = ColumnUpdate {
            name: Some("Rating".into()),
            column_type: Some(ColumnType::Rating),
            is_required: Some(true),
            ..ColumnUpdate::default()
        };
        columns.update_column(&id, &update).unwrap();

        let loaded = columns.get_column(&id).unwrap().unwrap();
        assert_eq!(loaded.name, "Rating");
        assert_eq!(loaded.column_type, ColumnType::Rating);
        assert!(loaded.is_required);
        // Untouched fields survive.
        assert_eq!(loaded.order, 0);
    }

    #[test]
    fn test_update_column_always_bumps_timestamp() {
        let (store, table_id) = setup();
        let columns = ColumnStore::new(&store);
        let id = columns
            .add_column(&table_id, "A", ColumnType::Text, None, None)
            .unwrap();
        let before = columns.get_column(&id).unwrap().unwrap();

        columns
            .update_column(&id, &ColumnUpdate::default())
            .unwrap();
        let after = columns.get_column(&id).unwrap().unwrap();
        assert!(after.updated_at >= before.updated_at);
    }

    #[test]
    fn test_get_table_with_columns_ordering() {
        let (store, table_id) = setup();
        let columns = ColumnStore::new(&store);

        columns
            .add_column(&table_id, "Second", ColumnType::Text, Some(5), None)
            .unwrap();
        columns
            .add_column(&table_id, "First", ColumnType::Text, Some(1), None)
            .unwrap();
        // Same order as "Second": insertion breaks the tie.
        columns
            .add_column(&table_id, "Third", ColumnType::Text, Some(5), None)
            .unwrap();

        let loaded = ColumnStore::new(&store)
            .get_table_with_columns(&table_id)
            .unwrap();
        let names: Vec<&str> = loaded.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["First", "Second", "Third"]);
        assert_eq!(loaded.table.id, table_id);
    }

    #[test]
    fn test_get_table_with_columns_missing_table() {
        let store = Store::open_in_memory().unwrap();
        let result = ColumnStore::new(&store).get_table_with_columns("nope");
        assert!(matches!(result, Err(TableError::NotFound(_))));
    }

    #[test]
    fn test_delete_column_twice_is_noop() {
        let (store, table_id) = setup();
        let columns = ColumnStore::new(&store);
        let id = columns
            .add_column(&table_id, "Doomed", ColumnType::Text, None, None)
            .unwrap();

        columns.delete_column(&id).unwrap();
        columns.delete_column(&id).unwrap();
        assert!(columns.get_column(&id).unwrap().is_none());
    }
}
