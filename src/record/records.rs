//! Record store
//!
//! CRUD over JSON-valued records plus filter/sort/search translation and
//! table stats. Every method issues independent statements; updates are
//! full replaces of the value map, last write wins.

use chrono::{DateTime, Utc};
use rusqlite::types::Value as SqlValue;
use rusqlite::{params, params_from_iter, OptionalExtension};
use serde::{Deserialize, Serialize};

use crate::store::time::{fmt_timestamp, parse_timestamp};
use crate::store::{generate_id, StorageError, Store};
use crate::value::{RecordValues, Value};

use super::errors::{RecordError, RecordResult};
use super::query::{Filter, Sort};

const SELECT_RECORD: &str =
    "SELECT id, table_id, \"values\", created_at, updated_at FROM records";

/// A stored record with its decoded value map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    pub table_id: String,
    pub values: RecordValues,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Record counts for a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TableStats {
    /// All records in the table
    pub total: u64,
    /// Records created within the trailing 7 days
    pub this_week: u64,
}

/// Store for records.
pub struct RecordStore<'a> {
    store: &'a Store,
}

impl<'a> RecordStore<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Creates a record from an already-validated value map.
    pub fn create_record(&self, table_id: &str, values: &RecordValues) -> RecordResult<String> {
        self.try_create_record(table_id, values)
            .map_err(|e| e.logged("record.create"))
    }

    fn try_create_record(&self, table_id: &str, values: &RecordValues) -> RecordResult<String> {
        let id = generate_id();
        let now = fmt_timestamp(Utc::now());
        let blob = serde_json::to_string(values)?;

        let conn = self.store.conn()?;
        conn.execute(
            "INSERT INTO records (id, table_id, \"values\", created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![id, table_id, blob, now, now],
        )?;
        Ok(id)
    }

    /// Replaces a record's value map wholesale and refreshes the update
    /// timestamp. This is not a merge.
    pub fn update_record(&self, record_id: &str, values: &RecordValues) -> RecordResult<()> {
        self.try_update_record(record_id, values)
            .map_err(|e| e.logged("record.update"))
    }

    fn try_update_record(&self, record_id: &str, values: &RecordValues) -> RecordResult<()> {
        let blob = serde_json::to_string(values)?;
        let conn = self.store.conn()?;
        conn.execute(
            "UPDATE records SET \"values\" = ?1, updated_at = ?2 WHERE id = ?3",
            params![blob, fmt_timestamp(Utc::now()), record_id],
        )?;
        Ok(())
    }

    /// Fetches one record, or `None` when it does not exist.
    pub fn get_record(&self, record_id: &str) -> RecordResult<Option<Record>> {
        let conn = self.store.conn()?;
        let raw = conn
            .query_row(
                &format!("{SELECT_RECORD} WHERE id = ?1"),
                params![record_id],
                row_to_raw_record,
            )
            .optional()?;
        raw.map(raw_to_record).transpose().map_err(RecordError::from)
    }

    /// Lists a table's records, newest-created first.
    pub fn get_table_records(&self, table_id: &str) -> RecordResult<Vec<Record>> {
        let sql = format!(
            "{SELECT_RECORD} WHERE table_id = ? ORDER BY created_at DESC, rowid DESC"
        );
        self.query_records(&sql, vec![SqlValue::Text(table_id.into())])
    }

    /// Lists records matching all of `filters`, newest-created first.
    pub fn filter_records(&self, table_id: &str, filters: &[Filter]) -> RecordResult<Vec<Record>> {
        let mut sql = format!("{SELECT_RECORD} WHERE table_id = ?");
        let mut params: Vec<SqlValue> = vec![SqlValue::Text(table_id.into())];

        for filter in filters {
            let predicate = filter.predicate_sql(&mut params)?;
            sql.push_str(" AND ");
            sql.push_str(&predicate);
        }
        sql.push_str(" ORDER BY created_at DESC, rowid DESC");

        self.query_records(&sql, params)
    }

    /// Lists a table's records ordered by the given sort keys, applied
    /// left to right. With no keys this is plain insertion order.
    pub fn sort_records(&self, table_id: &str, sorts: &[Sort]) -> RecordResult<Vec<Record>> {
        let mut sql = format!("{SELECT_RECORD} WHERE table_id = ?");
        let mut params: Vec<SqlValue> = vec![SqlValue::Text(table_id.into())];

        if !sorts.is_empty() {
            let terms: Vec<String> = sorts.iter().map(|s| s.order_sql(&mut params)).collect();
            sql.push_str(" ORDER BY ");
            sql.push_str(&terms.join(", "));
        }

        self.query_records(&sql, params)
    }

    /// Substring search over the serialized value blob as a whole, newest
    /// first. Blunt by design: the term can match inside any field's
    /// text, including multiselect array syntax.
    pub fn search_in_table(&self, table_id: &str, term: &str) -> RecordResult<Vec<Record>> {
        let sql = format!(
            "{SELECT_RECORD} WHERE table_id = ? AND \"values\" LIKE ?
             ORDER BY created_at DESC, rowid DESC"
        );
        let params = vec![
            SqlValue::Text(table_id.into()),
            SqlValue::Text(format!("%{}%", term)),
        ];
        self.query_records(&sql, params)
    }

    /// Deletes a record. Deleting an already-deleted id is a no-op.
    pub fn delete_record(&self, record_id: &str) -> RecordResult<()> {
        self.try_delete_record(record_id)
            .map(|_| ())
            .map_err(|e| e.logged("record.delete"))
    }

    fn try_delete_record(&self, record_id: &str) -> RecordResult<usize> {
        let conn = self.store.conn()?;
        Ok(conn.execute("DELETE FROM records WHERE id = ?1", params![record_id])?)
    }

    /// Deletes records one by one. A failure surfaces immediately and
    /// earlier deletions stay deleted; there is no compensation. Returns
    /// the number of rows actually removed.
    pub fn delete_records(&self, record_ids: &[String]) -> RecordResult<usize> {
        let mut deleted = 0;
        for record_id in record_ids {
            deleted += self
                .try_delete_record(record_id)
                .map_err(|e| e.logged("record.delete_many"))?;
        }
        Ok(deleted)
    }

    /// Creates a new record carrying the same values as an existing one.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::NotFound`] when the source record is gone.
    pub fn duplicate_record(&self, record_id: &str) -> RecordResult<String> {
        let source = self
            .get_record(record_id)?
            .ok_or_else(|| RecordError::NotFound(record_id.into()))?;
        self.create_record(&source.table_id, &source.values)
    }

    /// Total record count and the count created in the trailing 7 days.
    /// The cutoff is evaluated by the storage engine, not the caller's
    /// clock.
    pub fn get_table_stats(&self, table_id: &str) -> RecordResult<TableStats> {
        let conn = self.store.conn()?;

        let total: i64 = conn.query_row(
            "SELECT COUNT(*) FROM records WHERE table_id = ?1",
            params![table_id],
            |row| row.get(0),
        )?;

        let this_week: i64 = conn.query_row(
            "SELECT COUNT(*) FROM records
             WHERE table_id = ?1
               AND created_at > strftime('%Y-%m-%dT%H:%M:%fZ', 'now', '-7 days')",
            params![table_id],
            |row| row.get(0),
        )?;

        Ok(TableStats {
            total: total as u64,
            this_week: this_week as u64,
        })
    }

    fn query_records(&self, sql: &str, params: Vec<SqlValue>) -> RecordResult<Vec<Record>> {
        let conn = self.store.conn()?;
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(params_from_iter(params), row_to_raw_record)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(raw_to_record(row?)?);
        }
        Ok(records)
    }
}

type RawRecord = (String, String, String, String, String);

fn row_to_raw_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawRecord> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
    ))
}

fn raw_to_record(raw: RawRecord) -> Result<Record, StorageError> {
    let (id, table_id, blob, created_at, updated_at) = raw;
    Ok(Record {
        id,
        table_id,
        values: decode_values(&blob),
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}

/// Decodes a stored value blob. Tolerates a double-encoded blob (a JSON
/// string wrapping the object) and degrades anything unreadable to an
/// empty map rather than failing the read.
fn decode_values(blob: &str) -> RecordValues {
    let parsed: serde_json::Value = match serde_json::from_str(blob) {
        Ok(v) => v,
        Err(_) => return RecordValues::new(),
    };

    let parsed = match parsed {
        serde_json::Value::String(inner) => {
            serde_json::from_str(&inner).unwrap_or(serde_json::Value::Null)
        }
        other => other,
    };

    match parsed {
        serde_json::Value::Object(map) => map
            .into_iter()
            .filter_map(|(key, raw)| Value::from_json(raw).ok().map(|value| (key, value)))
            .collect(),
        _ => RecordValues::new(),
    }
}
