//! End-to-end record pipeline
//!
//! The full write path: table with typed columns, raw input through the
//! intake boundary, storage, then query translation (filter/sort/search),
//! stats, duplication, and CSV export.

use std::collections::BTreeMap;

use gridbase::record::{compose_values, export_csv, export_filename, Filter, RecordStore, Sort};
use gridbase::store::Store;
use gridbase::table::{Column, ColumnSeed, ColumnStore, TableStore};
use gridbase::value::{ColumnConfig, ColumnType, Value};

struct Fixture {
    store: Store,
    table_id: String,
}

impl Fixture {
    fn new() -> Self {
        let store = Store::open_in_memory().unwrap();

        let select_config = ColumnConfig {
            options: Some(vec!["open".into(), "closed".into()]),
            ..ColumnConfig::default()
        };
        let seeds = vec![
            ColumnSeed::new("Title", ColumnType::Text),
            ColumnSeed::new("Count", ColumnType::Number),
            ColumnSeed::new("State", ColumnType::Select).with_config(select_config),
            ColumnSeed::new("Contact", ColumnType::Email),
            ColumnSeed::new("Due", ColumnType::Date),
        ];
        let table_id = TableStore::new(&store)
            .create_table("u1", "Work Items", Some("demo"), Some(seeds))
            .unwrap();

        // Title is required.
        let columns = Self::columns_of(&store, &table_id);
        ColumnStore::new(&store)
            .update_column(
                &columns[0].id,
                &gridbase::table::ColumnUpdate {
                    is_required: Some(true),
                    ..Default::default()
                },
            )
            .unwrap();

        Self { store, table_id }
    }

    fn columns_of(store: &Store, table_id: &str) -> Vec<Column> {
        ColumnStore::new(store)
            .get_table_with_columns(table_id)
            .unwrap()
            .columns
    }

    fn columns(&self) -> Vec<Column> {
        Self::columns_of(&self.store, &self.table_id)
    }

    fn raw_input(&self, title: &str, count: &str) -> BTreeMap<String, Value> {
        let columns = self.columns();
        let mut raw = BTreeMap::new();
        raw.insert(columns[0].id.clone(), Value::Text(title.into()));
        raw.insert(columns[1].id.clone(), Value::Text(count.into()));
        raw.insert(columns[2].id.clone(), Value::Text("open".into()));
        raw.insert(columns[3].id.clone(), Value::Text("a@example.com".into()));
        raw.insert(columns[4].id.clone(), Value::Text("2026-08-01".into()));
        raw
    }
}

#[test]
fn test_intake_to_storage_round_trip() {
    let fx = Fixture::new();
    let columns = fx.columns();

    let values = compose_values(&columns, &fx.raw_input("Fix the gate", "12")).unwrap();
    let records = RecordStore::new(&fx.store);
    let id = records.create_record(&fx.table_id, &values).unwrap();

    let loaded = records.get_record(&id).unwrap().unwrap();
    assert_eq!(
        loaded.values.get(&columns[0].id),
        Some(&Value::Text("Fix the gate".into()))
    );
    assert_eq!(loaded.values.get(&columns[1].id), Some(&Value::Number(12.0)));
    assert_eq!(
        loaded.values.get(&columns[4].id),
        Some(&Value::Date("2026-08-01T00:00:00.000Z".into()))
    );
}

#[test]
fn test_intake_rejects_bad_field_with_column_name() {
    let fx = Fixture::new();
    let columns = fx.columns();

    let mut raw = fx.raw_input("Ok title", "1");
    raw.insert(columns[3].id.clone(), Value::Text("not-an-email".into()));

    let err = compose_values(&columns, &raw).unwrap_err();
    assert_eq!(err.column_name, "Contact");
    assert_eq!(err.column_id, columns[3].id);
}

#[test]
fn test_intake_requires_title() {
    let fx = Fixture::new();
    let columns = fx.columns();

    let mut raw = fx.raw_input("ignored", "1");
    raw.remove(&columns[0].id);

    let err = compose_values(&columns, &raw).unwrap_err();
    assert_eq!(err.column_name, "Title");
}

#[test]
fn test_intake_defaults_optional_fields() {
    let fx = Fixture::new();
    let columns = fx.columns();

    let mut raw = BTreeMap::new();
    raw.insert(columns[0].id.clone(), Value::Text("Only title".into()));

    let values = compose_values(&columns, &raw).unwrap();
    assert_eq!(values.get(&columns[1].id), Some(&Value::Number(0.0)));
    // Select defaults to its first option.
    assert_eq!(values.get(&columns[2].id), Some(&Value::Text("open".into())));
    assert_eq!(values.get(&columns[4].id), Some(&Value::Null));
}

#[test]
fn test_filter_sort_and_search_over_stored_records() {
    let fx = Fixture::new();
    let columns = fx.columns();
    let records = RecordStore::new(&fx.store);

    for (title, count) in [("alpha", "5"), ("beta", "15"), ("gamma", "25")] {
        let values = compose_values(&columns, &fx.raw_input(title, count)).unwrap();
        records.create_record(&fx.table_id, &values).unwrap();
    }

    let count_col = &columns[1].id;

    // greaterThan keeps 15 and 25.
    let found = records
        .filter_records(&fx.table_id, &[Filter::greater_than(count_col.clone(), 10.0)])
        .unwrap();
    assert_eq!(found.len(), 2);

    // Descending sort yields 25, 15, 5.
    let sorted = records
        .sort_records(&fx.table_id, &[Sort::desc(count_col.clone())])
        .unwrap();
    let counts: Vec<f64> = sorted
        .iter()
        .filter_map(|r| r.values.get(count_col).and_then(|v| v.as_f64()))
        .collect();
    assert_eq!(counts, vec![25.0, 15.0, 5.0]);

    // Whole-blob search finds the title text.
    let hits = records.search_in_table(&fx.table_id, "gamma").unwrap();
    assert_eq!(hits.len(), 1);

    let stats = records.get_table_stats(&fx.table_id).unwrap();
    assert_eq!(stats.total, 3);
    assert_eq!(stats.this_week, 3);
}

#[test]
fn test_duplicate_then_bulk_delete() {
    let fx = Fixture::new();
    let columns = fx.columns();
    let records = RecordStore::new(&fx.store);

    let values = compose_values(&columns, &fx.raw_input("original", "1")).unwrap();
    let first = records.create_record(&fx.table_id, &values).unwrap();
    let copy = records.duplicate_record(&first).unwrap();

    assert_eq!(records.get_table_records(&fx.table_id).unwrap().len(), 2);

    let deleted = records.delete_records(&[first, copy]).unwrap();
    assert_eq!(deleted, 2);
    assert!(records.get_table_records(&fx.table_id).unwrap().is_empty());
}

#[test]
fn test_csv_export_shape() {
    let fx = Fixture::new();
    let columns = fx.columns();
    let records_store = RecordStore::new(&fx.store);

    let values = compose_values(&columns, &fx.raw_input("Say \"hi\"", "3")).unwrap();
    records_store.create_record(&fx.table_id, &values).unwrap();

    let records = records_store.get_table_records(&fx.table_id).unwrap();
    let csv = export_csv(&columns, &records);

    let mut lines = csv.lines();
    assert_eq!(lines.next().unwrap(), "Title,Count,State,Contact,Due");
    let row = lines.next().unwrap();
    assert!(row.starts_with("\"Say \"\"hi\"\"\""));
    assert!(row.contains("\"3\""));

    assert_eq!(export_filename("Work Items"), "Work_Items_export.csv");
}
