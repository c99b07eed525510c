//! CSV export
//!
//! Renders a table's records as CSV in column order: a header row of
//! column names, then one row per record. Cells are quoted with doubled
//! inner quotes; missing values render empty.

use crate::table::Column;

use super::records::Record;

/// Renders `records` as CSV using `columns` for header and cell order.
pub fn export_csv(columns: &[Column], records: &[Record]) -> String {
    let header = columns
        .iter()
        .map(|c| c.name.clone())
        .collect::<Vec<_>>()
        .join(",");

    let mut lines = Vec::with_capacity(records.len() + 1);
    lines.push(header);

    for record in records {
        let row = columns
            .iter()
            .map(|column| {
                let text = record
                    .values
                    .get(&column.id)
                    .map(|v| v.to_display_string())
                    .unwrap_or_default();
                csv_cell(&text)
            })
            .collect::<Vec<_>>()
            .join(",");
        lines.push(row);
    }

    lines.join("\n")
}

/// Download filename for an export: the table name with every
/// non-alphanumeric character flattened to `_`.
pub fn export_filename(table_name: &str) -> String {
    let sanitized: String = table_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("{}_export.csv", sanitized)
}

fn csv_cell(text: &str) -> String {
    format!("\"{}\"", text.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{ColumnConfig, ColumnType, RecordValues, Value};
    use chrono::Utc;

    fn column(id: &str, name: &str) -> Column {
        Column {
            id: id.into(),
            table_id: "t1".into(),
            name: name.into(),
            column_type: ColumnType::Text,
            order: 0,
            is_required: false,
            config: ColumnConfig::default(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn record(pairs: &[(&str, Value)]) -> Record {
        Record {
            id: "r1".into(),
            table_id: "t1".into(),
            values: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect::<RecordValues>(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_header_and_rows_in_column_order() {
        let columns = vec![column("c1", "Name"), column("c2", "Count")];
        let records = vec![record(&[
            ("c1", Value::Text("Widget".into())),
            ("c2", Value::Number(3.0)),
        ])];

        let csv = export_csv(&columns, &records);
        assert_eq!(csv, "Name,Count\n\"Widget\",\"3\"");
    }

    #[test]
    fn test_quotes_are_doubled() {
        let columns = vec![column("c1", "Quote")];
        let records = vec![record(&[("c1", Value::Text("say \"hi\"".into()))])];

        let csv = export_csv(&columns, &records);
        assert_eq!(csv.lines().nth(1).unwrap(), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_missing_values_render_empty() {
        let columns = vec![column("c1", "A"), column("c2", "B")];
        let records = vec![record(&[("c1", Value::Text("x".into()))])];

        let csv = export_csv(&columns, &records);
        assert_eq!(csv.lines().nth(1).unwrap(), "\"x\",\"\"");
    }

    #[test]
    fn test_filename_sanitized() {
        assert_eq!(export_filename("Q3 Plan: Final"), "Q3_Plan__Final_export.csv");
        assert_eq!(export_filename("Inventory"), "Inventory_export.csv");
    }
}
