// SPDX-License-Identifier: PMPL-1.0-or-later
//! Output formatters for catalog and role listings.
//!
//! - **Table**: human-readable columns via `comfy-table`.
//! - **JSON**: pretty-printed, for scripts.

use comfy_table::{Cell, ContentArrangement, Table};
use serde_json::Value;
use std::fmt;

/// Available output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("Unknown format '{other}'. Valid formats: table, json")),
        }
    }
}

/// Format a JSON value according to the selected output format.
pub fn format_value(value: &Value, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string()),
        OutputFormat::Table => format_table(value),
    }
}

fn format_table(value: &Value) -> String {
    match value {
        Value::Array(rows) if !rows.is_empty() => format_array_table(rows),
        Value::Object(obj) => format_object_table(obj),
        other => format!("{other}"),
    }
}

/// Each object is a row; the union of keys, in first-seen order, are columns.
fn format_array_table(rows: &[Value]) -> String {
    let mut columns: Vec<String> = Vec::new();
    for row in rows {
        if let Value::Object(obj) = row {
            for key in obj.keys() {
                if !columns.contains(key) {
                    columns.push(key.clone());
                }
            }
        }
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);

    if columns.is_empty() {
        table.set_header(vec![Cell::new("value")]);
        for item in rows {
            table.add_row(vec![Cell::new(value_to_cell(item))]);
        }
        return table.to_string();
    }

    table.set_header(columns.iter().map(|c| Cell::new(c)));
    for row in rows {
        let cells: Vec<Cell> = columns
            .iter()
            .map(|col| Cell::new(value_to_cell(row.get(col).unwrap_or(&Value::Null))))
            .collect();
        table.add_row(cells);
    }

    let row_count = rows.len();
    format!("{table}\n({row_count} row{})", if row_count == 1 { "" } else { "s" })
}

fn format_object_table(obj: &serde_json::Map<String, Value>) -> String {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![Cell::new("Field"), Cell::new("Value")]);

    for (key, val) in obj {
        table.add_row(vec![Cell::new(key), Cell::new(value_to_cell(val))]);
    }

    table.to_string()
}

/// Short cell text. String arrays are listed one per line.
fn value_to_cell(value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(arr) if arr.iter().all(Value::is_string) => arr
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join("\n"),
        Value::Array(arr) => format!("[{} items]", arr.len()),
        Value::Object(obj) => format!("{{{} fields}}", obj.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_format_parsing() {
        assert_eq!("TABLE".parse::<OutputFormat>(), Ok(OutputFormat::Table));
        assert_eq!("json".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert!("csv".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_array_table_counts_rows() {
        let value = json!([{ "key": "a.b" }, { "key": "c.d" }]);
        let out = format_value(&value, OutputFormat::Table);
        assert!(out.contains("a.b"));
        assert!(out.contains("(2 rows)"));
    }

    #[test]
    fn test_object_table_lists_fields() {
        let value = json!({ "role": "manager", "permissions": ["x.y", "z.w"] });
        let out = format_value(&value, OutputFormat::Table);
        assert!(out.contains("Field"));
        assert!(out.contains("manager"));
        assert!(out.contains("z.w"));
    }

    #[test]
    fn test_json_is_pretty() {
        let out = format_value(&json!({ "a": 1 }), OutputFormat::Json);
        assert_eq!(out, "{\n  \"a\": 1\n}");
    }
}
