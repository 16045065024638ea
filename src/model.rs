//! Table model: row handles rendered by the terminal UI and column discovery.

use crate::selection::record::ID_FIELDS;
use crate::selection::{RowHandle, RowRecord};
use serde_json::Value;

/// Upper bound on the number of columns shown in the table.
pub const MAX_COLUMNS: usize = 6;

/// Column name used when items are not JSON objects.
pub const VALUE_COLUMN: &str = "value";

/// A rendered table line. The controller binds its record and flips
/// `selected`; the UI only reads it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableRow {
    pub record: Option<RowRecord>,
    pub selected: bool,
    pub cells: Vec<String>,
}

impl TableRow {
    pub fn new(item: &Value, columns: &[String]) -> Self {
        Self {
            record: None,
            selected: false,
            cells: columns.iter().map(|key| cell_text(item, key)).collect(),
        }
    }
}

impl RowHandle for TableRow {
    fn bind(&mut self, record: &RowRecord) {
        self.record = Some(record.clone());
    }

    fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }
}

/// Builds one row handle per item.
pub fn build_rows(items: &[Value], columns: &[String]) -> Vec<TableRow> {
    items.iter().map(|item| TableRow::new(item, columns)).collect()
}

/// Picks the table columns: scalar top-level keys in first-seen order, with
/// identifier fields moved to the front.
pub fn discover_columns(items: &[Value]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    let mut saw_non_object = false;

    for item in items {
        let Some(map) = item.as_object() else {
            saw_non_object = true;
            continue;
        };
        for (key, value) in map {
            if is_scalar(value) && !columns.iter().any(|c| c == key) {
                columns.push(key.clone());
            }
        }
    }

    columns.sort_by_key(|key| !ID_FIELDS.contains(&key.as_str()));
    columns.truncate(MAX_COLUMNS);

    if columns.is_empty() && (saw_non_object || !items.is_empty()) {
        columns.push(VALUE_COLUMN.to_string());
    }
    columns
}

fn is_scalar(value: &Value) -> bool {
    matches!(
        value,
        Value::String(_) | Value::Number(_) | Value::Bool(_) | Value::Null
    )
}

/// Text shown for `key` of `item`.
pub fn cell_text(item: &Value, key: &str) -> String {
    let value = match item.as_object() {
        Some(map) => map.get(key),
        None if key == VALUE_COLUMN => Some(item),
        None => None,
    };
    match value {
        None | Some(Value::Null) => "-".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Array(arr)) => format!("[{}]", arr.len()),
        Some(Value::Object(map)) => format!("{{{}}}", map.len()),
    }
}
