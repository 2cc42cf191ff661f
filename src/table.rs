//! Row-oriented tables.
//!
//! A dataset is a slice of [`Row`]s: ordered maps from column name to
//! [`Value`]. The schema is the key set of the first row, in its key order.
//! Rows are expected to share that key set; keys that only appear in later
//! rows are not columns (see [`unschematized_keys`]).
//!
//! # Example
//!
//! ```
//! use u_eda::table::{column_names, rows_from_json_str};
//!
//! let rows = rows_from_json_str(r#"[{"x": 1, "y": "a"}, {"x": 2, "y": null}]"#).unwrap();
//! assert_eq!(rows.len(), 2);
//! assert_eq!(column_names(&rows), vec!["x", "y"]);
//! ```

use indexmap::{IndexMap, IndexSet};
use log::warn;

use crate::error::EdaError;
use crate::value::Value;

/// One record: column name → cell value, in insertion order.
pub type Row = IndexMap<String, Value>;

static NULL: Value = Value::Null;

// ── Schema ────────────────────────────────────────────────────────────

/// Returns the column names of a dataset: the keys of its first row.
///
/// An empty dataset has no columns.
pub fn column_names(rows: &[Row]) -> Vec<&str> {
    rows.first()
        .map(|first| first.keys().map(String::as_str).collect())
        .unwrap_or_default()
}

/// Returns keys that appear in some row but not in the first row, in
/// encounter order. These keys are not part of the schema.
pub fn unschematized_keys(rows: &[Row]) -> Vec<&str> {
    let Some(first) = rows.first() else {
        return Vec::new();
    };
    let mut extra: IndexSet<&str> = IndexSet::new();
    for row in &rows[1..] {
        for key in row.keys() {
            if !first.contains_key(key) {
                extra.insert(key.as_str());
            }
        }
    }
    extra.into_iter().collect()
}

/// Collects the values of column `name` across all rows.
///
/// A row without the key contributes [`Value::Null`].
pub fn gather_column<'a>(rows: &'a [Row], name: &str) -> Vec<&'a Value> {
    rows.iter().map(|row| row.get(name).unwrap_or(&NULL)).collect()
}

// ── JSON loading ──────────────────────────────────────────────────────

/// Parses a JSON array of objects into rows.
///
/// ```
/// use u_eda::table::rows_from_json_str;
/// use u_eda::value::Value;
///
/// let rows = rows_from_json_str(r#"[{"a": true, "b": 1.5}]"#).unwrap();
/// assert_eq!(rows[0]["a"], Value::Bool(true));
/// assert_eq!(rows[0]["b"], Value::Number(1.5));
///
/// assert!(rows_from_json_str(r#"{"a": 1}"#).is_err());
/// ```
pub fn rows_from_json_str(input: &str) -> Result<Vec<Row>, EdaError> {
    let doc: serde_json::Value = serde_json::from_str(input)?;
    rows_from_json(doc)
}

/// Converts an already-parsed JSON document into rows.
///
/// The document must be an array whose elements are all objects. Key
/// order within each object is preserved.
pub fn rows_from_json(doc: serde_json::Value) -> Result<Vec<Row>, EdaError> {
    let items = match doc {
        serde_json::Value::Array(items) => items,
        other => {
            return Err(EdaError::NotATable {
                found: json_type_name(&other),
            })
        }
    };

    let mut rows = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        let object = match item {
            serde_json::Value::Object(object) => object,
            other => {
                return Err(EdaError::InvalidRow {
                    index,
                    found: json_type_name(&other),
                })
            }
        };
        let row: Row = object
            .into_iter()
            .map(|(key, cell)| (key, Value::from(cell)))
            .collect();
        rows.push(row);
    }
    Ok(rows)
}

impl From<serde_json::Value> for Value {
    /// Nested arrays and objects are not scalars; they are kept as their
    /// compact JSON text so they still count as present, categorical data.
    fn from(cell: serde_json::Value) -> Self {
        match cell {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::Text(s),
            nested @ (serde_json::Value::Array(_) | serde_json::Value::Object(_)) => {
                warn!(
                    "flattening nested JSON {} cell to text",
                    json_type_name(&nested)
                );
                Value::Text(nested.to_string())
            }
        }
    }
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

// ── Tests ─────────────────────────────────────────────────────────────
