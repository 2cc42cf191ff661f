//! Dataset-level summary: per-column statistics, numeric correlations and
//! missing-value accounting in one serializable report.
//!
//! # Example
//!
//! ```
//! use u_eda::config::SummaryConfig;
//! use u_eda::summary::summarize_json;
//!
//! let input = r#"[
//!     {"x": 1, "y": 2, "tag": "a"},
//!     {"x": 2, "y": 4, "tag": "b"},
//!     {"x": 3, "y": 6, "tag": null}
//! ]"#;
//! let summary = summarize_json(input, &SummaryConfig::default()).unwrap();
//!
//! assert_eq!(summary.row_count, 3);
//! assert_eq!(summary.column_count, 3);
//! assert_eq!(summary.missing_values[0].column, "tag");
//! // Three rows are too few for a coefficient.
//! assert!(summary.correlations["x"]["y"].is_nan());
//! ```

use log::{debug, warn};
use serde::Serialize;

use crate::analysis::{
    correlation_matrix, high_correlation_pairs, spearman_matrix, CorrelationMatrix,
    CorrelationPair,
};
use crate::config::SummaryConfig;
use crate::csv_parser::CsvParser;
use crate::error::EdaError;
use crate::profiling::{calculate_column_stats_with, ColumnStats, ColumnType};
use crate::table::{
    column_names, gather_column, rows_from_json_str, unschematized_keys, Row,
};

/// Missing-value count for one column that has any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingValueEntry {
    pub column: String,
    pub missing: usize,
    /// Row count of the dataset.
    pub total: usize,
}

/// Complete summary of a dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetSummary {
    pub row_count: usize,
    pub column_count: usize,
    /// One entry per column, in column order.
    pub columns: Vec<ColumnStats>,
    /// Pearson matrix over numeric columns. `NaN` serializes as `null`.
    pub correlations: CorrelationMatrix,
    /// Spearman rank matrix over the same columns and samples.
    pub spearman_correlations: CorrelationMatrix,
    /// Columns with at least one missing value.
    pub missing_values: Vec<MissingValueEntry>,
    /// Distinct numeric pairs with a strong linear relationship.
    pub high_correlations: Vec<CorrelationPair>,
    /// Missing cells across all columns.
    pub total_missing: usize,
    /// `total_missing` as a percentage of all cells; 0 for an empty table.
    pub missing_percentage: f64,
}

impl DatasetSummary {
    fn empty() -> Self {
        Self {
            row_count: 0,
            column_count: 0,
            columns: Vec::new(),
            correlations: CorrelationMatrix::new(),
            spearman_correlations: CorrelationMatrix::new(),
            missing_values: Vec::new(),
            high_correlations: Vec::new(),
            total_missing: 0,
            missing_percentage: 0.0,
        }
    }

    /// Serializes the summary as compact JSON.
    pub fn to_json(&self) -> Result<String, EdaError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Looks up a column's statistics by name.
    pub fn column(&self, name: &str) -> Option<&ColumnStats> {
        self.columns.iter().find(|c| c.name == name)
    }
}

// ── Orchestration ─────────────────────────────────────────────────────

/// Summarizes `rows` with the default configuration.
pub fn generate_dataset_summary(rows: &[Row]) -> DatasetSummary {
    generate_dataset_summary_with(rows, &SummaryConfig::default())
}

/// Summarizes `rows`.
///
/// Columns are the keys of the first row. Malformed cells never fail the
/// summary; they degrade to `NaN`, [`ColumnType::Unknown`] or empty
/// collections.
///
/// ```
/// use u_eda::summary::generate_dataset_summary;
///
/// let summary = generate_dataset_summary(&[]);
/// assert_eq!(summary.row_count, 0);
/// assert!(summary.columns.is_empty());
/// assert!(summary.correlations.is_empty());
/// ```
pub fn generate_dataset_summary_with(rows: &[Row], config: &SummaryConfig) -> DatasetSummary {
    if rows.is_empty() {
        debug!("summarizing empty dataset");
        return DatasetSummary::empty();
    }

    let names = column_names(rows);
    debug!("summarizing {} rows x {} columns", rows.len(), names.len());

    let extra = unschematized_keys(rows);
    if !extra.is_empty() {
        warn!(
            "ignoring keys absent from the first row: {}",
            extra.join(", ")
        );
    }

    let columns: Vec<ColumnStats> = names
        .iter()
        .map(|name| {
            let stats = calculate_column_stats_with(&gather_column(rows, name), name, config);
            debug!("column {name}: {}", stats.column_type);
            stats
        })
        .collect();

    let numeric: Vec<&str> = columns
        .iter()
        .filter(|c| c.column_type == ColumnType::Numeric)
        .map(|c| c.name.as_str())
        .collect();
    let correlations = correlation_matrix(rows, &numeric, config);
    let spearman_correlations = spearman_matrix(rows, &numeric, config);
    let high_correlations =
        high_correlation_pairs(&correlations, config.high_correlation_threshold);

    let missing_values: Vec<MissingValueEntry> = columns
        .iter()
        .filter(|c| c.missing > 0)
        .map(|c| MissingValueEntry {
            column: c.name.clone(),
            missing: c.missing,
            total: rows.len(),
        })
        .collect();

    let total_missing: usize = columns.iter().map(|c| c.missing).sum();
    let cells = rows.len() * columns.len();
    let missing_percentage = if cells == 0 {
        0.0
    } else {
        total_missing as f64 / cells as f64 * 100.0
    };

    debug!(
        "summary done: {} numeric columns, {} with missing values",
        numeric.len(),
        missing_values.len()
    );

    DatasetSummary {
        row_count: rows.len(),
        column_count: columns.len(),
        columns,
        correlations,
        spearman_correlations,
        missing_values,
        high_correlations,
        total_missing,
        missing_percentage,
    }
}

// ── Text entry points ─────────────────────────────────────────────────

/// Parses a JSON array of row objects and summarizes it.
///
/// Fails on invalid JSON, a non-table document, or when the row count
/// exceeds [`max_rows`](SummaryConfig::max_rows).
pub fn summarize_json(input: &str, config: &SummaryConfig) -> Result<DatasetSummary, EdaError> {
    let rows = rows_from_json_str(input)?;
    config.check_row_limit(rows.len())?;
    Ok(generate_dataset_summary_with(&rows, config))
}

/// Parses CSV text (comma-delimited, with a header) and summarizes it.
///
/// ```
/// use u_eda::config::SummaryConfig;
/// use u_eda::profiling::ColumnType;
/// use u_eda::summary::summarize_csv;
///
/// let csv = "name,score,passed\nAda,91,true\nBob,NA,false\n";
/// let summary = summarize_csv(csv, &SummaryConfig::default()).unwrap();
///
/// assert_eq!(summary.columns[1].column_type, ColumnType::Numeric);
/// assert_eq!(summary.columns[2].column_type, ColumnType::Boolean);
/// assert_eq!(summary.total_missing, 1);
/// ```
pub fn summarize_csv(input: &str, config: &SummaryConfig) -> Result<DatasetSummary, EdaError> {
    summarize_csv_with(&CsvParser::new(), input, config)
}

/// Parses CSV text with a configured parser and summarizes it.
pub fn summarize_csv_with(
    parser: &CsvParser,
    input: &str,
    config: &SummaryConfig,
) -> Result<DatasetSummary, EdaError> {
    let rows = parser.parse_str(input)?;
    config.check_row_limit(rows.len())?;
    Ok(generate_dataset_summary_with(&rows, config))
}

// ── Tests ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    fn linear_rows(n: usize) -> Vec<Row> {
        (1..=n)
            .map(|i| {
                let mut row = Row::new();
                row.insert("x".into(), Value::from(i as f64));
                row.insert("y".into(), Value::from(2.0 * i as f64));
                row
            })
            .collect()
    }

    // ── Orchestration ────────────────────────────────────────────

    #[test]
    fn empty_dataset() {
        let s = generate_dataset_summary(&[]);
        assert_eq!(s, DatasetSummary::empty());
        assert_eq!(s.missing_percentage, 0.0);
    }

    #[test]
    fn linear_columns_correlate_with_six_rows() {
        let s = generate_dataset_summary(&linear_rows(6));
        assert_eq!(s.row_count, 6);
        assert_eq!(s.column_count, 2);
        assert!(s.columns.iter().all(|c| c.column_type == ColumnType::Numeric));
        assert!((s.correlations["x"]["y"] - 1.0).abs() < 1e-9);
        assert_eq!(s.correlations["x"]["x"], 1.0);
        assert_eq!(s.correlations["y"]["x"], s.correlations["x"]["y"]);
        assert_eq!(s.high_correlations.len(), 1);
        assert_eq!(s.high_correlations[0].column1, "x");
        assert_eq!(s.high_correlations[0].column2, "y");
        assert!((s.spearman_correlations["x"]["y"] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn spearman_sees_monotonic_curve() {
        let rows: Vec<Row> = (1..=8)
            .map(|i| {
                let mut row = Row::new();
                row.insert("x".into(), Value::from(i as f64));
                row.insert("e".into(), Value::from((i as f64).exp()));
                row
            })
            .collect();
        let s = generate_dataset_summary(&rows);
        assert!((s.spearman_correlations["x"]["e"] - 1.0).abs() < 1e-12);
        assert!(s.correlations["x"]["e"] < 0.9);
        assert_eq!(s.spearman_correlations["e"]["e"], 1.0);
    }

    #[test]
    fn three_rows_give_nan() {
        let s = generate_dataset_summary(&linear_rows(3));
        assert!(s.correlations["x"]["y"].is_nan());
        assert_eq!(s.correlations["y"]["y"], 1.0);
        assert!(s.high_correlations.is_empty());
        assert!(s.spearman_correlations["x"]["y"].is_nan());
    }

    #[test]
    fn only_numeric_columns_in_matrix() {
        let rows = crate::table::rows_from_json_str(
            r#"[{"n": 1, "c": "a", "b": true}, {"n": 2, "c": "b", "b": false}]"#,
        )
        .expect("valid json");
        let s = generate_dataset_summary(&rows);
        let keys: Vec<&str> = s.correlations.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["n"]);
        assert_eq!(s.correlations["n"].len(), 1);
    }

    #[test]
    fn missing_accounting() {
        let rows = crate::table::rows_from_json_str(
            r#"[{"a": 1, "b": null}, {"a": null, "b": null}, {"a": 3}, {"a": 4, "b": "x"}]"#,
        )
        .expect("valid json");
        let s = generate_dataset_summary(&rows);
        assert_eq!(
            s.missing_values,
            vec![
                MissingValueEntry {
                    column: "a".into(),
                    missing: 1,
                    total: 4
                },
                MissingValueEntry {
                    column: "b".into(),
                    missing: 3,
                    total: 4
                },
            ]
        );
        assert_eq!(s.total_missing, 4);
        assert!((s.missing_percentage - 50.0).abs() < 1e-12);
    }

    #[test]
    fn complete_columns_not_listed_as_missing() {
        let s = generate_dataset_summary(&linear_rows(4));
        assert!(s.missing_values.is_empty());
        assert_eq!(s.total_missing, 0);
    }

    #[test]
    fn later_keys_are_not_columns() {
        let rows = crate::table::rows_from_json_str(r#"[{"a": 1}, {"a": 2, "extra": 5}]"#)
            .expect("valid json");
        let s = generate_dataset_summary(&rows);
        assert_eq!(s.column_count, 1);
        assert!(s.column("extra").is_none());
        assert_eq!(s.column("a").map(|c| c.count), Some(2));
    }

    #[test]
    fn columns_keep_first_row_order() {
        let rows = crate::table::rows_from_json_str(r#"[{"z": 1, "m": 2, "a": 3}]"#)
            .expect("valid json");
        let s = generate_dataset_summary(&rows);
        let names: Vec<&str> = s.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["z", "m", "a"]);
    }

    // ── Text entry points ────────────────────────────────────────

    #[test]
    fn json_entry_rejects_non_table() {
        let config = SummaryConfig::default();
        assert_eq!(
            summarize_json(r#"{"a": 1}"#, &config),
            Err(EdaError::NotATable { found: "object" })
        );
        assert!(matches!(
            summarize_json("not json", &config),
            Err(EdaError::Json { .. })
        ));
    }

    #[test]
    fn row_limit_enforced() {
        let config = SummaryConfig {
            max_rows: Some(1),
            ..SummaryConfig::default()
        };
        assert_eq!(
            summarize_json(r#"[{"a": 1}, {"a": 2}]"#, &config),
            Err(EdaError::TooManyRows {
                limit: 1,
                actual: 2
            })
        );
        assert_eq!(
            summarize_csv("a\n1\n2\n", &config),
            Err(EdaError::TooManyRows {
                limit: 1,
                actual: 2
            })
        );
    }

    #[test]
    fn csv_entry_types_and_correlation() {
        let csv = "x,y\n1,2\n2,4\n3,6\n4,8\n5,10\n6,12\n";
        let s = summarize_csv(csv, &SummaryConfig::default()).expect("valid csv");
        assert_eq!(s.row_count, 6);
        assert!((s.correlations["x"]["y"] - 1.0).abs() < 1e-9);
        assert_eq!(s.column("x").and_then(|c| c.mean), Some(3.5));
    }

    #[test]
    fn csv_empty_record_counts_as_missing() {
        let s = summarize_csv("a,b\n1,x\n,\n3,y\n", &SummaryConfig::default())
            .expect("valid csv");
        assert_eq!(s.row_count, 3);
        assert_eq!(s.column("a").map(|c| c.missing), Some(1));
        assert_eq!(s.column("b").map(|c| c.missing), Some(1));
        assert_eq!(s.total_missing, 2);
    }

    #[test]
    fn csv_with_custom_parser() {
        let parser = CsvParser::new().delimiter(b';');
        let s = summarize_csv_with(&parser, "a;b\n1;x\n2;y\n", &SummaryConfig::default())
            .expect("valid csv");
        assert_eq!(s.column_count, 2);
        assert_eq!(s.columns[1].column_type, ColumnType::Categorical);
    }

    // ── Serialization ────────────────────────────────────────────

    #[test]
    fn serialized_field_names() {
        let rows = crate::table::rows_from_json_str(
            r#"[{"x": 1, "g": "a"}, {"x": 2, "g": null}, {"x": 3, "g": "a"}]"#,
        )
        .expect("valid json");
        let json: serde_json::Value =
            serde_json::from_str(&generate_dataset_summary(&rows).to_json().expect("serializes"))
                .expect("round trip");

        for key in [
            "rowCount",
            "columnCount",
            "columns",
            "correlations",
            "spearmanCorrelations",
            "missingValues",
            "highCorrelations",
            "totalMissing",
            "missingPercentage",
        ] {
            assert!(json.get(key).is_some(), "missing {key}");
        }

        let x = &json["columns"][0];
        assert_eq!(x["type"], "numeric");
        assert_eq!(x["quantiles"]["50%"], 2.0);
        assert!(x.get("mode").is_none());

        let g = &json["columns"][1];
        assert_eq!(g["type"], "categorical");
        assert_eq!(g["mode"], "a");
        assert_eq!(g["frequent_values"][0]["count"], 2);
        assert!(g.get("mean").is_none());

        assert_eq!(json["missingValues"][0]["column"], "g");
    }

    #[test]
    fn nan_serializes_as_null() {
        let json = generate_dataset_summary(&linear_rows(3))
            .to_json()
            .expect("serializes");
        assert!(json.contains(r#""y":null"#));
    }
}
