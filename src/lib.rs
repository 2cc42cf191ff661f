//! # u-eda
//!
//! Exploratory data analysis engine with C FFI bindings.
//!
//! u-eda turns a table of loosely typed records into a structured summary:
//! the inferred type of every column, descriptive statistics suited to that
//! type, pairwise Pearson and Spearman correlations between numeric columns, and
//! missing-value accounting. It tolerates dirty data throughout: cells that
//! cannot be coerced are dropped from the computation and undefined
//! statistics are reported as `NaN`.
//!
//! ## Modules
//!
//! - [`value`]: Cell values (number, text, boolean, date, null) and their coercions
//! - [`table`]: Row model, first-row schema, JSON loading
//! - [`csv_parser`]: RFC 4180 CSV loading with null markers
//! - [`profiling`]: Column type detection and per-column statistics
//! - [`analysis`]: Pearson and Spearman correlation, correlation matrices, high-correlation pairs
//! - [`summary`]: Dataset summary orchestration and text entry points
//! - [`config`]: Tunable constants
//! - [`ffi`]: C FFI bindings (JSON in, JSON out; C header generated via cbindgen)
//! - [`error`]: Error types
//!
//! ## Quick Start
//!
//! ```
//! use u_eda::profiling::ColumnType;
//! use u_eda::summary::generate_dataset_summary;
//! use u_eda::table::rows_from_json_str;
//!
//! let rows = rows_from_json_str(
//!     r#"[
//!         {"name": "Alice", "value": 1.5, "active": true},
//!         {"name": "Bob", "value": 2.5, "active": false},
//!         {"name": "Carol", "value": null, "active": true}
//!     ]"#,
//! )
//! .unwrap();
//! let summary = generate_dataset_summary(&rows);
//!
//! assert_eq!(summary.row_count, 3);
//! assert_eq!(summary.columns[0].column_type, ColumnType::Categorical);
//! assert_eq!(summary.columns[1].column_type, ColumnType::Numeric);
//! assert_eq!(summary.columns[2].column_type, ColumnType::Boolean);
//! assert_eq!(summary.columns[1].mean, Some(2.0));
//! assert_eq!(summary.missing_values[0].column, "value");
//! ```

pub mod analysis;
pub mod config;
pub mod csv_parser;
pub mod error;
pub mod ffi;
pub mod profiling;
pub mod summary;
pub mod table;
pub mod value;
