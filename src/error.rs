//! Error types for u-eda.
//!
//! The statistics themselves never fail: degenerate input degrades to
//! `NaN`, [`ColumnType::Unknown`](crate::profiling::ColumnType::Unknown) or
//! empty collections. Errors only arise at the loading boundary, when text
//! handed to the crate is not a table.

use std::fmt;

/// All errors produced by u-eda operations.
#[derive(Debug, Clone, PartialEq)]
pub enum EdaError {
    /// Input is not valid JSON.
    Json { message: String },
    /// JSON top level is not an array of row objects.
    NotATable { found: &'static str },
    /// A row in the JSON array is not an object.
    InvalidRow { index: usize, found: &'static str },
    /// CSV parsing failed.
    CsvParse { line: usize, message: String },
    /// Dataset exceeds the configured row limit.
    TooManyRows { limit: usize, actual: usize },
    /// Configuration document was rejected.
    InvalidConfig { message: String },
    /// I/O error during file reading.
    Io(String),
}

impl fmt::Display for EdaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json { message } => write!(f, "invalid JSON: {message}"),
            Self::NotATable { found } => {
                write!(f, "expected an array of row objects, got {found}")
            }
            Self::InvalidRow { index, found } => {
                write!(f, "row {index} is not an object (got {found})")
            }
            Self::CsvParse { line, message } => {
                write!(f, "CSV parse error at line {line}: {message}")
            }
            Self::TooManyRows { limit, actual } => {
                write!(f, "dataset has {actual} rows, limit is {limit}")
            }
            Self::InvalidConfig { message } => write!(f, "invalid config: {message}"),
            Self::Io(msg) => write!(f, "I/O error: {msg}"),
        }
    }
}

impl std::error::Error for EdaError {}

impl From<std::io::Error> for EdaError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

impl From<serde_json::Error> for EdaError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json {
            message: e.to_string(),
        }
    }
}
