//! Analyzer configuration.
//!
//! [`SummaryConfig`] carries the tunable constants of the analyzer. Hosts
//! that load a configuration document only name the fields they change.
//!
//! ```
//! use u_eda::config::SummaryConfig;
//!
//! let config = SummaryConfig::from_json_str(r#"{"max_rows": 1000}"#).unwrap();
//! assert_eq!(config.max_rows, Some(1000));
//! assert_eq!(config.max_histogram_bins, 10);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::EdaError;

/// Tunable constants for column statistics and dataset summaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SummaryConfig {
    /// Upper bound on histogram bins. Default: 10.
    pub max_histogram_bins: usize,
    /// Number of entries kept in `frequent_values`. Default: 10.
    pub top_values: usize,
    /// A correlation pair is computed only when both columns have more
    /// than this many numeric values. Default: 5.
    pub min_correlation_samples: usize,
    /// `|r|` above which a pair is listed in `high_correlations`. Default: 0.7.
    pub high_correlation_threshold: f64,
    /// Tukey fence multiplier for IQR outliers. Default: 1.5.
    pub outlier_iqr_factor: f64,
    /// Row limit enforced by the JSON/CSV entry points. Default: none.
    pub max_rows: Option<usize>,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            max_histogram_bins: 10,
            top_values: 10,
            min_correlation_samples: 5,
            high_correlation_threshold: 0.7,
            outlier_iqr_factor: 1.5,
            max_rows: None,
        }
    }
}

impl SummaryConfig {
    /// Parses a configuration document. Missing fields take their default;
    /// unknown fields are rejected.
    pub fn from_json_str(input: &str) -> Result<Self, EdaError> {
        serde_json::from_str(input).map_err(|e| EdaError::InvalidConfig {
            message: e.to_string(),
        })
    }

    /// Returns an error if `rows` exceeds [`max_rows`](Self::max_rows).
    pub fn check_row_limit(&self, rows: usize) -> Result<(), EdaError> {
        match self.max_rows {
            Some(limit) if rows > limit => Err(EdaError::TooManyRows {
                limit,
                actual: rows,
            }),
            _ => Ok(()),
        }
    }
}
