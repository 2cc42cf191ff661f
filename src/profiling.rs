//! Column type detection and column-level statistics.
//!
//! Profiling tolerates dirty data: missing values are expected input, and
//! values that cannot be coerced for the detected type are dropped from
//! the computation rather than reported as errors.
//!
//! # Example
//!
//! ```
//! use u_eda::profiling::{calculate_column_stats, ColumnType};
//! use u_eda::value::Value;
//!
//! let values = vec![Value::from(1), Value::Null, Value::from("3"), Value::from(5)];
//! let stats = calculate_column_stats(&values, "x");
//!
//! assert_eq!(stats.column_type, ColumnType::Numeric);
//! assert_eq!(stats.count, 4);
//! assert_eq!(stats.missing, 1);
//! assert_eq!(stats.mean, Some(3.0));
//! ```

use std::borrow::{Borrow, Cow};
use std::collections::HashSet;

use indexmap::IndexMap;
use serde::Serialize;

use crate::config::SummaryConfig;
use crate::value::{cmp_utf16, format_iso, Value};

// ── ColumnType ────────────────────────────────────────────────────────

/// Semantic type inferred for a whole column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    /// Every non-null value is a number or a numeric string.
    Numeric,
    /// Anything that is not uniformly numeric, boolean or datetime.
    Categorical,
    /// Every non-null value is a date or a parseable date string.
    Datetime,
    /// Every non-null value is a boolean or `"true"` / `"false"`.
    Boolean,
    /// The column has no non-null values.
    Unknown,
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Numeric => write!(f, "numeric"),
            Self::Categorical => write!(f, "categorical"),
            Self::Datetime => write!(f, "datetime"),
            Self::Boolean => write!(f, "boolean"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

// ── Column statistics ─────────────────────────────────────────────────

/// A `min` / `max` bound. Numeric columns report numbers, datetime columns
/// ISO-8601 strings, categorical columns the original value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StatValue {
    Number(f64),
    Text(String),
    Bool(bool),
}

impl StatValue {
    fn from_value(value: &Value) -> Self {
        match value {
            Value::Number(n) => Self::Number(*n),
            Value::Bool(b) => Self::Bool(*b),
            Value::Text(s) => Self::Text(s.clone()),
            Value::DateTime(d) => Self::Text(format_iso(d)),
            Value::Null => Self::Text("null".to_string()),
        }
    }
}

/// Nearest-rank quartiles of a numeric column.
///
/// `p25` and `p75` index the sorted values at `floor(n·0.25)` and
/// `floor(n·0.75)`; `p50` is the median.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Quantiles {
    #[serde(rename = "25%")]
    pub p25: f64,
    #[serde(rename = "50%")]
    pub p50: f64,
    #[serde(rename = "75%")]
    pub p75: f64,
}

/// One histogram bin.
///
/// `bin` is the lower edge, except for the last bin where it is the upper
/// edge (the column maximum).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistogramBin {
    pub bin: f64,
    pub count: usize,
}

/// A categorical value and its frequency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrequentValue {
    pub value: String,
    pub count: usize,
}

/// Tukey-fence outlier summary of a numeric column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OutlierSummary {
    /// Values below `lower_bound` or above `upper_bound`.
    pub count: usize,
    /// `count` as a percentage of the column's numeric values.
    pub percentage: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
}

/// Summary of one column.
///
/// Which optional fields are set depends on [`column_type`](Self::column_type):
///
/// | Type | Fields |
/// |------|--------|
/// | numeric | `min`, `max`, `mean`, `median`, `std`, `skewness`, `kurtosis`, `quantiles`, `histogram`, `outliers` |
/// | categorical, boolean | `mode`, `frequent_values`, `min`, `max`, `entropy`, `is_binary` |
/// | datetime | `min`, `max` |
/// | unknown | none |
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnStats {
    /// Column name.
    pub name: String,
    /// Inferred column type.
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    /// Total number of values, missing included.
    pub count: usize,
    /// Number of null values.
    pub missing: usize,
    /// Number of distinct non-null values.
    pub unique: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<StatValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<StatValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub median: Option<f64>,
    /// Population standard deviation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub std: Option<f64>,
    /// Bias-corrected sample skewness (G1); needs 3 values and nonzero spread.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skewness: Option<f64>,
    /// Bias-corrected excess kurtosis (G2); needs 4 values and nonzero spread.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kurtosis: Option<f64>,
    /// Most frequent value (string form); ties go to the first seen.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantiles: Option<Quantiles>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub histogram: Option<Vec<HistogramBin>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequent_values: Option<Vec<FrequentValue>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outliers: Option<OutlierSummary>,
    /// Shannon entropy (natural log) of the value frequencies.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entropy: Option<f64>,
    /// Exactly two distinct values.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_binary: Option<bool>,
}

impl ColumnStats {
    fn bare(name: &str, column_type: ColumnType, count: usize, missing: usize, unique: usize) -> Self {
        Self {
            name: name.to_string(),
            column_type,
            count,
            missing,
            unique,
            min: None,
            max: None,
            mean: None,
            median: None,
            std: None,
            skewness: None,
            kurtosis: None,
            mode: None,
            quantiles: None,
            histogram: None,
            frequent_values: None,
            outliers: None,
            entropy: None,
            is_binary: None,
        }
    }
}

// ── Type detection ────────────────────────────────────────────────────

/// Infers the type of a column from all of its non-null values.
///
/// Checks run in priority order and the first one that holds for *every*
/// value wins: numeric, boolean, datetime, then categorical. A column with
/// no non-null values is [`ColumnType::Unknown`].
///
/// ```
/// use u_eda::profiling::{detect_column_type, ColumnType};
/// use u_eda::value::Value;
///
/// let v = |s: &str| Value::from(s);
/// assert_eq!(detect_column_type(&[v("1"), v("2.5")]), ColumnType::Numeric);
/// assert_eq!(detect_column_type(&[v("true"), Value::Bool(false)]), ColumnType::Boolean);
/// assert_eq!(detect_column_type(&[v("2024-01-01"), v("2024-02-01")]), ColumnType::Datetime);
/// assert_eq!(detect_column_type(&[v("1"), v("x")]), ColumnType::Categorical);
/// assert_eq!(detect_column_type(&[Value::Null]), ColumnType::Unknown);
/// ```
pub fn detect_column_type<V: Borrow<Value>>(values: &[V]) -> ColumnType {
    let mut non_null = values
        .iter()
        .map(Borrow::<Value>::borrow)
        .filter(|v| !v.is_null())
        .peekable();
    if non_null.peek().is_none() {
        return ColumnType::Unknown;
    }

    if non_null.clone().all(Value::is_numeric_like) {
        ColumnType::Numeric
    } else if non_null.clone().all(Value::is_boolean_like) {
        ColumnType::Boolean
    } else if non_null.all(|v| v.as_datetime().is_some()) {
        ColumnType::Datetime
    } else {
        ColumnType::Categorical
    }
}

// ── Column statistics ─────────────────────────────────────────────────

/// Computes statistics for one column with the default configuration.
pub fn calculate_column_stats<V: Borrow<Value>>(values: &[V], name: &str) -> ColumnStats {
    calculate_column_stats_with(values, name, &SummaryConfig::default())
}

/// Computes statistics for one column.
///
/// ```
/// use u_eda::config::SummaryConfig;
/// use u_eda::profiling::calculate_column_stats_with;
/// use u_eda::value::Value;
///
/// let values: Vec<Value> = ["A", "B", "A", "C"].into_iter().map(Value::from).collect();
/// let config = SummaryConfig { top_values: 1, ..SummaryConfig::default() };
/// let stats = calculate_column_stats_with(&values, "grade", &config);
///
/// assert_eq!(stats.mode.as_deref(), Some("A"));
/// assert_eq!(stats.frequent_values.unwrap().len(), 1);
/// ```
pub fn calculate_column_stats_with<V: Borrow<Value>>(
    values: &[V],
    name: &str,
    config: &SummaryConfig,
) -> ColumnStats {
    let non_null: Vec<&Value> = values
        .iter()
        .map(Borrow::<Value>::borrow)
        .filter(|v| !v.is_null())
        .collect();

    let count = values.len();
    let missing = count - non_null.len();
    let unique = non_null
        .iter()
        .filter_map(|v| v.distinct_key())
        .collect::<HashSet<_>>()
        .len();
    let column_type = detect_column_type(&non_null);

    let mut stats = ColumnStats::bare(name, column_type, count, missing, unique);
    match column_type {
        ColumnType::Numeric => fill_numeric(&mut stats, &non_null, config),
        ColumnType::Categorical | ColumnType::Boolean => {
            fill_categorical(&mut stats, &non_null, config)
        }
        ColumnType::Datetime => fill_datetime(&mut stats, &non_null),
        ColumnType::Unknown => {}
    }
    stats
}

// ── Internal helpers ──────────────────────────────────────────────────

fn fill_numeric(stats: &mut ColumnStats, non_null: &[&Value], config: &SummaryConfig) {
    let nums: Vec<f64> = non_null.iter().filter_map(|v| v.as_number()).collect();
    if nums.is_empty() {
        return;
    }
    let n = nums.len();

    let min = u_numflow::stats::min(&nums).unwrap_or(f64::NAN);
    let max = u_numflow::stats::max(&nums).unwrap_or(f64::NAN);
    let mean = u_numflow::stats::mean(&nums).unwrap_or(f64::NAN);
    let median = u_numflow::stats::median(&nums).unwrap_or(f64::NAN);

    // Population variance: divide by n.
    let variance = nums.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n as f64;

    let mut sorted = nums.clone();
    sorted.sort_by(f64::total_cmp);
    let p25 = sorted[(n as f64 * 0.25).floor() as usize];
    let p75 = sorted[(n as f64 * 0.75).floor() as usize];

    stats.min = Some(StatValue::Number(min));
    stats.max = Some(StatValue::Number(max));
    stats.mean = Some(mean);
    stats.median = Some(median);
    stats.std = Some(variance.sqrt());
    stats.skewness = skewness(&nums, mean);
    stats.kurtosis = kurtosis(&nums, mean);
    stats.quantiles = Some(Quantiles {
        p25,
        p50: median,
        p75,
    });

    let bin_count = config.max_histogram_bins.min(stats.unique);
    if bin_count > 1 {
        stats.histogram = Some(histogram(&nums, min, max, bin_count));
    }

    stats.outliers = Some(iqr_outliers(&nums, p25, p75, config.outlier_iqr_factor));
}

/// Population central moments `(m2, m3, m4)` about `mean`.
fn central_moments(nums: &[f64], mean: f64) -> (f64, f64, f64) {
    let n = nums.len() as f64;
    let (m2, m3, m4) = nums.iter().fold((0.0, 0.0, 0.0), |(m2, m3, m4), &v| {
        let d = v - mean;
        let d2 = d * d;
        (m2 + d2, m3 + d2 * d, m4 + d2 * d2)
    });
    (m2 / n, m3 / n, m4 / n)
}

/// Adjusted Fisher-Pearson skewness `G1 = g1·√(n(n−1))/(n−2)`.
fn skewness(nums: &[f64], mean: f64) -> Option<f64> {
    let n = nums.len() as f64;
    if nums.len() < 3 {
        return None;
    }
    let (m2, m3, _) = central_moments(nums, mean);
    if m2 == 0.0 {
        return None;
    }
    let g1 = m3 / m2.powf(1.5);
    Some(g1 * (n * (n - 1.0)).sqrt() / (n - 2.0))
}

/// Bias-corrected excess kurtosis `G2 = ((n+1)·g2 + 6)·(n−1)/((n−2)(n−3))`.
fn kurtosis(nums: &[f64], mean: f64) -> Option<f64> {
    let n = nums.len() as f64;
    if nums.len() < 4 {
        return None;
    }
    let (m2, _, m4) = central_moments(nums, mean);
    if m2 == 0.0 {
        return None;
    }
    let g2 = m4 / (m2 * m2) - 3.0;
    Some(((n + 1.0) * g2 + 6.0) * (n - 1.0) / ((n - 2.0) * (n - 3.0)))
}

/// Equal-width histogram over `[min, max]`.
///
/// Bin `i` covers `[edge(i), edge(i+1))` with `edge(i) = min + i·width`;
/// the last bin is closed and ends at `max`. Adjacent bins share the same
/// computed edge, so every value lands in exactly one bin.
fn histogram(nums: &[f64], min: f64, max: f64, bin_count: usize) -> Vec<HistogramBin> {
    let width = (max - min) / bin_count as f64;
    let edge = |i: usize| min + i as f64 * width;

    (0..bin_count)
        .map(|i| {
            let start = edge(i);
            if i == bin_count - 1 {
                let count = nums.iter().filter(|&&v| v >= start && v <= max).count();
                HistogramBin { bin: max, count }
            } else {
                let end = edge(i + 1);
                let count = nums.iter().filter(|&&v| v >= start && v < end).count();
                HistogramBin { bin: start, count }
            }
        })
        .collect()
}

fn iqr_outliers(nums: &[f64], p25: f64, p75: f64, factor: f64) -> OutlierSummary {
    let iqr = p75 - p25;
    let lower_bound = p25 - factor * iqr;
    let upper_bound = p75 + factor * iqr;
    let count = nums
        .iter()
        .filter(|&&v| v < lower_bound || v > upper_bound)
        .count();
    OutlierSummary {
        count,
        percentage: count as f64 / nums.len() as f64 * 100.0,
        lower_bound,
        upper_bound,
    }
}

fn fill_categorical(stats: &mut ColumnStats, non_null: &[&Value], config: &SummaryConfig) {
    if non_null.is_empty() {
        return;
    }

    // Insertion-ordered so that ties resolve to the first value seen.
    let mut freq: IndexMap<Cow<'_, str>, usize> = IndexMap::new();
    for v in non_null {
        *freq.entry(v.to_display_string()).or_insert(0) += 1;
    }

    let mut mode: Option<(&str, usize)> = None;
    for (value, &count) in &freq {
        if mode.map_or(true, |(_, best)| count > best) {
            mode = Some((&**value, count));
        }
    }
    stats.mode = mode.map(|(value, _)| value.to_string());

    let total = non_null.len() as f64;
    let sum_p_ln_p: f64 = freq
        .values()
        .map(|&count| {
            let p = count as f64 / total;
            p * p.ln()
        })
        .sum();
    // 0.0 - x keeps a single-valued column at +0.0
    stats.entropy = Some(0.0 - sum_p_ln_p);
    stats.is_binary = Some(stats.unique == 2);

    let mut ranked: Vec<FrequentValue> = freq
        .iter()
        .map(|(value, &count)| FrequentValue {
            value: value.to_string(),
            count,
        })
        .collect();
    // Stable: equal counts keep first-seen order.
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked.truncate(config.top_values);
    stats.frequent_values = Some(ranked);

    let mut sorted: Vec<(&Value, Cow<'_, str>)> = non_null
        .iter()
        .map(|&v| (v, v.to_display_string()))
        .collect();
    sorted.sort_by(|a, b| cmp_utf16(&a.1, &b.1));
    stats.min = sorted.first().map(|(v, _)| StatValue::from_value(v));
    stats.max = sorted.last().map(|(v, _)| StatValue::from_value(v));
}

fn fill_datetime(stats: &mut ColumnStats, non_null: &[&Value]) {
    let dates: Vec<_> = non_null.iter().filter_map(|v| v.as_datetime()).collect();
    if let (Some(min), Some(max)) = (dates.iter().min(), dates.iter().max()) {
        stats.min = Some(StatValue::Text(format_iso(min)));
        stats.max = Some(StatValue::Text(format_iso(max)));
    }
}

// ── Tests ─────────────────────────────────────────────────────────────
