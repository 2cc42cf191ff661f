//! Pairwise Pearson and Spearman correlation across numeric columns.
//!
//! Unlike the analysis layer of a statistics package, nothing here rejects
//! input: undefined coefficients (empty input, unequal lengths, constant
//! columns, too few samples) are reported as `NaN`.
//!
//! # Example
//!
//! ```
//! use u_eda::analysis::calculate_correlation;
//!
//! let x = [1.0, 2.0, 3.0, 4.0, 5.0];
//! let y = [2.1, 3.9, 6.1, 7.9, 10.1];
//! assert!(calculate_correlation(&x, &y) > 0.99);
//!
//! let constant = [3.0; 5];
//! assert!(calculate_correlation(&x, &constant).is_nan());
//! ```

use indexmap::IndexMap;
use log::trace;
use serde::Serialize;

use crate::config::SummaryConfig;
use crate::table::{gather_column, Row};

/// Column name → column name → coefficient.
pub type CorrelationMatrix = IndexMap<String, IndexMap<String, f64>>;

// ── Pearson correlation ───────────────────────────────────────────────

/// Pearson product-moment correlation of two equally long samples.
///
/// Computed as `Σ(dx·dy) / (√Σdx² · √Σdy²)` with deviations from the
/// sample means. Returns `NaN` if the inputs are empty, differ in length,
/// or either has zero variance.
pub fn calculate_correlation(x: &[f64], y: &[f64]) -> f64 {
    if x.len() != y.len() || x.is_empty() {
        return f64::NAN;
    }

    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let mut covariance = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (&xi, &yi) in x.iter().zip(y) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        covariance += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let std_x = var_x.sqrt();
    let std_y = var_y.sqrt();
    if std_x == 0.0 || std_y == 0.0 {
        return f64::NAN;
    }

    covariance / (std_x * std_y)
}

// ── Spearman rank correlation ─────────────────────────────────────────

/// 1-based ranks of `values`; tied values share the mean of their ranks.
///
/// ```
/// use u_eda::analysis::average_ranks;
///
/// assert_eq!(average_ranks(&[10.0, 30.0, 20.0, 30.0]), vec![1.0, 3.5, 2.0, 3.5]);
/// ```
pub fn average_ranks(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; values.len()];
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && values[order[end]] == values[order[start]] {
            end += 1;
        }
        // positions start..end hold ranks start+1 ..= end
        let rank = (start + end + 1) as f64 / 2.0;
        for &idx in &order[start..end] {
            ranks[idx] = rank;
        }
        start = end;
    }
    ranks
}

/// Spearman rank correlation: Pearson over [`average_ranks`].
///
/// `NaN` under the same conditions as [`calculate_correlation`]; a sample
/// whose values are all tied has constant ranks.
///
/// ```
/// use u_eda::analysis::calculate_spearman;
///
/// // monotonic but not linear
/// let x = [1.0, 2.0, 3.0, 4.0, 5.0];
/// let y = [1.0, 4.0, 9.0, 16.0, 25.0];
/// assert!((calculate_spearman(&x, &y) - 1.0).abs() < 1e-12);
/// ```
pub fn calculate_spearman(x: &[f64], y: &[f64]) -> f64 {
    if x.len() != y.len() || x.is_empty() {
        return f64::NAN;
    }
    calculate_correlation(&average_ranks(x), &average_ranks(y))
}

// ── Correlation matrix ────────────────────────────────────────────────

/// Builds the correlation matrix over the named numeric columns of `rows`.
///
/// Each column's cells are coerced to numbers and unparseable or missing
/// cells are dropped. A pair is computed only when both columns keep more
/// than [`min_correlation_samples`](SummaryConfig::min_correlation_samples)
/// values; both lists are then cut to the shorter length. The diagonal is
/// always `1`.
///
/// ```
/// use u_eda::analysis::correlation_matrix;
/// use u_eda::config::SummaryConfig;
/// use u_eda::table::rows_from_json_str;
///
/// let rows = rows_from_json_str(
///     r#"[{"a":1,"b":2},{"a":2,"b":4},{"a":3,"b":6},{"a":4,"b":8},{"a":5,"b":10},{"a":6,"b":12}]"#,
/// ).unwrap();
/// let m = correlation_matrix(&rows, &["a", "b"], &SummaryConfig::default());
/// assert_eq!(m["a"]["a"], 1.0);
/// assert!((m["a"]["b"] - 1.0).abs() < 1e-12);
/// ```
pub fn correlation_matrix(
    rows: &[Row],
    numeric_columns: &[&str],
    config: &SummaryConfig,
) -> CorrelationMatrix {
    build_matrix(rows, numeric_columns, config, calculate_correlation)
}

/// Builds the Spearman matrix over the named numeric columns of `rows`.
///
/// Samples are gathered, filtered and truncated exactly as in
/// [`correlation_matrix`]; ranks are taken after truncation.
pub fn spearman_matrix(
    rows: &[Row],
    numeric_columns: &[&str],
    config: &SummaryConfig,
) -> CorrelationMatrix {
    build_matrix(rows, numeric_columns, config, calculate_spearman)
}

fn build_matrix(
    rows: &[Row],
    numeric_columns: &[&str],
    config: &SummaryConfig,
    coefficient: fn(&[f64], &[f64]) -> f64,
) -> CorrelationMatrix {
    let samples: Vec<Vec<f64>> = numeric_columns
        .iter()
        .map(|name| {
            gather_column(rows, name)
                .into_iter()
                .filter_map(|v| v.as_number())
                .collect()
        })
        .collect();

    let k = numeric_columns.len();
    let mut coefficients = vec![vec![f64::NAN; k]; k];
    for i in 0..k {
        coefficients[i][i] = 1.0;
        for j in (i + 1)..k {
            let (x, y) = (&samples[i], &samples[j]);
            let r = if x.len() > config.min_correlation_samples
                && y.len() > config.min_correlation_samples
            {
                let n = x.len().min(y.len());
                coefficient(&x[..n], &y[..n])
            } else {
                trace!(
                    "skipping correlation {} ~ {}: {} and {} samples",
                    numeric_columns[i],
                    numeric_columns[j],
                    x.len(),
                    y.len()
                );
                f64::NAN
            };
            coefficients[i][j] = r;
            coefficients[j][i] = r;
        }
    }

    numeric_columns
        .iter()
        .zip(coefficients)
        .map(|(row_name, row)| {
            let inner = numeric_columns
                .iter()
                .zip(row)
                .map(|(col_name, r)| ((*col_name).to_string(), r))
                .collect();
            ((*row_name).to_string(), inner)
        })
        .collect()
}

// ── High-correlation pairs ────────────────────────────────────────────

/// A pair of distinct columns with a strong linear relationship.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationPair {
    pub column1: String,
    pub column2: String,
    /// Signed Pearson coefficient.
    pub correlation: f64,
}

/// Lists pairs above the diagonal whose `|r|` exceeds `threshold`, sorted
/// by `|r|` descending. `NaN` coefficients never qualify.
///
/// ```
/// use u_eda::analysis::{high_correlation_pairs, CorrelationMatrix};
/// use indexmap::IndexMap;
///
/// let mut m: CorrelationMatrix = IndexMap::new();
/// m.insert("a".into(), IndexMap::from([("a".into(), 1.0), ("b".into(), -0.9)]));
/// m.insert("b".into(), IndexMap::from([("a".into(), -0.9), ("b".into(), 1.0)]));
///
/// let pairs = high_correlation_pairs(&m, 0.7);
/// assert_eq!(pairs.len(), 1);
/// assert_eq!(pairs[0].correlation, -0.9);
/// ```
pub fn high_correlation_pairs(matrix: &CorrelationMatrix, threshold: f64) -> Vec<CorrelationPair> {
    let mut pairs = Vec::new();
    for (i, (name_a, row)) in matrix.iter().enumerate() {
        for (name_b, &r) in row.iter().skip(i + 1) {
            if r.abs() > threshold {
                pairs.push(CorrelationPair {
                    column1: name_a.clone(),
                    column2: name_b.clone(),
                    correlation: r,
                });
            }
        }
    }
    pairs.sort_by(|a, b| b.correlation.abs().total_cmp(&a.correlation.abs()));
    pairs
}

// ── Tests ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    fn rows_of(columns: &[(&str, Vec<Value>)]) -> Vec<Row> {
        let n = columns.first().map_or(0, |(_, v)| v.len());
        (0..n)
            .map(|i| {
                columns
                    .iter()
                    .map(|(name, values)| ((*name).to_string(), values[i].clone()))
                    .collect()
            })
            .collect()
    }

    fn nums(values: &[f64]) -> Vec<Value> {
        values.iter().map(|&v| Value::Number(v)).collect()
    }

    // ── Pearson ──────────────────────────────────────────────────

    #[test]
    fn perfect_positive_and_negative() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let up = [2.0, 4.0, 6.0, 8.0, 10.0];
        let down = [5.0, 4.0, 3.0, 2.0, 1.0];
        assert!((calculate_correlation(&x, &up) - 1.0).abs() < 1e-12);
        assert!((calculate_correlation(&x, &down) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn known_coefficient() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [2.0, 4.0, 5.0, 4.0, 5.0];
        // cov = 6, var_x = 10, var_y = 6
        let expected = 6.0 / (10f64.sqrt() * 6f64.sqrt());
        assert!((calculate_correlation(&x, &y) - expected).abs() < 1e-12);
    }

    #[test]
    fn symmetric() {
        let x = [1.5, 2.25, 3.0, 8.0, 0.5, 4.0];
        let y = [7.0, 1.0, 2.5, 3.5, 9.0, 0.25];
        assert_eq!(calculate_correlation(&x, &y), calculate_correlation(&y, &x));
    }

    #[test]
    fn degenerate_inputs_are_nan() {
        assert!(calculate_correlation(&[], &[]).is_nan());
        assert!(calculate_correlation(&[1.0, 2.0], &[1.0]).is_nan());
        assert!(calculate_correlation(&[1.0, 2.0, 3.0], &[4.0, 4.0, 4.0]).is_nan());
        assert!(calculate_correlation(&[5.0], &[6.0]).is_nan());
    }

    // ── Spearman ─────────────────────────────────────────────────

    #[test]
    fn ranks_average_ties() {
        assert_eq!(average_ranks(&[]), Vec::<f64>::new());
        assert_eq!(average_ranks(&[5.0, 5.0, 5.0]), vec![2.0, 2.0, 2.0]);
        assert_eq!(
            average_ranks(&[3.0, 1.0, 2.0, 1.0, 3.0]),
            vec![4.5, 1.5, 3.0, 1.5, 4.5]
        );
    }

    #[test]
    fn spearman_monotonic_is_one() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [1.0, 4.0, 9.0, 16.0, 25.0];
        assert!((calculate_spearman(&x, &y) - 1.0).abs() < 1e-12);
        assert!(calculate_correlation(&x, &y) < 0.99);

        let down = [100.0, 50.0, 10.0, 1.0, 0.5];
        assert!((calculate_spearman(&x, &down) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn spearman_with_ties() {
        // ranks: x = [1, 2, 3, 4], y = [1, 2.5, 2.5, 4]
        let x = [1.0, 2.0, 3.0, 4.0];
        let y = [10.0, 20.0, 20.0, 40.0];
        let expected = calculate_correlation(&[1.0, 2.0, 3.0, 4.0], &[1.0, 2.5, 2.5, 4.0]);
        assert!((calculate_spearman(&x, &y) - expected).abs() < 1e-12);
        assert!(expected < 1.0);
    }

    #[test]
    fn spearman_degenerate_inputs_are_nan() {
        assert!(calculate_spearman(&[], &[]).is_nan());
        assert!(calculate_spearman(&[1.0, 2.0], &[1.0]).is_nan());
        assert!(calculate_spearman(&[1.0, 2.0, 3.0], &[7.0, 7.0, 7.0]).is_nan());
    }

    #[test]
    fn spearman_matrix_shares_pearson_shape() {
        let rows = rows_of(&[
            ("x", nums(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0])),
            ("y", nums(&[1.0, 8.0, 27.0, 64.0, 125.0, 216.0])),
            ("k", nums(&[2.0; 6])),
        ]);
        let names = ["x", "y", "k"];
        let config = SummaryConfig::default();
        let pearson = correlation_matrix(&rows, &names, &config);
        let spearman = spearman_matrix(&rows, &names, &config);

        let keys: Vec<&str> = spearman.keys().map(String::as_str).collect();
        assert_eq!(keys, names);
        assert_eq!(spearman["y"]["y"], 1.0);
        assert!((spearman["x"]["y"] - 1.0).abs() < 1e-12);
        assert!(pearson["x"]["y"] < spearman["x"]["y"]);
        assert!(spearman["x"]["k"].is_nan());
    }

    #[test]
    fn spearman_matrix_respects_sample_threshold() {
        let rows = rows_of(&[
            ("x", nums(&[1.0, 2.0, 3.0])),
            ("y", nums(&[3.0, 2.0, 1.0])),
        ]);
        let m = spearman_matrix(&rows, &["x", "y"], &SummaryConfig::default());
        assert!(m["x"]["y"].is_nan());
    }

    // ── Matrix ───────────────────────────────────────────────────

    #[test]
    fn matrix_is_square_symmetric_with_unit_diagonal() {
        let rows = rows_of(&[
            ("a", nums(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0])),
            ("b", nums(&[2.0, 1.0, 4.0, 3.0, 6.0, 5.0, 8.0])),
            ("c", nums(&[9.0, 7.0, 8.0, 3.0, 2.0, 4.0, 1.0])),
        ]);
        let names = ["a", "b", "c"];
        let m = correlation_matrix(&rows, &names, &SummaryConfig::default());
        assert_eq!(m.len(), 3);
        for a in names {
            assert_eq!(m[a].len(), 3);
            assert_eq!(m[a][a], 1.0);
            for b in names {
                assert_eq!(m[a][b], m[b][a]);
            }
        }
        assert!(m["a"]["c"] < -0.8);
    }

    #[test]
    fn matrix_order_follows_column_order() {
        let rows = rows_of(&[("z", nums(&[1.0; 6])), ("a", nums(&[2.0; 6]))]);
        let m = correlation_matrix(&rows, &["z", "a"], &SummaryConfig::default());
        let keys: Vec<&str> = m.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["z", "a"]);
        let inner: Vec<&str> = m["z"].keys().map(String::as_str).collect();
        assert_eq!(inner, vec!["z", "a"]);
    }

    #[test]
    fn constant_column_correlates_as_nan() {
        let rows = rows_of(&[
            ("x", nums(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0])),
            ("k", nums(&[3.0; 6])),
        ]);
        let m = correlation_matrix(&rows, &["x", "k"], &SummaryConfig::default());
        assert!(m["x"]["k"].is_nan());
        assert!(m["k"]["x"].is_nan());
        assert_eq!(m["k"]["k"], 1.0);
    }

    #[test]
    fn five_samples_are_not_enough() {
        let rows = rows_of(&[
            ("x", nums(&[1.0, 2.0, 3.0, 4.0, 5.0])),
            ("y", nums(&[2.0, 4.0, 6.0, 8.0, 10.0])),
        ]);
        let m = correlation_matrix(&rows, &["x", "y"], &SummaryConfig::default());
        assert!(m["x"]["y"].is_nan());

        let lenient = SummaryConfig {
            min_correlation_samples: 2,
            ..SummaryConfig::default()
        };
        let m = correlation_matrix(&rows, &["x", "y"], &lenient);
        assert!((m["x"]["y"] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn missing_cells_are_dropped_then_truncated() {
        // x keeps 7 values, y keeps 6 after dropping the null; both cut to 6.
        let rows = rows_of(&[
            ("x", nums(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0])),
            (
                "y",
                vec![
                    Value::from(2),
                    Value::from("4"),
                    Value::from(6),
                    Value::from(8),
                    Value::Null,
                    Value::from(10),
                    Value::from(12),
                ],
            ),
        ]);
        let m = correlation_matrix(&rows, &["x", "y"], &SummaryConfig::default());
        let expected = calculate_correlation(
            &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
            &[2.0, 4.0, 6.0, 8.0, 10.0, 12.0],
        );
        assert_eq!(m["x"]["y"], expected);
    }

    #[test]
    fn empty_column_list() {
        let m = correlation_matrix(&[], &[], &SummaryConfig::default());
        assert!(m.is_empty());
    }

    // ── High-correlation pairs ───────────────────────────────────

    #[test]
    fn high_pairs_sorted_and_filtered() {
        let rows = rows_of(&[
            ("a", nums(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0])),
            ("b", nums(&[1.1, 2.3, 2.9, 4.2, 4.8, 6.1])),
            ("c", nums(&[6.0, 5.0, 4.0, 3.0, 2.0, 1.0])),
            ("d", nums(&[1.0, -1.0, 1.0, -1.0, 1.0, -1.0])),
        ]);
        let m = correlation_matrix(&rows, &["a", "b", "c", "d"], &SummaryConfig::default());
        let pairs = high_correlation_pairs(&m, 0.7);

        assert!(pairs.iter().all(|p| p.column1 != p.column2));
        assert!(pairs.iter().all(|p| p.column1 != "d" && p.column2 != "d"));
        assert_eq!(pairs.len(), 3); // a~b, a~c, b~c
        assert_eq!(pairs[0].column1, "a");
        assert_eq!(pairs[0].column2, "c");
        assert!((pairs[0].correlation + 1.0).abs() < 1e-12);
        for w in pairs.windows(2) {
            assert!(w[0].correlation.abs() >= w[1].correlation.abs());
        }
    }

    #[test]
    fn nan_never_a_high_pair() {
        let mut m: CorrelationMatrix = IndexMap::new();
        m.insert("a".into(), IndexMap::from([("a".into(), 1.0), ("b".into(), f64::NAN)]));
        m.insert("b".into(), IndexMap::from([("a".into(), f64::NAN), ("b".into(), 1.0)]));
        assert!(high_correlation_pairs(&m, 0.7).is_empty());
    }
}
