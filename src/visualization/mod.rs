//! Chart façade and the statistics behind it
//!
//! Every chart helper takes a `&DataFrame`, column selectors, a
//! [`PlotConfig`], and an output path, and renders an SVG file. The one
//! piece of arithmetic that is ours is [`freedman_diaconis_bins`], the
//! histogram's automatic bin count.

mod charts;

pub use charts::{bar_plot, box_plot, count_plot, heatmap, hist_plot, line_plot, scatter_plot};

use crate::error::{Result, TreinoError};
use crate::training::numeric_column;
use ndarray::Array2;
use polars::prelude::*;

/// Title and figure size shared by all chart helpers
#[derive(Debug, Clone)]
pub struct PlotConfig {
    pub title: Option<String>,
    /// Width × height in pixels
    pub size: (u32, u32),
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            title: None,
            size: (1000, 600),
        }
    }
}

impl PlotConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.size = (width, height);
        self
    }
}

/// Quantile on a sorted slice, linearly interpolated between ranks
fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        let frac = pos - lo as f64;
        sorted[lo] * (1.0 - frac) + sorted[hi] * frac
    }
}

/// Histogram bin count by the Freedman–Diaconis rule:
///
/// ```text
/// h    = 2 * IQR / n^(1/3)
/// bins = floor((max - min) / h)
/// ```
///
/// Degenerate input is clamped rather than faulting: an empty column is a
/// [`TreinoError::DataError`]; a zero-spread column yields 1 bin. The result
/// is always a positive integer.
pub fn freedman_diaconis_bins(df: &DataFrame, column: &str) -> Result<usize> {
    let values = numeric_column(df, column)?;
    if values.is_empty() {
        return Err(TreinoError::DataError(format!(
            "column '{column}' is empty, cannot compute bin count"
        )));
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let iqr = quantile(&sorted, 0.75) - quantile(&sorted, 0.25);
    let h = 2.0 * iqr / (sorted.len() as f64).cbrt();
    let range = sorted[sorted.len() - 1] - sorted[0];

    if h <= 0.0 || range <= 0.0 {
        return Ok(1);
    }

    Ok(((range / h).floor() as usize).max(1))
}

/// Pearson correlation matrix over the numeric columns of `df`.
///
/// Returns the column names (in frame order) and the symmetric matrix.
/// Constant columns correlate 0 with everything (and 1 with themselves).
pub fn correlation_matrix(df: &DataFrame) -> Result<(Vec<String>, Array2<f64>)> {
    let numeric_names: Vec<String> = df
        .get_columns()
        .iter()
        .filter(|col| {
            matches!(
                col.dtype(),
                DataType::Float64
                    | DataType::Float32
                    | DataType::Int64
                    | DataType::Int32
                    | DataType::Int16
                    | DataType::Int8
                    | DataType::UInt64
                    | DataType::UInt32
                    | DataType::UInt16
                    | DataType::UInt8
            )
        })
        .map(|col| col.name().to_string())
        .collect();

    if numeric_names.is_empty() {
        return Err(TreinoError::DataError(
            "no numeric columns to correlate".to_string(),
        ));
    }

    let series: Vec<Vec<f64>> = numeric_names
        .iter()
        .map(|name| numeric_column(df, name).map(|a| a.to_vec()))
        .collect::<Result<Vec<_>>>()?;

    let k = series.len();
    let mut matrix = Array2::zeros((k, k));
    for i in 0..k {
        for j in i..k {
            let r = if i == j {
                1.0
            } else {
                pearson(&series[i], &series[j])
            };
            matrix[[i, j]] = r;
            matrix[[j, i]] = r;
        }
    }

    Ok((numeric_names, matrix))
}

fn pearson(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len() as f64;
    if n == 0.0 {
        return 0.0;
    }
    let mean_a = a.iter().sum::<f64>() / n;
    let mean_b = b.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for (x, y) in a.iter().zip(b.iter()) {
        let dx = x - mean_a;
        let dy = y - mean_b;
        cov += dx * dy;
        var_a += dx * dx;
        var_b += dy * dy;
    }

    if var_a == 0.0 || var_b == 0.0 {
        return 0.0;
    }
    cov / (var_a.sqrt() * var_b.sqrt())
}

/// Extract a column as display strings (category labels)
pub(crate) fn string_column(df: &DataFrame, name: &str) -> Result<Vec<String>> {
    let series = df
        .column(name)
        .map_err(|_| TreinoError::FeatureNotFound(name.to_string()))?;
    let casted = series
        .cast(&DataType::String)
        .map_err(|e| TreinoError::DataError(e.to_string()))?;
    let values: Vec<String> = casted
        .str()
        .map_err(|e| TreinoError::DataError(e.to_string()))?
        .into_iter()
        .map(|v| v.unwrap_or("").to_string())
        .collect();
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_quantile_interpolation() {
        let sorted: Vec<f64> = (1..=10).map(|v| v as f64).collect();
        assert_relative_eq!(quantile(&sorted, 0.25), 3.25);
        assert_relative_eq!(quantile(&sorted, 0.75), 7.75);
        assert_relative_eq!(quantile(&sorted, 0.5), 5.5);
        assert_relative_eq!(quantile(&sorted, 0.0), 1.0);
        assert_relative_eq!(quantile(&sorted, 1.0), 10.0);
    }

    #[test]
    fn test_freedman_diaconis_one_to_ten() {
        let df = df!("v" => (1..=10).map(|v| v as f64).collect::<Vec<_>>()).unwrap();
        // iqr = 4.5, h = 9 / 10^(1/3) ≈ 4.177, range = 9 -> floor(2.15) = 2
        let bins = freedman_diaconis_bins(&df, "v").unwrap();
        assert_eq!(bins, 2);
    }

    #[test]
    fn test_freedman_diaconis_constant_column_clamps() {
        let df = df!("v" => &[5.0, 5.0, 5.0, 5.0]).unwrap();
        assert_eq!(freedman_diaconis_bins(&df, "v").unwrap(), 1);
    }

    #[test]
    fn test_freedman_diaconis_empty_column_errors() {
        let df = df!("v" => Vec::<f64>::new()).unwrap();
        assert!(matches!(
            freedman_diaconis_bins(&df, "v"),
            Err(TreinoError::DataError(_))
        ));
    }

    #[test]
    fn test_freedman_diaconis_unknown_column() {
        let df = df!("v" => &[1.0, 2.0]).unwrap();
        assert!(matches!(
            freedman_diaconis_bins(&df, "w"),
            Err(TreinoError::FeatureNotFound(_))
        ));
    }

    #[test]
    fn test_correlation_matrix_signs() {
        let df = df!(
            "up" => &[1.0, 2.0, 3.0, 4.0],
            "down" => &[4.0, 3.0, 2.0, 1.0],
            "name" => &["a", "b", "c", "d"],
        )
        .unwrap();

        let (names, matrix) = correlation_matrix(&df).unwrap();
        // String column excluded
        assert_eq!(names, vec!["up", "down"]);
        assert_relative_eq!(matrix[[0, 0]], 1.0);
        assert_relative_eq!(matrix[[0, 1]], -1.0);
        assert_relative_eq!(matrix[[1, 0]], -1.0);
    }

    #[test]
    fn test_pearson_constant_is_zero() {
        assert_eq!(pearson(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]), 0.0);
    }
}
