//! Estimator contract and built-in models
//!
//! A model is anything implementing [`Estimator`]: fit on arrays, predict on
//! arrays, optionally expose feature importances, and accept hyperparameters
//! by name so grid search can enumerate configurations.

mod decision_tree;
mod knn;

pub use decision_tree::{Criterion, DecisionTreeClassifier};
pub use knn::{DistanceMetric, KnnClassifier};

use crate::error::Result;
use ndarray::{Array1, Array2};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;

/// Contract every trainable model satisfies.
///
/// The `Serialize`/`DeserializeOwned` bounds let
/// [`ModelTrainer`](crate::training::ModelTrainer) persist trained models as
/// JSON artifacts.
pub trait Estimator: Clone + Serialize + DeserializeOwned {
    /// Fit the model to training data
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()>;

    /// Make predictions
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>>;

    /// Per-feature importance scores, if the model kind supports them
    fn feature_importances(&self) -> Option<Array1<f64>> {
        None
    }

    /// Assign a hyperparameter by name
    fn set_param(&mut self, name: &str, value: &ParamValue) -> Result<()>;
}

/// A single hyperparameter value
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Int(i64),
    Float(f64),
    Str(String),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Int(v) => write!(f, "{v}"),
            ParamValue::Float(v) => write!(f, "{v}"),
            ParamValue::Str(v) => write!(f, "{v}"),
        }
    }
}

/// One point in the grid: parameter name → value, in insertion order
pub type Candidate = Vec<(String, ParamValue)>;

/// Hyperparameter grid for exhaustive search
///
/// ```
/// use treino::models::ParamGrid;
///
/// let grid = ParamGrid::new()
///     .ints("max_depth", [2, 4, 8])
///     .strs("criterion", ["gini", "entropy"]);
/// assert_eq!(grid.n_candidates(), 6);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ParamGrid {
    params: Vec<(String, Vec<ParamValue>)>,
}

impl ParamGrid {
    pub fn new() -> Self {
        Self { params: Vec::new() }
    }

    /// Add integer candidate values for a parameter
    pub fn ints<I: IntoIterator<Item = i64>>(mut self, name: &str, values: I) -> Self {
        let values = values.into_iter().map(ParamValue::Int).collect();
        self.params.push((name.to_string(), values));
        self
    }

    /// Add float candidate values for a parameter
    pub fn floats<I: IntoIterator<Item = f64>>(mut self, name: &str, values: I) -> Self {
        let values = values.into_iter().map(ParamValue::Float).collect();
        self.params.push((name.to_string(), values));
        self
    }

    /// Add string candidate values for a parameter
    pub fn strs<'a, I: IntoIterator<Item = &'a str>>(mut self, name: &str, values: I) -> Self {
        let values = values
            .into_iter()
            .map(|s| ParamValue::Str(s.to_string()))
            .collect();
        self.params.push((name.to_string(), values));
        self
    }

    /// Total number of grid points
    pub fn n_candidates(&self) -> usize {
        if self.params.is_empty() {
            return 0;
        }
        self.params.iter().map(|(_, v)| v.len()).product()
    }

    /// Enumerate the full cartesian product of parameter values
    pub fn candidates(&self) -> Vec<Candidate> {
        let mut out: Vec<Candidate> = vec![Vec::new()];
        for (name, values) in &self.params {
            let mut next = Vec::with_capacity(out.len() * values.len());
            for partial in &out {
                for value in values {
                    let mut candidate = partial.clone();
                    candidate.push((name.clone(), value.clone()));
                    next.push(candidate);
                }
            }
            out = next;
        }
        if self.params.is_empty() {
            out.clear();
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_cartesian_product() {
        let grid = ParamGrid::new()
            .ints("max_depth", [2, 4])
            .ints("min_samples_split", [2, 5, 10]);

        let candidates = grid.candidates();
        assert_eq!(candidates.len(), 6);
        assert_eq!(grid.n_candidates(), 6);

        // First candidate pairs first values of each parameter
        assert_eq!(candidates[0][0], ("max_depth".to_string(), ParamValue::Int(2)));
        assert_eq!(
            candidates[0][1],
            ("min_samples_split".to_string(), ParamValue::Int(2))
        );
    }

    #[test]
    fn test_empty_grid_has_no_candidates() {
        let grid = ParamGrid::new();
        assert_eq!(grid.n_candidates(), 0);
        assert!(grid.candidates().is_empty());
    }

    #[test]
    fn test_mixed_value_kinds() {
        let grid = ParamGrid::new()
            .strs("criterion", ["gini", "entropy"])
            .floats("alpha", [0.1]);
        assert_eq!(grid.n_candidates(), 2);
    }
}
