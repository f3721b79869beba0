//! K-nearest-neighbors classifier
//!
//! Stores the training set and predicts by majority vote among the k
//! closest rows. Has no notion of feature importance, which makes it the
//! canonical tenant of `feature_importance`'s soft-degrade path.

use crate::error::{Result, TreinoError};
use crate::models::{Estimator, ParamValue};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Distance metric between feature rows
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum DistanceMetric {
    #[default]
    Euclidean,
    Manhattan,
}

impl DistanceMetric {
    fn distance(&self, a: &[f64], b: &[f64]) -> f64 {
        match self {
            DistanceMetric::Euclidean => a
                .iter()
                .zip(b.iter())
                .map(|(x, y)| (x - y).powi(2))
                .sum::<f64>()
                .sqrt(),
            DistanceMetric::Manhattan => {
                a.iter().zip(b.iter()).map(|(x, y)| (x - y).abs()).sum()
            }
        }
    }
}

/// KNN classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnnClassifier {
    pub n_neighbors: usize,
    pub metric: DistanceMetric,
    x_train: Option<Array2<f64>>,
    y_train: Option<Array1<f64>>,
}

impl Default for KnnClassifier {
    fn default() -> Self {
        Self::new(5)
    }
}

impl KnnClassifier {
    pub fn new(n_neighbors: usize) -> Self {
        Self {
            n_neighbors,
            metric: DistanceMetric::default(),
            x_train: None,
            y_train: None,
        }
    }

    pub fn with_metric(mut self, metric: DistanceMetric) -> Self {
        self.metric = metric;
        self
    }
}

impl Estimator for KnnClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        if self.n_neighbors == 0 {
            return Err(TreinoError::InvalidParameter {
                name: "n_neighbors".to_string(),
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if x.nrows() != y.len() {
            return Err(TreinoError::ShapeError {
                expected: format!("y length = {}", x.nrows()),
                actual: format!("y length = {}", y.len()),
            });
        }
        if x.nrows() == 0 {
            return Err(TreinoError::TrainingError(
                "cannot fit on an empty dataset".to_string(),
            ));
        }

        self.x_train = Some(x.clone());
        self.y_train = Some(y.clone());
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let x_train = self.x_train.as_ref().ok_or(TreinoError::ModelNotFitted)?;
        let y_train = self.y_train.as_ref().ok_or(TreinoError::ModelNotFitted)?;
        let k = self.n_neighbors.min(x_train.nrows());

        let predictions: Vec<f64> = (0..x.nrows())
            .map(|i| {
                let row = x.row(i).to_vec();

                let mut dists: Vec<(f64, f64)> = (0..x_train.nrows())
                    .map(|j| {
                        let d = self.metric.distance(&row, &x_train.row(j).to_vec());
                        (d, y_train[j])
                    })
                    .collect();
                dists.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

                // Majority vote among the k nearest labels
                let mut votes: HashMap<i64, usize> = HashMap::new();
                for (_, label) in dists.iter().take(k) {
                    *votes.entry(label.round() as i64).or_insert(0) += 1;
                }
                votes
                    .into_iter()
                    .max_by_key(|&(_, count)| count)
                    .map(|(label, _)| label as f64)
                    .unwrap_or(0.0)
            })
            .collect();

        Ok(Array1::from_vec(predictions))
    }

    fn set_param(&mut self, name: &str, value: &ParamValue) -> Result<()> {
        match (name, value) {
            ("n_neighbors", ParamValue::Int(v)) if *v >= 1 => {
                self.n_neighbors = *v as usize;
            }
            ("metric", ParamValue::Str(s)) => {
                self.metric = match s.as_str() {
                    "euclidean" => DistanceMetric::Euclidean,
                    "manhattan" => DistanceMetric::Manhattan,
                    other => {
                        return Err(TreinoError::InvalidParameter {
                            name: name.to_string(),
                            value: other.to_string(),
                            reason: "expected \"euclidean\" or \"manhattan\"".to_string(),
                        })
                    }
                };
            }
            _ => {
                return Err(TreinoError::InvalidParameter {
                    name: name.to_string(),
                    value: value.to_string(),
                    reason: "unknown parameter or out-of-range value".to_string(),
                })
            }
        }
        Ok(())
    }
}
