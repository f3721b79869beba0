//! Decision tree classifier

use crate::error::{Result, TreinoError};
use crate::models::{Estimator, ParamValue};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Split impurity criterion
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Criterion {
    Gini,
    Entropy,
}

/// A node of the fitted tree
#[derive(Debug, Clone, Serialize, Deserialize)]
enum Node {
    Leaf {
        class: f64,
        n_samples: usize,
    },
    Split {
        feature_idx: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

/// Binary-split classification tree with impurity-decrease feature
/// importances.
///
/// Labels are treated as integer classes (rounded); predictions return the
/// majority class of the reached leaf.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTreeClassifier {
    root: Option<Node>,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub criterion: Criterion,
    feature_importances: Option<Array1<f64>>,
}

impl Default for DecisionTreeClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl DecisionTreeClassifier {
    pub fn new() -> Self {
        Self {
            root: None,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            criterion: Criterion::Gini,
            feature_importances: None,
        }
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    pub fn with_min_samples_split(mut self, n: usize) -> Self {
        self.min_samples_split = n;
        self
    }

    pub fn with_min_samples_leaf(mut self, n: usize) -> Self {
        self.min_samples_leaf = n;
        self
    }

    pub fn with_criterion(mut self, criterion: Criterion) -> Self {
        self.criterion = criterion;
        self
    }

    fn class_counts(y: impl Iterator<Item = f64>) -> HashMap<i64, usize> {
        let mut counts = HashMap::new();
        for v in y {
            *counts.entry(v.round() as i64).or_insert(0) += 1;
        }
        counts
    }

    fn impurity(&self, counts: &HashMap<i64, usize>, n: usize) -> f64 {
        if n == 0 {
            return 0.0;
        }
        let n = n as f64;
        match self.criterion {
            Criterion::Gini => {
                1.0 - counts.values().map(|&c| (c as f64 / n).powi(2)).sum::<f64>()
            }
            Criterion::Entropy => -counts
                .values()
                .filter(|&&c| c > 0)
                .map(|&c| {
                    let p = c as f64 / n;
                    p * p.ln()
                })
                .sum::<f64>(),
        }
    }

    fn majority_class(counts: &HashMap<i64, usize>) -> f64 {
        counts
            .iter()
            .max_by_key(|(_, &count)| count)
            .map(|(&class, _)| class as f64)
            .unwrap_or(0.0)
    }

    /// Best (feature, threshold, gain) over all features for the given rows,
    /// or `None` when no split improves impurity.
    fn find_best_split(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        indices: &[usize],
    ) -> Option<(usize, f64, f64)> {
        let parent_counts = Self::class_counts(indices.iter().map(|&i| y[i]));
        let parent_impurity = self.impurity(&parent_counts, indices.len());
        let n = indices.len() as f64;

        let mut best: Option<(usize, f64, f64)> = None;

        for feature_idx in 0..x.ncols() {
            // Candidate thresholds are midpoints between consecutive distinct values
            let mut values: Vec<f64> = indices.iter().map(|&i| x[[i, feature_idx]]).collect();
            values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            values.dedup();

            for window in values.windows(2) {
                let threshold = (window[0] + window[1]) / 2.0;

                let mut left_counts: HashMap<i64, usize> = HashMap::new();
                let mut right_counts: HashMap<i64, usize> = HashMap::new();
                let mut n_left = 0usize;
                let mut n_right = 0usize;

                for &i in indices {
                    let class = y[i].round() as i64;
                    if x[[i, feature_idx]] <= threshold {
                        *left_counts.entry(class).or_insert(0) += 1;
                        n_left += 1;
                    } else {
                        *right_counts.entry(class).or_insert(0) += 1;
                        n_right += 1;
                    }
                }

                if n_left < self.min_samples_leaf || n_right < self.min_samples_leaf {
                    continue;
                }

                let weighted = (n_left as f64 * self.impurity(&left_counts, n_left)
                    + n_right as f64 * self.impurity(&right_counts, n_right))
                    / n;
                let gain = parent_impurity - weighted;

                if gain > best.map_or(0.0, |(_, _, g)| g) {
                    best = Some((feature_idx, threshold, gain));
                }
            }
        }

        best
    }

    fn build(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        indices: &[usize],
        depth: usize,
        importances: &mut [f64],
    ) -> Node {
        let counts = Self::class_counts(indices.iter().map(|&i| y[i]));
        let is_pure = counts.len() <= 1;

        let stop = indices.len() < self.min_samples_split
            || self.max_depth.is_some_and(|d| depth >= d)
            || is_pure;

        if stop {
            return Node::Leaf {
                class: Self::majority_class(&counts),
                n_samples: indices.len(),
            };
        }

        match self.find_best_split(x, y, indices) {
            Some((feature_idx, threshold, gain)) => {
                let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
                    .iter()
                    .partition(|&&i| x[[i, feature_idx]] <= threshold);

                // Importance: impurity decrease weighted by node size
                importances[feature_idx] += indices.len() as f64 * gain;

                Node::Split {
                    feature_idx,
                    threshold,
                    left: Box::new(self.build(x, y, &left_idx, depth + 1, importances)),
                    right: Box::new(self.build(x, y, &right_idx, depth + 1, importances)),
                }
            }
            None => Node::Leaf {
                class: Self::majority_class(&counts),
                n_samples: indices.len(),
            },
        }
    }

    fn predict_row(&self, node: &Node, row: &[f64]) -> f64 {
        match node {
            Node::Leaf { class, .. } => *class,
            Node::Split {
                feature_idx,
                threshold,
                left,
                right,
            } => {
                if row[*feature_idx] <= *threshold {
                    self.predict_row(left, row)
                } else {
                    self.predict_row(right, row)
                }
            }
        }
    }

    /// Fitted tree depth (0 before fitting)
    pub fn depth(&self) -> usize {
        fn node_depth(node: &Node) -> usize {
            match node {
                Node::Leaf { .. } => 1,
                Node::Split { left, right, .. } => 1 + node_depth(left).max(node_depth(right)),
            }
        }
        self.root.as_ref().map_or(0, node_depth)
    }
}

impl Estimator for DecisionTreeClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        let n_samples = x.nrows();
        let n_features = x.ncols();

        if n_samples != y.len() {
            return Err(TreinoError::ShapeError {
                expected: format!("y length = {n_samples}"),
                actual: format!("y length = {}", y.len()),
            });
        }
        if n_samples == 0 {
            return Err(TreinoError::TrainingError(
                "cannot fit on an empty dataset".to_string(),
            ));
        }

        let mut importances = vec![0.0; n_features];
        let indices: Vec<usize> = (0..n_samples).collect();
        self.root = Some(self.build(x, y, &indices, 0, &mut importances));

        let total: f64 = importances.iter().sum();
        if total > 0.0 {
            for imp in &mut importances {
                *imp /= total;
            }
        }
        self.feature_importances = Some(Array1::from_vec(importances));

        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let root = self.root.as_ref().ok_or(TreinoError::ModelNotFitted)?;

        let predictions: Vec<f64> = (0..x.nrows())
            .map(|i| self.predict_row(root, &x.row(i).to_vec()))
            .collect();

        Ok(Array1::from_vec(predictions))
    }

    fn feature_importances(&self) -> Option<Array1<f64>> {
        self.feature_importances.clone()
    }

    fn set_param(&mut self, name: &str, value: &ParamValue) -> Result<()> {
        match (name, value) {
            ("max_depth", ParamValue::Int(v)) if *v > 0 => {
                self.max_depth = Some(*v as usize);
            }
            ("min_samples_split", ParamValue::Int(v)) if *v >= 2 => {
                self.min_samples_split = *v as usize;
            }
            ("min_samples_leaf", ParamValue::Int(v)) if *v >= 1 => {
                self.min_samples_leaf = *v as usize;
            }
            ("criterion", ParamValue::Str(s)) => {
                self.criterion = match s.as_str() {
                    "gini" => Criterion::Gini,
                    "entropy" => Criterion::Entropy,
                    other => {
                        return Err(TreinoError::InvalidParameter {
                            name: name.to_string(),
                            value: other.to_string(),
                            reason: "expected \"gini\" or \"entropy\"".to_string(),
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
