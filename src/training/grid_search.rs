//! Exhaustive cross-validated hyperparameter search

use crate::error::{Result, TreinoError};
use crate::models::{Candidate, Estimator, ParamGrid};
use crate::training::cross_validation::{CvScores, Fold, KFold};
use ndarray::{Array1, Array2};
use rayon::prelude::*;
use tracing::debug;

/// Scores for one grid point
#[derive(Debug, Clone)]
pub struct GridSearchResult {
    pub candidate: Candidate,
    pub cv: CvScores,
}

/// Exhaustive grid search: every candidate is scored by k-fold
/// cross-validated accuracy, and the best is refit on the full data.
///
/// Cost is grid size × folds; there is no early stopping or budget control.
/// Candidates are scored in parallel.
pub struct GridSearch {
    n_folds: usize,
    random_state: Option<u64>,
}

impl GridSearch {
    pub fn new(n_folds: usize) -> Self {
        Self {
            n_folds,
            random_state: None,
        }
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }

    /// Search the grid starting from `base`'s configuration.
    ///
    /// Returns the best model (already refit on all of `x`/`y`) together with
    /// the per-candidate scores.
    pub fn fit<M>(
        &self,
        base: &M,
        grid: &ParamGrid,
        x: &Array2<f64>,
        y: &Array1<f64>,
    ) -> Result<(M, Vec<GridSearchResult>)>
    where
        M: Estimator + Send + Sync,
    {
        let candidates = grid.candidates();
        if candidates.is_empty() {
            return Err(TreinoError::ValidationError(
                "parameter grid is empty".to_string(),
            ));
        }

        let mut k_fold = KFold::new(self.n_folds);
        if let Some(seed) = self.random_state {
            k_fold = k_fold.with_random_state(seed);
        }
        let folds = k_fold.split(x.nrows())?;

        let results: Vec<GridSearchResult> = candidates
            .into_par_iter()
            .map(|candidate| {
                let scores = self.score_candidate(base, &candidate, x, y, &folds)?;
                Ok(GridSearchResult {
                    candidate,
                    cv: CvScores::from_scores(scores),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let best = results
            .iter()
            .max_by(|a, b| {
                a.cv.mean
                    .partial_cmp(&b.cv.mean)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .ok_or_else(|| TreinoError::TrainingError("no candidates scored".to_string()))?;

        debug!(
            mean_accuracy = best.cv.mean,
            candidate = ?best.candidate,
            "grid search selected best candidate"
        );

        // Refit the winning configuration on the full data
        let mut best_model = base.clone();
        for (name, value) in &best.candidate {
            best_model.set_param(name, value)?;
        }
        best_model.fit(x, y)?;

        Ok((best_model, results))
    }

    fn score_candidate<M: Estimator>(
        &self,
        base: &M,
        candidate: &Candidate,
        x: &Array2<f64>,
        y: &Array1<f64>,
        folds: &[Fold],
    ) -> Result<Vec<f64>> {
        let mut scores = Vec::with_capacity(folds.len());

        for fold in folds {
            let x_train = rows(x, &fold.train_indices);
            let y_train = labels(y, &fold.train_indices);
            let x_val = rows(x, &fold.val_indices);
            let y_val = labels(y, &fold.val_indices);

            let mut model = base.clone();
            for (name, value) in candidate {
                model.set_param(name, value)?;
            }
            model.fit(&x_train, &y_train)?;
            let y_pred = model.predict(&x_val)?;

            scores.push(accuracy(&y_val, &y_pred));
        }

        Ok(scores)
    }
}

fn rows(x: &Array2<f64>, indices: &[usize]) -> Array2<f64> {
    Array2::from_shape_fn((indices.len(), x.ncols()), |(i, j)| x[[indices[i], j]])
}

fn labels(y: &Array1<f64>, indices: &[usize]) -> Array1<f64> {
    Array1::from_iter(indices.iter().map(|&i| y[i]))
}

fn accuracy(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    let correct = y_true
        .iter()
        .zip(y_pred.iter())
        .filter(|(t, p)| t.round() as i64 == p.round() as i64)
        .count();
    correct as f64 / y_true.len() as f64
}
