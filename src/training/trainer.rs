//! Model training façade
//!
//! [`ModelTrainer`] owns a model and a dataset and sequences the usual
//! workflow: split, train, evaluate, tune, persist. Method order is a
//! convention, not a state machine — calling `train` or `evaluate` before
//! `split_data` fails at runtime with [`TreinoError::DataNotSplit`].

use crate::error::{Result, TreinoError};
use crate::models::{Estimator, ParamGrid};
use crate::training::grid_search::{GridSearch, GridSearchResult};
use crate::training::metrics::{classification_report, ClassificationReport};
use ndarray::{Array1, Array2};
use polars::prelude::*;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, warn};

/// Directory where model artifacts are written. Assumed to already exist.
const MODEL_DIR: &str = "modelos";

/// The four partition arrays produced by `split_data`
#[derive(Debug, Clone)]
pub struct TrainTestSplit {
    pub x_train: Array2<f64>,
    pub x_test: Array2<f64>,
    pub y_train: Array1<f64>,
    pub y_test: Array1<f64>,
}

/// Training façade holding a model, a dataset, and the target column name
pub struct ModelTrainer<M: Estimator> {
    model: M,
    data: DataFrame,
    target_column: String,
    feature_names: Vec<String>,
    split: Option<TrainTestSplit>,
    split_seed: Option<u64>,
}

impl<M: Estimator> ModelTrainer<M> {
    pub fn new(model: M, data: DataFrame, target_column: &str) -> Self {
        Self {
            model,
            data,
            target_column: target_column.to_string(),
            feature_names: Vec::new(),
            split: None,
            split_seed: None,
        }
    }

    /// The held model
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Feature column names (populated by `split_data`)
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// The current partition, if `split_data` has been called
    pub fn split(&self) -> Option<&TrainTestSplit> {
        self.split.as_ref()
    }

    /// Randomly partition the dataset into train/test sets.
    ///
    /// The target column is removed from the feature set;
    /// `ceil(n * test_size)` rows go to the test partition. A fixed `seed`
    /// makes the partition reproducible. Any prior split is overwritten.
    pub fn split_data(&mut self, test_size: f64, seed: Option<u64>) -> Result<()> {
        if !(test_size > 0.0 && test_size < 1.0) {
            return Err(TreinoError::InvalidParameter {
                name: "test_size".to_string(),
                value: test_size.to_string(),
                reason: "must be strictly between 0 and 1".to_string(),
            });
        }

        let feature_names: Vec<String> = self
            .data
            .get_column_names()
            .into_iter()
            .filter(|name| name.as_str() != self.target_column)
            .map(|s| s.to_string())
            .collect();

        let y = numeric_column(&self.data, &self.target_column)?;
        let x = columns_to_array2(&self.data, &feature_names)?;

        let n = x.nrows();
        let n_test = ((n as f64) * test_size).ceil() as usize;

        let mut indices: Vec<usize> = (0..n).collect();
        let mut rng = match seed {
            Some(s) => ChaCha8Rng::seed_from_u64(s),
            None => ChaCha8Rng::from_entropy(),
        };
        indices.shuffle(&mut rng);

        let (test_idx, train_idx) = indices.split_at(n_test);

        let split = TrainTestSplit {
            x_train: select_rows(&x, train_idx),
            x_test: select_rows(&x, test_idx),
            y_train: select_labels(&y, train_idx),
            y_test: select_labels(&y, test_idx),
        };

        debug!(
            n_train = split.x_train.nrows(),
            n_test = split.x_test.nrows(),
            target_column = %self.target_column,
            "dataset split"
        );

        self.feature_names = feature_names;
        self.split = Some(split);
        self.split_seed = seed;
        Ok(())
    }

    /// Fit the held model on the training partition
    pub fn train(&mut self) -> Result<()> {
        let split = self.split.as_ref().ok_or(TreinoError::DataNotSplit)?;
        self.model.fit(&split.x_train, &split.y_train)
    }

    /// Predict labels for arbitrary new feature rows.
    ///
    /// Independent of the test partition: all columns of `new_data` are used
    /// as features, in their given order.
    pub fn predict(&self, new_data: &DataFrame) -> Result<Array1<f64>> {
        let col_names: Vec<String> = new_data
            .get_column_names()
            .into_iter()
            .map(|s| s.to_string())
            .collect();
        let x = columns_to_array2(new_data, &col_names)?;
        self.model.predict(&x)
    }

    /// Predict on the test partition and build a per-class
    /// precision/recall/F1 report.
    ///
    /// Assumes a classification target; regression labels produce a
    /// meaningless report.
    pub fn evaluate(&self, target_names: Option<&[&str]>) -> Result<ClassificationReport> {
        let split = self.split.as_ref().ok_or(TreinoError::DataNotSplit)?;
        let y_pred = self.model.predict(&split.x_test)?;
        Ok(classification_report(&split.y_test, &y_pred, target_names))
    }

    /// Exhaustive cross-validated grid search over the training partition.
    ///
    /// Replaces the held model with the best-scoring configuration (refit on
    /// the full training partition) and returns the per-candidate scores.
    pub fn tune(&mut self, grid: &ParamGrid, n_folds: usize) -> Result<Vec<GridSearchResult>>
    where
        M: Send + Sync,
    {
        let split = self.split.as_ref().ok_or(TreinoError::DataNotSplit)?;

        let mut search = GridSearch::new(n_folds);
        if let Some(seed) = self.split_seed {
            search = search.with_random_state(seed);
        }

        let (best, results) = search.fit(&self.model, grid, &split.x_train, &split.y_train)?;
        self.model = best;
        Ok(results)
    }

    /// Artifact path for a model name: `modelos/<name>.json`
    pub fn build_filename(model_name: &str) -> String {
        format!("{MODEL_DIR}/{model_name}.json")
    }

    /// Serialize the held model to `modelos/<name>.json`.
    ///
    /// The directory must already exist; the write is not atomic.
    pub fn save(&self, model_name: &str) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.model)?;
        std::fs::write(Self::build_filename(model_name), json)?;
        Ok(())
    }

    /// Replace the held model with one deserialized from
    /// `modelos/<name>.json`.
    pub fn load(&mut self, model_name: &str) -> Result<()> {
        let json = std::fs::read_to_string(Self::build_filename(model_name))?;
        self.model = serde_json::from_str(&json)?;
        Ok(())
    }

    /// The model's feature-importance vector.
    ///
    /// Returns `None` with a logged diagnostic when the model kind has no
    /// importances; this is a soft degrade, not an error.
    pub fn feature_importance(&self) -> Option<Array1<f64>> {
        match self.model.feature_importances() {
            Some(importances) => Some(importances),
            None => {
                warn!(
                    model = std::any::type_name::<M>(),
                    "model does not support feature importance analysis"
                );
                None
            }
        }
    }
}

/// Extract named columns into a row-major `Array2<f64>`, casting each Series
/// to `Float64` (nulls become 0.0).
pub(crate) fn columns_to_array2(df: &DataFrame, col_names: &[String]) -> Result<Array2<f64>> {
    let n_rows = df.height();
    let n_cols = col_names.len();

    let col_data: Vec<Vec<f64>> = col_names
        .iter()
        .map(|name| numeric_column(df, name).map(|a| a.to_vec()))
        .collect::<Result<Vec<_>>>()?;

    Ok(Array2::from_shape_fn((n_rows, n_cols), |(r, c)| {
        col_data[c][r]
    }))
}

/// Extract one column as `Array1<f64>`
pub(crate) fn numeric_column(df: &DataFrame, name: &str) -> Result<Array1<f64>> {
    let series = df
        .column(name)
        .map_err(|_| TreinoError::FeatureNotFound(name.to_string()))?;
    let series_f64 = series
        .cast(&DataType::Float64)
        .map_err(|e| TreinoError::DataError(e.to_string()))?;
    let values: Vec<f64> = series_f64
        .f64()
        .map_err(|e| TreinoError::DataError(e.to_string()))?
        .into_iter()
        .map(|v| v.unwrap_or(0.0))
        .collect();
    Ok(Array1::from_vec(values))
}

fn select_rows(x: &Array2<f64>, indices: &[usize]) -> Array2<f64> {
    Array2::from_shape_fn((indices.len(), x.ncols()), |(i, j)| x[[indices[i], j]])
}

fn select_labels(y: &Array1<f64>, indices: &[usize]) -> Array1<f64> {
    Array1::from_iter(indices.iter().map(|&i| y[i]))
}
