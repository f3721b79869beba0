//! Treino - tabular data analysis and model training toolkit
//!
//! This crate covers the everyday loop of working with a CSV dataset:
//! load it, look at it, fit a classifier, evaluate and persist it.
//!
//! # Modules
//!
//! - [`data`] - CSV loading and saving on top of polars
//! - [`visualization`] - SVG charts (line, count, histogram, bar, box,
//!   scatter, correlation heatmap)
//! - [`models`] - [`models::Estimator`] trait, decision tree and k-NN
//!   classifiers, parameter grids
//! - [`training`] - train/test splitting, cross-validated grid search,
//!   classification metrics, model persistence
//! - [`error`] - crate-wide error type

pub mod data;
pub mod error;
pub mod models;
pub mod training;
pub mod visualization;

pub use error::{Result, TreinoError};

/// Re-export commonly used types
pub mod prelude {
    // Error handling
    pub use crate::error::{Result, TreinoError};

    // Data I/O
    pub use crate::data::{load_data, save_data, DataLoader};

    // Models
    pub use crate::models::{
        DecisionTreeClassifier, Estimator, KnnClassifier, ParamGrid, ParamValue,
    };

    // Training
    pub use crate::training::{
        classification_report, ClassificationReport, CvScores, GridSearch, KFold, ModelTrainer,
        TrainTestSplit,
    };

    // Visualization
    pub use crate::visualization::{freedman_diaconis_bins, PlotConfig};
}
