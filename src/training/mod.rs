//! Model training façade
//!
//! Splitting, fitting, evaluation, grid-search tuning, and model
//! persistence. The entry point is [`ModelTrainer`]; the supporting pieces
//! ([`KFold`], [`GridSearch`], [`classification_report`]) are usable on
//! their own.

pub mod cross_validation;
pub mod grid_search;
pub mod metrics;
mod trainer;

pub use cross_validation::{CvScores, Fold, KFold};
pub use grid_search::{GridSearch, GridSearchResult};
pub use metrics::{classification_report, ClassMetrics, ClassificationReport};
pub use trainer::{ModelTrainer, TrainTestSplit};

pub(crate) use trainer::numeric_column;
