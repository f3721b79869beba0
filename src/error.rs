//! Error types for the treino crate

use thiserror::Error;

/// Result type alias for treino operations
pub type Result<T> = std::result::Result<T, TreinoError>;

/// Main error type for the crate
#[derive(Error, Debug)]
pub enum TreinoError {
    #[error("Data error: {0}")]
    DataError(String),

    #[error("Training error: {0}")]
    TrainingError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Plot error: {0}")]
    PlotError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Column not found: {0}")]
    FeatureNotFound(String),

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("Data not split: call split_data first")]
    DataNotSplit,

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Invalid parameter: {name} = {value}, {reason}")]
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },
}

impl From<polars::error::PolarsError> for TreinoError {
    fn from(err: polars::error::PolarsError) -> Self {
        TreinoError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for TreinoError {
    fn from(err: serde_json::Error) -> Self {
        TreinoError::SerializationError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for TreinoError {
    fn from(err: ndarray::ShapeError) -> Self {
        TreinoError::ShapeError {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}
