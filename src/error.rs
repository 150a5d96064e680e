//! Error types for the attrition pipeline

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, AttritionError>;

/// Main error type for the pipeline and the dashboard context
#[derive(Error, Debug)]
pub enum AttritionError {
    #[error("Data error: {0}")]
    DataError(String),

    #[error("Preprocessing error: {0}")]
    PreprocessingError(String),

    #[error("Training error: {0}")]
    TrainingError(String),

    #[error("Inference error: {0}")]
    InferenceError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Feature not found: {0}")]
    FeatureNotFound(String),

    #[error("Unknown value {value:?} in target column {column} at row {row}")]
    UnknownTargetLabel {
        column: String,
        row: usize,
        value: Option<String>,
    },

    #[error("Schema mismatch: record is missing column {0}")]
    SchemaMismatch(String),

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<polars::error::PolarsError> for AttritionError {
    fn from(err: polars::error::PolarsError) -> Self {
        AttritionError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for AttritionError {
    fn from(err: serde_json::Error) -> Self {
        AttritionError::SerializationError(err.to_string())
    }
}

impl From<bincode::Error> for AttritionError {
    fn from(err: bincode::Error) -> Self {
        AttritionError::SerializationError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for AttritionError {
    fn from(err: ndarray::ShapeError) -> Self {
        AttritionError::ShapeError {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}
