//! Error types for the biobeat pipeline

use thiserror::Error;

/// Result type alias for biobeat operations
pub type Result<T> = std::result::Result<T, BiobeatError>;

/// Main error type for the biobeat pipeline
#[derive(Error, Debug)]
pub enum BiobeatError {
    #[error("Data error: {0}")]
    DataError(String),

    #[error("Preprocessing error: {0}")]
    PreprocessingError(String),

    #[error("Training error: {0}")]
    TrainingError(String),

    #[error("Blending error: {0}")]
    BlendingError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Computation error: {0}")]
    ComputationError(String),

    #[error("Feature not found: {0}")]
    FeatureNotFound(String),

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },
}

impl From<polars::error::PolarsError> for BiobeatError {
    fn from(err: polars::error::PolarsError) -> Self {
        BiobeatError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for BiobeatError {
    fn from(err: serde_json::Error) -> Self {
        BiobeatError::SerializationError(err.to_string())
    }
}
