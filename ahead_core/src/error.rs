//! Error types for the ahead_core crate

use polars::prelude::PolarsError;
use thiserror::Error;

/// Custom error types for the ahead crates
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Error related to data validation or processing
    #[error("Data error: {0}")]
    DataError(String),

    /// Error related to parameter validation
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The input dates are not regular enough to infer a sampling frequency
    #[error("Frequency inference error: {0}")]
    FrequencyInference(String),

    /// A frequency code was not found in strict lookup mode
    #[error("Unknown frequency code: {0}")]
    UnknownFrequency(String),

    /// A buffer returned by the engine does not have the expected length
    #[error("Shape mismatch for {what}: expected {expected}, got {got}")]
    ShapeMismatch {
        what: String,
        expected: usize,
        got: usize,
    },

    /// A required field is absent from the engine output
    #[error("Missing output field: {0}")]
    MissingOutputField(String),

    /// The forecast engine itself failed; the message is kept as reported
    #[error("{0}")]
    EngineInvocation(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from Polars operations
    #[error("Polars error: {0}")]
    PolarsError(String),

    /// Error from parsing dates or numbers
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Error from (de)serializing configuration
    #[error("Serde error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<PolarsError> for ForecastError {
    fn from(err: PolarsError) -> Self {
        ForecastError::PolarsError(err.to_string())
    }
}

impl From<chrono::ParseError> for ForecastError {
    fn from(err: chrono::ParseError) -> Self {
        ForecastError::ParseError(err.to_string())
    }
}

impl From<std::num::ParseIntError> for ForecastError {
    fn from(err: std::num::ParseIntError) -> Self {
        ForecastError::ParseError(err.to_string())
    }
}

impl ForecastError {
    /// Shorthand for [`ForecastError::ShapeMismatch`]
    pub fn shape(what: impl Into<String>, expected: usize, got: usize) -> Self {
        ForecastError::ShapeMismatch {
            what: what.into(),
            expected,
            got,
        }
    }
}
