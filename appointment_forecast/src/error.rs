//! Error types for the appointment_forecast crate

use appointment_math::MathError;
use thiserror::Error;

/// Custom error types for the appointment_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Error related to the shape or content of input data
    #[error("Data error: {0}")]
    DataError(String),

    /// Error related to data validation
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Error raised while fitting or running a model
    #[error("Model error: {0}")]
    ModelError(String),

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error in the run configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Error while drawing a chart
    #[error("Chart error: {0}")]
    ChartError(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from CSV reading or writing
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// Error from JSON configuration parsing
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Error from the numerical core
    #[error("Math error: {0}")]
    MathError(#[from] MathError),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;
