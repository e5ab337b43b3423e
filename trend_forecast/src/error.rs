//! Error types for the trend_forecast crate

use thiserror::Error;
use trend_math::MathError;

/// Custom error types for the trend_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Invalid or insufficient input series
    #[error("Data error: {0}")]
    DataError(String),

    /// Model-specific fitting failure
    #[error("Fit error in {model}: {reason}")]
    FitError { model: String, reason: String },

    /// Series shorter than a model's minimum order
    #[error("Insufficient data for {model}: need at least {required} observations, got {actual}")]
    InsufficientDataError {
        model: String,
        required: usize,
        actual: usize,
    },

    /// Lag exceeds the overlap of the two series
    #[error("Alignment error: lag {lag} leaves no overlap between series of lengths {len_a} and {len_b}")]
    AlignmentError { lag: i64, len_a: usize, len_b: usize },

    /// No forecasts could be combined
    #[error("Ensemble error: {0}")]
    EnsembleError(String),

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error from configuration loading or validation
    #[error("Config error: {0}")]
    ConfigError(String),

    /// Error from numeric kernels
    #[error("Math error: {0}")]
    MathError(#[from] MathError),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from CSV parsing
    #[error("CSV error: {0}")]
    CsvError(String),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<csv::Error> for ForecastError {
    fn from(err: csv::Error) -> Self {
        ForecastError::CsvError(err.to_string())
    }
}

impl From<serde_json::Error> for ForecastError {
    fn from(err: serde_json::Error) -> Self {
        ForecastError::ConfigError(err.to_string())
    }
}

impl ForecastError {
    /// Wrap a numeric failure as a fit failure of the named model
    pub(crate) fn fit(model: &str, reason: impl std::fmt::Display) -> Self {
        ForecastError::FitError {
            model: model.to_string(),
            reason: reason.to_string(),
        }
    }
}
