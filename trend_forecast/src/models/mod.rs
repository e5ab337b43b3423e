//! Forecasting models for time series data

use crate::data::TimeSeries;
use crate::error::{ForecastError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug};
use trend_math::metrics::FitAccuracy;

/// In-sample fit quality of one model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelMetrics {
    /// Mean absolute percentage error, as a fraction
    pub mape: f64,
    /// Root mean squared error
    pub rmse: f64,
    /// Mean absolute error
    pub mae: f64,
}

impl From<FitAccuracy> for ModelMetrics {
    fn from(accuracy: FitAccuracy) -> Self {
        Self {
            mape: accuracy.mape,
            rmse: accuracy.rmse,
            mae: accuracy.mae,
        }
    }
}

impl fmt::Display for ModelMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MAPE {:.2}%  RMSE {:.3}  MAE {:.3}",
            self.mape * 100.0,
            self.rmse,
            self.mae
        )
    }
}

/// Forecast produced by a single model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FitResult {
    model: String,
    timestamps: Vec<DateTime<Utc>>,
    values: Vec<f64>,
    lower_bound: Option<Vec<f64>>,
    upper_bound: Option<Vec<f64>>,
    metrics: ModelMetrics,
}

impl FitResult {
    /// Create a new point forecast
    pub fn new(
        model: &str,
        timestamps: Vec<DateTime<Utc>>,
        values: Vec<f64>,
        metrics: ModelMetrics,
    ) -> Result<Self> {
        if values.len() != timestamps.len() {
            return Err(ForecastError::fit(
                model,
                format!(
                    "Values length ({}) doesn't match timestamps length ({})",
                    values.len(),
                    timestamps.len()
                ),
            ));
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::fit(model, "forecast contains non-finite values"));
        }

        Ok(Self {
            model: model.to_string(),
            timestamps,
            values,
            lower_bound: None,
            upper_bound: None,
            metrics,
        })
    }

    /// Attach lower/upper uncertainty bounds
    pub fn with_bounds(mut self, lower: Vec<f64>, upper: Vec<f64>) -> Result<Self> {
        if lower.len() != self.values.len() || upper.len() != self.values.len() {
            return Err(ForecastError::fit(
                &self.model,
                format!(
                    "Bounds lengths ({}, {}) don't match values length ({})",
                    lower.len(),
                    upper.len(),
                    self.values.len()
                ),
            ));
        }

        self.lower_bound = Some(lower);
        self.upper_bound = Some(upper);
        Ok(self)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of periods forecasted
    pub fn horizon(&self) -> usize {
        self.values.len()
    }

    pub fn lower_bound(&self) -> Option<&[f64]> {
        self.lower_bound.as_deref()
    }

    pub fn upper_bound(&self) -> Option<&[f64]> {
        self.upper_bound.as_deref()
    }

    pub fn metrics(&self) -> ModelMetrics {
        self.metrics
    }

    pub fn mape(&self) -> f64 {
        self.metrics.mape
    }

    pub fn rmse(&self) -> f64 {
        self.metrics.rmse
    }
}

/// Common interface for forecasting models.
///
/// A model fits one series, extrapolates `horizon` daily periods past its
/// last observation and scores its own in-sample reconstruction.
pub trait ForecastModel: Debug + Send + Sync {
    /// Name the model is registered and reported under
    fn name(&self) -> &str;

    /// Fit the series and forecast `horizon` periods
    fn fit_and_forecast(&self, series: &TimeSeries, horizon: usize) -> Result<FitResult>;
}

/// Checks shared by every model before fitting
pub(crate) fn validate_input(
    model: &str,
    series: &TimeSeries,
    horizon: usize,
    min_observations: usize,
) -> Result<()> {
    if horizon == 0 {
        return Err(ForecastError::InvalidParameter(
            "Horizon must be at least 1".to_string(),
        ));
    }
    if series.len() < min_observations {
        return Err(ForecastError::InsufficientDataError {
            model: model.to_string(),
            required: min_observations,
            actual: series.len(),
        });
    }
    if series.has_non_finite() {
        return Err(ForecastError::DataError(format!(
            "{model}: series contains non-finite values"
        )));
    }
    Ok(())
}

pub mod arima;
pub mod seasonal;

pub use arima::AutoRegressiveModel;
pub use seasonal::SeasonalDecompositionModel;
