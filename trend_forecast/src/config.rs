//! Engine configuration
//!
//! Every section deserializes with defaults, so a partial JSON document
//! only overrides the fields it names.

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings for the seasonal decomposition model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeasonalConfig {
    pub weekly_seasonality: bool,
    pub yearly_seasonality: bool,
    pub daily_seasonality: bool,
    /// Trend flexibility: larger values let the slope change more freely
    pub changepoint_prior_scale: f64,
    pub seasonality_prior_scale: f64,
    pub n_changepoints: usize,
    /// Share of the history in which changepoints may be placed
    pub changepoint_range: f64,
    pub weekly_fourier_order: usize,
    pub yearly_fourier_order: usize,
    /// Coverage of the lower/upper uncertainty bounds
    pub interval_width: f64,
}

impl Default for SeasonalConfig {
    fn default() -> Self {
        Self {
            weekly_seasonality: true,
            yearly_seasonality: true,
            daily_seasonality: false,
            changepoint_prior_scale: 0.05,
            seasonality_prior_scale: 10.0,
            n_changepoints: 25,
            changepoint_range: 0.8,
            weekly_fourier_order: 3,
            yearly_fourier_order: 10,
            interval_width: 0.8,
        }
    }
}

/// ARIMA(p, d, q) order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArimaConfig {
    pub p: usize,
    pub d: usize,
    pub q: usize,
}

impl Default for ArimaConfig {
    fn default() -> Self {
        Self { p: 5, d: 1, q: 2 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnsembleConfig {
    /// Added to each MAPE before inversion
    pub epsilon: f64,
}

impl Default for EnsembleConfig {
    fn default() -> Self {
        Self { epsilon: 0.01 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrelationConfig {
    pub max_lag: usize,
}

impl Default for CorrelationConfig {
    fn default() -> Self {
        Self { max_lag: 30 }
    }
}

/// Top-level configuration for forecasting and correlation analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Forecast periods used when the caller doesn't pick one
    pub default_horizon: usize,
    /// Fan model fits and lag evaluations out over the rayon pool
    pub parallel: bool,
    pub seasonal: SeasonalConfig,
    pub arima: ArimaConfig,
    pub ensemble: EnsembleConfig,
    pub correlation: CorrelationConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_horizon: 30,
            parallel: true,
            seasonal: SeasonalConfig::default(),
            arima: ArimaConfig::default(),
            ensemble: EnsembleConfig::default(),
            correlation: CorrelationConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<()> {
        if self.default_horizon == 0 {
            return Err(ForecastError::ConfigError(
                "default_horizon must be positive".to_string(),
            ));
        }

        let s = &self.seasonal;
        if !(s.changepoint_prior_scale > 0.0) || !s.changepoint_prior_scale.is_finite() {
            return Err(ForecastError::ConfigError(
                "changepoint_prior_scale must be positive".to_string(),
            ));
        }
        if !(s.seasonality_prior_scale > 0.0) || !s.seasonality_prior_scale.is_finite() {
            return Err(ForecastError::ConfigError(
                "seasonality_prior_scale must be positive".to_string(),
            ));
        }
        if !(s.interval_width > 0.0 && s.interval_width < 1.0) {
            return Err(ForecastError::ConfigError(
                "interval_width must be between 0 and 1".to_string(),
            ));
        }
        if !(s.changepoint_range > 0.0 && s.changepoint_range <= 1.0) {
            return Err(ForecastError::ConfigError(
                "changepoint_range must be in (0, 1]".to_string(),
            ));
        }

        if !(self.ensemble.epsilon > 0.0) || !self.ensemble.epsilon.is_finite() {
            return Err(ForecastError::ConfigError(
                "ensemble epsilon must be positive".to_string(),
            ));
        }

        Ok(())
    }
}
