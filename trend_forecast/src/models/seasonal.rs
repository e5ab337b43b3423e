//! Additive trend + seasonality decomposition model
//!
//! The series is modelled as
//!
//! ```text
//! y(t) = m + k·t + Σ δⱼ·(t − cⱼ)₊ + Σ seasonal Fourier terms + noise
//! ```
//!
//! where `cⱼ` are changepoints spread over the early part of the history.
//! The slope deltas `δⱼ` carry a Gaussian prior whose scale is the
//! changepoint prior scale, so the maximum a posteriori fit is a ridge
//! regression. Small prior scales give a stiff trend; large ones let the
//! trend bend at every changepoint.

use crate::config::SeasonalConfig;
use crate::data::{days_between, TimeSeries};
use crate::error::{ForecastError, Result};
use crate::models::{validate_input, FitResult, ForecastModel, ModelMetrics};
use crate::utils::future_timestamps;
use chrono::{DateTime, Utc};
use log::debug;
use statrs::distribution::{ContinuousCDF, Normal};
use std::f64::consts::PI;
use trend_math::metrics::fit_accuracy;
use trend_math::regression::{apply_coefficients, ridge_least_squares, LinearRegression};

const WEEKLY_PERIOD_DAYS: f64 = 7.0;
const YEARLY_PERIOD_DAYS: f64 = 365.25;
const DAILY_PERIOD_DAYS: f64 = 1.0;
const DAILY_FOURIER_ORDER: usize = 4;
/// Lower bound on the noise variance of the scaled series
const MIN_NOISE_VARIANCE: f64 = 1e-4;

/// Fourier-encoded periodic component
#[derive(Debug, Clone, Copy, PartialEq)]
struct SeasonalComponent {
    period_days: f64,
    order: usize,
}

/// Everything needed to evaluate the fitted curve at arbitrary times
#[derive(Debug, Clone)]
struct FittedCurve {
    first: DateTime<Utc>,
    span_days: f64,
    scale: f64,
    changepoints: Vec<f64>,
    components: Vec<SeasonalComponent>,
    coefficients: Vec<f64>,
}

impl FittedCurve {
    fn design_row(&self, timestamp: DateTime<Utc>) -> Vec<f64> {
        let t = days_between(self.first, timestamp) / self.span_days;
        let mut row = Vec::with_capacity(2 + self.changepoints.len());
        row.push(1.0);
        row.push(t);
        row.extend(self.changepoints.iter().map(|c| (t - c).max(0.0)));

        let epoch_days = timestamp.timestamp() as f64 / 86_400.0;
        for component in &self.components {
            for k in 1..=component.order {
                let angle = 2.0 * PI * k as f64 * epoch_days / component.period_days;
                row.push(angle.sin());
                row.push(angle.cos());
            }
        }
        row
    }

    fn evaluate(&self, timestamps: &[DateTime<Utc>]) -> Vec<f64> {
        let design: Vec<Vec<f64>> = timestamps.iter().map(|t| self.design_row(*t)).collect();
        apply_coefficients(&design, &self.coefficients)
            .into_iter()
            .map(|v| v * self.scale)
            .collect()
    }
}

/// Seasonal decomposition forecaster with uncertainty bounds
#[derive(Debug, Clone)]
pub struct SeasonalDecompositionModel {
    /// Name of the model
    name: String,
    config: SeasonalConfig,
}

impl Default for SeasonalDecompositionModel {
    fn default() -> Self {
        Self {
            name: "seasonal".to_string(),
            config: SeasonalConfig::default(),
        }
    }
}

impl SeasonalDecompositionModel {
    /// Create a new model from its settings
    pub fn new(config: SeasonalConfig) -> Result<Self> {
        if !(config.changepoint_prior_scale > 0.0) {
            return Err(ForecastError::InvalidParameter(
                "Changepoint prior scale must be positive".to_string(),
            ));
        }
        if !(config.seasonality_prior_scale > 0.0) {
            return Err(ForecastError::InvalidParameter(
                "Seasonality prior scale must be positive".to_string(),
            ));
        }
        if !(config.interval_width > 0.0 && config.interval_width < 1.0) {
            return Err(ForecastError::InvalidParameter(
                "Interval width must be between 0 and 1".to_string(),
            ));
        }
        if !(config.changepoint_range > 0.0 && config.changepoint_range <= 1.0) {
            return Err(ForecastError::InvalidParameter(
                "Changepoint range must be in (0, 1]".to_string(),
            ));
        }

        Ok(Self {
            config,
            ..Self::default()
        })
    }

    pub fn config(&self) -> &SeasonalConfig {
        &self.config
    }

    /// Changepoint locations on the scaled [0, 1] time axis
    fn changepoints(&self, scaled_times: &[f64]) -> Vec<f64> {
        let history = (scaled_times.len() as f64 * self.config.changepoint_range).floor() as usize;
        let count = self.config.n_changepoints.min(history.saturating_sub(1));
        if count == 0 {
            return Vec::new();
        }

        (1..=count)
            .map(|i| {
                let idx = (i as f64 * (history - 1) as f64 / count as f64).round() as usize;
                scaled_times[idx]
            })
            .collect()
    }

    /// Seasonal components enabled and identifiable over the history.
    ///
    /// A component is only fitted once the history covers a full period.
    fn components(&self, span_days: f64) -> Vec<SeasonalComponent> {
        let candidates = [
            (
                self.config.yearly_seasonality,
                YEARLY_PERIOD_DAYS,
                self.config.yearly_fourier_order,
            ),
            (
                self.config.weekly_seasonality,
                WEEKLY_PERIOD_DAYS,
                self.config.weekly_fourier_order,
            ),
            (
                self.config.daily_seasonality,
                DAILY_PERIOD_DAYS,
                DAILY_FOURIER_ORDER,
            ),
        ];

        candidates
            .iter()
            .filter(|(enabled, period, order)| *enabled && *order > 0 && span_days >= *period)
            .map(|&(_, period_days, order)| SeasonalComponent { period_days, order })
            .collect()
    }

    /// Two-sided standard normal quantile for the interval width
    fn interval_z(&self) -> Result<f64> {
        let normal = Normal::new(0.0, 1.0).map_err(|e| ForecastError::fit(&self.name, e))?;
        Ok(normal.inverse_cdf(0.5 + self.config.interval_width / 2.0))
    }

    fn fit(&self, series: &TimeSeries) -> Result<FittedCurve> {
        let values = series.values();
        let timestamps = series.timestamps();
        let first = timestamps[0];
        let elapsed = series.elapsed_days();
        let span_days = elapsed[elapsed.len() - 1];

        let scale = values.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
        let scale = if scale > 0.0 { scale } else { 1.0 };
        let scaled: Vec<f64> = values.iter().map(|v| v / scale).collect();
        let scaled_times: Vec<f64> = elapsed.iter().map(|d| d / span_days).collect();

        // Noise level from a plain linear trend sets the prior strength
        let baseline = LinearRegression::fit(&scaled_times, &scaled)
            .map_err(|e| ForecastError::fit(&self.name, e))?;
        let noise_variance =
            trend_math::variance(&baseline.residuals(&scaled_times, &scaled)).max(MIN_NOISE_VARIANCE);

        let mut curve = FittedCurve {
            first,
            span_days,
            scale,
            changepoints: self.changepoints(&scaled_times),
            components: self.components(span_days),
            coefficients: Vec::new(),
        };

        let design: Vec<Vec<f64>> = timestamps.iter().map(|t| curve.design_row(*t)).collect();
        let delta_penalty = noise_variance / self.config.changepoint_prior_scale.powi(2);
        let seasonal_penalty = noise_variance / self.config.seasonality_prior_scale.powi(2);
        let seasonal_columns: usize = curve.components.iter().map(|c| 2 * c.order).sum();

        let mut penalties = vec![0.0, 0.0];
        penalties.extend(std::iter::repeat(delta_penalty).take(curve.changepoints.len()));
        penalties.extend(std::iter::repeat(seasonal_penalty).take(seasonal_columns));

        curve.coefficients = ridge_least_squares(&design, &scaled, &penalties)
            .map_err(|e| ForecastError::fit(&self.name, e))?;

        debug!(
            "{}: {} changepoints, {} seasonal columns, noise variance {:.6}",
            self.name,
            curve.changepoints.len(),
            seasonal_columns,
            noise_variance
        );
        Ok(curve)
    }
}

impl ForecastModel for SeasonalDecompositionModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn fit_and_forecast(&self, series: &TimeSeries, horizon: usize) -> Result<FitResult> {
        validate_input(&self.name, series, horizon, 2)?;

        let curve = self.fit(series)?;
        let fitted = curve.evaluate(series.timestamps());
        let actual = series.values();
        let metrics = ModelMetrics::from(fit_accuracy(actual, &fitted)?);

        let last_timestamp = series
            .last_timestamp()
            .ok_or_else(|| ForecastError::DataError("Empty time series data".to_string()))?;
        let timestamps = future_timestamps(last_timestamp, horizon);
        let values = curve.evaluate(&timestamps);

        // Spread widens with distance from the training range
        let z = self.interval_z()?;
        let n = series.len() as f64;
        let (lower, upper): (Vec<f64>, Vec<f64>) = values
            .iter()
            .enumerate()
            .map(|(k, v)| {
                let margin = z * metrics.rmse * (1.0 + (k + 1) as f64 / n).sqrt();
                (v - margin, v + margin)
            })
            .unzip();

        FitResult::new(&self.name, timestamps, values, metrics)?.with_bounds(lower, upper)
    }
}
