//! ARIMA models for time series forecasting
//!
//! The autoregressive part is estimated from the Yule-Walker equations
//! (Levinson-Durbin recursion) on the differenced series, the moving
//! average part from the autocorrelation of the AR residuals.

use crate::config::ArimaConfig;
use crate::data::TimeSeries;
use crate::error::{ForecastError, Result};
use crate::models::{validate_input, FitResult, ForecastModel, ModelMetrics};
use crate::utils::future_timestamps;
use log::debug;
use trend_math::metrics::fit_accuracy;

const VARIANCE_EPSILON: f64 = 1e-12;
const MA_COEFFICIENT_BOUND: f64 = 0.99;

/// ARIMA model (AutoRegressive Integrated Moving Average)
#[derive(Debug, Clone)]
pub struct AutoRegressiveModel {
    /// Name of the model
    name: String,
    /// AR order (p)
    p: usize,
    /// Differencing order (d)
    d: usize,
    /// MA order (q)
    q: usize,
}

/// Coefficients estimated on the differenced series
#[derive(Debug, Clone)]
struct ArmaFit {
    mean: f64,
    ar: Vec<f64>,
    ma: Vec<f64>,
    /// One-step-ahead innovations, one per differenced point
    innovations: Vec<f64>,
}

impl Default for AutoRegressiveModel {
    fn default() -> Self {
        Self {
            name: "arima".to_string(),
            p: 5,
            d: 1,
            q: 2,
        }
    }
}

impl AutoRegressiveModel {
    /// Create a new ARIMA(p, d, q) model
    pub fn new(p: usize, d: usize, q: usize) -> Result<Self> {
        if p > 10 {
            return Err(ForecastError::InvalidParameter(
                "AR order must be <= 10".to_string(),
            ));
        }
        if d > 2 {
            return Err(ForecastError::InvalidParameter(
                "Differencing order must be <= 2".to_string(),
            ));
        }
        if q > 10 {
            return Err(ForecastError::InvalidParameter(
                "MA order must be <= 10".to_string(),
            ));
        }

        Ok(Self {
            p,
            d,
            q,
            ..Self::default()
        })
    }

    pub fn from_config(config: &ArimaConfig) -> Result<Self> {
        Self::new(config.p, config.d, config.q)
    }

    /// Order as (p, d, q)
    pub fn order(&self) -> (usize, usize, usize) {
        (self.p, self.d, self.q)
    }

    /// Fewest observations the model accepts
    pub fn min_observations(&self) -> usize {
        self.p + self.d + self.q
    }

    fn difference(data: &[f64]) -> Vec<f64> {
        data.windows(2).map(|w| w[1] - w[0]).collect()
    }

    /// Biased autocovariances of a centered series for lags `0..=max_lag`
    fn autocovariances(centered: &[f64], max_lag: usize) -> Vec<f64> {
        let n = centered.len();
        (0..=max_lag)
            .map(|k| {
                if k >= n {
                    return 0.0;
                }
                let sum: f64 = (k..n).map(|i| centered[i] * centered[i - k]).sum();
                sum / n as f64
            })
            .collect()
    }

    /// Solve the Yule-Walker equations by Levinson-Durbin recursion
    fn estimate_ar_coefficients(&self, autocov: &[f64]) -> Result<Vec<f64>> {
        let mut coeffs = vec![0.0; self.p];
        if self.p == 0 || autocov[0] <= VARIANCE_EPSILON {
            return Ok(coeffs);
        }

        let mut error = autocov[0];
        for k in 0..self.p {
            if error <= autocov[0] * VARIANCE_EPSILON {
                // Remaining lags carry no information
                break;
            }

            let acc = autocov[k + 1] - (0..k).map(|j| coeffs[j] * autocov[k - j]).sum::<f64>();
            let reflection = acc / error;
            if !reflection.is_finite() || reflection.abs() >= 1.0 {
                return Err(ForecastError::fit(
                    &self.name,
                    format!("AR estimation did not converge at lag {} (reflection {reflection})", k + 1),
                ));
            }

            let previous = coeffs.clone();
            coeffs[k] = reflection;
            for j in 0..k {
                coeffs[j] = previous[j] - reflection * previous[k - 1 - j];
            }
            error *= 1.0 - reflection * reflection;
        }

        Ok(coeffs)
    }

    /// Estimate MA coefficients from the autocorrelation of AR residuals
    fn estimate_ma_coefficients(&self, residuals: &[f64]) -> Result<Vec<f64>> {
        if self.q == 0 || residuals.is_empty() {
            return Ok(vec![0.0; self.q]);
        }

        let mean = trend_math::mean(residuals);
        let centered: Vec<f64> = residuals.iter().map(|r| r - mean).collect();
        let autocov = Self::autocovariances(&centered, self.q);

        if autocov[0] <= VARIANCE_EPSILON {
            return Ok(vec![0.0; self.q]);
        }
        let ma: Vec<f64> = autocov[1..]
            .iter()
            .map(|c| (c / autocov[0]).clamp(-MA_COEFFICIENT_BOUND, MA_COEFFICIENT_BOUND))
            .collect();

        if !is_invertible(&ma) {
            return Err(ForecastError::fit(
                &self.name,
                format!("non-invertible MA coefficients {ma:?}"),
            ));
        }
        Ok(ma)
    }

    /// One-step-ahead prediction of the next differenced value
    fn step(fit: &ArmaFit, history: &[f64], innovations: &[f64]) -> f64 {
        let mut prediction = fit.mean;
        for (j, phi) in fit.ar.iter().enumerate() {
            if let Some(idx) = history.len().checked_sub(j + 1) {
                prediction += phi * (history[idx] - fit.mean);
            }
        }
        for (j, theta) in fit.ma.iter().enumerate() {
            if let Some(idx) = innovations.len().checked_sub(j + 1) {
                prediction += theta * innovations[idx];
            }
        }
        prediction
    }

    fn fit_arma(&self, differenced: &[f64]) -> Result<ArmaFit> {
        let mean = trend_math::mean(differenced);
        let centered: Vec<f64> = differenced.iter().map(|w| w - mean).collect();

        let autocov = Self::autocovariances(&centered, self.p);
        let ar = self.estimate_ar_coefficients(&autocov)?;

        let ar_residuals: Vec<f64> = (self.p..centered.len())
            .map(|t| {
                centered[t] - (0..self.p).map(|j| ar[j] * centered[t - j - 1]).sum::<f64>()
            })
            .collect();
        let ma = self.estimate_ma_coefficients(&ar_residuals)?;

        let mut fit = ArmaFit {
            mean,
            ar,
            ma,
            innovations: Vec::with_capacity(differenced.len()),
        };
        for t in 0..differenced.len() {
            let predicted = Self::step(&fit, &differenced[..t], &fit.innovations);
            fit.innovations.push(differenced[t] - predicted);
        }

        if fit.innovations.iter().any(|e| !e.is_finite()) {
            return Err(ForecastError::fit(&self.name, "in-sample fit diverged"));
        }
        Ok(fit)
    }

    /// Forecast `horizon` values on the differenced scale
    fn forecast_differenced(fit: &ArmaFit, differenced: &[f64], horizon: usize) -> Vec<f64> {
        let mut history = differenced.to_vec();
        let mut innovations = fit.innovations.clone();

        for _ in 0..horizon {
            let next = Self::step(fit, &history, &innovations);
            history.push(next);
            // Future shocks have zero expectation
            innovations.push(0.0);
        }

        history.split_off(differenced.len())
    }
}

/// Whether `1 + θ₁z + … + θ_q z^q` has all its roots outside the unit
/// circle, by the Schur-Cohn step-down recursion.
fn is_invertible(theta: &[f64]) -> bool {
    let mut poly: Vec<f64> = std::iter::once(1.0).chain(theta.iter().copied()).collect();
    while poly.len() > 1 {
        let m = poly.len() - 1;
        let k = poly[m];
        if !k.is_finite() || k.abs() >= 1.0 {
            return false;
        }
        let scale = 1.0 - k * k;
        poly = (0..m).map(|i| (poly[i] - k * poly[m - i]) / scale).collect();
    }
    true
}

impl ForecastModel for AutoRegressiveModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn fit_and_forecast(&self, series: &TimeSeries, horizon: usize) -> Result<FitResult> {
        validate_input(&self.name, series, horizon, self.min_observations())?;
        let values = series.values();

        // levels[k] holds the k-times differenced series
        let mut levels = vec![values.to_vec()];
        for k in 0..self.d {
            let next = Self::difference(&levels[k]);
            levels.push(next);
        }
        let differenced = &levels[self.d];

        let fit = self.fit_arma(differenced)?;
        debug!(
            "{}: mean={:.4} ar={:?} ma={:?}",
            self.name, fit.mean, fit.ar, fit.ma
        );

        // The first d observations have no fitted counterpart
        let actual = &values[self.d..];
        let fitted: Vec<f64> = actual
            .iter()
            .zip(&fit.innovations)
            .map(|(y, e)| y - e)
            .collect();
        let metrics = ModelMetrics::from(fit_accuracy(actual, &fitted)?);

        let mut forecast = Self::forecast_differenced(&fit, differenced, horizon);
        for level in levels[..self.d].iter().rev() {
            let mut last = level.last().copied().unwrap_or_default();
            for value in forecast.iter_mut() {
                last += *value;
                *value = last;
            }
        }

        let last_timestamp = series
            .last_timestamp()
            .ok_or_else(|| ForecastError::DataError("Empty time series data".to_string()))?;
        FitResult::new(
            &self.name,
            future_timestamps(last_timestamp, horizon),
            forecast,
            metrics,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::parse_timestamp;

    fn series(values: Vec<f64>) -> TimeSeries {
        TimeSeries::from_values(parse_timestamp("2024-01-01").unwrap(), values)
    }

    #[test]
    fn test_arima_creation() {
        assert!(AutoRegressiveModel::new(1, 1, 1).is_ok());
        assert!(AutoRegressiveModel::new(11, 0, 0).is_err());
        assert!(AutoRegressiveModel::new(1, 3, 0).is_err());
        assert_eq!(AutoRegressiveModel::default().order(), (5, 1, 2));
        assert_eq!(AutoRegressiveModel::default().min_observations(), 8);
    }

    #[test]
    fn test_linear_series_continues_drift() {
        let model = AutoRegressiveModel::default();
        let data: Vec<f64> = (1..=40).map(|x| x as f64).collect();
        let result = model.fit_and_forecast(&series(data), 3).unwrap();

        assert_eq!(result.values().len(), 3);
        for (i, v) in result.values().iter().enumerate() {
            assert!((v - (41 + i) as f64).abs() < 1e-9);
        }
        assert!(result.mape() < 1e-9);
        assert!(result.lower_bound().is_none());
        assert!(result.upper_bound().is_none());
    }

    #[test]
    fn test_oscillating_series_fits() {
        let model = AutoRegressiveModel::default();
        let data: Vec<f64> = (0..120)
            .map(|x| 50.0 + 0.2 * x as f64 + 5.0 * (x as f64 * 0.7).sin())
            .collect();
        let result = model.fit_and_forecast(&series(data), 10).unwrap();

        assert_eq!(result.horizon(), 10);
        assert!(result.values().iter().all(|v| v.is_finite()));
        assert!(result.mape().is_finite() && result.mape() >= 0.0);
        assert!(result.rmse().is_finite() && result.rmse() >= 0.0);
    }

    #[test]
    fn test_levinson_durbin_ar1() {
        // For AR(1) the only coefficient is rho(1)
        let model = AutoRegressiveModel::new(1, 0, 0).unwrap();
        let autocov = [2.0, 1.0];
        let coeffs = model.estimate_ar_coefficients(&autocov).unwrap();
        assert!((coeffs[0] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_insufficient_data() {
        let model = AutoRegressiveModel::default();
        let result = model.fit_and_forecast(&series(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]), 5);
        assert!(matches!(
            result,
            Err(ForecastError::InsufficientDataError {
                required: 8,
                actual: 6,
                ..
            })
        ));

        let data: Vec<f64> = (0..8).map(|x| 10.0 + x as f64 + (x % 3) as f64).collect();
        assert!(model.fit_and_forecast(&series(data), 2).is_ok());
    }

    #[test]
    fn test_ma_invertibility() {
        assert!(is_invertible(&[]));
        assert!(is_invertible(&[0.5, 0.2]));
        assert!(is_invertible(&[-0.4, 0.3]));
        // θ₁ + θ₂ < -1
        assert!(!is_invertible(&[-0.6, -0.6]));
        // θ₂ - θ₁ < -1
        assert!(!is_invertible(&[0.7, -0.5]));
        assert!(!is_invertible(&[0.0, 1.0]));
    }

    #[test]
    fn test_non_invertible_ma_is_fit_error() {
        // A pure cosine with cos(ω) = -0.25 has ρ₁ + ρ₂ ≈ -1.125
        let model = AutoRegressiveModel::new(0, 0, 2).unwrap();
        let omega = (-0.25_f64).acos();
        let residuals: Vec<f64> = (0..200).map(|t| (t as f64 * omega).cos()).collect();
        let result = model.estimate_ma_coefficients(&residuals);
        assert!(matches!(result, Err(ForecastError::FitError { .. })));
    }

    #[test]
    fn test_non_finite_input() {
        let model = AutoRegressiveModel::default();
        let mut data: Vec<f64> = (0..20).map(|x| x as f64).collect();
        data[7] = f64::NAN;
        let result = model.fit_and_forecast(&series(data), 5);
        assert!(matches!(result, Err(ForecastError::DataError(_))));
    }
}
