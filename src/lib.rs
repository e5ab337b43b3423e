//! # Trend Intel
//!
//! `trend_intel` forecasts public-interest trend series and correlates them
//! with external reference series.
//!
//! ## Example
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use trend_intel::TimeSeries;
//!
//! let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
//! let values: Vec<f64> = (0..40).map(|i| 20.0 + i as f64 * 0.3).collect();
//! let series = TimeSeries::from_values(start, values);
//!
//! let prediction = trend_intel::predict(&series, 7).unwrap();
//! assert_eq!(prediction.ensemble().unwrap().values().len(), 7);
//! ```

use log::debug;

pub use trend_forecast;
pub use trend_math;

pub use trend_forecast::{
    align, CorrelationAnalyzer, CorrelationReport, EngineConfig, EnsembleCombiner, EnsembleResult,
    FitResult, ForecastEngine, ForecastError, ForecastModel, LagCorrelationRecord, ModelMetrics,
    Prediction, Result, TimeSeries,
};

/// Forecasts `horizon` days past the end of `series` with the default
/// seasonal and ARIMA models.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use trend_intel::TimeSeries;
///
/// let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
/// let series = TimeSeries::from_values(start, vec![3.0, 4.0, 6.0, 5.0]);
///
/// // Too short for ARIMA, so only the seasonal model contributes
/// let prediction = trend_intel::predict(&series, 2).unwrap();
/// assert!(prediction.failures().contains_key("arima"));
/// assert_eq!(prediction.ensemble().unwrap().weights()["seasonal"], 1.0);
/// ```
pub fn predict(series: &TimeSeries, horizon: usize) -> Result<Prediction> {
    debug!("predict: {} points, horizon {horizon}", series.len());
    ForecastEngine::default().predict(series, horizon)
}

/// Correlates `a` against `b` for every lag in `[-max_lag, max_lag]`.
///
/// # Examples
///
/// ```
/// let a: Vec<f64> = (0..30).map(|i| (i as f64 * 0.7).sin()).collect();
/// let report = trend_intel::analyze(&a, &a, 3).unwrap();
/// assert_eq!(report.best().lag, 0);
/// ```
pub fn analyze(a: &[f64], b: &[f64], max_lag: usize) -> Result<CorrelationReport> {
    debug!("analyze: {} vs {} points, max lag {max_lag}", a.len(), b.len());
    CorrelationAnalyzer::new().analyze(a, b, max_lag)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_predict_uses_both_models() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let values = (0..50).map(|i| 10.0 + (i as f64 * 0.5).cos()).collect();
        let prediction = predict(&TimeSeries::from_values(start, values), 3).unwrap();
        assert_eq!(prediction.models().len(), 2);
    }

    #[test]
    fn test_predict_rejects_zero_horizon() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let series = TimeSeries::from_values(start, vec![1.0, 2.0, 3.0]);
        assert!(matches!(
            predict(&series, 0),
            Err(ForecastError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_analyze_record_count() {
        let a: Vec<f64> = (0..25).map(|i| (i as f64).sqrt()).collect();
        let b: Vec<f64> = (0..25).map(|i| (i as f64 * 0.3).sin()).collect();
        let report = analyze(&a, &b, 4).unwrap();
        assert_eq!(report.records().len(), 9);
    }
}
