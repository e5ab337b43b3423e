//! # Trend Forecast
//!
//! Forecasting and lag-correlation analysis for public-interest time series.
//!
//! ## Features
//!
//! - Daily time series handling with CSV ingestion and seeded synthetic
//!   reference series
//! - Forecasting models (seasonal decomposition with uncertainty bounds,
//!   ARIMA) behind one [`ForecastModel`] trait
//! - Inverse-MAPE weighted ensemble of every model that fits
//! - Lag sweep with Pearson and Spearman correlation and a plain-language
//!   interpretation of the strongest lag
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use trend_forecast::{CorrelationAnalyzer, ForecastEngine, TimeSeries};
//!
//! let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
//! let interest: Vec<f64> = (0..60).map(|i| 40.0 + (i as f64 * 0.4).sin() * 5.0).collect();
//! let series = TimeSeries::from_values(start, interest);
//!
//! // Forecast the next two weeks
//! let prediction = ForecastEngine::default().predict(&series, 14)?;
//! let ensemble = prediction.ensemble().expect("both models fit 60 points");
//! assert_eq!(ensemble.values().len(), 14);
//!
//! // Correlate against a reproducible reference series
//! let reference = TimeSeries::synthetic(42, start, 60, 50.0, 10.0)?;
//! let report = CorrelationAnalyzer::new().analyze_series(&series, &reference, 7)?;
//! assert_eq!(report.records().len(), 15);
//! # Ok::<(), trend_forecast::ForecastError>(())
//! ```

pub mod alignment;
pub mod config;
pub mod correlation;
pub mod data;
pub mod engine;
pub mod ensemble;
pub mod error;
pub mod models;
pub mod utils;

// Re-export commonly used types
pub use crate::alignment::align;
pub use crate::config::EngineConfig;
pub use crate::correlation::{CorrelationAnalyzer, CorrelationReport, LagCorrelationRecord};
pub use crate::data::TimeSeries;
pub use crate::engine::{ForecastEngine, Prediction};
pub use crate::ensemble::{EnsembleCombiner, EnsembleResult};
pub use crate::error::{ForecastError, Result};
pub use crate::models::{
    AutoRegressiveModel, FitResult, ForecastModel, ModelMetrics, SeasonalDecompositionModel,
};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
