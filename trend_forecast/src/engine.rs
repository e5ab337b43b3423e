//! Forecast orchestration
//!
//! The engine runs every registered model against the same series,
//! keeps the successes, records the failures and hands the successes to
//! the ensemble combiner.

use crate::config::EngineConfig;
use crate::data::TimeSeries;
use crate::ensemble::{EnsembleCombiner, EnsembleResult};
use crate::error::{ForecastError, Result};
use crate::models::{
    AutoRegressiveModel, FitResult, ForecastModel, ModelMetrics, SeasonalDecompositionModel,
};
use log::{info, warn};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;

/// Outcome of one `predict` call
#[derive(Debug)]
pub struct Prediction {
    models: BTreeMap<String, FitResult>,
    failures: BTreeMap<String, ForecastError>,
    ensemble: Option<EnsembleResult>,
}

#[derive(Serialize)]
struct PredictionView<'a> {
    models: &'a BTreeMap<String, FitResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ensemble: Option<&'a EnsembleResult>,
    failures: BTreeMap<String, String>,
    metrics: BTreeMap<String, ModelMetrics>,
}

impl Prediction {
    /// Successful forecasts keyed by model name
    pub fn models(&self) -> &BTreeMap<String, FitResult> {
        &self.models
    }

    /// Failed fits keyed by model name
    pub fn failures(&self) -> &BTreeMap<String, ForecastError> {
        &self.failures
    }

    /// Combined forecast; absent when no model succeeded
    pub fn ensemble(&self) -> Option<&EnsembleResult> {
        self.ensemble.as_ref()
    }

    /// In-sample MAPE/RMSE of every successful model
    pub fn metrics(&self) -> BTreeMap<String, ModelMetrics> {
        self.models
            .iter()
            .map(|(name, fit)| (name.clone(), fit.metrics()))
            .collect()
    }

    /// Human-readable failure reason per model
    pub fn failure_reasons(&self) -> BTreeMap<String, String> {
        self.failures
            .iter()
            .map(|(name, err)| (name.clone(), err.to_string()))
            .collect()
    }

    pub fn to_json(&self) -> Result<String> {
        let view = PredictionView {
            models: &self.models,
            ensemble: self.ensemble.as_ref(),
            failures: self.failure_reasons(),
            metrics: self.metrics(),
        };
        Ok(serde_json::to_string_pretty(&view)?)
    }
}

/// Runs all registered forecasting models and combines their output
#[derive(Debug)]
pub struct ForecastEngine {
    models: Vec<Box<dyn ForecastModel>>,
    combiner: EnsembleCombiner,
    parallel: bool,
}

impl Default for ForecastEngine {
    fn default() -> Self {
        Self {
            models: vec![
                Box::new(SeasonalDecompositionModel::default()),
                Box::new(AutoRegressiveModel::default()),
            ],
            combiner: EnsembleCombiner::default(),
            parallel: true,
        }
    }
}

impl ForecastEngine {
    /// Engine with no registered models
    pub fn empty() -> Self {
        Self {
            models: Vec::new(),
            combiner: EnsembleCombiner::default(),
            parallel: true,
        }
    }

    /// Engine with both built-in models configured from `config`
    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        config.validate()?;
        Self::empty()
            .with_combiner(EnsembleCombiner::new(config.ensemble.epsilon)?)
            .with_parallel(config.parallel)
            .with_model(Box::new(SeasonalDecompositionModel::new(
                config.seasonal.clone(),
            )?))?
            .with_model(Box::new(AutoRegressiveModel::from_config(&config.arima)?))
    }

    /// Register another model; names must be unique
    pub fn with_model(mut self, model: Box<dyn ForecastModel>) -> Result<Self> {
        if self.models.iter().any(|m| m.name() == model.name()) {
            return Err(ForecastError::InvalidParameter(format!(
                "A model named '{}' is already registered",
                model.name()
            )));
        }
        self.models.push(model);
        Ok(self)
    }

    pub fn with_combiner(mut self, combiner: EnsembleCombiner) -> Self {
        self.combiner = combiner;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Registered model names in registration order
    pub fn model_names(&self) -> Vec<&str> {
        self.models.iter().map(|m| m.name()).collect()
    }

    /// Fit every model and forecast `horizon` daily periods.
    ///
    /// Individual model failures are reported in the returned
    /// [`Prediction`] instead of aborting the call. The only errors are an
    /// invalid horizon and an ensemble that cannot be weighted.
    pub fn predict(&self, series: &TimeSeries, horizon: usize) -> Result<Prediction> {
        if horizon == 0 {
            return Err(ForecastError::InvalidParameter(
                "Horizon must be at least 1".to_string(),
            ));
        }

        let attempt = |model: &Box<dyn ForecastModel>| {
            (
                model.name().to_string(),
                model.fit_and_forecast(series, horizon),
            )
        };
        let attempts: Vec<(String, Result<FitResult>)> = if self.parallel {
            self.models.par_iter().map(attempt).collect()
        } else {
            self.models.iter().map(attempt).collect()
        };

        let mut models = BTreeMap::new();
        let mut failures = BTreeMap::new();
        for (name, outcome) in attempts {
            match outcome {
                Ok(fit) => {
                    models.insert(name, fit);
                }
                Err(err) => {
                    warn!("{name} failed to fit: {err}");
                    failures.insert(name, err);
                }
            }
        }

        let ensemble = if models.is_empty() {
            None
        } else {
            Some(self.combiner.combine(&models)?)
        };

        info!(
            "Predicted {} periods over {} points: {} succeeded, {} failed",
            horizon,
            series.len(),
            models.len(),
            failures.len()
        );
        Ok(Prediction {
            models,
            failures,
            ensemble,
        })
    }
}
