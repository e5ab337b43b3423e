//! Inverse-error weighted combination of model forecasts

use crate::error::{ForecastError, Result};
use crate::models::FitResult;
use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::Serialize;
use std::collections::BTreeMap;

/// Default constant added to each MAPE before inversion
pub const DEFAULT_EPSILON: f64 = 0.01;

/// Weighted combination of several model forecasts
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnsembleResult {
    timestamps: Vec<DateTime<Utc>>,
    values: Vec<f64>,
    weights: BTreeMap<String, f64>,
}

impl EnsembleResult {
    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Normalized weight per contributing model, keyed by model name
    pub fn weights(&self) -> &BTreeMap<String, f64> {
        &self.weights
    }

    pub fn horizon(&self) -> usize {
        self.values.len()
    }
}

/// Merges model forecasts with weights proportional to `1 / (MAPE + ε)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnsembleCombiner {
    epsilon: f64,
}

impl Default for EnsembleCombiner {
    fn default() -> Self {
        Self {
            epsilon: DEFAULT_EPSILON,
        }
    }
}

impl EnsembleCombiner {
    pub fn new(epsilon: f64) -> Result<Self> {
        if !(epsilon > 0.0) || !epsilon.is_finite() {
            return Err(ForecastError::InvalidParameter(
                "Ensemble epsilon must be positive".to_string(),
            ));
        }
        Ok(Self { epsilon })
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Normalized weights for every model with a finite, non-negative MAPE
    pub fn weights(&self, forecasts: &BTreeMap<String, FitResult>) -> Result<BTreeMap<String, f64>> {
        let mut raw = BTreeMap::new();
        for (name, fit) in forecasts {
            let mape = fit.mape();
            if mape.is_finite() && mape >= 0.0 {
                raw.insert(name.clone(), 1.0 / (mape + self.epsilon));
            } else {
                warn!("Excluding {name} from the ensemble: MAPE is {mape}");
            }
        }

        let total: f64 = raw.values().sum();
        if raw.is_empty() || !(total > 0.0) || !total.is_finite() {
            return Err(ForecastError::EnsembleError(
                "No model has a usable error metric to weight by".to_string(),
            ));
        }

        Ok(raw.into_iter().map(|(name, w)| (name, w / total)).collect())
    }

    /// Combine forecasts sharing one timestamp sequence
    pub fn combine(&self, forecasts: &BTreeMap<String, FitResult>) -> Result<EnsembleResult> {
        let reference = forecasts.values().next().ok_or_else(|| {
            ForecastError::EnsembleError("No forecasts to combine".to_string())
        })?;

        for (name, fit) in forecasts {
            if fit.values().len() != reference.values().len() {
                return Err(ForecastError::EnsembleError(format!(
                    "{} forecasts {} periods but {} forecasts {}",
                    name,
                    fit.values().len(),
                    reference.model(),
                    reference.values().len()
                )));
            }
            if fit.timestamps() != reference.timestamps() {
                return Err(ForecastError::EnsembleError(format!(
                    "{} forecast timestamps differ from {}",
                    name,
                    reference.model()
                )));
            }
        }

        let weights = self.weights(forecasts)?;
        let mut values = vec![0.0; reference.values().len()];
        for (name, weight) in &weights {
            if let Some(fit) = forecasts.get(name) {
                for (acc, v) in values.iter_mut().zip(fit.values()) {
                    *acc += weight * v;
                }
            }
        }

        debug!("Ensemble weights: {weights:?}");
        Ok(EnsembleResult {
            timestamps: reference.timestamps().to_vec(),
            values,
            weights,
        })
    }
}
