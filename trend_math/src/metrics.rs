//! In-sample fit quality metrics

use crate::{MathError, Result};
use serde::{Deserialize, Serialize};

/// Fit quality of a reconstructed series against the observed one
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitAccuracy {
    /// Mean Absolute Error
    pub mae: f64,
    /// Root Mean Squared Error
    pub rmse: f64,
    /// Mean Absolute Percentage Error, as a fraction (0.05 = 5%)
    pub mape: f64,
}

fn check_lengths(actual: &[f64], fitted: &[f64]) -> Result<()> {
    if actual.len() != fitted.len() {
        return Err(MathError::InvalidInput(format!(
            "Actual length ({}) doesn't match fitted length ({})",
            actual.len(),
            fitted.len()
        )));
    }
    if actual.is_empty() {
        return Err(MathError::InsufficientData(
            "Cannot score an empty fit".to_string(),
        ));
    }
    Ok(())
}

/// Mean absolute percentage error as a fraction.
///
/// Observations equal to zero are guarded with machine epsilon in the
/// denominator, so a miss on a zero observation yields a very large but
/// finite error.
pub fn mean_absolute_percentage_error(actual: &[f64], fitted: &[f64]) -> Result<f64> {
    check_lengths(actual, fitted)?;
    let total: f64 = actual
        .iter()
        .zip(fitted)
        .map(|(&a, &f)| (a - f).abs() / a.abs().max(f64::EPSILON))
        .sum();
    Ok(total / actual.len() as f64)
}

pub fn root_mean_squared_error(actual: &[f64], fitted: &[f64]) -> Result<f64> {
    check_lengths(actual, fitted)?;
    let mse = actual
        .iter()
        .zip(fitted)
        .map(|(&a, &f)| (a - f).powi(2))
        .sum::<f64>()
        / actual.len() as f64;
    Ok(mse.sqrt())
}

pub fn mean_absolute_error(actual: &[f64], fitted: &[f64]) -> Result<f64> {
    check_lengths(actual, fitted)?;
    let total: f64 = actual.iter().zip(fitted).map(|(&a, &f)| (a - f).abs()).sum();
    Ok(total / actual.len() as f64)
}

/// All fit metrics at once
pub fn fit_accuracy(actual: &[f64], fitted: &[f64]) -> Result<FitAccuracy> {
    Ok(FitAccuracy {
        mae: mean_absolute_error(actual, fitted)?,
        rmse: root_mean_squared_error(actual, fitted)?,
        mape: mean_absolute_percentage_error(actual, fitted)?,
    })
}
