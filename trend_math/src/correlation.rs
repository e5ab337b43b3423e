//! Correlation coefficients and their significance
//!
//! Pearson (linear) and Spearman (rank) correlation, each with a
//! two-sided p-value from the Student t approximation with `n - 2`
//! degrees of freedom.

use crate::{MathError, Result};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, StudentsT};

/// Minimum number of paired samples for a defined test
pub const MIN_CORRELATION_SAMPLES: usize = 3;

/// A correlation coefficient together with its two-sided p-value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorrelationTest {
    pub coefficient: f64,
    pub p_value: f64,
}

impl CorrelationTest {
    /// Both fields `NaN`, used where the test is not defined
    pub fn undefined() -> Self {
        Self {
            coefficient: f64::NAN,
            p_value: f64::NAN,
        }
    }

    pub fn is_defined(&self) -> bool {
        self.coefficient.is_finite()
    }
}

fn check_pair(x: &[f64], y: &[f64]) -> Result<()> {
    if x.len() != y.len() {
        return Err(MathError::InvalidInput(format!(
            "Series lengths differ ({} vs {})",
            x.len(),
            y.len()
        )));
    }
    if x.len() < MIN_CORRELATION_SAMPLES {
        return Err(MathError::InsufficientData(format!(
            "Need at least {} paired samples, got {}",
            MIN_CORRELATION_SAMPLES,
            x.len()
        )));
    }
    if x.iter().chain(y).any(|v| !v.is_finite()) {
        return Err(MathError::InvalidInput(
            "Series contain non-finite values".to_string(),
        ));
    }
    Ok(())
}

fn is_constant(values: &[f64]) -> bool {
    values.iter().all(|v| *v == values[0])
}

/// Pearson product-moment correlation coefficient
pub fn pearson(x: &[f64], y: &[f64]) -> Result<f64> {
    check_pair(x, y)?;
    if is_constant(x) || is_constant(y) {
        return Err(MathError::CalculationError(
            "Correlation is undefined for a constant series".to_string(),
        ));
    }

    let mean_x = crate::mean(x);
    let mean_y = crate::mean(y);

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (xi, yi) in x.iter().zip(y) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let denominator = (var_x * var_y).sqrt();
    if denominator <= 0.0 || !denominator.is_finite() {
        return Err(MathError::CalculationError(
            "Correlation denominator vanished".to_string(),
        ));
    }
    Ok((cov / denominator).clamp(-1.0, 1.0))
}

/// Ranks starting at 1, ties receive the average of their positions
pub fn rank(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    let mut indexed: Vec<(usize, f64)> = values.iter().copied().enumerate().collect();
    indexed.sort_by(|a, b| a.1.total_cmp(&b.1));

    let mut ranks = vec![0.0; n];
    let mut i = 0;
    while i < n {
        let mut j = i;
        while j + 1 < n && indexed[j + 1].1 == indexed[i].1 {
            j += 1;
        }
        let avg_rank = (i + j) as f64 / 2.0 + 1.0;
        for entry in &indexed[i..=j] {
            ranks[entry.0] = avg_rank;
        }
        i = j + 1;
    }
    ranks
}

/// Spearman rank correlation coefficient
pub fn spearman(x: &[f64], y: &[f64]) -> Result<f64> {
    check_pair(x, y)?;
    pearson(&rank(x), &rank(y))
}

/// Two-sided p-value for a correlation `r` over `n` samples
pub fn correlation_p_value(r: f64, n: usize) -> Result<f64> {
    if n < MIN_CORRELATION_SAMPLES {
        return Err(MathError::InsufficientData(format!(
            "Need at least {} samples for a p-value, got {}",
            MIN_CORRELATION_SAMPLES, n
        )));
    }
    if !r.is_finite() {
        return Err(MathError::InvalidInput(
            "Correlation coefficient is not finite".to_string(),
        ));
    }
    if r.abs() >= 1.0 {
        return Ok(0.0);
    }

    let df = (n - 2) as f64;
    let t = r * (df / (1.0 - r * r)).sqrt();
    let dist = StudentsT::new(0.0, 1.0, df)
        .map_err(|e| MathError::CalculationError(format!("Student t distribution: {e}")))?;
    let p = 2.0 * (1.0 - dist.cdf(t.abs()));
    Ok(p.clamp(0.0, 1.0))
}

pub fn pearson_test(x: &[f64], y: &[f64]) -> Result<CorrelationTest> {
    let coefficient = pearson(x, y)?;
    Ok(CorrelationTest {
        coefficient,
        p_value: correlation_p_value(coefficient, x.len())?,
    })
}

pub fn spearman_test(x: &[f64], y: &[f64]) -> Result<CorrelationTest> {
    let coefficient = spearman(x, y)?;
    Ok(CorrelationTest {
        coefficient,
        p_value: correlation_p_value(coefficient, x.len())?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_perfect_correlation() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [2.0, 4.0, 6.0, 8.0, 10.0];
        let test = pearson_test(&x, &y).unwrap();
        assert_relative_eq!(test.coefficient, 1.0, epsilon = 1e-12);
        assert_eq!(test.p_value, 0.0);

        let reversed: Vec<f64> = y.iter().rev().copied().collect();
        assert_relative_eq!(pearson(&x, &reversed).unwrap(), -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_spearman_is_rank_based() {
        // Monotone but non-linear
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [1.0, 8.0, 27.0, 64.0, 125.0];
        assert_relative_eq!(spearman(&x, &y).unwrap(), 1.0, epsilon = 1e-12);
        assert!(pearson(&x, &y).unwrap() < 1.0);
    }

    #[test]
    fn test_rank_with_ties() {
        assert_eq!(rank(&[10.0, 20.0, 10.0, 30.0]), vec![1.5, 3.0, 1.5, 4.0]);
    }

    #[test]
    fn test_known_p_value() {
        // r = 0.5 over 10 samples: t = 1.633, df = 8, p ≈ 0.1411
        let p = correlation_p_value(0.5, 10).unwrap();
        assert_relative_eq!(p, 0.1411, epsilon = 1e-3);
    }

    #[test]
    fn test_degenerate_inputs() {
        assert!(matches!(
            pearson(&[1.0, 2.0], &[1.0, 2.0]),
            Err(MathError::InsufficientData(_))
        ));
        assert!(matches!(
            pearson(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]),
            Err(MathError::CalculationError(_))
        ));
        assert!(pearson(&[1.0, 2.0, 3.0], &[1.0, 2.0]).is_err());
        assert!(!CorrelationTest::undefined().is_defined());
    }
}
