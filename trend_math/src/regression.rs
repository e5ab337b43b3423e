//! Least squares fitting
//!
//! Contains:
//! - Simple linear regression on paired samples
//! - Penalized (ridge) least squares on an arbitrary design matrix
//! - A dense linear system solver used by both

use crate::{MathError, Result};

const PIVOT_EPSILON: f64 = 1e-12;

/// Ordinary least squares fit of `y = intercept + slope * x`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearRegression {
    slope: f64,
    intercept: f64,
}

impl LinearRegression {
    /// Fit the regression line to paired samples
    pub fn fit(x: &[f64], y: &[f64]) -> Result<Self> {
        if x.len() != y.len() {
            return Err(MathError::InvalidInput(format!(
                "x length ({}) doesn't match y length ({})",
                x.len(),
                y.len()
            )));
        }
        if x.len() < 2 {
            return Err(MathError::InsufficientData(
                "Need at least 2 points for linear regression".to_string(),
            ));
        }

        let x_mean = crate::mean(x);
        let y_mean = crate::mean(y);

        let mut numerator = 0.0;
        let mut denominator = 0.0;
        for (&xi, &yi) in x.iter().zip(y) {
            numerator += (xi - x_mean) * (yi - y_mean);
            denominator += (xi - x_mean) * (xi - x_mean);
        }

        if denominator.abs() < 1e-10 {
            return Err(MathError::CalculationError(
                "Cannot calculate slope: x values are too similar".to_string(),
            ));
        }

        let slope = numerator / denominator;
        Ok(Self {
            slope,
            intercept: y_mean - slope * x_mean,
        })
    }

    pub fn slope(&self) -> f64 {
        self.slope
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Evaluate the fitted line at `x`
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }

    /// Residuals `y - ŷ` for the given samples
    pub fn residuals(&self, x: &[f64], y: &[f64]) -> Vec<f64> {
        x.iter()
            .zip(y)
            .map(|(&xi, &yi)| yi - self.predict(xi))
            .collect()
    }
}

/// Solve `A x = b` by Gaussian elimination with partial pivoting.
///
/// `a` is row-major and consumed.
pub fn solve_linear_system(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Result<Vec<f64>> {
    let n = b.len();
    if a.len() != n || a.iter().any(|row| row.len() != n) {
        return Err(MathError::InvalidInput(format!(
            "System matrix must be {n}x{n}"
        )));
    }

    for col in 0..n {
        let pivot_row = (col..n)
            .max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))
            .unwrap_or(col);
        if !a[pivot_row][col].is_finite() || a[pivot_row][col].abs() < PIVOT_EPSILON {
            return Err(MathError::CalculationError(format!(
                "Singular system: no usable pivot in column {col}"
            )));
        }
        a.swap(col, pivot_row);
        b.swap(col, pivot_row);

        for row in (col + 1)..n {
            let factor = a[row][col] / a[col][col];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = ((row + 1)..n).map(|k| a[row][k] * x[k]).sum();
        x[row] = (b[row] - tail) / a[row][row];
    }

    if x.iter().any(|v| !v.is_finite()) {
        return Err(MathError::CalculationError(
            "Solution contains non-finite values".to_string(),
        ));
    }
    Ok(x)
}

/// Penalized least squares: minimizes `|y - Xβ|² + Σ penalties[j] β[j]²`.
///
/// `design` holds one row per observation. A zero penalty leaves the
/// matching coefficient unregularized.
pub fn ridge_least_squares(design: &[Vec<f64>], y: &[f64], penalties: &[f64]) -> Result<Vec<f64>> {
    if design.len() != y.len() {
        return Err(MathError::InvalidInput(format!(
            "Design rows ({}) don't match observations ({})",
            design.len(),
            y.len()
        )));
    }
    let k = penalties.len();
    if design.iter().any(|row| row.len() != k) {
        return Err(MathError::InvalidInput(format!(
            "Every design row must have {k} columns"
        )));
    }
    if penalties.iter().any(|p| *p < 0.0 || !p.is_finite()) {
        return Err(MathError::InvalidInput(
            "Penalties must be finite and non-negative".to_string(),
        ));
    }

    let mut gram = vec![vec![0.0; k]; k];
    let mut rhs = vec![0.0; k];
    for (row, &target) in design.iter().zip(y) {
        for i in 0..k {
            if row[i] == 0.0 {
                continue;
            }
            rhs[i] += row[i] * target;
            for j in i..k {
                gram[i][j] += row[i] * row[j];
            }
        }
    }
    for i in 0..k {
        gram[i][i] += penalties[i];
        for j in 0..i {
            gram[i][j] = gram[j][i];
        }
    }

    solve_linear_system(gram, rhs)
}

/// Evaluate `Xβ` for each design row
pub fn apply_coefficients(design: &[Vec<f64>], coefficients: &[f64]) -> Vec<f64> {
    design
        .iter()
        .map(|row| row.iter().zip(coefficients).map(|(x, b)| x * b).sum())
        .collect()
}
