//! Lagged correlation between a trend series and an external reference
//!
//! Every integer lag in `[-max_lag, max_lag]` is evaluated on the aligned
//! overlap of the two series. Lags whose overlap is too short or constant
//! yield `NaN` coefficients instead of failing the sweep.

use crate::alignment::align;
use crate::config::{CorrelationConfig, EngineConfig};
use crate::data::TimeSeries;
use crate::error::{ForecastError, Result};
use log::{debug, info};
use rayon::prelude::*;
use serde::Serialize;
use trend_math::correlation::{pearson_test, spearman_test, CorrelationTest};

/// Coefficients whose magnitudes differ by less than this are tied
const TIE_TOLERANCE: f64 = 1e-12;

/// Correlation measures for one lag
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LagCorrelationRecord {
    /// Signed lag in days
    pub lag: i64,
    /// Number of paired points after alignment
    pub overlap: usize,
    pub pearson_correlation: f64,
    pub pearson_pvalue: f64,
    pub spearman_correlation: f64,
    pub spearman_pvalue: f64,
}

impl LagCorrelationRecord {
    fn new(lag: i64, overlap: usize, pearson: CorrelationTest, spearman: CorrelationTest) -> Self {
        Self {
            lag,
            overlap,
            pearson_correlation: pearson.coefficient,
            pearson_pvalue: pearson.p_value,
            spearman_correlation: spearman.coefficient,
            spearman_pvalue: spearman.p_value,
        }
    }

    pub fn is_defined(&self) -> bool {
        self.pearson_correlation.is_finite()
    }
}

/// Full lag sweep with its strongest record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationReport {
    records: Vec<LagCorrelationRecord>,
    best: LagCorrelationRecord,
    interpretation: String,
}

impl CorrelationReport {
    /// One record per lag, ascending
    pub fn records(&self) -> &[LagCorrelationRecord] {
        &self.records
    }

    /// Record with the largest absolute Pearson coefficient
    pub fn best(&self) -> &LagCorrelationRecord {
        &self.best
    }

    pub fn interpretation(&self) -> &str {
        &self.interpretation
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Sweeps lag offsets between two series
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorrelationAnalyzer {
    parallel: bool,
    max_lag: usize,
}

impl Default for CorrelationAnalyzer {
    fn default() -> Self {
        Self {
            parallel: true,
            max_lag: CorrelationConfig::default().max_lag,
        }
    }
}

impl CorrelationAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Analyzer honoring the configured parallelism and default lag window
    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            parallel: config.parallel,
            max_lag: config.correlation.max_lag,
        })
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_max_lag(mut self, max_lag: usize) -> Self {
        self.max_lag = max_lag;
        self
    }

    pub fn is_parallel(&self) -> bool {
        self.parallel
    }

    /// Lag window used by [`CorrelationAnalyzer::analyze_default`]
    pub fn max_lag(&self) -> usize {
        self.max_lag
    }

    /// Correlate `a` against `b` for every lag in `[-max_lag, max_lag]`
    pub fn analyze(&self, a: &[f64], b: &[f64], max_lag: usize) -> Result<CorrelationReport> {
        let max_lag = i64::try_from(max_lag)
            .map_err(|_| ForecastError::InvalidParameter(format!("max_lag {max_lag} is too large")))?;

        let lags: Vec<i64> = (-max_lag..=max_lag).collect();
        let records: Vec<LagCorrelationRecord> = if self.parallel {
            lags.par_iter().map(|&lag| evaluate_lag(a, b, lag)).collect()
        } else {
            lags.iter().map(|&lag| evaluate_lag(a, b, lag)).collect()
        };

        let best = *select_best(&records).ok_or_else(|| {
            ForecastError::DataError(format!(
                "No lag in [-{max_lag}, {max_lag}] produced a defined correlation"
            ))
        })?;
        let interpretation = interpret(&best);

        info!(
            "Lag sweep over {} lags: best lag {} (r = {:.4})",
            records.len(),
            best.lag,
            best.pearson_correlation
        );
        Ok(CorrelationReport {
            records,
            best,
            interpretation,
        })
    }

    /// Correlate two series assumed to share a daily cadence
    pub fn analyze_series(
        &self,
        a: &TimeSeries,
        b: &TimeSeries,
        max_lag: usize,
    ) -> Result<CorrelationReport> {
        self.analyze(a.values(), b.values(), max_lag)
    }

    /// Sweep `[-max_lag, max_lag]` with the analyzer's own lag window
    pub fn analyze_default(&self, a: &[f64], b: &[f64]) -> Result<CorrelationReport> {
        self.analyze(a, b, self.max_lag)
    }
}

fn evaluate_lag(a: &[f64], b: &[f64], lag: i64) -> LagCorrelationRecord {
    let (x, y) = match align(a, b, lag) {
        Ok(pair) => pair,
        Err(err) => {
            debug!("lag {lag}: {err}");
            return LagCorrelationRecord::new(
                lag,
                0,
                CorrelationTest::undefined(),
                CorrelationTest::undefined(),
            );
        }
    };

    let pearson = pearson_test(x, y).unwrap_or_else(|err| {
        debug!("lag {lag}: pearson undefined: {err}");
        CorrelationTest::undefined()
    });
    let spearman = spearman_test(x, y).unwrap_or_else(|_| CorrelationTest::undefined());
    LagCorrelationRecord::new(lag, x.len(), pearson, spearman)
}

/// Record maximizing `|pearson|`; ties go to the lag closest to zero
pub fn select_best(records: &[LagCorrelationRecord]) -> Option<&LagCorrelationRecord> {
    let mut best: Option<&LagCorrelationRecord> = None;
    for record in records.iter().filter(|r| r.is_defined()) {
        best = match best {
            None => Some(record),
            Some(current) => {
                let strength = record.pearson_correlation.abs();
                let current_strength = current.pearson_correlation.abs();
                let stronger = strength > current_strength + TIE_TOLERANCE;
                let tied = (strength - current_strength).abs() <= TIE_TOLERANCE;
                if stronger || (tied && record.lag.abs() < current.lag.abs()) {
                    Some(record)
                } else {
                    Some(current)
                }
            }
        };
    }
    best
}

/// Plain-language summary of a lag record
pub fn interpret(record: &LagCorrelationRecord) -> String {
    let r = record.pearson_correlation;
    let strength = if r.abs() < 0.3 {
        "Weak"
    } else if r.abs() < 0.7 {
        "Moderate"
    } else {
        "Strong"
    };
    let direction = if r > 0.0 { "positive" } else { "negative" };

    let timing = match record.lag {
        0 => "simultaneous".to_string(),
        lag if lag > 0 => format!("{lag} days after the trend"),
        lag => format!("{} days before the trend", lag.abs()),
    };

    format!("{strength} {direction} correlation, occurring {timing}")
}
