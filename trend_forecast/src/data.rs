//! Time series data handling for forecasting

use crate::error::{ForecastError, Result};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Ordered sequence of timestamped observations.
///
/// Timestamps are strictly increasing. Gaps are simply absent points and
/// are never interpolated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeries {
    timestamps: Vec<DateTime<Utc>>,
    values: Vec<f64>,
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    date: String,
    value: f64,
}

impl TimeSeries {
    /// Create a series from parallel timestamp and value vectors
    pub fn new(timestamps: Vec<DateTime<Utc>>, values: Vec<f64>) -> Result<Self> {
        if timestamps.len() != values.len() {
            return Err(ForecastError::DataError(format!(
                "Timestamps length ({}) doesn't match values length ({})",
                timestamps.len(),
                values.len()
            )));
        }

        if let Some(pos) = timestamps.windows(2).position(|w| w[1] <= w[0]) {
            return Err(ForecastError::DataError(format!(
                "Timestamps must be strictly increasing: {} is followed by {}",
                timestamps[pos],
                timestamps[pos + 1]
            )));
        }

        Ok(Self { timestamps, values })
    }

    /// Create a daily-cadence series starting at `start`
    pub fn from_values(start: DateTime<Utc>, values: Vec<f64>) -> Self {
        let timestamps = (0..values.len())
            .map(|i| start + chrono::Duration::days(i as i64))
            .collect();
        Self { timestamps, values }
    }

    /// Read `date,value` rows with a header line
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::Reader::from_reader(reader);
        let mut timestamps = Vec::new();
        let mut values = Vec::new();

        for row in rdr.deserialize() {
            let row: CsvRow = row?;
            timestamps.push(parse_timestamp(&row.date)?);
            values.push(row.value);
        }

        Self::new(timestamps, values)
    }

    /// Load a series from a CSV file
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_csv_reader(file)
    }

    /// Gaussian reference series drawn from an explicit seed.
    ///
    /// The same seed always yields the same series.
    pub fn synthetic(
        seed: u64,
        start: DateTime<Utc>,
        len: usize,
        mean: f64,
        std_dev: f64,
    ) -> Result<Self> {
        if !(std_dev >= 0.0) || !mean.is_finite() {
            return Err(ForecastError::InvalidParameter(format!(
                "Reference series needs a finite mean and non-negative std_dev, got mean {mean}, std_dev {std_dev}"
            )));
        }
        let normal = Normal::new(mean, std_dev)
            .map_err(|e| ForecastError::InvalidParameter(format!("Normal distribution: {e}")))?;
        let mut rng = StdRng::seed_from_u64(seed);
        let values = (0..len).map(|_| normal.sample(&mut rng)).collect();
        Ok(Self::from_values(start, values))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    pub fn last_timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamps.last().copied()
    }

    /// Whether any value is NaN or infinite
    pub fn has_non_finite(&self) -> bool {
        self.values.iter().any(|v| !v.is_finite())
    }

    /// Days elapsed since the first observation, per point
    pub fn elapsed_days(&self) -> Vec<f64> {
        match self.timestamps.first() {
            Some(first) => self
                .timestamps
                .iter()
                .map(|t| days_between(*first, *t))
                .collect(),
            None => Vec::new(),
        }
    }
}

/// Fractional days from `from` to `to`
pub(crate) fn days_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_seconds() as f64 / 86_400.0
}

/// Parse `YYYY-MM-DD` or an RFC 3339 timestamp
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }

    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|e| ForecastError::DataError(format!("Invalid date '{raw}': {e}")))?;
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| ForecastError::DataError(format!("Invalid date '{raw}'")))?;
    Ok(Utc.from_utc_datetime(&midnight))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start() -> DateTime<Utc> {
        parse_timestamp("2024-01-01").unwrap()
    }

    #[test]
    fn test_rejects_unordered_timestamps() {
        let t0 = start();
        let result = TimeSeries::new(vec![t0, t0], vec![1.0, 2.0]);
        assert!(matches!(result, Err(ForecastError::DataError(_))));

        let result = TimeSeries::new(vec![t0], vec![1.0, 2.0]);
        assert!(matches!(result, Err(ForecastError::DataError(_))));
    }

    #[test]
    fn test_from_values_is_daily() {
        let series = TimeSeries::from_values(start(), vec![1.0, 2.0, 3.0]);
        assert_eq!(series.len(), 3);
        assert_eq!(series.elapsed_days(), vec![0.0, 1.0, 2.0]);
        assert_eq!(
            series.last_timestamp(),
            Some(parse_timestamp("2024-01-03").unwrap())
        );
    }

    #[test]
    fn test_csv_reader() {
        let csv = "date,value\n2024-01-01,10.5\n2024-01-02,11\n2024-01-04T00:00:00Z,12\n";
        let series = TimeSeries::from_csv_reader(csv.as_bytes()).unwrap();
        assert_eq!(series.values(), &[10.5, 11.0, 12.0]);
        assert_eq!(series.elapsed_days(), vec![0.0, 1.0, 3.0]);

        let bad = "date,value\nnot-a-date,1\n";
        assert!(TimeSeries::from_csv_reader(bad.as_bytes()).is_err());
    }

    #[test]
    fn test_synthetic_is_seeded() {
        let a = TimeSeries::synthetic(42, start(), 50, 50.0, 10.0).unwrap();
        let b = TimeSeries::synthetic(42, start(), 50, 50.0, 10.0).unwrap();
        let c = TimeSeries::synthetic(7, start(), 50, 50.0, 10.0).unwrap();
        assert_eq!(a, b);
        assert_ne!(a.values(), c.values());

        assert!(matches!(
            TimeSeries::synthetic(1, start(), 5, 0.0, -1.0),
            Err(ForecastError::InvalidParameter(_))
        ));
        assert!(TimeSeries::synthetic(1, start(), 5, f64::NAN, 1.0).is_err());
        assert!(TimeSeries::synthetic(1, start(), 5, 3.0, 0.0).is_ok());
    }
}
