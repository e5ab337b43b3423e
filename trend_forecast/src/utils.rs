//! Utility functions for the trend_forecast crate

use chrono::{DateTime, Duration, Utc};

/// Spacing between successive forecast points
pub fn daily_cadence() -> Duration {
    Duration::days(1)
}

/// Create `horizon` daily timestamps, starting one day after `last_timestamp`
pub fn future_timestamps(last_timestamp: DateTime<Utc>, horizon: usize) -> Vec<DateTime<Utc>> {
    let step = daily_cadence();
    let mut timestamps = Vec::with_capacity(horizon);
    let mut current = last_timestamp;

    for _ in 0..horizon {
        current += step;
        timestamps.push(current);
    }

    timestamps
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::parse_timestamp;

    #[test]
    fn test_future_timestamps() {
        let last = parse_timestamp("2024-02-28").unwrap();
        let future = future_timestamps(last, 3);
        assert_eq!(
            future,
            vec![
                parse_timestamp("2024-02-29").unwrap(),
                parse_timestamp("2024-03-01").unwrap(),
                parse_timestamp("2024-03-02").unwrap(),
            ]
        );
        assert!(future_timestamps(last, 0).is_empty());
    }
}
