use std::io::Write;

use chrono::Duration;
use tempfile::NamedTempFile;
use trend_forecast::data::parse_timestamp;
use trend_forecast::{EngineConfig, ForecastEngine, ForecastError, TimeSeries};

fn write_temp(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_csv_and_forecast() {
    let mut contents = String::from("date,value\n");
    let start = parse_timestamp("2024-03-01").unwrap();
    for i in 0..40 {
        let day = start + Duration::days(i);
        contents.push_str(&format!("{},{}\n", day.format("%Y-%m-%d"), 30.0 + i as f64 * 0.5));
    }
    let file = write_temp(&contents);

    let series = TimeSeries::from_csv(file.path()).unwrap();
    assert_eq!(series.len(), 40);
    assert_eq!(series.timestamps()[0], start);

    let prediction = ForecastEngine::default().predict(&series, 5).unwrap();
    let ensemble = prediction.ensemble().unwrap();
    assert_eq!(
        ensemble.timestamps()[0],
        parse_timestamp("2024-04-10").unwrap()
    );
}

#[test]
fn test_missing_file_is_io_error() {
    let result = TimeSeries::from_csv("/definitely/not/here.csv");
    assert!(matches!(result, Err(ForecastError::IoError(_))));
}

#[test]
fn test_malformed_csv_rows() {
    let file = write_temp("date,value\n2024-01-01,abc\n");
    assert!(matches!(
        TimeSeries::from_csv(file.path()),
        Err(ForecastError::CsvError(_))
    ));

    let file = write_temp("date,value\n2024-01-02,1\n2024-01-01,2\n");
    assert!(matches!(
        TimeSeries::from_csv(file.path()),
        Err(ForecastError::DataError(_))
    ));
}

#[test]
fn test_config_file_round_trip() {
    let file = write_temp(r#"{"default_horizon": 14, "correlation": {"max_lag": 10}}"#);
    let config = EngineConfig::from_file(file.path()).unwrap();
    assert_eq!(config.default_horizon, 14);
    assert_eq!(config.correlation.max_lag, 10);
    assert_eq!(config.arima.p, 5);

    let file = write_temp(r#"{"default_horizon": "soon"}"#);
    assert!(matches!(
        EngineConfig::from_file(file.path()),
        Err(ForecastError::ConfigError(_))
    ));
}
