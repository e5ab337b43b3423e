use approx::assert_relative_eq;
use chrono::{DateTime, Duration, TimeZone, Utc};
use rstest::rstest;
use trend_forecast::{EngineConfig, ForecastEngine, ForecastError, TimeSeries};

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2023, 6, 1, 0, 0, 0).unwrap()
}

fn interest_series(len: usize) -> TimeSeries {
    let values = (0..len)
        .map(|i| {
            let t = i as f64;
            55.0 + 0.15 * t + 6.0 * (2.0 * std::f64::consts::PI * t / 7.0).sin() + 2.0 * (t * 0.37).cos()
        })
        .collect();
    TimeSeries::from_values(start(), values)
}

#[rstest]
#[case(30, 1)]
#[case(30, 14)]
#[case(90, 30)]
#[case(400, 7)]
fn test_ensemble_covers_horizon(#[case] len: usize, #[case] horizon: usize) {
    let series = interest_series(len);
    let prediction = ForecastEngine::default().predict(&series, horizon).unwrap();
    let ensemble = prediction.ensemble().expect("ensemble present");

    assert_eq!(ensemble.values().len(), horizon);
    assert_eq!(ensemble.timestamps().len(), horizon);

    let last = series.last_timestamp().unwrap();
    assert_eq!(ensemble.timestamps()[0], last + Duration::days(1));
    for pair in ensemble.timestamps().windows(2) {
        assert_eq!(pair[1] - pair[0], Duration::days(1));
    }
    assert!(ensemble.values().iter().all(|v| v.is_finite()));
}

#[test]
fn test_weights_sum_to_one() {
    let prediction = ForecastEngine::default()
        .predict(&interest_series(60), 10)
        .unwrap();
    let ensemble = prediction.ensemble().unwrap();

    assert_eq!(ensemble.weights().len(), 2);
    let total: f64 = ensemble.weights().values().sum();
    assert_relative_eq!(total, 1.0, epsilon = 1e-12);
    assert!(ensemble.weights().values().all(|w| *w > 0.0 && *w <= 1.0));

    // Each combined value lies between the model forecasts
    let seasonal = prediction.models()["seasonal"].values();
    let arima = prediction.models()["arima"].values();
    for ((e, s), a) in ensemble.values().iter().zip(seasonal).zip(arima) {
        assert!(*e >= s.min(*a) - 1e-9 && *e <= s.max(*a) + 1e-9);
    }
}

#[test]
fn test_metrics_exposed_per_model() {
    let prediction = ForecastEngine::default()
        .predict(&interest_series(45), 5)
        .unwrap();
    let metrics = prediction.metrics();

    assert_eq!(metrics.keys().collect::<Vec<_>>(), vec!["arima", "seasonal"]);
    for m in metrics.values() {
        assert!(m.mape.is_finite() && m.mape >= 0.0);
        assert!(m.rmse.is_finite() && m.rmse >= 0.0);
    }
}

#[test]
fn test_short_series_uses_seasonal_only() {
    let series = TimeSeries::from_values(start(), vec![12.0, 15.0, 14.0, 18.0, 17.0, 21.0]);
    let prediction = ForecastEngine::default().predict(&series, 4).unwrap();

    assert!(matches!(
        prediction.failures().get("arima"),
        Some(ForecastError::InsufficientDataError { .. })
    ));
    assert!(prediction.models().contains_key("seasonal"));

    let ensemble = prediction.ensemble().unwrap();
    assert_eq!(ensemble.weights().len(), 1);
    assert_eq!(ensemble.weights()["seasonal"], 1.0);
    assert_eq!(ensemble.values(), prediction.models()["seasonal"].values());
}

#[test]
fn test_single_point_yields_no_ensemble() {
    let series = TimeSeries::from_values(start(), vec![42.0]);
    let prediction = ForecastEngine::default().predict(&series, 4).unwrap();

    assert!(prediction.models().is_empty());
    assert!(prediction.ensemble().is_none());
    assert_eq!(prediction.failures().len(), 2);
    assert!(prediction.failure_reasons().contains_key("seasonal"));
    assert!(prediction.failure_reasons().contains_key("arima"));
}

#[test]
fn test_non_finite_values_fail_every_model() {
    let mut values: Vec<f64> = (0..40).map(|i| i as f64).collect();
    values[10] = f64::INFINITY;
    let series = TimeSeries::from_values(start(), values);
    let prediction = ForecastEngine::default().predict(&series, 3).unwrap();

    assert!(prediction.ensemble().is_none());
    assert!(prediction
        .failures()
        .values()
        .all(|e| matches!(e, ForecastError::DataError(_))));
}

#[test]
fn test_engine_from_config() {
    let config = EngineConfig::from_json_str(
        r#"{
            "parallel": false,
            "arima": {"p": 2, "d": 1, "q": 1},
            "seasonal": {"weekly_seasonality": false, "yearly_seasonality": false}
        }"#,
    )
    .unwrap();
    let engine = ForecastEngine::from_config(&config).unwrap();
    assert_eq!(engine.model_names(), vec!["seasonal", "arima"]);

    // ARIMA(2,1,1) needs only 4 points
    let series = TimeSeries::from_values(start(), vec![1.0, 3.0, 2.0, 4.0, 3.5, 5.0]);
    let prediction = engine.predict(&series, 2).unwrap();
    assert_eq!(prediction.models().len(), 2);
}

#[test]
fn test_gapped_series_forecasts_from_last_point() {
    let timestamps: Vec<DateTime<Utc>> = (0..40)
        .filter(|i| i % 5 != 3)
        .map(|i| start() + Duration::days(i))
        .collect();
    let values = timestamps.iter().enumerate().map(|(i, _)| 20.0 + i as f64).collect();
    let series = TimeSeries::new(timestamps, values).unwrap();

    let prediction = ForecastEngine::default().predict(&series, 3).unwrap();
    let ensemble = prediction.ensemble().unwrap();
    assert_eq!(
        ensemble.timestamps()[0],
        series.last_timestamp().unwrap() + Duration::days(1)
    );
}
