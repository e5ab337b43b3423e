use chrono::{TimeZone, Utc};
use trend_forecast::{EngineConfig, ForecastEngine, TimeSeries};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load data from a CSV path if given, otherwise build a weekly-cycle series
    let series = match std::env::args().nth(1) {
        Some(path) => {
            println!("Loading data from: {path}");
            TimeSeries::from_csv(path)?
        }
        None => {
            let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
            let values = (0..120)
                .map(|i| {
                    let t = i as f64;
                    50.0 + 0.1 * t + 8.0 * (2.0 * std::f64::consts::PI * t / 7.0).sin()
                })
                .collect();
            TimeSeries::from_values(start, values)
        }
    };
    println!("Loaded {} data points", series.len());

    let config = EngineConfig::default();
    let engine = ForecastEngine::from_config(&config)?;
    let prediction = engine.predict(&series, config.default_horizon)?;

    println!("\nModel accuracy:");
    for (name, metrics) in prediction.metrics() {
        println!("  {name:<10} {metrics}");
    }
    for (name, reason) in prediction.failure_reasons() {
        println!("  {name:<10} failed: {reason}");
    }

    let Some(ensemble) = prediction.ensemble() else {
        println!("No model could be fit");
        return Ok(());
    };

    println!("\nEnsemble weights:");
    for (name, weight) in ensemble.weights() {
        println!("  {name:<10} {weight:.3}");
    }

    println!("\nForecast for the next {} days:", ensemble.values().len());
    for (ts, value) in ensemble.timestamps().iter().zip(ensemble.values()) {
        println!("  {}: {:.2}", ts.format("%Y-%m-%d"), value);
    }

    Ok(())
}
