use chrono::{TimeZone, Utc};
use trend_forecast::{CorrelationAnalyzer, EngineConfig, TimeSeries};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

    // Interest that echoes the reference three days later
    let reference = TimeSeries::synthetic(42, start, 365, 50.0, 10.0)?;
    let echoed: Vec<f64> = (0..reference.len())
        .map(|i| match i.checked_sub(3) {
            Some(j) => 0.8 * reference.values()[j] + 5.0,
            None => 45.0,
        })
        .collect();
    let interest = TimeSeries::from_values(start, echoed);

    let config = EngineConfig::default();
    let report = CorrelationAnalyzer::from_config(&config)?
        .analyze_default(interest.values(), reference.values())?;

    println!("Lag   Pearson   p-value   Spearman");
    for record in report.records().iter().filter(|r| r.lag.abs() <= 5) {
        println!(
            "{:>3}   {:>7.4}   {:>7.4}   {:>8.4}",
            record.lag, record.pearson_correlation, record.pearson_pvalue, record.spearman_correlation
        );
    }

    println!("\nBest lag: {}", report.best().lag);
    println!("{}", report.interpretation());

    Ok(())
}
