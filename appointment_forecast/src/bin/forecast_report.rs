//! Forecast the coming month and render both charts

use anyhow::{Context, Result};
use appointment_forecast::config::{AppConfig, DEFAULT_CONFIG_FILE};
use appointment_forecast::logging::init_logging;
use appointment_forecast::pipeline::run_forecast_report;

fn main() -> Result<()> {
    init_logging();

    let config = AppConfig::load_or_default(DEFAULT_CONFIG_FILE)
        .with_context(|| format!("Failed to load {}", DEFAULT_CONFIG_FILE))?;
    let outcome = run_forecast_report(&config).with_context(|| {
        format!(
            "Failed to build the report from {}",
            config.forecast.data_path.display()
        )
    })?;

    println!("{}", outcome.analysis.summary.trend.message());
    println!(
        "Gráfica de línea guardada en: {}",
        outcome.line_chart.display()
    );
    println!(
        "Gráfica de pastel guardada en: {}",
        outcome.pie_chart.display()
    );
    Ok(())
}
