//! Write the synthetic appointment dataset

use anyhow::{Context, Result};
use appointment_forecast::config::{AppConfig, DEFAULT_CONFIG_FILE};
use appointment_forecast::logging::init_logging;
use appointment_forecast::pipeline::run_generator;

fn main() -> Result<()> {
    init_logging();

    let config = AppConfig::load_or_default(DEFAULT_CONFIG_FILE)
        .with_context(|| format!("Failed to load {}", DEFAULT_CONFIG_FILE))?;
    let path = run_generator(&config.generator).context("Failed to generate the dataset")?;

    println!("Dataset generado y guardado en {}", path.display());
    Ok(())
}
