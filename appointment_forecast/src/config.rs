//! Run configuration
//!
//! Every tunable of both programs lives here. [`AppConfig::default`] holds
//! the values used when no configuration file is present; a JSON file may
//! override any subset of them.

use crate::error::{ForecastError, Result};
use appointment_math::{Order, SeasonalOrder};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Dataset shared by the generator and the report pipeline
pub const DEFAULT_DATA_FILE: &str = "dataset_citas_mascotas.csv";
/// Optional configuration file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "citas_config.json";
/// Directory receiving the rendered charts
pub const DEFAULT_OUTPUT_DIR: &str = "./graficas";
pub const DEFAULT_LINE_CHART_FILE: &str = "grafica_linea_citas_usuario.png";
pub const DEFAULT_PIE_CHART_FILE: &str = "grafica_pastel_tipo_animal.png";

/// Complete configuration of a run
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub generator: GeneratorConfig,
    pub forecast: ForecastConfig,
    pub report: ReportConfig,
}

/// Synthetic dataset parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Seed of the random source
    pub seed: u64,
    /// First generated day (inclusive)
    pub start_date: NaiveDate,
    /// Last generated day (inclusive)
    pub end_date: NaiveDate,
    /// Animal types drawn uniformly for each day
    pub categories: Vec<String>,
    /// Mean of the Poisson distribution of daily appointments
    pub poisson_mean: f64,
    /// Destination CSV file, overwritten on each run
    pub output_path: PathBuf,
}

/// Forecast pipeline parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ForecastConfig {
    /// CSV file to load
    pub data_path: PathBuf,
    /// Length of the fitting window in calendar months
    pub window_months: u32,
    /// Number of days to forecast
    pub horizon: usize,
    /// Non-seasonal model order
    pub order: Order,
    /// Seasonal model order
    pub seasonal_order: SeasonalOrder,
    /// Coverage of the forecast interval, in (0, 1)
    pub confidence_level: f64,
    /// Optimizer iteration budget for model estimation
    pub max_iterations: usize,
}

/// Chart output parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportConfig {
    /// Directory receiving both charts, created when missing
    pub output_dir: PathBuf,
    pub line_chart_file: String,
    pub pie_chart_file: String,
    /// Draw the confidence band around the forecast
    pub show_confidence_band: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            start_date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap_or_default(),
            end_date: NaiveDate::from_ymd_opt(2023, 12, 31).unwrap_or_default(),
            categories: vec!["Perro".to_string(), "Gato".to_string()],
            poisson_mean: 5.0,
            output_path: PathBuf::from(DEFAULT_DATA_FILE),
        }
    }
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_FILE),
            window_months: 1,
            horizon: 30,
            order: Order::new(1, 1, 1),
            seasonal_order: SeasonalOrder::new(1, 1, 0, 7),
            confidence_level: 0.95,
            max_iterations: 2000,
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            line_chart_file: DEFAULT_LINE_CHART_FILE.to_string(),
            pie_chart_file: DEFAULT_PIE_CHART_FILE.to_string(),
            show_confidence_band: false,
        }
    }
}

impl AppConfig {
    /// Build a configuration, rejecting invalid values
    pub fn new(
        generator: GeneratorConfig,
        forecast: ForecastConfig,
        report: ReportConfig,
    ) -> Result<Self> {
        let config = Self {
            generator,
            forecast,
            report,
        };
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a JSON configuration file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Parse and validate a JSON configuration
    pub fn from_json_str(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` when it exists, otherwise fall back to the defaults
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            info!("Loading configuration from {}", path.display());
            Self::from_json_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Check every section
    pub fn validate(&self) -> Result<()> {
        self.generator.validate()?;
        self.forecast.validate()?;
        self.report.validate()
    }
}

impl GeneratorConfig {
    pub fn validate(&self) -> Result<()> {
        if self.end_date < self.start_date {
            return Err(ForecastError::ConfigError(format!(
                "End date {} precedes start date {}",
                self.end_date, self.start_date
            )));
        }
        if self.categories.is_empty() {
            return Err(ForecastError::ConfigError(
                "At least one animal type is required".to_string(),
            ));
        }
        if self.categories.iter().any(|c| c.trim().is_empty()) {
            return Err(ForecastError::ConfigError(
                "Animal types must not be blank".to_string(),
            ));
        }
        if !self.poisson_mean.is_finite() || self.poisson_mean <= 0.0 {
            return Err(ForecastError::ConfigError(format!(
                "Poisson mean must be positive, got {}",
                self.poisson_mean
            )));
        }

        Ok(())
    }

    /// Number of days in the configured range
    pub fn day_count(&self) -> usize {
        (self.end_date - self.start_date).num_days() as usize + 1
    }
}

impl ForecastConfig {
    pub fn validate(&self) -> Result<()> {
        if self.window_months == 0 {
            return Err(ForecastError::ConfigError(
                "Window must span at least one month".to_string(),
            ));
        }
        if self.horizon == 0 {
            return Err(ForecastError::ConfigError(
                "Forecast horizon must be greater than zero".to_string(),
            ));
        }
        let seasonal = self.seasonal_order;
        if (seasonal.p > 0 || seasonal.d > 0 || seasonal.q > 0) && seasonal.period < 2 {
            return Err(ForecastError::ConfigError(format!(
                "Seasonal period must be at least 2, got {}",
                seasonal.period
            )));
        }
        if self.max_iterations == 0 {
            return Err(ForecastError::ConfigError(
                "Optimizer needs at least one iteration".to_string(),
            ));
        }
        if !(self.confidence_level > 0.0 && self.confidence_level < 1.0) {
            return Err(ForecastError::ConfigError(format!(
                "Confidence level must be between 0 and 1, got {}",
                self.confidence_level
            )));
        }

        Ok(())
    }
}

impl ReportConfig {
    pub fn validate(&self) -> Result<()> {
        for name in [&self.line_chart_file, &self.pie_chart_file] {
            if name.trim().is_empty() {
                return Err(ForecastError::ConfigError(
                    "Chart file names must not be empty".to_string(),
                ));
            }
        }
        if self.line_chart_file == self.pie_chart_file {
            return Err(ForecastError::ConfigError(
                "Line and pie charts must be written to different files".to_string(),
            ));
        }

        Ok(())
    }

    /// Full path of the line chart
    pub fn line_chart_path(&self) -> PathBuf {
        self.output_dir.join(&self.line_chart_file)
    }

    /// Full path of the pie chart
    pub fn pie_chart_path(&self) -> PathBuf {
        self.output_dir.join(&self.pie_chart_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.generator.day_count(), 365);
        assert_eq!(config.forecast.horizon, 30);
        assert_eq!(
            config.report.line_chart_path(),
            Path::new("./graficas").join("grafica_linea_citas_usuario.png")
        );
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = AppConfig::from_json_str(r#"{"forecast": {"horizon": 14}}"#).unwrap();

        assert_eq!(config.forecast.horizon, 14);
        assert_eq!(config.forecast.window_months, 1);
        assert_eq!(config.generator, GeneratorConfig::default());
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        let result = AppConfig::from_json_str(r#"{"forecast": {"horizn": 14}}"#);
        assert!(matches!(result, Err(ForecastError::JsonError(_))));
    }
}
