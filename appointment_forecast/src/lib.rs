//! # Appointment Forecast
//!
//! Daily pet clinic appointments: a synthetic dataset generator, a seasonal
//! forecast of the coming month and two chart reports.
//!
//! ## Features
//!
//! - Reproducible synthetic dataset (one record per day, Poisson counts)
//! - CSV loading with validation and zero imputation of missing days
//! - SARIMA(1,1,1)(1,1,0)[7] fitted on a trailing calendar window
//! - Projected trend of the forecast against the window
//! - Line chart of history and forecast, pie chart of animal types
//!
//! ## Quick Start
//!
//! ```no_run
//! use appointment_forecast::config::AppConfig;
//! use appointment_forecast::pipeline::{run_forecast_report, run_generator};
//!
//! let config = AppConfig::default();
//!
//! // Write the synthetic dataset
//! run_generator(&config.generator)?;
//!
//! // Forecast the next month and draw both charts
//! let outcome = run_forecast_report(&config)?;
//! println!("{}", outcome.analysis.summary.trend.message());
//! # Ok::<(), appointment_forecast::ForecastError>(())
//! ```
//!
//! Models can also be used directly:
//!
//! ```
//! use appointment_forecast::data::DailySeries;
//! use appointment_forecast::models::{ForecastModel, SarimaModel, TrainedForecastModel};
//! use appointment_math::{Order, SeasonalOrder};
//! use chrono::NaiveDate;
//!
//! let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
//! let values: Vec<f64> = (0..28).map(|i| [4.0, 6.0, 5.0, 7.0, 3.0, 5.0, 6.0][i % 7]).collect();
//! let series = DailySeries::new(start, values)?;
//!
//! let model = SarimaModel::new(Order::new(1, 1, 1), SeasonalOrder::new(1, 1, 0, 7))?;
//! let forecast = model.train(&series)?.forecast(7)?;
//! assert_eq!(forecast.horizon(), 7);
//! # Ok::<(), appointment_forecast::ForecastError>(())
//! ```

pub mod config;
pub mod data;
pub mod error;
pub mod generator;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod report;
pub mod utils;
pub mod window;

// Re-export commonly used types
pub use crate::config::AppConfig;
pub use crate::data::{AppointmentData, AppointmentRecord, DailySeries, DataLoader};
pub use crate::error::ForecastError;
pub use crate::metrics::Trend;
pub use crate::models::{ForecastModel, ForecastResult, TrainedForecastModel};
pub use crate::window::ForecastWindow;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
