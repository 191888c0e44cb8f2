//! # Pet Appointments
//!
//! Workspace facade over the forecasting crates.
//!
//! - [`forecast`]: dataset generation, loading, forecasting and charts
//! - [`math`]: the numerical core (differencing, optimizer, SARIMA)
//!
//! ## Example
//!
//! ```
//! use pet_appointments_workspace::forecast::metrics::Trend;
//!
//! let trend = Trend::between(4.0, 5.0);
//! assert_eq!(trend.message(), "Aumento proyectado: 25.00%");
//! ```

pub use appointment_forecast as forecast;
pub use appointment_math as math;
