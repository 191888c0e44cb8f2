//! # Appointment Math
//!
//! Numerical building blocks for forecasting daily appointment counts.
//! The crate has no I/O: it works on plain `f64` slices.
//!
//! - [`stats`]: descriptive statistics
//! - [`differencing`]: lag polynomials, differencing and integration
//! - [`optimizer`]: derivative-free Nelder–Mead minimization
//! - [`sarima`]: seasonal ARIMA estimation and forecasting

use thiserror::Error;

pub mod differencing;
pub mod optimizer;
pub mod sarima;
pub mod stats;

pub use sarima::{FittedSarima, Order, Sarima, SeasonalOrder};

/// Errors that can occur in numerical routines
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),

    #[error("Optimizer did not converge after {iterations} iterations")]
    ConvergenceFailure { iterations: usize },
}

/// Result type for numerical operations
pub type Result<T> = std::result::Result<T, MathError>;
