//! Descriptive statistics over slices

use crate::{MathError, Result};

/// Arithmetic mean of the values
pub fn mean(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(MathError::InsufficientData(
            "Cannot compute the mean of an empty series".to_string(),
        ));
    }

    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sum of squared values
pub fn sum_of_squares(values: &[f64]) -> f64 {
    values.iter().map(|v| v * v).sum()
}

/// Relative change from `base` to `value`, in percent.
///
/// Returns `None` when `base` is zero, since the change is undefined.
pub fn percentage_change(base: f64, value: f64) -> Option<f64> {
    if base == 0.0 {
        return None;
    }

    Some((value - base) / base * 100.0)
}
