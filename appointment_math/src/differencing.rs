//! Lag polynomials and (seasonal) differencing
//!
//! A lag polynomial `L(B) = l0 + l1·B + l2·B² + ...` is stored as its
//! coefficient vector, indexed by lag. Every polynomial built here is monic
//! (`l0 == 1.0`).

use crate::{MathError, Result};

/// Multiply two lag polynomials
pub fn multiply(a: &[f64], b: &[f64]) -> Vec<f64> {
    if a.is_empty() || b.is_empty() {
        return Vec::new();
    }

    let mut product = vec![0.0; a.len() + b.len() - 1];
    for (i, &x) in a.iter().enumerate() {
        for (j, &y) in b.iter().enumerate() {
            product[i + j] += x * y;
        }
    }

    product
}

/// Build `(1 - B)^d · (1 - B^period)^seasonal_d`
pub fn differencing_polynomial(d: usize, seasonal_d: usize, period: usize) -> Result<Vec<f64>> {
    if seasonal_d > 0 && period == 0 {
        return Err(MathError::InvalidInput(
            "Seasonal period must be greater than zero".to_string(),
        ));
    }

    let mut poly = vec![1.0];
    for _ in 0..d {
        poly = multiply(&poly, &[1.0, -1.0]);
    }

    if seasonal_d > 0 {
        let mut seasonal = vec![0.0; period + 1];
        seasonal[0] = 1.0;
        seasonal[period] = -1.0;
        for _ in 0..seasonal_d {
            poly = multiply(&poly, &seasonal);
        }
    }

    Ok(poly)
}

/// Apply a lag polynomial to a series.
///
/// The first `poly.len() - 1` observations are consumed as pre-sample
/// values, so the output is that much shorter than the input.
pub fn apply(data: &[f64], poly: &[f64]) -> Result<Vec<f64>> {
    let order = poly.len().saturating_sub(1);
    if data.len() <= order {
        return Err(MathError::InsufficientData(format!(
            "Need more than {} observations to difference, got {}",
            order,
            data.len()
        )));
    }

    let differenced = (order..data.len())
        .map(|t| {
            poly.iter()
                .enumerate()
                .map(|(k, coeff)| coeff * data[t - k])
                .sum()
        })
        .collect();

    Ok(differenced)
}

/// Invert [`apply`] for values that follow `history`.
///
/// `history` must hold at least `poly.len() - 1` observations; the returned
/// values continue the original (undifferenced) series.
pub fn integrate(history: &[f64], differenced: &[f64], poly: &[f64]) -> Result<Vec<f64>> {
    let order = poly.len().saturating_sub(1);
    if history.len() < order {
        return Err(MathError::InsufficientData(format!(
            "Need at least {} past observations to integrate, got {}",
            order,
            history.len()
        )));
    }

    let mut series = history[history.len() - order..].to_vec();
    let mut restored = Vec::with_capacity(differenced.len());

    for &w in differenced {
        let len = series.len();
        let lagged: f64 = poly
            .iter()
            .enumerate()
            .skip(1)
            .map(|(k, coeff)| coeff * series[len - k])
            .sum();
        let value = w - lagged;
        series.push(value);
        restored.push(value);
    }

    Ok(restored)
}
