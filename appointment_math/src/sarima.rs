//! Seasonal ARIMA models
//!
//! A SARIMA(p,d,q)(P,D,Q)[s] model is fitted in two stages. The series is
//! first differenced with `(1 - B)^d (1 - B^s)^D`; an ARMA model with
//! multiplicative seasonal polynomials is then estimated on the differenced
//! series by conditional sum of squares (pre-sample values and innovations
//! taken as zero). Coefficients are searched through `tanh`, which keeps
//! every AR and MA coefficient inside (-1, 1).
//!
//! Forecasts are produced for the differenced series and integrated back.

use crate::differencing::{self, multiply};
use crate::optimizer::NelderMead;
use crate::{stats, MathError, Result};
use serde::{Deserialize, Serialize};

/// Largest magnitude of a search-space parameter before `tanh`
const PARAMETER_BOUND: f64 = 6.0;

/// Starting value of every coefficient
const INITIAL_COEFFICIENT: f64 = 0.1;

/// Non-seasonal order (p, d, q)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Autoregressive order
    pub p: usize,
    /// Differencing order
    pub d: usize,
    /// Moving-average order
    pub q: usize,
}

/// Seasonal order (P, D, Q, s)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonalOrder {
    /// Seasonal autoregressive order
    pub p: usize,
    /// Seasonal differencing order
    pub d: usize,
    /// Seasonal moving-average order
    pub q: usize,
    /// Number of observations per season
    pub period: usize,
}

impl Order {
    pub fn new(p: usize, d: usize, q: usize) -> Self {
        Self { p, d, q }
    }
}

impl SeasonalOrder {
    pub fn new(p: usize, d: usize, q: usize, period: usize) -> Self {
        Self { p, d, q, period }
    }

    /// Seasonal order with no seasonal terms
    pub fn none() -> Self {
        Self::new(0, 0, 0, 0)
    }

    fn is_empty(&self) -> bool {
        self.p == 0 && self.d == 0 && self.q == 0
    }
}

/// Unfitted SARIMA specification
#[derive(Debug, Clone)]
pub struct Sarima {
    order: Order,
    seasonal: SeasonalOrder,
    optimizer: NelderMead,
}

/// SARIMA model fitted to a series
#[derive(Debug, Clone)]
pub struct FittedSarima {
    order: Order,
    seasonal: SeasonalOrder,
    ar: Vec<f64>,
    ma: Vec<f64>,
    seasonal_ar: Vec<f64>,
    seasonal_ma: Vec<f64>,
    sigma2: f64,
    sum_of_squares: f64,
    iterations: usize,
    history: Vec<f64>,
    differenced: Vec<f64>,
    residuals: Vec<f64>,
}

impl Sarima {
    /// Create a SARIMA specification
    pub fn new(order: Order, seasonal: SeasonalOrder) -> Result<Self> {
        if !seasonal.is_empty() && seasonal.period < 2 {
            return Err(MathError::InvalidInput(format!(
                "Seasonal period must be at least 2, got {}",
                seasonal.period
            )));
        }

        Ok(Self {
            order,
            seasonal,
            optimizer: NelderMead::default(),
        })
    }

    /// Replace the optimizer used for estimation
    pub fn with_optimizer(mut self, optimizer: NelderMead) -> Self {
        self.optimizer = optimizer;
        self
    }

    pub fn order(&self) -> Order {
        self.order
    }

    pub fn seasonal_order(&self) -> SeasonalOrder {
        self.seasonal
    }

    /// Number of observations consumed by differencing
    pub fn differencing_lags(&self) -> usize {
        self.order.d + self.seasonal.d * self.seasonal.period
    }

    /// Smallest series length the model can be fitted to
    pub fn min_observations(&self) -> usize {
        self.differencing_lags() + 1
    }

    fn parameter_count(&self) -> usize {
        self.order.p + self.order.q + self.seasonal.p + self.seasonal.q
    }

    /// Fit the model to `data` by conditional sum of squares
    pub fn fit(&self, data: &[f64]) -> Result<FittedSarima> {
        if data.iter().any(|v| !v.is_finite()) {
            return Err(MathError::InvalidInput(
                "Series contains non-finite values".to_string(),
            ));
        }
        if data.len() < self.min_observations() {
            return Err(MathError::InsufficientData(format!(
                "SARIMA{:?}{:?} needs at least {} observations, got {}",
                (self.order.p, self.order.d, self.order.q),
                (
                    self.seasonal.p,
                    self.seasonal.d,
                    self.seasonal.q,
                    self.seasonal.period
                ),
                self.min_observations(),
                data.len()
            )));
        }

        let diff_poly =
            differencing::differencing_polynomial(self.order.d, self.seasonal.d, self.seasonal.period)?;
        let differenced = differencing::apply(data, &diff_poly)?;

        let (coefficients, iterations) = if self.parameter_count() == 0 {
            (Vec::new(), 0)
        } else {
            let start = vec![INITIAL_COEFFICIENT.atanh(); self.parameter_count()];
            let minimum = self.optimizer.minimize(
                |raw| {
                    let coeffs = constrain(raw);
                    let (ar, ma) = self.polynomials(&coeffs);
                    stats::sum_of_squares(&innovations(&differenced, &ar, &ma))
                },
                &start,
            )?
            .into_converged()?;
            (constrain(&minimum.point), minimum.iterations)
        };

        if coefficients.iter().any(|c| !c.is_finite()) {
            return Err(MathError::CalculationError(
                "Estimated coefficients are not finite".to_string(),
            ));
        }

        let (ar_poly, ma_poly) = self.polynomials(&coefficients);
        let residuals = innovations(&differenced, &ar_poly, &ma_poly);
        let sum_of_squares = stats::sum_of_squares(&residuals);
        let sigma2 = sum_of_squares / differenced.len() as f64;

        if !sigma2.is_finite() {
            return Err(MathError::CalculationError(
                "Innovation variance is not finite".to_string(),
            ));
        }

        let (ar, rest) = coefficients.split_at(self.order.p);
        let (ma, rest) = rest.split_at(self.order.q);
        let (seasonal_ar, seasonal_ma) = rest.split_at(self.seasonal.p);

        Ok(FittedSarima {
            order: self.order,
            seasonal: self.seasonal,
            ar: ar.to_vec(),
            ma: ma.to_vec(),
            seasonal_ar: seasonal_ar.to_vec(),
            seasonal_ma: seasonal_ma.to_vec(),
            sigma2,
            sum_of_squares,
            iterations,
            history: data.to_vec(),
            differenced,
            residuals,
        })
    }

    /// Lag polynomials of the ARMA part for a flat coefficient vector
    /// ordered as `[ar.., ma.., seasonal_ar.., seasonal_ma..]`.
    fn polynomials(&self, coefficients: &[f64]) -> (Vec<f64>, Vec<f64>) {
        let (ar, rest) = coefficients.split_at(self.order.p);
        let (ma, rest) = rest.split_at(self.order.q);
        let (seasonal_ar, seasonal_ma) = rest.split_at(self.seasonal.p);

        arma_polynomials(ar, ma, seasonal_ar, seasonal_ma, self.seasonal.period)
    }
}

impl FittedSarima {
    /// Non-seasonal AR coefficients
    pub fn ar(&self) -> &[f64] {
        &self.ar
    }

    /// Non-seasonal MA coefficients
    pub fn ma(&self) -> &[f64] {
        &self.ma
    }

    /// Seasonal AR coefficients
    pub fn seasonal_ar(&self) -> &[f64] {
        &self.seasonal_ar
    }

    /// Seasonal MA coefficients
    pub fn seasonal_ma(&self) -> &[f64] {
        &self.seasonal_ma
    }

    /// Innovation variance estimate
    pub fn sigma2(&self) -> f64 {
        self.sigma2
    }

    /// Conditional sum of squares at the optimum
    pub fn sum_of_squares(&self) -> f64 {
        self.sum_of_squares
    }

    /// Optimizer iterations used during fitting
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// One-step innovations on the differenced series
    pub fn residuals(&self) -> &[f64] {
        &self.residuals
    }

    /// Observations the model was fitted to
    pub fn history(&self) -> &[f64] {
        &self.history
    }

    /// Point forecast for the next `horizon` observations
    pub fn forecast(&self, horizon: usize) -> Result<Vec<f64>> {
        let (ar_poly, ma_poly) = arma_polynomials(
            &self.ar,
            &self.ma,
            &self.seasonal_ar,
            &self.seasonal_ma,
            self.seasonal.period,
        );

        let n = self.differenced.len();
        let mut w = self.differenced.clone();
        let mut e = self.residuals.clone();

        for t in n..n + horizon {
            let ar_part: f64 = ar_poly
                .iter()
                .enumerate()
                .skip(1)
                .filter(|(k, _)| *k <= t)
                .map(|(k, coeff)| coeff * w[t - k])
                .sum();
            let ma_part: f64 = ma_poly
                .iter()
                .enumerate()
                .skip(1)
                .filter(|(k, _)| *k <= t)
                .map(|(k, coeff)| coeff * e[t - k])
                .sum();

            w.push(ma_part - ar_part);
            e.push(0.0);
        }

        let diff_poly =
            differencing::differencing_polynomial(self.order.d, self.seasonal.d, self.seasonal.period)?;
        let forecast = differencing::integrate(&self.history, &w[n..], &diff_poly)?;

        if forecast.iter().any(|v| !v.is_finite()) {
            return Err(MathError::CalculationError(
                "Forecast produced non-finite values".to_string(),
            ));
        }

        Ok(forecast)
    }

    /// Variance of the forecast error for steps `1..=horizon`
    pub fn forecast_variance(&self, horizon: usize) -> Result<Vec<f64>> {
        let psi = self.psi_weights(horizon)?;

        let mut cumulative = 0.0;
        Ok(psi
            .iter()
            .map(|weight| {
                cumulative += weight * weight;
                self.sigma2 * cumulative
            })
            .collect())
    }

    /// MA(∞) weights of the integrated model, `psi[0] == 1`
    fn psi_weights(&self, count: usize) -> Result<Vec<f64>> {
        let (ar_poly, ma_poly) = arma_polynomials(
            &self.ar,
            &self.ma,
            &self.seasonal_ar,
            &self.seasonal_ma,
            self.seasonal.period,
        );
        let diff_poly =
            differencing::differencing_polynomial(self.order.d, self.seasonal.d, self.seasonal.period)?;
        let full_ar = multiply(&ar_poly, &diff_poly);

        let mut psi: Vec<f64> = Vec::with_capacity(count);
        for j in 0..count {
            if j == 0 {
                psi.push(1.0);
                continue;
            }
            let ma_term = ma_poly.get(j).copied().unwrap_or(0.0);
            let ar_term: f64 = (1..=j.min(full_ar.len() - 1))
                .map(|k| full_ar[k] * psi[j - k])
                .sum();
            psi.push(ma_term - ar_term);
        }

        Ok(psi)
    }
}

/// Map unconstrained search parameters into (-1, 1)
fn constrain(raw: &[f64]) -> Vec<f64> {
    raw.iter()
        .map(|u| u.clamp(-PARAMETER_BOUND, PARAMETER_BOUND).tanh())
        .collect()
}

/// Build the multiplicative AR and MA lag polynomials.
///
/// AR: `(1 - φ1·B - ...)(1 - Φ1·B^s - ...)`, MA: `(1 + θ1·B + ...)(1 + Θ1·B^s + ...)`.
fn arma_polynomials(
    ar: &[f64],
    ma: &[f64],
    seasonal_ar: &[f64],
    seasonal_ma: &[f64],
    period: usize,
) -> (Vec<f64>, Vec<f64>) {
    let ar_poly = multiply(
        &lag_polynomial(ar, 1, -1.0),
        &lag_polynomial(seasonal_ar, period, -1.0),
    );
    let ma_poly = multiply(
        &lag_polynomial(ma, 1, 1.0),
        &lag_polynomial(seasonal_ma, period, 1.0),
    );

    (ar_poly, ma_poly)
}

fn lag_polynomial(coefficients: &[f64], step: usize, sign: f64) -> Vec<f64> {
    let mut poly = vec![0.0; coefficients.len() * step + 1];
    poly[0] = 1.0;
    for (i, c) in coefficients.iter().enumerate() {
        poly[(i + 1) * step] = sign * c;
    }
    poly
}

/// One-step innovations `e[t]` solving `AR(B) w[t] = MA(B) e[t]`
fn innovations(w: &[f64], ar_poly: &[f64], ma_poly: &[f64]) -> Vec<f64> {
    let mut e = Vec::with_capacity(w.len());

    for t in 0..w.len() {
        let ar_part: f64 = ar_poly
            .iter()
            .enumerate()
            .filter(|(k, _)| *k <= t)
            .map(|(k, coeff)| coeff * w[t - k])
            .sum();
        let ma_part: f64 = ma_poly
            .iter()
            .enumerate()
            .skip(1)
            .filter(|(k, _)| *k <= t)
            .map(|(k, coeff)| coeff * e[t - k])
            .sum();

        e.push(ar_part - ma_part);
    }

    e
}
