//! Forecasting models for daily appointment series

use crate::data::DailySeries;
use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use std::fmt::Debug;

/// Forecast of consecutive days following the fitted history
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastResult {
    /// Forecasted values
    values: Vec<f64>,
    /// Day of each value
    dates: Vec<NaiveDate>,
    /// Lower and upper bound per day (optional)
    intervals: Option<Vec<(f64, f64)>>,
    /// Name of the model that produced the forecast
    model_name: String,
}

impl ForecastResult {
    /// Create a new forecast result
    pub fn new(values: Vec<f64>, dates: Vec<NaiveDate>, model_name: &str) -> Result<Self> {
        if values.len() != dates.len() {
            return Err(ForecastError::ValidationError(format!(
                "Values length ({}) doesn't match dates length ({})",
                values.len(),
                dates.len()
            )));
        }
        if values.is_empty() {
            return Err(ForecastError::ValidationError(
                "Forecast must contain at least one value".to_string(),
            ));
        }
        if dates.windows(2).any(|pair| pair[0].succ_opt() != Some(pair[1])) {
            return Err(ForecastError::ValidationError(
                "Forecast dates must be consecutive days".to_string(),
            ));
        }

        Ok(Self {
            values,
            dates,
            intervals: None,
            model_name: model_name.to_string(),
        })
    }

    /// Attach confidence intervals
    pub fn with_intervals(mut self, intervals: Vec<(f64, f64)>) -> Result<Self> {
        if intervals.len() != self.values.len() {
            return Err(ForecastError::ValidationError(format!(
                "Values length ({}) doesn't match intervals length ({})",
                self.values.len(),
                intervals.len()
            )));
        }

        self.intervals = Some(intervals);
        Ok(self)
    }

    /// Get the forecasted values
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Get the forecast dates
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Get the number of periods forecasted
    pub fn horizon(&self) -> usize {
        self.values.len()
    }

    /// Get the confidence intervals, if available
    pub fn intervals(&self) -> Option<&[(f64, f64)]> {
        self.intervals.as_deref()
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// First forecast day
    pub fn start(&self) -> NaiveDate {
        self.dates[0]
    }

    /// Last forecast day
    pub fn end(&self) -> NaiveDate {
        self.dates[self.dates.len() - 1]
    }

    /// `(date, value)` pairs
    pub fn points(&self) -> Vec<(NaiveDate, f64)> {
        self.dates.iter().copied().zip(self.values.iter().copied()).collect()
    }

    /// Mean forecasted value
    pub fn mean(&self) -> Result<f64> {
        Ok(appointment_math::stats::mean(&self.values)?)
    }
}

/// Trained forecast model
pub trait TrainedForecastModel: Debug {
    /// Generate forecast for the days following the training data
    fn forecast(&self, horizon: usize) -> Result<ForecastResult>;

    /// Name of the model
    fn name(&self) -> &str;
}

/// Forecast model that can be trained on a daily series
pub trait ForecastModel: Debug + Clone {
    /// The type of trained model produced
    type Trained: TrainedForecastModel;

    /// Train the model on a daily series
    fn train(&self, data: &DailySeries) -> Result<Self::Trained>;

    /// Get the name of the model
    fn name(&self) -> &str;
}

pub mod sarima;

pub use sarima::{SarimaModel, TrainedSarimaModel};
