//! Seasonal ARIMA model over daily appointment counts

use crate::data::DailySeries;
use crate::error::{ForecastError, Result};
use crate::models::{ForecastModel, ForecastResult, TrainedForecastModel};
use crate::utils::future_dates;
use appointment_math::optimizer::NelderMead;
use appointment_math::{FittedSarima, MathError, Order, Sarima, SeasonalOrder};
use chrono::NaiveDate;
use statrs::distribution::{ContinuousCDF, Normal};
use tracing::debug;

/// SARIMA model (seasonal AutoRegressive Integrated Moving Average)
#[derive(Debug, Clone)]
pub struct SarimaModel {
    /// Name of the model
    name: String,
    /// Model specification
    sarima: Sarima,
    /// Coverage of the forecast intervals
    confidence_level: Option<f64>,
}

/// Trained SARIMA model
#[derive(Debug, Clone)]
pub struct TrainedSarimaModel {
    /// Name of the model
    name: String,
    /// Fitted coefficients and history
    fitted: FittedSarima,
    /// Last day of the training data
    last_date: NaiveDate,
    /// Coverage of the forecast intervals
    confidence_level: Option<f64>,
}

impl SarimaModel {
    /// Create a new SARIMA model
    pub fn new(order: Order, seasonal: SeasonalOrder) -> Result<Self> {
        let sarima = Sarima::new(order, seasonal).map_err(model_error)?;

        Ok(Self {
            name: format!(
                "SARIMA({},{},{})({},{},{})[{}]",
                order.p, order.d, order.q, seasonal.p, seasonal.d, seasonal.q, seasonal.period
            ),
            sarima,
            confidence_level: None,
        })
    }

    /// Also produce intervals with the given coverage
    pub fn with_confidence_level(mut self, level: f64) -> Result<Self> {
        if level <= 0.0 || level >= 1.0 || level.is_nan() {
            return Err(ForecastError::InvalidParameter(
                "Confidence level must be between 0 and 1".to_string(),
            ));
        }

        self.confidence_level = Some(level);
        Ok(self)
    }

    /// Limit the optimizer iterations spent on estimation
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Result<Self> {
        let optimizer = NelderMead::default()
            .with_max_iterations(max_iterations)
            .map_err(|e| ForecastError::InvalidParameter(e.to_string()))?;

        self.sarima = self.sarima.with_optimizer(optimizer);
        Ok(self)
    }

    /// Smallest series the model accepts
    pub fn min_observations(&self) -> usize {
        self.sarima.min_observations()
    }
}

impl ForecastModel for SarimaModel {
    type Trained = TrainedSarimaModel;

    fn train(&self, data: &DailySeries) -> Result<TrainedSarimaModel> {
        data.validate()?;

        let fitted = self.sarima.fit(data.values()).map_err(model_error)?;
        debug!(
            "{} fitted on {} days: ar={:?} ma={:?} seasonal_ar={:?} sigma2={:.4} ({} iterations)",
            self.name,
            data.len(),
            fitted.ar(),
            fitted.ma(),
            fitted.seasonal_ar(),
            fitted.sigma2(),
            fitted.iterations()
        );

        Ok(TrainedSarimaModel {
            name: self.name.clone(),
            fitted,
            last_date: data.end(),
            confidence_level: self.confidence_level,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TrainedSarimaModel {
    /// Fitted coefficients
    pub fn fitted(&self) -> &FittedSarima {
        &self.fitted
    }

    /// Intervals of the given coverage around `values`, floored at zero
    fn intervals(&self, values: &[f64], level: f64) -> Result<Vec<(f64, f64)>> {
        let normal = Normal::new(0.0, 1.0)
            .map_err(|e| ForecastError::ModelError(format!("Normal distribution: {}", e)))?;
        let z = normal.inverse_cdf(0.5 + level / 2.0);

        let variances = self
            .fitted
            .forecast_variance(values.len())
            .map_err(model_error)?;

        Ok(values
            .iter()
            .zip(variances)
            .map(|(value, variance)| {
                let margin = z * variance.sqrt();
                ((value - margin).max(0.0), (value + margin).max(0.0))
            })
            .collect())
    }
}

impl TrainedForecastModel for TrainedSarimaModel {
    fn forecast(&self, horizon: usize) -> Result<ForecastResult> {
        if horizon == 0 {
            return Err(ForecastError::InvalidParameter(
                "Forecast horizon must be greater than zero".to_string(),
            ));
        }

        let values = self.fitted.forecast(horizon).map_err(model_error)?;
        let dates = future_dates(self.last_date, horizon)?;

        let intervals = match self.confidence_level {
            Some(level) => Some(self.intervals(&values, level)?),
            None => None,
        };

        let result = ForecastResult::new(values, dates, &self.name)?;
        match intervals {
            Some(intervals) => result.with_intervals(intervals),
            None => Ok(result),
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Model fitting failures are reported as model errors
fn model_error(err: MathError) -> ForecastError {
    ForecastError::ModelError(err.to_string())
}
