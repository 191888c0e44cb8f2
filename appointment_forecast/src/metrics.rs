//! Trend of the forecast against the fitting window

use crate::error::Result;
use crate::models::ForecastResult;
use crate::window::ForecastWindow;
use appointment_math::stats::percentage_change;
use std::fmt;

/// Direction and size of the projected change
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Trend {
    /// Forecast mean at or above the window mean, percentage `>= 0`
    Increase(f64),
    /// Forecast mean below the window mean, percentage `< 0`
    Decrease(f64),
    /// Window mean is zero, so no relative change exists
    Undefined,
}

impl Trend {
    /// Classify a window mean and a forecast mean
    pub fn between(window_mean: f64, forecast_mean: f64) -> Self {
        match percentage_change(window_mean, forecast_mean) {
            Some(pct) if pct >= 0.0 => Trend::Increase(pct),
            Some(pct) => Trend::Decrease(pct),
            None => Trend::Undefined,
        }
    }

    /// Signed percentage, if defined
    pub fn percentage(&self) -> Option<f64> {
        match self {
            Trend::Increase(pct) | Trend::Decrease(pct) => Some(*pct),
            Trend::Undefined => None,
        }
    }

    /// Human readable message used on the line chart
    pub fn message(&self) -> String {
        match self {
            Trend::Increase(pct) => format!("Aumento proyectado: {:.2}%", pct),
            Trend::Decrease(pct) => format!("Disminución proyectada: {:.2}%", pct.abs()),
            Trend::Undefined => "Tendencia no definida: promedio histórico igual a cero".to_string(),
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.percentage() {
            Some(pct) => write!(f, "{:+.2}%", pct),
            None => write!(f, "undefined"),
        }
    }
}

/// Means of both periods and the resulting trend
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendSummary {
    pub window_mean: f64,
    pub forecast_mean: f64,
    pub trend: Trend,
}

/// Compare the forecast mean with the window mean
pub fn trend_summary(window: &ForecastWindow, forecast: &ForecastResult) -> Result<TrendSummary> {
    let window_mean = window.mean()?;
    let forecast_mean = forecast.mean()?;

    Ok(TrendSummary {
        window_mean,
        forecast_mean,
        trend: Trend::between(window_mean, forecast_mean),
    })
}
