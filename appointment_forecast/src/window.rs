//! Trailing fitting window
//!
//! The model is refit on the most recent calendar months only, not on the
//! whole history.

use crate::data::DailySeries;
use crate::error::{ForecastError, Result};
use chrono::{Months, NaiveDate};
use tracing::{debug, warn};

/// Contiguous tail of a [`DailySeries`] used to fit the model
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastWindow {
    series: DailySeries,
    /// Start the window would have had with enough history
    requested_start: NaiveDate,
}

impl ForecastWindow {
    /// Select `[last - months, last]`, clamping the start to the first date
    pub fn trailing(series: &DailySeries, months: u32) -> Result<Self> {
        if months == 0 {
            return Err(ForecastError::InvalidParameter(
                "Window must span at least one month".to_string(),
            ));
        }

        let end = series.end();
        let requested_start = end
            .checked_sub_months(Months::new(months))
            .unwrap_or(NaiveDate::MIN);
        let start = requested_start.max(series.start());

        if start > requested_start {
            warn!(
                "Only {} days of history available, window starts at {} instead of {}",
                series.len(),
                start,
                requested_start
            );
        }

        let window = series.slice(start, end)?;
        debug!("Forecast window {} to {} ({} days)", start, end, window.len());

        Ok(Self {
            series: window,
            requested_start,
        })
    }

    /// Observations inside the window
    pub fn series(&self) -> &DailySeries {
        &self.series
    }

    pub fn start(&self) -> NaiveDate {
        self.series.start()
    }

    pub fn end(&self) -> NaiveDate {
        self.series.end()
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn values(&self) -> &[f64] {
        self.series.values()
    }

    /// Whether the history was too short for the requested window
    pub fn is_clamped(&self) -> bool {
        self.start() > self.requested_start
    }

    /// Mean count inside the window
    pub fn mean(&self) -> Result<f64> {
        self.series.mean()
    }
}
