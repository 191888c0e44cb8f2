//! Appointment records, CSV loading and daily aggregation

use crate::error::{ForecastError, Result};
use crate::utils::{date_range, parse_date};
use appointment_math::stats;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

pub const DATE_COLUMN: &str = "Fecha";
pub const CATEGORY_COLUMN: &str = "Tipo de Animal";
pub const COUNT_COLUMN: &str = "Cantidad de Citas";

/// One day of appointments for one animal type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentRecord {
    #[serde(rename = "Fecha")]
    pub date: NaiveDate,
    #[serde(rename = "Tipo de Animal")]
    pub animal_type: String,
    #[serde(rename = "Cantidad de Citas")]
    pub appointment_count: u32,
}

/// Row as it appears in the file, before validation
#[derive(Debug, Deserialize)]
struct RawRecord {
    #[serde(rename = "Fecha")]
    date: String,
    #[serde(rename = "Tipo de Animal")]
    animal_type: String,
    #[serde(rename = "Cantidad de Citas")]
    appointment_count: String,
}

/// Records loaded from a CSV file
#[derive(Debug, Clone, PartialEq)]
pub struct AppointmentData {
    records: Vec<AppointmentRecord>,
    /// Rows whose count cell was empty; they were loaded with a count of 0
    missing_counts: usize,
}

/// Data loader for appointment CSV files
#[derive(Debug)]
pub struct DataLoader;

impl DataLoader {
    /// Load appointment records from a CSV file
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<AppointmentData> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let data = Self::from_reader(file)?;
        info!("Loaded {} records from {}", data.len(), path.display());
        Ok(data)
    }

    /// Load appointment records from any CSV source
    pub fn from_reader<R: Read>(reader: R) -> Result<AppointmentData> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = reader.headers()?.clone();
        for required in [DATE_COLUMN, CATEGORY_COLUMN, COUNT_COLUMN] {
            if !headers.iter().any(|h| h == required) {
                return Err(ForecastError::DataError(format!(
                    "Missing required column '{}'",
                    required
                )));
            }
        }

        let mut records = Vec::new();
        let mut missing_counts = 0;

        for (index, row) in reader.deserialize::<RawRecord>().enumerate() {
            // Header is line 1
            let line = index + 2;
            let raw = row?;

            let date = parse_date(&raw.date).map_err(|_| {
                ForecastError::ValidationError(format!(
                    "Line {}: '{}' is not a valid date",
                    line, raw.date
                ))
            })?;

            let appointment_count = if raw.appointment_count.is_empty() {
                missing_counts += 1;
                0
            } else {
                parse_count(&raw.appointment_count).map_err(|reason| {
                    ForecastError::ValidationError(format!(
                        "Line {}: column '{}' must be numeric, {}",
                        line, COUNT_COLUMN, reason
                    ))
                })?
            };

            records.push(AppointmentRecord {
                date,
                animal_type: raw.animal_type,
                appointment_count,
            });
        }

        if records.is_empty() {
            return Err(ForecastError::DataError(
                "Input contains no appointment records".to_string(),
            ));
        }

        Ok(AppointmentData {
            records,
            missing_counts,
        })
    }
}

fn parse_count(value: &str) -> std::result::Result<u32, String> {
    match value.parse::<i64>() {
        Ok(count) if count < 0 => Err(format!("got negative count {}", count)),
        Ok(count) => u32::try_from(count).map_err(|_| format!("count {} is too large", count)),
        Err(_) => Err(format!("got '{}'", value)),
    }
}

impl AppointmentData {
    /// Wrap already validated records
    pub fn new(records: Vec<AppointmentRecord>) -> Result<Self> {
        if records.is_empty() {
            return Err(ForecastError::DataError(
                "Input contains no appointment records".to_string(),
            ));
        }

        Ok(Self {
            records,
            missing_counts: 0,
        })
    }

    pub fn records(&self) -> &[AppointmentRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Rows loaded with an empty count cell
    pub fn missing_counts(&self) -> usize {
        self.missing_counts
    }

    /// Number of records per animal type
    pub fn category_counts(&self) -> CategoryCounts {
        CategoryCounts::from_records(&self.records)
    }
}

/// Gaps repaired while building a [`DailySeries`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleaningReport {
    /// Days with no record at all, filled with 0
    pub imputed_days: Vec<NaiveDate>,
    /// Rows with an empty count cell, counted as 0
    pub missing_counts: usize,
}

impl CleaningReport {
    /// Whether any value had to be imputed
    pub fn has_imputations(&self) -> bool {
        !self.imputed_days.is_empty() || self.missing_counts > 0
    }
}

/// Daily appointment totals without gaps
#[derive(Debug, Clone, PartialEq)]
pub struct DailySeries {
    start: NaiveDate,
    values: Vec<f64>,
}

impl DailySeries {
    /// Create a series whose first value falls on `start`
    pub fn new(start: NaiveDate, values: Vec<f64>) -> Result<Self> {
        let series = Self { start, values };
        series.validate()?;
        Ok(series)
    }

    /// Sum record counts per calendar day and fill missing days with zero
    pub fn aggregate(data: &AppointmentData) -> Result<(Self, CleaningReport)> {
        let mut totals: BTreeMap<NaiveDate, u64> = BTreeMap::new();
        for record in data.records() {
            *totals.entry(record.date).or_insert(0) += u64::from(record.appointment_count);
        }

        let (first, last) = match (totals.keys().next(), totals.keys().next_back()) {
            (Some(first), Some(last)) => (*first, *last),
            _ => {
                return Err(ForecastError::DataError(
                    "Cannot aggregate an empty dataset".to_string(),
                ))
            }
        };

        let mut report = CleaningReport {
            missing_counts: data.missing_counts(),
            ..CleaningReport::default()
        };
        let values = date_range(first, last)
            .into_iter()
            .map(|day| match totals.get(&day) {
                Some(total) => *total as f64,
                None => {
                    report.imputed_days.push(day);
                    0.0
                }
            })
            .collect();

        let series = Self::new(first, values)?;

        if report.has_imputations() {
            info!(
                "Missing data detected, imputed {} absent days and {} empty counts with 0",
                report.imputed_days.len(),
                report.missing_counts
            );
        }
        debug!(
            "Aggregated {} records into {} days ({} to {})",
            data.len(),
            series.len(),
            series.start(),
            series.end()
        );

        Ok((series, report))
    }

    /// Check that every value is a finite, non-negative number
    pub fn validate(&self) -> Result<()> {
        if self.values.is_empty() {
            return Err(ForecastError::DataError(
                "Daily series is empty".to_string(),
            ));
        }

        if let Some((offset, value)) = self
            .values
            .iter()
            .enumerate()
            .find(|(_, v)| !v.is_finite() || **v < 0.0)
        {
            return Err(ForecastError::ValidationError(format!(
                "Column '{}' must hold non-negative numbers, found {} on {}",
                COUNT_COLUMN,
                value,
                self.date_at(offset)
            )));
        }

        Ok(())
    }

    /// First day of the series
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last day of the series
    pub fn end(&self) -> NaiveDate {
        self.date_at(self.values.len().saturating_sub(1))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Dates of every value, in order
    pub fn dates(&self) -> Vec<NaiveDate> {
        date_range(self.start, self.end())
    }

    /// `(date, value)` pairs
    pub fn points(&self) -> Vec<(NaiveDate, f64)> {
        self.dates().into_iter().zip(self.values.iter().copied()).collect()
    }

    /// Inclusive sub-series between two dates
    pub fn slice(&self, from: NaiveDate, to: NaiveDate) -> Result<Self> {
        if from > to || from < self.start || to > self.end() {
            return Err(ForecastError::InvalidParameter(format!(
                "Range {} to {} is outside the series ({} to {})",
                from,
                to,
                self.start,
                self.end()
            )));
        }

        let begin = (from - self.start).num_days() as usize;
        let end = (to - self.start).num_days() as usize;

        Ok(Self {
            start: from,
            values: self.values[begin..=end].to_vec(),
        })
    }

    /// Mean daily count
    pub fn mean(&self) -> Result<f64> {
        Ok(stats::mean(&self.values)?)
    }

    fn date_at(&self, offset: usize) -> NaiveDate {
        self.start + chrono::Days::new(offset as u64)
    }
}

/// Record counts per animal type, largest first
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryCounts {
    entries: Vec<(String, usize)>,
}

impl CategoryCounts {
    /// Count records per animal type
    pub fn from_records(records: &[AppointmentRecord]) -> Self {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for record in records {
            *counts.entry(record.animal_type.as_str()).or_insert(0) += 1;
        }

        let mut entries: Vec<(String, usize)> = counts
            .into_iter()
            .map(|(name, count)| (name.to_string(), count))
            .collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        Self { entries }
    }

    pub fn entries(&self) -> &[(String, usize)] {
        &self.entries
    }

    /// Total number of records
    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, count)| count).sum()
    }

    /// Count for one animal type
    pub fn get(&self, category: &str) -> Option<usize> {
        self.entries
            .iter()
            .find(|(name, _)| name == category)
            .map(|(_, count)| *count)
    }

    /// Share of each animal type in percent
    pub fn percentages(&self) -> Vec<(String, f64)> {
        let total = self.total();
        if total == 0 {
            return Vec::new();
        }

        self.entries
            .iter()
            .map(|(name, count)| (name.clone(), *count as f64 / total as f64 * 100.0))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 3, d).unwrap()
    }

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count("7"), Ok(7));
        assert!(parse_count("-1").unwrap_err().contains("negative"));
        assert!(parse_count("siete").is_err());
        assert!(parse_count("2.5").is_err());
    }

    #[test]
    fn test_slice() {
        let series = DailySeries::new(day(1), vec![1.0, 2.0, 3.0, 4.0]).unwrap();

        assert_eq!(series.end(), day(4));

        let sub = series.slice(day(2), day(3)).unwrap();
        assert_eq!(sub.start(), day(2));
        assert_eq!(sub.values(), &[2.0, 3.0]);

        assert!(series.slice(day(3), day(2)).is_err());
        assert!(series.slice(day(1), day(9)).is_err());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(DailySeries::new(day(1), vec![]).is_err());
        assert!(matches!(
            DailySeries::new(day(1), vec![1.0, f64::NAN]),
            Err(ForecastError::ValidationError(_))
        ));
        assert!(DailySeries::new(day(1), vec![-1.0]).is_err());
    }

    #[test]
    fn test_category_percentages() {
        let records: Vec<AppointmentRecord> = ["Gato", "Perro", "Perro", "Perro"]
            .iter()
            .enumerate()
            .map(|(i, name)| AppointmentRecord {
                date: day(i as u32 + 1),
                animal_type: name.to_string(),
                appointment_count: 1,
            })
            .collect();

        let counts = CategoryCounts::from_records(&records);
        assert_eq!(counts.entries()[0], ("Perro".to_string(), 3));
        assert_eq!(counts.get("Gato"), Some(1));
        assert_eq!(counts.total(), 4);
        assert_eq!(
            counts.percentages(),
            vec![("Perro".to_string(), 75.0), ("Gato".to_string(), 25.0)]
        );
    }
}
