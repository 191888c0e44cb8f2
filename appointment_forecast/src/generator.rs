//! Synthetic appointment dataset
//!
//! One record per calendar day: a uniformly drawn animal type and a
//! Poisson-distributed appointment count. The random source is passed in by
//! the caller, so a seeded generator reproduces the same dataset.

use crate::config::GeneratorConfig;
use crate::data::AppointmentRecord;
use crate::error::{ForecastError, Result};
use crate::utils::date_range;
use rand::seq::SliceRandom;
use rand::Rng;
use rand_distr::{Distribution, Poisson};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Draw one record per day of the configured range
pub fn generate_records<R: Rng + ?Sized>(
    config: &GeneratorConfig,
    rng: &mut R,
) -> Result<Vec<AppointmentRecord>> {
    config.validate()?;

    let poisson = Poisson::new(config.poisson_mean).map_err(|e| {
        ForecastError::InvalidParameter(format!(
            "Invalid Poisson mean {}: {}",
            config.poisson_mean, e
        ))
    })?;

    let days = date_range(config.start_date, config.end_date);

    // All animal types are drawn before any count.
    let mut animal_types = Vec::with_capacity(days.len());
    for _ in &days {
        let animal_type = config.categories.choose(rng).ok_or_else(|| {
            ForecastError::ConfigError("At least one animal type is required".to_string())
        })?;
        animal_types.push(animal_type.clone());
    }

    let records = days
        .into_iter()
        .zip(animal_types)
        .map(|(date, animal_type)| {
            let draw: f64 = poisson.sample(rng);
            AppointmentRecord {
                date,
                animal_type,
                appointment_count: draw as u32,
            }
        })
        .collect();

    Ok(records)
}

/// Serialize records as CSV with a header row
pub fn write_records<W: Write>(writer: W, records: &[AppointmentRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write records to `path`, replacing any existing file
pub fn write_csv<P: AsRef<Path>>(path: P, records: &[AppointmentRecord]) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let file = File::create(path)?;
    write_records(file, records)?;
    info!("Wrote {} records to {}", records.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn small_config() -> GeneratorConfig {
        GeneratorConfig {
            start_date: NaiveDate::from_ymd_opt(2024, 2, 27).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 3, 2).unwrap(),
            ..GeneratorConfig::default()
        }
    }

    #[test]
    fn test_one_record_per_day() {
        let mut rng = StdRng::seed_from_u64(7);
        let records = generate_records(&small_config(), &mut rng).unwrap();

        // 2024 is a leap year
        assert_eq!(records.len(), 5);
        for pair in records.windows(2) {
            assert_eq!(pair[1].date, pair[0].date.succ_opt().unwrap());
        }
    }

    #[test]
    fn test_same_seed_same_records() {
        let config = small_config();
        let first = generate_records(&config, &mut StdRng::seed_from_u64(42)).unwrap();
        let second = generate_records(&config, &mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_write_records_header() {
        let records = vec![AppointmentRecord {
            date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            animal_type: "Gato".to_string(),
            appointment_count: 4,
        }];

        let mut buffer = Vec::new();
        write_records(&mut buffer, &records).unwrap();

        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(
            text,
            "Fecha,Tipo de Animal,Cantidad de Citas\n2023-01-01,Gato,4\n"
        );
    }
}
