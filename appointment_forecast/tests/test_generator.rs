use appointment_forecast::config::GeneratorConfig;
use appointment_forecast::data::{DailySeries, DataLoader};
use appointment_forecast::generator::{generate_records, write_csv};
use appointment_forecast::pipeline::run_generator;
use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tempfile::tempdir;

#[test]
fn test_default_year_has_one_record_per_day() {
    let config = GeneratorConfig::default();
    let mut rng = StdRng::seed_from_u64(config.seed);

    let records = generate_records(&config, &mut rng).unwrap();

    assert_eq!(records.len(), 365);
    assert_eq!(records[0].date, NaiveDate::from_ymd_opt(2023, 1, 1).unwrap());
    assert_eq!(records[364].date, NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());
    assert!(records
        .iter()
        .all(|r| r.animal_type == "Perro" || r.animal_type == "Gato"));
    assert!(records.windows(2).all(|w| w[0].date < w[1].date));
}

#[test]
fn test_poisson_mean_is_respected() {
    let config = GeneratorConfig::default();
    let mut rng = StdRng::seed_from_u64(7);

    let records = generate_records(&config, &mut rng).unwrap();
    let mean = records.iter().map(|r| r.appointment_count as f64).sum::<f64>() / records.len() as f64;

    assert!((mean - 5.0).abs() < 0.75, "mean was {}", mean);
}

#[test]
fn test_written_dataset_loads_back() {
    let dir = tempdir().unwrap();
    let config = GeneratorConfig {
        output_path: dir.path().join("nested").join("citas.csv"),
        ..GeneratorConfig::default()
    };
    let mut rng = StdRng::seed_from_u64(config.seed);
    let records = generate_records(&config, &mut rng).unwrap();

    write_csv(&config.output_path, &records).unwrap();
    let data = DataLoader::from_csv(&config.output_path).unwrap();

    assert_eq!(data.records(), records.as_slice());
    let (series, report) = DailySeries::aggregate(&data).unwrap();
    assert_eq!(series.len(), 365);
    assert!(!report.has_imputations());
}

#[test]
fn test_run_generator_is_reproducible() {
    let dir = tempdir().unwrap();
    let config = GeneratorConfig {
        output_path: dir.path().join("citas.csv"),
        ..GeneratorConfig::default()
    };

    let path = run_generator(&config).unwrap();
    let first = std::fs::read_to_string(&path).unwrap();
    run_generator(&config).unwrap();
    let second = std::fs::read_to_string(&path).unwrap();

    assert_eq!(first, second);
    assert!(first.starts_with("Fecha,Tipo de Animal,Cantidad de Citas\n"));
}

#[test]
fn test_invalid_mean_rejected() {
    let config = GeneratorConfig {
        poisson_mean: 0.0,
        ..GeneratorConfig::default()
    };
    let mut rng = StdRng::seed_from_u64(1);

    assert!(generate_records(&config, &mut rng).is_err());
}
