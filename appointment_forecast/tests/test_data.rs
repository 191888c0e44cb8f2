use approx::assert_abs_diff_eq;
use appointment_forecast::data::{DailySeries, DataLoader};
use appointment_forecast::ForecastError;
use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use std::io::Write;
use tempfile::NamedTempFile;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn csv_file(lines: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    for line in lines {
        writeln!(file, "{}", line).unwrap();
    }
    file
}

#[test]
fn test_data_loader_from_csv() {
    let file = csv_file(&[
        "Fecha,Tipo de Animal,Cantidad de Citas",
        "2023-01-01,Perro,4",
        "2023-01-02,Gato,6",
        "2023-01-03,Perro,5",
    ]);

    let data = DataLoader::from_csv(file.path()).unwrap();

    assert_eq!(data.len(), 3);
    assert_eq!(data.missing_counts(), 0);
    assert_eq!(data.records()[1].animal_type, "Gato");
    assert_eq!(data.records()[1].appointment_count, 6);
}

#[test]
fn test_missing_days_are_zero_filled() {
    let file = csv_file(&[
        "Fecha,Tipo de Animal,Cantidad de Citas",
        "2023-01-01,Perro,4",
        "2023-01-04,Gato,6",
    ]);

    let data = DataLoader::from_csv(file.path()).unwrap();
    let (series, report) = DailySeries::aggregate(&data).unwrap();

    assert_eq!(series.values(), &[4.0, 0.0, 0.0, 6.0]);
    assert_eq!(report.imputed_days, vec![date(2023, 1, 2), date(2023, 1, 3)]);
    assert!(report.has_imputations());
}

#[test]
fn test_same_day_records_are_summed() {
    let file = csv_file(&[
        "Fecha,Tipo de Animal,Cantidad de Citas",
        "2023-01-01,Perro,4",
        "2023-01-01,Gato,3",
        "2023-01-02,Gato,1",
    ]);

    let data = DataLoader::from_csv(file.path()).unwrap();
    let (series, report) = DailySeries::aggregate(&data).unwrap();

    assert_eq!(series.values(), &[7.0, 1.0]);
    assert!(!report.has_imputations());
}

#[test]
fn test_loading_twice_gives_the_same_series() {
    let file = csv_file(&[
        "Fecha,Tipo de Animal,Cantidad de Citas",
        "2023-01-03,Perro,2",
        "2023-01-01,Gato,5",
    ]);

    let (first, _) = DailySeries::aggregate(&DataLoader::from_csv(file.path()).unwrap()).unwrap();
    let (second, _) = DailySeries::aggregate(&DataLoader::from_csv(file.path()).unwrap()).unwrap();

    assert_eq!(first, second);
    assert_eq!(first.start(), date(2023, 1, 1));
    assert_eq!(first.end(), date(2023, 1, 3));
}

#[test]
fn test_empty_count_is_imputed() {
    let file = csv_file(&[
        "Fecha,Tipo de Animal,Cantidad de Citas",
        "2023-01-01,Perro,",
        "2023-01-02,Gato,3",
    ]);

    let data = DataLoader::from_csv(file.path()).unwrap();
    let (series, report) = DailySeries::aggregate(&data).unwrap();

    assert_eq!(data.missing_counts(), 1);
    assert_eq!(report.missing_counts, 1);
    assert_eq!(series.values(), &[0.0, 3.0]);
}

#[test]
fn test_missing_column_is_a_data_error() {
    let file = csv_file(&["Fecha,Tipo de Animal", "2023-01-01,Perro"]);

    let err = DataLoader::from_csv(file.path()).unwrap_err();
    assert!(matches!(err, ForecastError::DataError(_)));
    assert!(err.to_string().contains("Cantidad de Citas"));
}

#[test]
fn test_non_numeric_count_names_the_line() {
    let file = csv_file(&[
        "Fecha,Tipo de Animal,Cantidad de Citas",
        "2023-01-01,Perro,4",
        "2023-01-02,Gato,muchas",
    ]);

    let err = DataLoader::from_csv(file.path()).unwrap_err();
    assert!(matches!(err, ForecastError::ValidationError(_)));
    assert!(err.to_string().contains("Line 3"));
}

#[test]
fn test_negative_count_rejected() {
    let file = csv_file(&[
        "Fecha,Tipo de Animal,Cantidad de Citas",
        "2023-01-01,Perro,-2",
    ]);

    let err = DataLoader::from_csv(file.path()).unwrap_err();
    assert!(err.to_string().contains("negative"));
}

#[test]
fn test_header_only_file_is_a_data_error() {
    let file = csv_file(&["Fecha,Tipo de Animal,Cantidad de Citas"]);

    let err = DataLoader::from_csv(file.path()).unwrap_err();
    assert!(matches!(err, ForecastError::DataError(_)));
}

#[test]
fn test_missing_file_is_an_io_error() {
    let err = DataLoader::from_csv("no/such/dataset.csv").unwrap_err();
    assert!(matches!(err, ForecastError::IoError(_)));
}

#[test]
fn test_category_counts() {
    let file = csv_file(&[
        "Fecha,Tipo de Animal,Cantidad de Citas",
        "2023-01-01,Gato,4",
        "2023-01-02,Perro,1",
        "2023-01-03,Perro,9",
        "2023-01-04,Perro,2",
    ]);

    let counts = DataLoader::from_csv(file.path()).unwrap().category_counts();

    assert_eq!(
        counts.entries(),
        &[("Perro".to_string(), 3), ("Gato".to_string(), 1)]
    );
    assert_eq!(counts.total(), 4);
    assert_abs_diff_eq!(counts.percentages()[0].1, 75.0, epsilon = 1e-12);
    assert_abs_diff_eq!(counts.percentages()[1].1, 25.0, epsilon = 1e-12);
}
