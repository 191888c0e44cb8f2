use appointment_forecast::config::{AppConfig, GeneratorConfig, ReportConfig};
use appointment_forecast::data::DataLoader;
use appointment_forecast::pipeline::{analyze, run_forecast_report, run_generator};
use appointment_forecast::report::{LineChart, PieChart};
use std::path::Path;
use tempfile::tempdir;

fn config_in(dir: &Path) -> AppConfig {
    let data_path = dir.join("dataset_citas_mascotas.csv");
    let mut config = AppConfig {
        generator: GeneratorConfig {
            output_path: data_path.clone(),
            ..GeneratorConfig::default()
        },
        report: ReportConfig {
            output_dir: dir.join("graficas"),
            ..ReportConfig::default()
        },
        ..AppConfig::default()
    };
    config.forecast.data_path = data_path;
    config
}

#[test]
fn test_generate_then_analyze() {
    let dir = tempdir().unwrap();
    let config = config_in(dir.path());

    run_generator(&config.generator).unwrap();
    let data = DataLoader::from_csv(&config.forecast.data_path).unwrap();
    let analysis = analyze(&data, &config).unwrap();

    assert_eq!(analysis.window.end().to_string(), "2023-12-31");
    assert_eq!(analysis.window.start().to_string(), "2023-11-30");
    assert_eq!(analysis.forecast.horizon(), 30);
    assert_eq!(analysis.forecast.start().to_string(), "2024-01-01");
    assert_eq!(analysis.categories.total(), 365);

    let line = LineChart::new(
        &analysis.window,
        &analysis.forecast,
        &analysis.summary.trend,
        false,
    );
    assert_eq!(line.history.len(), 32);
    assert_eq!(line.forecast.len(), 30);
    assert!(line.band.is_none());
    assert_eq!(line.annotation, analysis.summary.trend.message());

    let pie = PieChart::new(&analysis.categories).unwrap();
    let share: f64 = pie.slices.iter().map(|s| s.percentage).sum();
    assert!((share - 100.0).abs() < 1e-9);
}

#[test]
fn test_missing_dataset_fails_before_drawing() {
    let dir = tempdir().unwrap();
    let config = config_in(dir.path());

    assert!(run_forecast_report(&config).is_err());
    assert!(!config.report.line_chart_path().exists());
}

#[test]
#[ignore = "requires system fonts"]
fn test_full_report_writes_both_charts() {
    let dir = tempdir().unwrap();
    let mut config = config_in(dir.path());
    config.report.show_confidence_band = true;

    run_generator(&config.generator).unwrap();
    let outcome = run_forecast_report(&config).unwrap();

    assert!(outcome.line_chart.exists());
    assert!(outcome.pie_chart.exists());
    assert!(std::fs::metadata(&outcome.line_chart).unwrap().len() > 0);
}
