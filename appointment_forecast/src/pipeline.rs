//! End-to-end runs of both programs

use crate::config::{AppConfig, GeneratorConfig};
use crate::data::{AppointmentData, CategoryCounts, CleaningReport, DailySeries, DataLoader};
use crate::error::Result;
use crate::generator::{generate_records, write_csv};
use crate::metrics::{trend_summary, TrendSummary};
use crate::models::{ForecastModel, ForecastResult, SarimaModel, TrainedForecastModel};
use crate::report::{render_line_chart, render_pie_chart, LineChart, PieChart};
use crate::window::ForecastWindow;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs;
use std::path::PathBuf;
use tracing::info;

/// Everything computed before drawing
#[derive(Debug, Clone)]
pub struct ForecastAnalysis {
    pub cleaning: CleaningReport,
    pub window: ForecastWindow,
    pub forecast: ForecastResult,
    pub summary: TrendSummary,
    pub categories: CategoryCounts,
}

/// Result of a full report run
#[derive(Debug, Clone)]
pub struct ReportOutcome {
    pub analysis: ForecastAnalysis,
    pub line_chart: PathBuf,
    pub pie_chart: PathBuf,
}

/// Generate the synthetic dataset and write it, returning its path
pub fn run_generator(config: &GeneratorConfig) -> Result<PathBuf> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let records = generate_records(config, &mut rng)?;
    write_csv(&config.output_path, &records)?;
    Ok(config.output_path.clone())
}

/// Aggregate, window, fit and forecast already loaded records
pub fn analyze(data: &AppointmentData, config: &AppConfig) -> Result<ForecastAnalysis> {
    let forecast_config = &config.forecast;
    forecast_config.validate()?;

    let (series, cleaning) = DailySeries::aggregate(data)?;
    let window = ForecastWindow::trailing(&series, forecast_config.window_months)?;

    let model = SarimaModel::new(forecast_config.order, forecast_config.seasonal_order)?
        .with_confidence_level(forecast_config.confidence_level)?
        .with_max_iterations(forecast_config.max_iterations)?;
    info!("Fitting {} on {} days", model.name(), window.len());
    let trained = model.train(window.series())?;
    let forecast = trained.forecast(forecast_config.horizon)?;

    let summary = trend_summary(&window, &forecast)?;
    info!(
        "Window mean {:.3}, forecast mean {:.3}, trend {}",
        summary.window_mean, summary.forecast_mean, summary.trend
    );

    Ok(ForecastAnalysis {
        cleaning,
        window,
        forecast,
        summary,
        categories: data.category_counts(),
    })
}

/// Load the dataset, forecast and render both charts
pub fn run_forecast_report(config: &AppConfig) -> Result<ReportOutcome> {
    config.validate()?;

    let data = DataLoader::from_csv(&config.forecast.data_path)?;
    let analysis = analyze(&data, config)?;

    let report = &config.report;
    fs::create_dir_all(&report.output_dir)?;

    let line_content = LineChart::new(
        &analysis.window,
        &analysis.forecast,
        &analysis.summary.trend,
        report.show_confidence_band,
    );
    let line_chart = report.line_chart_path();
    render_line_chart(&line_content, &line_chart)?;

    let pie_content = PieChart::new(&analysis.categories)?;
    let pie_chart = report.pie_chart_path();
    render_pie_chart(&pie_content, &pie_chart)?;

    Ok(ReportOutcome {
        analysis,
        line_chart,
        pie_chart,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::AppointmentRecord;
    use chrono::{Days, NaiveDate};

    fn records(days: u64) -> AppointmentData {
        let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let records = (0..days)
            .map(|i| AppointmentRecord {
                date: start + Days::new(i),
                animal_type: if i % 3 == 0 { "Gato" } else { "Perro" }.to_string(),
                appointment_count: [4, 6, 5, 7, 3, 5, 6][(i % 7) as usize],
            })
            .collect();
        AppointmentData::new(records).unwrap()
    }

    #[test]
    fn test_analyze_forecasts_after_window() {
        let config = AppConfig::default();
        let analysis = analyze(&records(90), &config).unwrap();

        assert_eq!(analysis.forecast.horizon(), 30);
        assert_eq!(
            analysis.forecast.start(),
            analysis.window.end().succ_opt().unwrap()
        );
        assert!(analysis.forecast.intervals().is_some());
        assert_eq!(analysis.categories.total(), 90);
        assert!(!analysis.cleaning.has_imputations());
    }

    #[test]
    fn test_analyze_short_history_is_a_model_error() {
        let config = AppConfig::default();
        let err = analyze(&records(5), &config).unwrap_err();
        assert!(matches!(err, crate::error::ForecastError::ModelError(_)));
    }
}
