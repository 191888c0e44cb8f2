//! Chart rendering
//!
//! Each chart is described by a plain description built from the data, then drawn
//! by a function that owns its own drawing area and writes one PNG file.
//! Nothing is shared between two renders.

use crate::data::CategoryCounts;
use crate::error::{ForecastError, Result};
use crate::metrics::Trend;
use crate::models::ForecastResult;
use crate::window::ForecastWindow;
use chrono::NaiveDate;
use plotters::element::Pie;
use plotters::prelude::*;
use plotters::series::DashedLineSeries;
use std::fmt::Display;
use std::fs;
use std::path::Path;
use tracing::info;

pub const LINE_CHART_SIZE: (u32, u32) = (1400, 800);
pub const PIE_CHART_SIZE: (u32, u32) = (800, 800);

const HISTORY_COLOR: RGBColor = RGBColor(31, 119, 180);
const FORECAST_COLOR: RGBColor = RGBColor(214, 39, 40);
const INCREASE_COLOR: RGBColor = RGBColor(0, 128, 0);
const DECREASE_COLOR: RGBColor = RGBColor(214, 39, 40);
const UNDEFINED_COLOR: RGBColor = RGBColor(110, 110, 110);
const GRID_COLOR: RGBColor = RGBColor(200, 200, 200);
/// Dash length and gap of the forecast line, in pixels
const FORECAST_DASH: (i32, i32) = (10, 6);

/// Slice colors, reused cyclically
const PIE_PALETTE: [RGBColor; 6] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
];

/// Content of the history and forecast line chart
#[derive(Debug, Clone, PartialEq)]
pub struct LineChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub history_label: String,
    pub forecast_label: String,
    /// Observed counts inside the window
    pub history: Vec<(NaiveDate, f64)>,
    /// Forecast values
    pub forecast: Vec<(NaiveDate, f64)>,
    /// Lower and upper forecast bounds
    pub band: Option<Vec<(NaiveDate, f64, f64)>>,
    /// Trend annotation
    pub annotation: String,
    pub annotation_color: RGBColor,
}

/// One pie slice
#[derive(Debug, Clone, PartialEq)]
pub struct PieSlice {
    pub category: String,
    pub count: usize,
    pub percentage: f64,
    pub color: RGBColor,
}

/// Content of the category distribution pie chart
#[derive(Debug, Clone, PartialEq)]
pub struct PieChart {
    pub title: String,
    pub legend_title: String,
    pub slices: Vec<PieSlice>,
}

impl LineChart {
    /// Describe the window, its forecast and the trend annotation
    pub fn new(
        window: &ForecastWindow,
        forecast: &ForecastResult,
        trend: &Trend,
        show_band: bool,
    ) -> Self {
        let band = if show_band {
            forecast.intervals().map(|intervals| {
                forecast
                    .dates()
                    .iter()
                    .zip(intervals)
                    .map(|(date, (lower, upper))| (*date, *lower, *upper))
                    .collect()
            })
        } else {
            None
        };

        Self {
            title: "Citas Diarias y Proyección".to_string(),
            x_label: "Fecha".to_string(),
            y_label: "Cantidad de Citas".to_string(),
            history_label: "Citas Reales".to_string(),
            forecast_label: "Proyección Próximo Mes".to_string(),
            history: window.series().points(),
            forecast: forecast.points(),
            band,
            annotation: trend.message(),
            annotation_color: trend_color(trend),
        }
    }

    /// First and last day shown
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.history.first().or(self.forecast.first())?.0;
        let last = self.forecast.last().or(self.history.last())?.0;
        Some((first, last))
    }

    /// Vertical axis range, from zero to a little above the largest value
    pub fn y_range(&self) -> (f64, f64) {
        let band_max = self
            .band
            .iter()
            .flatten()
            .map(|(_, _, upper)| *upper);
        let max = self
            .history
            .iter()
            .chain(&self.forecast)
            .map(|(_, v)| *v)
            .chain(band_max)
            .fold(0.0, f64::max);
        let min = self
            .forecast
            .iter()
            .map(|(_, v)| *v)
            .fold(0.0, f64::min);

        (min, max * 1.1 + 1.0)
    }

    /// Horizontal position of `date`, in days from the first day shown
    pub fn day_offset(&self, date: NaiveDate) -> i32 {
        self.date_range()
            .map(|(first, _)| (date - first).num_days() as i32)
            .unwrap_or(0)
    }

    /// Observed counts in chart coordinates
    pub fn history_path(&self) -> Vec<(i32, f64)> {
        self.history
            .iter()
            .map(|(date, value)| (self.day_offset(*date), *value))
            .collect()
    }

    /// Forecast in chart coordinates, joined to the last observed day
    pub fn forecast_path(&self) -> Vec<(i32, f64)> {
        self.history
            .last()
            .into_iter()
            .chain(&self.forecast)
            .map(|(date, value)| (self.day_offset(*date), *value))
            .collect()
    }
}

/// Annotation color for a trend
pub fn trend_color(trend: &Trend) -> RGBColor {
    match trend {
        Trend::Increase(_) => INCREASE_COLOR,
        Trend::Decrease(_) => DECREASE_COLOR,
        Trend::Undefined => UNDEFINED_COLOR,
    }
}

impl PieChart {
    /// One slice per animal type, largest first
    pub fn new(counts: &CategoryCounts) -> Result<Self> {
        if counts.total() == 0 {
            return Err(ForecastError::DataError(
                "Cannot draw a pie chart without records".to_string(),
            ));
        }

        let slices = counts
            .entries()
            .iter()
            .zip(counts.percentages())
            .enumerate()
            .map(|(i, ((category, count), (_, percentage)))| PieSlice {
                category: category.clone(),
                count: *count,
                percentage,
                color: PIE_PALETTE[i % PIE_PALETTE.len()],
            })
            .collect();

        Ok(Self {
            title: "Distribución por Tipo de Animal".to_string(),
            legend_title: "Tipos de Animales".to_string(),
            slices,
        })
    }

    /// Slice labels with their share, e.g. `Perro (51.2%)`
    pub fn labels(&self) -> Vec<String> {
        self.slices
            .iter()
            .map(|s| format!("{} ({:.1}%)", s.category, s.percentage))
            .collect()
    }
}

/// Draw the line chart into a PNG file
pub fn render_line_chart(content: &LineChart, output: &Path) -> Result<()> {
    let (first, last) = content.date_range().ok_or_else(|| {
        ForecastError::DataError("Cannot draw a line chart without data".to_string())
    })?;
    ensure_parent_dir(output)?;

    let x_max = content.day_offset(last).max(1);
    let (y_min, y_max) = content.y_range();

    let root = BitMapBackend::new(output, LINE_CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(chart_error)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            &content.title,
            ("sans-serif", 36).into_font().style(FontStyle::Bold),
        )
        .margin(30)
        .x_label_area_size(70)
        .y_label_area_size(80)
        .build_cartesian_2d(0..x_max, y_min..y_max)
        .map_err(chart_error)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc(content.x_label.as_str())
        .y_desc(content.y_label.as_str())
        .x_labels(12)
        .y_labels(10)
        .bold_line_style(ShapeStyle::from(&GRID_COLOR).stroke_width(1))
        .light_line_style(ShapeStyle::from(&WHITE))
        .x_label_style(("sans-serif", 14))
        .y_label_style(("sans-serif", 16))
        .x_label_formatter(&|x| {
            (first + chrono::Duration::days(i64::from(*x)))
                .format("%Y-%m-%d")
                .to_string()
        })
        .y_label_formatter(&|y| format!("{:.0}", y))
        .axis_desc_style(("sans-serif", 20))
        .draw()
        .map_err(chart_error)?;

    if let Some(band) = &content.band {
        let upper = band.iter().map(|(d, _, u)| (content.day_offset(*d), *u));
        let lower = band.iter().rev().map(|(d, l, _)| (content.day_offset(*d), *l));
        chart
            .draw_series(std::iter::once(Polygon::new(
                upper.chain(lower).collect::<Vec<_>>(),
                FORECAST_COLOR.mix(0.15).filled(),
            )))
            .map_err(chart_error)?;
    }

    let history = content.history_path();
    chart
        .draw_series(LineSeries::new(
            history.iter().copied(),
            HISTORY_COLOR.stroke_width(2),
        ))
        .map_err(chart_error)?
        .label(content.history_label.as_str())
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], HISTORY_COLOR.stroke_width(2)));
    chart
        .draw_series(
            history
                .iter()
                .map(|point| Circle::new(*point, 4, HISTORY_COLOR.filled())),
        )
        .map_err(chart_error)?;

    let (dash, gap) = FORECAST_DASH;
    chart
        .draw_series(DashedLineSeries::new(
            content.forecast_path(),
            dash,
            gap,
            FORECAST_COLOR.stroke_width(2),
        ))
        .map_err(chart_error)?
        .label(content.forecast_label.as_str())
        .legend(|(x, y)| {
            PathElement::new(vec![(x, y), (x + 8, y)], FORECAST_COLOR.stroke_width(2))
        });

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .label_font(("sans-serif", 18))
        .draw()
        .map_err(chart_error)?;

    root.draw(&Text::new(
        content.annotation.clone(),
        (150, 100),
        ("sans-serif", 24)
            .into_font()
            .style(FontStyle::Bold)
            .color(&content.annotation_color),
    ))
    .map_err(chart_error)?;

    root.present().map_err(chart_error)?;
    info!("Line chart written to {}", output.display());
    Ok(())
}

/// Draw the pie chart into a PNG file
pub fn render_pie_chart(content: &PieChart, output: &Path) -> Result<()> {
    ensure_parent_dir(output)?;

    let root = BitMapBackend::new(output, PIE_CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(chart_error)?;
    let area = root
        .titled(&content.title, ("sans-serif", 32))
        .map_err(chart_error)?;

    let (width, height) = area.dim_in_pixel();
    let center = (width as i32 / 2, height as i32 / 2 + 20);
    let radius = f64::from(width.min(height)) * 0.33;
    let sizes: Vec<f64> = content.slices.iter().map(|s| s.count as f64).collect();
    let colors: Vec<RGBColor> = content.slices.iter().map(|s| s.color).collect();
    let labels = content.labels();

    let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
    pie.start_angle(-90.0);
    pie.label_style(("sans-serif", 22).into_font().color(&BLACK));
    area.draw(&pie).map_err(chart_error)?;

    draw_legend(&area, &content.legend_title, &content.slices, (width as i32 - 200, 10))?;

    root.present().map_err(chart_error)?;
    info!("Pie chart written to {}", output.display());
    Ok(())
}

fn draw_legend<DB: DrawingBackend>(
    area: &DrawingArea<DB, plotters::coord::Shift>,
    title: &str,
    slices: &[PieSlice],
    origin: (i32, i32),
) -> Result<()> {
    let (x, y) = origin;
    area.draw(&Rectangle::new(
        [(x - 10, y - 5), (x + 190, y + 35 + 28 * slices.len() as i32)],
        BLACK.stroke_width(1),
    ))
    .map_err(chart_error)?;
    area.draw(&Text::new(
        title.to_string(),
        (x, y),
        ("sans-serif", 18).into_font().style(FontStyle::Bold),
    ))
    .map_err(chart_error)?;

    for (i, slice) in slices.iter().enumerate() {
        let row = y + 32 + 28 * i as i32;
        area.draw(&Rectangle::new(
            [(x, row), (x + 18, row + 18)],
            slice.color.filled(),
        ))
        .map_err(chart_error)?;
        area.draw(&Text::new(
            slice.category.clone(),
            (x + 28, row),
            ("sans-serif", 16),
        ))
        .map_err(chart_error)?;
    }

    Ok(())
}

/// Create the parent directory of `output` when missing
fn ensure_parent_dir(output: &Path) -> Result<()> {
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

fn chart_error<E: Display>(err: E) -> ForecastError {
    ForecastError::ChartError(err.to_string())
}
