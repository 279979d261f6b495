use chrono::{Duration, NaiveDate};
use plotters::prelude::*;
use serde_json::{json, Value};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{ChartRow, SeriesType};

pub const X_TITLE: &str = "Date";
pub const Y_TITLE: &str = "Stock Price (USD)";
pub const LEGEND_TITLE: &str = "Data Type";
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Size of the interactive (Vega-Lite) chart
pub const INTERACTIVE_WIDTH: u32 = 700;
pub const INTERACTIVE_HEIGHT: u32 = 400;

const ORANGE: RGBColor = RGBColor(255, 165, 0);

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("No data points to chart")]
    NoData,
    #[error("Failed to render chart: {0}")]
    Render(String),
    #[error("Chart file error: {0}")]
    Io(#[from] std::io::Error),
}

fn render_err<E: std::fmt::Display>(e: E) -> ChartError {
    ChartError::Render(e.to_string())
}

/// Fixed series → color mapping shared by the PNG and the interactive spec
pub fn series_color(series_type: SeriesType) -> RGBColor {
    match series_type {
        SeriesType::Historical => BLUE,
        SeriesType::Forecast => ORANGE,
    }
}

pub fn series_color_name(series_type: SeriesType) -> &'static str {
    match series_type {
        SeriesType::Historical => "blue",
        SeriesType::Forecast => "orange",
    }
}

/// Presentation settings for one forecast chart
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl ChartSpec {
    pub fn for_ticker(ticker: &str, width: u32, height: u32) -> Self {
        Self {
            title: format!("Stock Prices and Forecast for {}", ticker),
            width,
            height,
        }
    }
}

/// Earliest and latest date, widened by a day on each side when they coincide
pub fn date_bounds(rows: &[ChartRow]) -> Result<(NaiveDate, NaiveDate), ChartError> {
    let min = rows.iter().map(|r| r.date).min().ok_or(ChartError::NoData)?;
    let max = rows.iter().map(|r| r.date).max().ok_or(ChartError::NoData)?;

    if min == max {
        let day = Duration::days(1);
        let lower = min
            .checked_sub_signed(day)
            .ok_or_else(|| ChartError::Render(format!("date {} is at the edge of the calendar", min)))?;
        let upper = max
            .checked_add_signed(day)
            .ok_or_else(|| ChartError::Render(format!("date {} is at the edge of the calendar", max)))?;
        return Ok((lower, upper));
    }
    Ok((min, max))
}

/// Value range with 10% padding; never dips below zero for non-negative data.
///
/// Fails when the padded range does not fit in an `f64`, which plotters
/// cannot lay out.
pub fn value_bounds(rows: &[ChartRow]) -> Result<(f64, f64), ChartError> {
    if rows.is_empty() {
        return Err(ChartError::NoData);
    }

    let min = rows.iter().map(|r| r.value).fold(f64::INFINITY, f64::min);
    let max = rows.iter().map(|r| r.value).fold(f64::NEG_INFINITY, f64::max);

    let span = max - min;
    let padding = if span > f64::EPSILON {
        span * 0.1
    } else {
        (max.abs() * 0.05).max(1.0)
    };

    let lower = if min >= 0.0 { (min - padding).max(0.0) } else { min - padding };
    let upper = max + padding;
    if !(lower.is_finite() && upper.is_finite()) {
        return Err(ChartError::Render(format!(
            "value range {} to {} is too wide to plot",
            min, max
        )));
    }
    Ok((lower, upper))
}

/// Render the merged dataset as a PNG line chart, one line per series
pub fn render_png(spec: &ChartSpec, rows: &[ChartRow]) -> Result<Vec<u8>, ChartError> {
    let (x_min, x_max) = date_bounds(rows)?;
    let (y_min, y_max) = value_bounds(rows)?;

    // BitMapBackend encodes PNG only when writing to a path
    let temp_file = std::env::temp_dir().join(format!("forecast_chart_{}.png", Uuid::new_v4()));

    let drawn = draw_chart(&temp_file, spec, rows, (x_min, x_max), (y_min, y_max));
    let image_data = drawn.and_then(|_| std::fs::read(&temp_file).map_err(ChartError::from));

    if let Err(e) = std::fs::remove_file(&temp_file) {
        tracing::debug!("Could not remove chart file {}: {}", temp_file.display(), e);
    }

    image_data
}

fn draw_chart(
    path: &std::path::Path,
    spec: &ChartSpec,
    rows: &[ChartRow],
    (x_min, x_max): (NaiveDate, NaiveDate),
    (y_min, y_max): (f64, f64),
) -> Result<(), ChartError> {
    let root = BitMapBackend::new(path, (spec.width, spec.height)).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(&spec.title, ("sans-serif", 32.0).into_font())
        .margin(15)
        .x_label_area_size(50)
        .y_label_area_size(80)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)
        .map_err(render_err)?;

    chart
        .configure_mesh()
        .x_desc(X_TITLE)
        .y_desc(Y_TITLE)
        .x_label_formatter(&|d: &NaiveDate| d.format(DATE_FORMAT).to_string())
        .y_label_formatter(&|v: &f64| format!("{:.2}", v))
        .label_style(("sans-serif", 18))
        .axis_desc_style(("sans-serif", 20))
        .draw()
        .map_err(render_err)?;

    for series_type in SeriesType::ALL {
        let points: Vec<(NaiveDate, f64)> = rows
            .iter()
            .filter(|r| r.series_type == series_type)
            .map(|r| (r.date, r.value))
            .collect();

        if points.is_empty() {
            continue;
        }

        let color = series_color(series_type);

        // A lone point draws no line segment, mark it instead
        if points.len() == 1 {
            chart
                .draw_series(points.iter().map(|&p| Circle::new(p, 4, color.filled())))
                .map_err(render_err)?;
        }

        chart
            .draw_series(LineSeries::new(points, color.stroke_width(2)))
            .map_err(render_err)?
            .label(series_type.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .label_font(("sans-serif", 16))
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(render_err)?;

    root.present().map_err(render_err)?;
    Ok(())
}

/// Render off the async runtime; plotting is CPU-bound
pub async fn generate_chart(spec: ChartSpec, rows: Vec<ChartRow>) -> Result<Vec<u8>, ChartError> {
    tokio::task::spawn_blocking(move || render_png(&spec, &rows))
        .await
        .map_err(|e| ChartError::Render(format!("render task failed: {}", e)))?
}

/// Vega-Lite v5 document for the same chart, with tooltips and pan/zoom
pub fn vega_lite_spec(spec: &ChartSpec, rows: &[ChartRow]) -> Value {
    let domain: Vec<&str> = SeriesType::ALL.iter().map(|s| s.as_str()).collect();
    let range: Vec<&str> = SeriesType::ALL.iter().map(|s| series_color_name(*s)).collect();

    json!({
        "$schema": "https://vega.github.io/schema/vega-lite/v5.json",
        "title": {"text": spec.title, "fontSize": 20},
        "width": INTERACTIVE_WIDTH,
        "height": INTERACTIVE_HEIGHT,
        "data": {"values": rows},
        "mark": "line",
        "encoding": {
            "x": {
                "field": "date",
                "type": "temporal",
                "title": X_TITLE,
                "axis": {"format": DATE_FORMAT, "labelFontSize": 18, "titleFontSize": 20}
            },
            "y": {
                "field": "value",
                "type": "quantitative",
                "title": Y_TITLE,
                "axis": {"labelFontSize": 18, "titleFontSize": 20}
            },
            "color": {
                "field": "series_type",
                "type": "nominal",
                "legend": {"title": LEGEND_TITLE},
                "scale": {"domain": domain, "range": range}
            },
            "tooltip": [
                {"field": "date", "type": "temporal", "title": X_TITLE, "format": DATE_FORMAT},
                {"field": "value", "type": "quantitative", "title": Y_TITLE},
                {"field": "series_type", "type": "nominal", "title": LEGEND_TITLE}
            ]
        },
        "params": [
            {"name": "pan_zoom", "select": "interval", "bind": "scales"}
        ],
        "config": {
            "legend": {"titleFontSize": 16, "labelFontSize": 14}
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(y: i32, m: u32, d: u32, value: f64, series_type: SeriesType) -> ChartRow {
        ChartRow {
            date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            value,
            series_type,
        }
    }

    fn scenario_rows() -> Vec<ChartRow> {
        vec![
            row(2024, 1, 1, 100.0, SeriesType::Historical),
            row(2024, 2, 1, 110.0, SeriesType::Forecast),
        ]
    }

    #[test]
    fn test_spec_title() {
        let spec = ChartSpec::for_ticker("AAPL", 1024, 768);
        assert_eq!(spec.title, "Stock Prices and Forecast for AAPL");
    }

    #[test]
    fn test_value_bounds_padding() {
        let (lower, upper) = value_bounds(&scenario_rows()).unwrap();
        assert!((lower - 99.0).abs() < 1e-9);
        assert!((upper - 111.0).abs() < 1e-9);
    }

    #[test]
    fn test_value_bounds_flat_and_empty() {
        let flat = vec![row(2024, 1, 1, 50.0, SeriesType::Historical)];
        let (lower, upper) = value_bounds(&flat).unwrap();
        assert!(lower < 50.0 && upper > 50.0);

        let near_zero = vec![row(2024, 1, 1, 0.5, SeriesType::Historical), row(2024, 1, 2, 10.0, SeriesType::Forecast)];
        assert_eq!(value_bounds(&near_zero).unwrap().0, 0.0);

        assert!(matches!(value_bounds(&[]), Err(ChartError::NoData)));
    }

    #[test]
    fn test_date_bounds() {
        let (min, max) = date_bounds(&scenario_rows()).unwrap();
        assert_eq!(min, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(max, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());

        let single = vec![row(2024, 3, 10, 1.0, SeriesType::Historical)];
        let (min, max) = date_bounds(&single).unwrap();
        assert_eq!(min, NaiveDate::from_ymd_opt(2024, 3, 9).unwrap());
        assert_eq!(max, NaiveDate::from_ymd_opt(2024, 3, 11).unwrap());

        assert!(matches!(date_bounds(&[]), Err(ChartError::NoData)));
    }

    #[test]
    fn test_value_bounds_rejects_overflowing_range() {
        let extreme = vec![
            row(2024, 1, 1, 1e308, SeriesType::Historical),
            row(2024, 1, 2, -1e308, SeriesType::Forecast),
        ];
        assert!(matches!(value_bounds(&extreme), Err(ChartError::Render(_))));

        let huge = vec![row(2024, 1, 1, f64::MAX, SeriesType::Historical)];
        assert!(matches!(value_bounds(&huge), Err(ChartError::Render(_))));
    }

    #[test]
    fn test_date_bounds_calendar_edge() {
        let first = vec![ChartRow { date: NaiveDate::MIN, value: 1.0, series_type: SeriesType::Historical }];
        assert!(matches!(date_bounds(&first), Err(ChartError::Render(_))));

        let last = vec![ChartRow { date: NaiveDate::MAX, value: 1.0, series_type: SeriesType::Forecast }];
        assert!(matches!(date_bounds(&last), Err(ChartError::Render(_))));
    }

    fn assert_png(bytes: &[u8]) {
        assert!(bytes.starts_with(b"\x89PNG\r\n\x1a\n"), "not a PNG image");
    }

    #[test]
    fn test_render_png_rejects_empty() {
        let spec = ChartSpec::for_ticker("AAPL", 320, 240);
        assert!(matches!(render_png(&spec, &[]), Err(ChartError::NoData)));
    }

    #[test]
    fn test_render_png_scenario() {
        let spec = ChartSpec::for_ticker("AAPL", 640, 480);
        let png = render_png(&spec, &scenario_rows()).unwrap();
        assert_png(&png);
    }

    #[test]
    fn test_render_png_single_point() {
        let spec = ChartSpec::for_ticker("AAPL", 320, 240);
        let png = render_png(&spec, &[row(2024, 3, 10, 42.0, SeriesType::Historical)]).unwrap();
        assert_png(&png);
    }

    #[test]
    fn test_render_png_forecast_only() {
        let spec = ChartSpec::for_ticker("MSFT", 320, 240);
        let rows: Vec<ChartRow> = (1..=5)
            .map(|d| row(2024, 6, d, 400.0 + d as f64, SeriesType::Forecast))
            .collect();
        let png = render_png(&spec, &rows).unwrap();
        assert_png(&png);
    }

    #[test]
    fn test_render_png_extreme_values_fail_fast() {
        let spec = ChartSpec::for_ticker("AAPL", 320, 240);
        let rows = vec![
            row(2024, 1, 1, 1e308, SeriesType::Historical),
            row(2024, 1, 2, -1e308, SeriesType::Forecast),
        ];
        assert!(matches!(render_png(&spec, &rows), Err(ChartError::Render(_))));
    }

    #[tokio::test]
    async fn test_generate_chart_off_runtime() {
        let spec = ChartSpec::for_ticker("AAPL", 320, 240);
        let png = generate_chart(spec, scenario_rows()).await.unwrap();
        assert_png(&png);
    }

    #[test]
    fn test_vega_lite_encoding() {
        let spec = ChartSpec::for_ticker("AAPL", 1024, 768);
        let doc = vega_lite_spec(&spec, &scenario_rows());

        assert_eq!(doc["title"]["text"], "Stock Prices and Forecast for AAPL");
        assert_eq!(doc["mark"], "line");
        assert_eq!(doc["encoding"]["x"]["type"], "temporal");
        assert_eq!(doc["encoding"]["x"]["axis"]["format"], "%Y-%m-%d");
        assert_eq!(doc["encoding"]["color"]["scale"]["domain"], json!(["Historical", "Forecast"]));
        assert_eq!(doc["encoding"]["color"]["scale"]["range"], json!(["blue", "orange"]));
        assert_eq!(doc["encoding"]["tooltip"].as_array().unwrap().len(), 3);
        assert_eq!(doc["params"][0]["bind"], "scales");
    }

    #[test]
    fn test_vega_lite_data_values() {
        let spec = ChartSpec::for_ticker("AAPL", 1024, 768);
        let doc = vega_lite_spec(&spec, &scenario_rows());

        assert_eq!(
            doc["data"]["values"],
            json!([
                {"date": "2024-01-01", "value": 100.0, "series_type": "Historical"},
                {"date": "2024-02-01", "value": 110.0, "series_type": "Forecast"}
            ])
        );
    }
}
