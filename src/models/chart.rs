//! Chart data models

use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

/// Which series a chart row came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SeriesType {
    Historical,
    Forecast,
}

impl SeriesType {
    /// Legend order: historical first
    pub const ALL: [SeriesType; 2] = [SeriesType::Historical, SeriesType::Forecast];

    pub fn as_str(self) -> &'static str {
        match self {
            SeriesType::Historical => "Historical",
            SeriesType::Forecast => "Forecast",
        }
    }
}

impl fmt::Display for SeriesType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single row of the merged dataset drawn on the chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartRow {
    pub date: NaiveDate,
    pub value: f64,
    pub series_type: SeriesType,
}
