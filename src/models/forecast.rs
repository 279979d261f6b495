//! Forecast query result models

use chrono::NaiveDate;

use super::chart::{ChartRow, SeriesType};

/// Merged historical + forecast dataset for one ticker
#[derive(Debug, Clone)]
pub struct ForecastResult {
    pub ticker: String,
    pub periods: u32,
    pub rows: Vec<ChartRow>,
}

/// Per-series figures shown under the chart
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesSummary {
    pub series_type: SeriesType,
    pub points: usize,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub last_value: f64,
}

impl ForecastResult {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows belonging to one series, in dataset order
    pub fn series(&self, series_type: SeriesType) -> impl Iterator<Item = &ChartRow> {
        self.rows.iter().filter(move |row| row.series_type == series_type)
    }

    /// Summary for one series, or `None` if the backend returned no points for it
    pub fn summary(&self, series_type: SeriesType) -> Option<SeriesSummary> {
        let mut points = 0;
        let mut first_date: Option<NaiveDate> = None;
        let mut last: Option<&ChartRow> = None;

        for row in self.series(series_type) {
            points += 1;
            first_date = Some(first_date.map_or(row.date, |d| d.min(row.date)));
            if last.map_or(true, |l| row.date >= l.date) {
                last = Some(row);
            }
        }

        let last = last?;
        Some(SeriesSummary {
            series_type,
            points,
            first_date: first_date?,
            last_date: last.date,
            last_value: last.value,
        })
    }
}
