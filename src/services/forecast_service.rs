use thiserror::Error;
use tracing::info;

use crate::api::forecast::{ApiError, ForecastClient, ForecastPoint, ForecastResponse, HistoricalPoint};
use crate::models::{ChartRow, ForecastResult, SeriesType};

pub const DEFAULT_TICKER: &str = "AAPL";
pub const DEFAULT_PERIODS: u32 = 30;
pub const MIN_PERIODS: u32 = 1;
pub const MAX_PERIODS: u32 = 365;

/// Shown for every backend failure, whatever the underlying cause
pub const FETCH_ERROR_MESSAGE: &str = "Error fetching data. Please check the ticker symbol.";

/// Input validation failures, reported before any request is made
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("Ticker symbol cannot be empty")]
    EmptyTicker,
    #[error("'{0}' is not a whole number of days")]
    InvalidHorizon(String),
    #[error("Forecast horizon must be between 1 and 365 days (got {0})")]
    HorizonOutOfRange(i64),
    #[error("Too many arguments")]
    TooManyArguments,
}

/// A validated ticker + horizon pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForecastQuery {
    pub ticker: String,
    pub periods: u32,
}

impl ForecastQuery {
    /// The ticker is forwarded as typed, minus surrounding whitespace
    pub fn new(ticker: &str, periods: i64) -> Result<Self, QueryError> {
        let ticker = ticker.trim().to_string();
        if ticker.is_empty() {
            return Err(QueryError::EmptyTicker);
        }

        if periods < MIN_PERIODS as i64 || periods > MAX_PERIODS as i64 {
            return Err(QueryError::HorizonOutOfRange(periods));
        }

        Ok(Self {
            ticker,
            periods: periods as u32,
        })
    }
}

impl Default for ForecastQuery {
    fn default() -> Self {
        Self {
            ticker: DEFAULT_TICKER.to_string(),
            periods: DEFAULT_PERIODS,
        }
    }
}

/// Parse a day count typed by the user
pub fn parse_periods(raw: &str) -> Result<i64, QueryError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| QueryError::InvalidHorizon(raw.to_string()))
}

/// Tag and concatenate both series into one dataset.
///
/// Historical rows come first. Forecast `yhat` values land in the same
/// `value` field as historical `y` values so both share one axis.
pub fn combine_series(historical: Vec<HistoricalPoint>, forecast: Vec<ForecastPoint>) -> Vec<ChartRow> {
    let mut rows = Vec::with_capacity(historical.len() + forecast.len());

    rows.extend(historical.into_iter().map(|point| ChartRow {
        date: point.ds,
        value: point.y,
        series_type: SeriesType::Historical,
    }));

    rows.extend(forecast.into_iter().map(|point| ChartRow {
        date: point.ds,
        value: point.yhat,
        series_type: SeriesType::Forecast,
    }));

    rows
}

/// Fetch a forecast and merge it into a chartable dataset
pub async fn request_forecast(
    client: &ForecastClient,
    query: &ForecastQuery,
) -> Result<ForecastResult, ApiError> {
    info!("Requesting {}-day forecast for {} from {}", query.periods, query.ticker, client.base_url());

    let ForecastResponse { historical, forecast } = client.forecast(&query.ticker, query.periods).await?;

    info!(
        "Forecast service returned {} historical and {} forecast points for {}",
        historical.len(),
        forecast.len(),
        query.ticker
    );

    Ok(ForecastResult {
        ticker: query.ticker.clone(),
        periods: query.periods,
        rows: combine_series(historical, forecast),
    })
}
