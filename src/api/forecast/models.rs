use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Request body for POST /forecast
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ForecastRequest {
    pub ticker: String,
    pub periods: u32,
}

/// Observed price point from the `historical` array
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoricalPoint {
    #[serde(deserialize_with = "deserialize_ds")]
    pub ds: NaiveDate,
    pub y: f64,
}

/// Predicted price point from the `forecast` array.
/// Extra model columns (yhat_lower, yhat_upper, trend...) are ignored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForecastPoint {
    #[serde(deserialize_with = "deserialize_ds")]
    pub ds: NaiveDate,
    pub yhat: f64,
}

/// Successful response from POST /forecast
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForecastResponse {
    pub historical: Vec<HistoricalPoint>,
    pub forecast: Vec<ForecastPoint>,
}

/// Parse a `ds` value into a calendar date.
///
/// Accepts plain dates (`2024-01-01`) as well as the date-time shapes a
/// dataframe serializer tends to emit (`2024-01-01T00:00:00`,
/// `2024-01-01 00:00:00.000`, RFC 3339). The time of day is discarded.
pub fn parse_ds(raw: &str) -> Result<NaiveDate, String> {
    let trimmed = raw.trim();

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(datetime.date());
        }
    }

    DateTime::parse_from_rfc3339(trimmed)
        .map(|datetime| datetime.date_naive())
        .map_err(|_| format!("invalid date '{}'", raw))
}

fn deserialize_ds<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_ds(&raw).map_err(serde::de::Error::custom)
}

/// Errors from the forecasting service client
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// Any status other than 200 OK
    #[error("Forecast service returned HTTP {code}: {body}")]
    Status { code: u16, body: String },
    /// Network/request error
    #[error("Request Error: {0}")]
    Request(String),
    /// Body was not the expected JSON shape
    #[error("Deserialization Error: {0}")]
    Deserialization(String),
}

impl ApiError {
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ApiError::Status { code, .. } => Some(*code),
            _ => None,
        }
    }

    pub fn is_client_error(&self) -> bool {
        matches!(self.status_code(), Some(400..=499))
    }

    pub fn is_server_error(&self) -> bool {
        matches!(self.status_code(), Some(500..=599))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ds_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(parse_ds("2024-01-01").unwrap(), expected);
        assert_eq!(parse_ds("2024-01-01T00:00:00").unwrap(), expected);
        assert_eq!(parse_ds("2024-01-01 13:45:00.000").unwrap(), expected);
        assert_eq!(parse_ds("2024-01-01T09:30:00+00:00").unwrap(), expected);
        assert!(parse_ds("01/01/2024").is_err());
        assert!(parse_ds("").is_err());
    }

    #[test]
    fn test_response_deserializes() {
        let body = r#"{
            "historical": [{"ds": "2024-01-01", "y": 100}],
            "forecast": [{"ds": "2024-02-01T00:00:00", "yhat": 110.5, "yhat_lower": 100.0, "yhat_upper": 120.0}]
        }"#;
        let response: ForecastResponse = serde_json::from_str(body).unwrap();

        assert_eq!(response.historical.len(), 1);
        assert_eq!(response.historical[0].y, 100.0);
        assert_eq!(response.forecast[0].ds, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(response.forecast[0].yhat, 110.5);
    }

    #[test]
    fn test_response_rejects_missing_fields() {
        let missing_forecast = r#"{"historical": [{"ds": "2024-01-01", "y": 100}]}"#;
        assert!(serde_json::from_str::<ForecastResponse>(missing_forecast).is_err());

        let missing_yhat = r#"{"historical": [], "forecast": [{"ds": "2024-02-01", "y": 1}]}"#;
        assert!(serde_json::from_str::<ForecastResponse>(missing_yhat).is_err());

        let bad_date = r#"{"historical": [{"ds": "yesterday", "y": 1}], "forecast": []}"#;
        assert!(serde_json::from_str::<ForecastResponse>(bad_date).is_err());

        let string_value = r#"{"historical": [{"ds": "2024-01-01", "y": "100"}], "forecast": []}"#;
        assert!(serde_json::from_str::<ForecastResponse>(string_value).is_err());
    }

    #[test]
    fn test_error_classification() {
        let not_found = ApiError::Status { code: 404, body: String::new() };
        let server = ApiError::Status { code: 503, body: String::new() };
        let network = ApiError::Request("connection refused".to_string());

        assert!(not_found.is_client_error());
        assert!(!not_found.is_server_error());
        assert!(server.is_server_error());
        assert_eq!(network.status_code(), None);
        assert!(!network.is_client_error());
    }
}
