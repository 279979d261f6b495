use reqwest::Client as HttpClient;
use reqwest::StatusCode;
use tracing::{debug, warn};

use super::models::{ApiError, ForecastRequest, ForecastResponse};

/// Client for the remote forecasting service
#[derive(Debug, Clone)]
pub struct ForecastClient {
    http_client: HttpClient,
    base_url: String,
}

impl ForecastClient {
    pub const DEFAULT_BASE_URL: &'static str = "http://fastapi:8000";

    /// Create a client with a custom base URL
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http_client: HttpClient::new(),
            base_url,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST /forecast
    ///
    /// Requests `periods` days of forecast for `ticker`, along with the
    /// observed history the model was fitted on.
    ///
    /// # Returns
    /// * `Ok(ForecastResponse)` - only for HTTP 200 with a well-formed body
    /// * `Err(ApiError)` - any other status, a transport failure, or a body
    ///   missing required fields
    pub async fn forecast(&self, ticker: &str, periods: u32) -> Result<ForecastResponse, ApiError> {
        let url = format!("{}/forecast", self.base_url);
        let body = ForecastRequest {
            ticker: ticker.to_string(),
            periods,
        };

        debug!("POST {} {:?}", url, body);

        let response = self.http_client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ApiError::Request(format!("Request failed: {}", e)))?;

        let status = response.status();
        if status != StatusCode::OK {
            let body_text = response.text().await.unwrap_or_default();
            warn!("Forecast service returned {} for {}: {}", status, ticker, body_text);
            return Err(ApiError::Status {
                code: status.as_u16(),
                body: body_text,
            });
        }

        response
            .json::<ForecastResponse>()
            .await
            .map_err(|e| ApiError::Deserialization(format!("Failed to parse response: {}", e)))
    }
}
