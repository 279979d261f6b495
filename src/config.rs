use thiserror::Error;

use crate::api::forecast::ForecastClient;

pub const DEFAULT_CHART_WIDTH: u32 = 1024;
pub const DEFAULT_CHART_HEIGHT: u32 = 768;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{0} not set")]
    Missing(&'static str),
    #[error("{key} has invalid value '{value}'")]
    Invalid { key: &'static str, value: String },
}

/// PNG dimensions for rendered charts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartSize {
    pub width: u32,
    pub height: u32,
}

/// Bot settings read from the environment (after `.env` is loaded)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub discord_token: String,
    pub forecast_api_url: String,
    pub chart_size: ChartSize,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let discord_token = lookup("DISCORD_TOKEN")
            .filter(|token| !token.trim().is_empty())
            .ok_or(ConfigError::Missing("DISCORD_TOKEN"))?;

        let forecast_api_url = lookup("FORECAST_API_URL")
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| ForecastClient::DEFAULT_BASE_URL.to_string());

        let chart_size = ChartSize {
            width: parse_dimension(&lookup, "CHART_WIDTH", DEFAULT_CHART_WIDTH)?,
            height: parse_dimension(&lookup, "CHART_HEIGHT", DEFAULT_CHART_HEIGHT)?,
        };

        Ok(Self {
            discord_token,
            forecast_api_url,
            chart_size,
        })
    }
}

fn parse_dimension<F>(lookup: &F, key: &'static str, default: u32) -> Result<u32, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|&px| px > 0)
            .ok_or(ConfigError::Invalid { key, value: raw }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("DISCORD_TOKEN", "abc")]).unwrap();
        assert_eq!(config.discord_token, "abc");
        assert_eq!(config.forecast_api_url, "http://fastapi:8000");
        assert_eq!(config.chart_size, ChartSize { width: 1024, height: 768 });
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("DISCORD_TOKEN", "abc"),
            ("FORECAST_API_URL", "http://localhost:9000/"),
            ("CHART_WIDTH", "800"),
            ("CHART_HEIGHT", "600"),
        ])
        .unwrap();
        assert_eq!(config.forecast_api_url, "http://localhost:9000");
        assert_eq!(config.chart_size, ChartSize { width: 800, height: 600 });
    }

    #[test]
    fn test_missing_token() {
        assert_eq!(load(&[]), Err(ConfigError::Missing("DISCORD_TOKEN")));
        assert_eq!(load(&[("DISCORD_TOKEN", "  ")]), Err(ConfigError::Missing("DISCORD_TOKEN")));
    }

    #[test]
    fn test_invalid_dimension() {
        let err = load(&[("DISCORD_TOKEN", "abc"), ("CHART_WIDTH", "wide")]).unwrap_err();
        assert_eq!(err, ConfigError::Invalid { key: "CHART_WIDTH", value: "wide".to_string() });

        let err = load(&[("DISCORD_TOKEN", "abc"), ("CHART_HEIGHT", "0")]).unwrap_err();
        assert_eq!(err, ConfigError::Invalid { key: "CHART_HEIGHT", value: "0".to_string() });
    }
}
