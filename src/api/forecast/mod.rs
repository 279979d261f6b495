pub mod client;
pub mod models;

pub use client::ForecastClient;
pub use models::{ApiError, ForecastPoint, ForecastResponse, HistoricalPoint};
