//! Data models for forecast commands and services
//!
//! Result and data transfer structs produced by the service layer and
//! consumed by the command layer.

pub mod chart;
pub mod forecast;

pub use chart::{ChartRow, SeriesType};
pub use forecast::ForecastResult;
