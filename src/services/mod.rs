pub mod chart_service;
pub mod forecast_service;
