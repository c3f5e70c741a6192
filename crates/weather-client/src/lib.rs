//! Forecast API client.
//!
//! This crate provides:
//! - `WeatherClient` for fetching multi-day forecasts over HTTP
//! - Serde models for the forecast payload
//! - Hourly, daily and "current condition" views over a forecast

pub mod client;
pub mod error;
pub mod forecast;

pub use client::{validate_coordinates, WeatherClient, DEFAULT_BASE_URL};
pub use error::{Result, WeatherClientError};
pub use forecast::{
    current_condition, daily, hourly, DailyForecast, Forecast, ForecastEntry, Readings,
    WeatherDescription,
};
