//! Error types for the weather client.

use thiserror::Error;

/// Errors that can occur when talking to the forecast API
#[derive(Error, Debug)]
pub enum WeatherClientError {
    /// Latitude or longitude outside the valid range
    #[error("Invalid coordinates: lat {lat}, lon {lon}")]
    InvalidCoordinates { lat: f64, lon: f64 },

    /// The request never got a response
    #[error("Failed to reach weather API: {0}")]
    Request(String),

    /// The API answered with a non-success status
    #[error("Weather API returned HTTP {status}: {body}")]
    Upstream { status: u16, body: String },

    /// The response body didn't match the forecast shape
    #[error("Invalid response from weather API: {0}")]
    InvalidResponse(String),

    /// The forecast had no entries to derive a condition from
    #[error("Forecast contains no entries")]
    EmptyForecast,
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, WeatherClientError>;
