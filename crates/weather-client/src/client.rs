//! HTTP client for the forecast API.

use crate::error::{Result, WeatherClientError};
use crate::forecast::Forecast;
use tracing::{debug, warn};

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

/// Number of 3-hour entries requested per forecast.
const FORECAST_COUNT: u32 = 80;

/// Forecast API client.
#[derive(Clone)]
pub struct WeatherClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl std::fmt::Debug for WeatherClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl WeatherClient {
    /// Create a client for the given API key and base URL.
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch the multi-day forecast for a coordinate pair.
    pub async fn fetch_forecast(&self, lat: f64, lon: f64) -> Result<Forecast> {
        validate_coordinates(lat, lon)?;

        let url = format!("{}/forecast", self.base_url);
        debug!(lat, lon, "fetching forecast");

        let response = self
            .http
            .get(&url)
            .query(&self.forecast_query(lat, lon))
            .send()
            .await
            .map_err(|e| WeatherClientError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "weather API request failed");
            return Err(WeatherClientError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<Forecast>()
            .await
            .map_err(|e| WeatherClientError::InvalidResponse(e.to_string()))
    }

    fn forecast_query(&self, lat: f64, lon: f64) -> Vec<(&'static str, String)> {
        vec![
            ("lat", lat.to_string()),
            ("lon", lon.to_string()),
            ("appid", self.api_key.clone()),
            ("units", "metric".to_string()),
            ("cnt", FORECAST_COUNT.to_string()),
        ]
    }
}

/// Latitude must be in [-90, 90] and longitude in [-180, 180].
pub fn validate_coordinates(lat: f64, lon: f64) -> Result<()> {
    let lat_ok = lat.is_finite() && (-90.0..=90.0).contains(&lat);
    let lon_ok = lon.is_finite() && (-180.0..=180.0).contains(&lon);
    if lat_ok && lon_ok {
        Ok(())
    } else {
        Err(WeatherClientError::InvalidCoordinates { lat, lon })
    }
}
