//! Error types for the service layer.
//!
//! Every failure a caller can see maps onto an HTTP-style status code so
//! front ends can render it without matching on the inner error.

use catalog::CatalogError;
use pipeline::EngineError;
use serde::Serialize;
use thiserror::Error;
use weather_client::WeatherClientError;

#[derive(Error, Debug)]
pub enum ServiceError {
    /// A request parameter was missing or malformed
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Weather(#[from] WeatherClientError),

    /// No API key was configured for the forecast API
    #[error("Weather service is not configured")]
    WeatherUnavailable,
}

impl ServiceError {
    pub fn status_code(&self) -> u16 {
        match self {
            ServiceError::InvalidInput(_) | ServiceError::Engine(_) => 400,
            ServiceError::Catalog(err) => match err {
                CatalogError::Validation(_) | CatalogError::InvalidValue { .. } => 400,
                CatalogError::NotFound { .. } => 404,
                CatalogError::Conflict(_) => 409,
                CatalogError::FileNotFound { .. }
                | CatalogError::IoError(_)
                | CatalogError::ParseError { .. }
                | CatalogError::MissingReference { .. } => 500,
            },
            ServiceError::Weather(WeatherClientError::InvalidCoordinates { .. }) => 400,
            ServiceError::Weather(_) => 502,
            ServiceError::WeatherUnavailable => 503,
        }
    }
}

/// Body returned alongside a non-2xx status.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorEnvelope {
    pub error: String,
}

impl From<&ServiceError> for ErrorEnvelope {
    fn from(err: &ServiceError) -> Self {
        Self {
            error: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let cases: Vec<(ServiceError, u16)> = vec![
            (ServiceError::InvalidInput("user id".into()), 400),
            (EngineError::InvalidInput("bad".into()).into(), 400),
            (CatalogError::Validation("min > max".into()).into(), 400),
            (
                CatalogError::NotFound {
                    entity: "Activity".into(),
                    id: "9".into(),
                }
                .into(),
                404,
            ),
            (CatalogError::Conflict("duplicate".into()).into(), 409),
            (
                WeatherClientError::Upstream {
                    status: 401,
                    body: String::new(),
                }
                .into(),
                502,
            ),
            (
                WeatherClientError::InvalidCoordinates { lat: 99.0, lon: 0.0 }.into(),
                400,
            ),
            (ServiceError::WeatherUnavailable, 503),
        ];

        for (err, expected) in cases {
            assert_eq!(err.status_code(), expected, "{err}");
        }
    }

    #[test]
    fn test_error_envelope() {
        let err = ServiceError::from(CatalogError::Conflict("already exists".into()));
        let json = serde_json::to_value(ErrorEnvelope::from(&err)).unwrap();
        assert_eq!(json, serde_json::json!({ "error": "Conflict: already exists" }));
    }
}
