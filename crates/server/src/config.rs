//! Service configuration loaded from environment variables.

use pipeline::FilterMode;
use std::env;
use std::path::PathBuf;
use weather_client::DEFAULT_BASE_URL;

pub const DEFAULT_DATA_DIR: &str = "data/catalog";

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    /// Directory holding activities.dat, preferences.dat and personal.dat
    pub data_dir: PathBuf,
    /// How partial weather queries are treated by the filter views
    pub filter_mode: FilterMode,
    /// Forecast API key; forecast operations are disabled without it
    pub weather_api_key: Option<String>,
    pub weather_api_url: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            filter_mode: FilterMode::default(),
            weather_api_key: None,
            weather_api_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from the environment, reading `.env` if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key/value source.
    ///
    /// Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let filter_mode = match get("ACTIVITY_FILTER_MODE") {
            Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
                var: "ACTIVITY_FILTER_MODE",
                value,
            })?,
            None => defaults.filter_mode,
        };

        Ok(Self {
            data_dir: get("ACTIVITY_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            filter_mode,
            weather_api_key: get("WEATHER_API_KEY"),
            weather_api_url: get("WEATHER_API_URL").unwrap_or(defaults.weather_api_url),
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value}")]
    Invalid { var: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ServiceConfig::default());
        assert_eq!(config.filter_mode, FilterMode::IndependentOptional);
        assert!(config.weather_api_key.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = ServiceConfig::from_lookup(lookup(&[
            ("ACTIVITY_DATA_DIR", "/srv/catalog"),
            ("ACTIVITY_FILTER_MODE", "both"),
            ("WEATHER_API_KEY", " abc123 "),
            ("WEATHER_API_URL", "http://localhost:8081"),
        ]))
        .unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/srv/catalog"));
        assert_eq!(config.filter_mode, FilterMode::BothRequired);
        assert_eq!(config.weather_api_key.as_deref(), Some("abc123"));
        assert_eq!(config.weather_api_url, "http://localhost:8081");
    }

    #[test]
    fn test_blank_key_is_unset() {
        let config = ServiceConfig::from_lookup(lookup(&[("WEATHER_API_KEY", "  ")])).unwrap();
        assert!(config.weather_api_key.is_none());
    }

    #[test]
    fn test_invalid_filter_mode() {
        let err = ServiceConfig::from_lookup(lookup(&[("ACTIVITY_FILTER_MODE", "sometimes")]))
            .unwrap_err();
        assert!(err.to_string().contains("ACTIVITY_FILTER_MODE"));
    }
}
