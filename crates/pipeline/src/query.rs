//! Weather queries and filter modes.
//!
//! Some views treat temperature and sky label as independently optional,
//! others need both. `FilterMode` names the two behaviours so callers pick
//! one explicitly instead of inferring it from which parameters showed up.

use crate::error::{EngineError, Result};
use catalog::{normalize_sky, SkyCondition, WeatherCondition};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a view treats missing query parameters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterMode {
    /// Temperature and sky label are each optional; a missing one filters nothing
    #[default]
    IndependentOptional,
    /// Both temperature and sky label must be present
    BothRequired,
}

impl FromStr for FilterMode {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "independent" | "independent_optional" | "optional" => {
                Ok(FilterMode::IndependentOptional)
            }
            "both" | "both_required" | "required" => Ok(FilterMode::BothRequired),
            other => Err(EngineError::invalid(format!("unknown filter mode '{}'", other))),
        }
    }
}

impl fmt::Display for FilterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterMode::IndependentOptional => f.write_str("independent"),
            FilterMode::BothRequired => f.write_str("both"),
        }
    }
}

/// A temperature and/or sky label to filter by.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherQuery {
    pub temperature: Option<f64>,
    /// Raw sky label as the caller sent it; blank labels are stored as `None`
    pub label: Option<String>,
}

impl WeatherQuery {
    pub fn new(temperature: Option<f64>, label: Option<&str>) -> Self {
        let label = label
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string);
        Self { temperature, label }
    }

    /// A query with both axes taken from a full weather condition.
    pub fn from_condition(condition: &WeatherCondition) -> Self {
        Self::new(Some(condition.temperature), Some(&condition.label))
    }

    /// The normalized sky, if a label was given.
    pub fn sky(&self) -> Option<SkyCondition> {
        self.label.as_deref().map(normalize_sky)
    }

    pub fn is_empty(&self) -> bool {
        self.temperature.is_none() && self.label.is_none()
    }

    /// Check the query against a filter mode.
    ///
    /// A present temperature must be finite in either mode.
    pub fn check(&self, mode: FilterMode) -> Result<()> {
        if let Some(t) = self.temperature {
            if !t.is_finite() {
                return Err(EngineError::invalid("temperature must be a finite number"));
            }
        }
        if mode == FilterMode::BothRequired && (self.temperature.is_none() || self.label.is_none())
        {
            return Err(EngineError::invalid(
                "temperature and sky label are both required",
            ));
        }
        Ok(())
    }

    /// Fail when neither axis is present.
    pub fn require_any(&self) -> Result<()> {
        if self.is_empty() {
            return Err(EngineError::invalid(
                "at least one filter is required: temperature or sky label",
            ));
        }
        Ok(())
    }
}
