//! Forecast payloads and the views derived from them.
//!
//! The API returns a flat list of 3-hour entries. `hourly` and `daily`
//! reshape that list the way the app displays it; `current_condition`
//! turns the first entry into something the engine can consume.

use crate::error::{Result, WeatherClientError};
use catalog::{SkyCondition, WeatherCondition};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Number of entries in the hourly view.
pub const HOURLY_ENTRIES: usize = 7;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub list: Vec<ForecastEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<City>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub name: String,
    #[serde(default)]
    pub country: String,
}

/// One 3-hour slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    /// Unix timestamp, UTC
    pub dt: i64,
    /// "YYYY-MM-DD HH:MM:SS"
    pub dt_txt: String,
    pub main: Readings,
    #[serde(default)]
    pub weather: Vec<WeatherDescription>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Readings {
    pub temp: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humidity: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherDescription {
    /// Category such as "Clear", "Clouds" or "Rain"
    pub main: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
}

impl ForecastEntry {
    /// Calendar date part of `dt_txt`.
    pub fn date(&self) -> &str {
        self.dt_txt
            .split_once(' ')
            .map_or(self.dt_txt.as_str(), |(date, _)| date)
    }

    /// Category label of the first weather description, if any.
    pub fn label(&self) -> Option<&str> {
        self.weather.first().map(|w| w.main.as_str())
    }
}

/// Aggregate for one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    pub date: String,
    pub temperature_min: f64,
    pub temperature_max: f64,
    /// Most frequent category label of the day
    pub label: String,
    pub sky: SkyCondition,
}

/// The first few entries, as shown in the hourly strip.
pub fn hourly(forecast: &Forecast) -> &[ForecastEntry] {
    let end = forecast.list.len().min(HOURLY_ENTRIES);
    &forecast.list[..end]
}

/// Group entries by calendar date.
///
/// Days keep the order they appear in. The first day is dropped because it
/// only covers what is left of today.
pub fn daily(forecast: &Forecast) -> Vec<DailyForecast> {
    let mut days: Vec<(&str, Vec<&ForecastEntry>)> = Vec::new();
    for entry in &forecast.list {
        match days.last_mut() {
            Some((date, entries)) if *date == entry.date() => entries.push(entry),
            _ => days.push((entry.date(), vec![entry])),
        }
    }

    days.into_iter()
        .skip(1)
        .map(|(date, entries)| aggregate_day(date, &entries))
        .collect()
}

fn aggregate_day(date: &str, entries: &[&ForecastEntry]) -> DailyForecast {
    let temperature_min = entries
        .iter()
        .map(|e| e.main.temp_min)
        .fold(f64::INFINITY, f64::min);
    let temperature_max = entries
        .iter()
        .map(|e| e.main.temp_max)
        .fold(f64::NEG_INFINITY, f64::max);

    let label = dominant_label(entries).unwrap_or_default();
    let sky = catalog::normalize_sky(&label);

    DailyForecast {
        date: date.to_string(),
        temperature_min,
        temperature_max,
        label,
        sky,
    }
}

/// Most frequent label; ties go to the one seen first.
fn dominant_label(entries: &[&ForecastEntry]) -> Option<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();
    for label in entries.iter().filter_map(|e| e.label()) {
        let count = counts.entry(label).or_insert(0);
        if *count == 0 {
            order.push(label);
        }
        *count += 1;
    }

    let mut best: Option<(&str, usize)> = None;
    for label in order {
        let count = counts[label];
        if best.is_none_or(|(_, best_count)| count > best_count) {
            best = Some((label, count));
        }
    }
    best.map(|(label, _)| label.to_string())
}

/// Weather condition for "now": the first entry's temperature and label.
pub fn current_condition(forecast: &Forecast) -> Result<WeatherCondition> {
    let entry = forecast
        .list
        .first()
        .ok_or(WeatherClientError::EmptyForecast)?;
    let label = entry.label().ok_or_else(|| {
        WeatherClientError::InvalidResponse(format!("entry {} has no weather description", entry.dt))
    })?;
    Ok(WeatherCondition::from_label(entry.main.temp, label))
}
