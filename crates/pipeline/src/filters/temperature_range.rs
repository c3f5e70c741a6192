//! Filter to keep activities whose temperature range fits the query.
//!
//! This is the admissibility step of the recommendation engine: anything
//! it drops appears in neither the perfect nor the compatible bucket.

use crate::error::Result;
use crate::query::WeatherQuery;
use crate::suitability::is_admissible;
use crate::traits::Filter;
use catalog::Activity;

/// Keeps activities with `temperature_min <= t <= temperature_max`.
///
/// Without a temperature in the query every activity passes.
pub struct TemperatureRangeFilter;

impl Filter for TemperatureRangeFilter {
    fn name(&self) -> &str {
        "TemperatureRangeFilter"
    }

    fn apply(&self, activities: Vec<Activity>, query: &WeatherQuery) -> Result<Vec<Activity>> {
        let Some(temperature) = query.temperature else {
            return Ok(activities);
        };

        let filtered: Vec<Activity> = activities
            .into_iter()
            .filter(|activity| is_admissible(activity, temperature))
            .collect();
        Ok(filtered)
    }
}
