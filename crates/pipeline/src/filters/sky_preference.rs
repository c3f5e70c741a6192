//! Filter to keep activities that prefer the queried sky.

use crate::error::Result;
use crate::query::WeatherQuery;
use crate::suitability::is_perfect_match;
use crate::traits::Filter;
use catalog::{Activity, SkyCondition};
use tracing::debug;

/// Keeps activities whose weather preference includes the query's sky.
///
/// ## Algorithm
/// 1. Normalize the query label
/// 2. No label, or an unrecognized one: keep everything
/// 3. Otherwise keep activities that prefer that sky
pub struct SkyPreferenceFilter;

impl Filter for SkyPreferenceFilter {
    fn name(&self) -> &str {
        "SkyPreferenceFilter"
    }

    fn apply(&self, activities: Vec<Activity>, query: &WeatherQuery) -> Result<Vec<Activity>> {
        let sky = match query.sky() {
            None => return Ok(activities),
            Some(SkyCondition::Unrecognized) => {
                debug!(label = ?query.label, "unrecognized sky label, skipping sky filter");
                return Ok(activities);
            }
            Some(sky) => sky,
        };

        let filtered: Vec<Activity> = activities
            .into_iter()
            .filter(|activity| is_perfect_match(&activity.preference, sky))
            .collect();
        Ok(filtered)
    }
}
