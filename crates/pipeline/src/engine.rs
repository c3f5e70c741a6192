//! # Recommendation Engine
//!
//! Turns a catalog snapshot and a weather condition into a categorized
//! result:
//! 1. Validate the condition and every activity's temperature range
//! 2. Keep admissible activities (temperature inside the range)
//! 3. Split them into `perfect` (prefers the current sky) and `compatible`
//! 4. Pick the primary list according to `include_all_compatible`
//!
//! The engine is stateless. Identical input gives identical output, and
//! every list keeps the input order.

use crate::error::{EngineError, Result};
use crate::filter_pipeline::FilterPipeline;
use crate::filters::{SkyPreferenceFilter, TemperatureRangeFilter};
use crate::query::{FilterMode, WeatherQuery};
use crate::suitability::{is_perfect_match, is_unsuitable_for};
use crate::traits::Filter;
use catalog::{Activity, WeatherCondition};
use serde::Serialize;
use tracing::debug;

/// Categorized outcome of a recommendation request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub condition: WeatherCondition,
    pub include_all_compatible: bool,
    /// `perfect`, or every admissible activity when `include_all_compatible` is set
    pub primary: Vec<Activity>,
    /// Admissible activities that prefer the current sky
    pub perfect: Vec<Activity>,
    /// Admissible activities that do not prefer the current sky
    pub compatible: Vec<Activity>,
}

impl Recommendation {
    /// Number of admissible activities.
    pub fn total(&self) -> usize {
        self.perfect.len() + self.compatible.len()
    }
}

/// Refuse to classify anything when an activity's range is inverted or
/// not a number.
pub fn validate_activities(activities: &[Activity]) -> Result<()> {
    match activities.iter().find(|a| !a.has_valid_range()) {
        Some(bad) => Err(EngineError::invalid(format!(
            "activity {} has an invalid temperature range [{}, {}]",
            bad.id, bad.temperature_min, bad.temperature_max
        ))),
        None => Ok(()),
    }
}

fn validate_condition(condition: &WeatherCondition) -> Result<()> {
    if !condition.temperature.is_finite() {
        return Err(EngineError::invalid("temperature must be a finite number"));
    }
    if condition.label.trim().is_empty() {
        return Err(EngineError::invalid("sky label is required"));
    }
    Ok(())
}

/// Recommendation engine with an admissibility pipeline.
///
/// The default pipeline is just the temperature range filter. Extra
/// filters (e.g. restricting to one activity kind) can be chained on.
pub struct RecommendationEngine {
    admissibility: FilterPipeline,
}

impl RecommendationEngine {
    pub fn new() -> Self {
        Self {
            admissibility: FilterPipeline::new().add_filter(TemperatureRangeFilter),
        }
    }

    /// Add a filter that runs after the temperature check (builder pattern).
    pub fn with_filter(mut self, filter: impl Filter + 'static) -> Self {
        self.admissibility = self.admissibility.add_filter(filter);
        self
    }

    /// Recommend activities for a weather condition.
    ///
    /// # Errors
    /// `InvalidInput` for a non-finite temperature, an empty sky label, or
    /// any activity with `temperature_min > temperature_max`.
    pub fn recommend(
        &self,
        activities: &[Activity],
        condition: &WeatherCondition,
        include_all_compatible: bool,
    ) -> Result<Recommendation> {
        validate_condition(condition)?;
        validate_activities(activities)?;

        let query = WeatherQuery::from_condition(condition);
        let admissible = self.admissibility.apply(activities.to_vec(), &query)?;

        let (perfect, compatible): (Vec<Activity>, Vec<Activity>) = admissible
            .iter()
            .cloned()
            .partition(|activity| is_perfect_match(&activity.preference, condition.sky));

        debug!(
            admissible = admissible.len(),
            perfect = perfect.len(),
            compatible = compatible.len(),
            sky = ?condition.sky,
            "classified activities"
        );

        let primary = if include_all_compatible {
            admissible
        } else {
            perfect.clone()
        };

        Ok(Recommendation {
            condition: condition.clone(),
            include_all_compatible,
            primary,
            perfect,
            compatible,
        })
    }
}

impl Default for RecommendationEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Recommend with the default engine.
pub fn recommend(
    activities: &[Activity],
    condition: &WeatherCondition,
    include_all_compatible: bool,
) -> Result<Recommendation> {
    RecommendationEngine::new().recommend(activities, condition, include_all_compatible)
}

/// Activities matching a (possibly partial) weather query.
///
/// Temperature range first, then sky preference; an unrecognized sky
/// label filters nothing.
pub fn filter_activities(
    activities: &[Activity],
    query: &WeatherQuery,
    mode: FilterMode,
) -> Result<Vec<Activity>> {
    query.check(mode)?;
    validate_activities(activities)?;

    FilterPipeline::new()
        .add_filter(TemperatureRangeFilter)
        .add_filter(SkyPreferenceFilter)
        .apply(activities.to_vec(), query)
}

/// Activities that should not be suggested for a weather query.
///
/// At least one of temperature and sky label is needed even when the
/// mode makes each optional.
pub fn not_recommended(
    activities: &[Activity],
    query: &WeatherQuery,
    mode: FilterMode,
) -> Result<Vec<Activity>> {
    query.check(mode)?;
    query.require_any()?;
    validate_activities(activities)?;

    Ok(activities
        .iter()
        .filter(|activity| is_unsuitable_for(activity, query))
        .cloned()
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::ActivityKindFilter;
    use catalog::{ActivityKind, Sky, SkyFlags, WeatherPreference};

    fn activity(id: u32, kind: ActivityKind, min: f64, max: f64, skies: &[Sky]) -> Activity {
        Activity {
            id,
            name: format!("Activity {id}"),
            kind,
            description: String::new(),
            temperature_min: min,
            temperature_max: max,
            preference: WeatherPreference::Flags(SkyFlags::only(skies)),
        }
    }

    fn ids(activities: &[Activity]) -> Vec<u32> {
        activities.iter().map(|a| a.id).collect()
    }

    #[test]
    fn test_rejects_empty_label() {
        let condition = WeatherCondition::from_label(20.0, "  ");
        let err = recommend(&[], &condition, false).unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)));
    }

    #[test]
    fn test_rejects_infinite_temperature() {
        let condition = WeatherCondition::from_label(f64::INFINITY, "sunny");
        assert!(recommend(&[], &condition, false).is_err());
    }

    #[test]
    fn test_declared_preference_is_classified() {
        let mut declared = activity(1, ActivityKind::Outdoor, 0.0, 30.0, &[]);
        declared.preference = WeatherPreference::Declared { sky: Sky::Cloudy };
        let flags = activity(2, ActivityKind::Outdoor, 0.0, 30.0, &[Sky::Sunny]);

        let result = recommend(
            &[declared, flags],
            &WeatherCondition::from_label(12.0, "nubes"),
            false,
        )
        .unwrap();

        assert_eq!(ids(&result.perfect), vec![1]);
        assert_eq!(ids(&result.compatible), vec![2]);
    }

    #[test]
    fn test_engine_with_extra_filter() {
        let activities = vec![
            activity(1, ActivityKind::Indoor, 0.0, 30.0, &[Sky::Rainy]),
            activity(2, ActivityKind::Outdoor, 0.0, 30.0, &[Sky::Rainy]),
        ];
        let engine = RecommendationEngine::new()
            .with_filter(ActivityKindFilter::new(ActivityKind::Indoor));

        let result = engine
            .recommend(&activities, &WeatherCondition::from_label(10.0, "rain"), true)
            .unwrap();
        assert_eq!(ids(&result.primary), vec![1]);
    }

    #[test]
    fn test_filter_activities_modes() {
        let activities = vec![
            activity(1, ActivityKind::Outdoor, 15.0, 25.0, &[Sky::Sunny]),
            activity(2, ActivityKind::Indoor, 0.0, 40.0, &[Sky::Rainy]),
            activity(3, ActivityKind::Outdoor, 0.0, 10.0, &[Sky::Sunny]),
        ];

        let everything = filter_activities(
            &activities,
            &WeatherQuery::default(),
            FilterMode::IndependentOptional,
        )
        .unwrap();
        assert_eq!(ids(&everything), vec![1, 2, 3]);

        let sunny_only = filter_activities(
            &activities,
            &WeatherQuery::new(None, Some("soleado")),
            FilterMode::IndependentOptional,
        )
        .unwrap();
        assert_eq!(ids(&sunny_only), vec![1, 3]);

        let both = filter_activities(
            &activities,
            &WeatherQuery::new(Some(20.0), Some("soleado")),
            FilterMode::BothRequired,
        )
        .unwrap();
        assert_eq!(ids(&both), vec![1]);

        assert!(filter_activities(
            &activities,
            &WeatherQuery::new(Some(20.0), None),
            FilterMode::BothRequired,
        )
        .is_err());
    }

    #[test]
    fn test_not_recommended() {
        let mut declared = activity(3, ActivityKind::Outdoor, 0.0, 30.0, &[]);
        declared.preference = WeatherPreference::Declared { sky: Sky::Rainy };
        let activities = vec![
            activity(1, ActivityKind::Outdoor, 15.0, 25.0, &[Sky::Sunny]),
            activity(2, ActivityKind::Indoor, 0.0, 40.0, &[Sky::Rainy, Sky::Sunny]),
            declared,
        ];

        let result = not_recommended(
            &activities,
            &WeatherQuery::new(Some(5.0), Some("soleado")),
            FilterMode::BothRequired,
        )
        .unwrap();
        // 1 is too cold, 3 declares rain
        assert_eq!(ids(&result), vec![1, 3]);

        let missing = not_recommended(
            &activities,
            &WeatherQuery::default(),
            FilterMode::IndependentOptional,
        );
        assert!(matches!(missing, Err(EngineError::InvalidInput(_))));
    }
}
