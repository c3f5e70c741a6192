//! Admissibility, perfect-match and unsuitability predicates.
//!
//! Activities record their sky preference either as three flags or as one
//! declared sky. Each shape gets a small adapter; the temperature range
//! check is shared.

use crate::query::WeatherQuery;
use catalog::{Activity, Sky, SkyCondition, SkyFlags, WeatherCondition, WeatherPreference};

/// `min <= temperature <= max`, both ends inclusive.
pub fn in_range(temperature: f64, min: f64, max: f64) -> bool {
    min <= temperature && temperature <= max
}

/// The activity's temperature range contains `temperature`.
pub fn is_admissible(activity: &Activity, temperature: f64) -> bool {
    in_range(temperature, activity.temperature_min, activity.temperature_max)
}

/// The activity prefers the current sky.
///
/// An unrecognized sky is never a perfect match.
pub fn is_perfect_match(preference: &WeatherPreference, sky: SkyCondition) -> bool {
    match sky.sky() {
        Some(sky) => preference.prefers(sky),
        None => false,
    }
}

/// Declared-sky adapter: mismatch unless the declared sky is the current one.
pub fn declared_sky_mismatch(declared: Sky, sky: SkyCondition) -> bool {
    SkyCondition::from(declared) != sky
}

/// Flags adapter: mismatch when the current sky is known and its flag is off.
pub fn flags_sky_mismatch(flags: &SkyFlags, sky: SkyCondition) -> bool {
    sky.sky().is_some_and(|sky| !flags.prefers(sky))
}

fn sky_mismatch(preference: &WeatherPreference, sky: SkyCondition) -> bool {
    match preference {
        WeatherPreference::Flags(flags) => flags_sky_mismatch(flags, sky),
        WeatherPreference::Declared { sky: declared } => declared_sky_mismatch(*declared, sky),
    }
}

/// The activity should not be suggested for this weather.
///
/// Out of the temperature range, or the sky does not suit its preference.
pub fn is_unsuitable(activity: &Activity, condition: &WeatherCondition) -> bool {
    !is_admissible(activity, condition.temperature)
        || sky_mismatch(&activity.preference, condition.sky)
}

/// `is_unsuitable` over a partial query: an absent axis contributes nothing.
pub fn is_unsuitable_for(activity: &Activity, query: &WeatherQuery) -> bool {
    let too_hot_or_cold = query
        .temperature
        .is_some_and(|t| !is_admissible(activity, t));
    let wrong_sky = query
        .sky()
        .is_some_and(|sky| sky_mismatch(&activity.preference, sky));
    too_hot_or_cold || wrong_sky
}
