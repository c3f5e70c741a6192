//! Core domain types for the activity catalog.
//!
//! Activities, their weather preferences, per-user preference overrides and
//! user-created personal activities. The recommendation engine only reads
//! these; `CatalogIndex` owns them.

use crate::sky::normalize_sky;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

// =============================================================================
// Type Aliases
// =============================================================================

/// Unique identifier for a catalog or personal activity
pub type ActivityId = u32;

/// Identifier of an authenticated user (an opaque auth-provider id)
pub type UserId = String;

/// Unique identifier for a user preference row
pub type PreferenceId = u32;

/// Unique identifier for a city
pub type CityId = u32;

// =============================================================================
// Weather Types
// =============================================================================

/// Canonical sky categories an activity can prefer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sky {
    Sunny,
    Cloudy,
    Rainy,
}

impl Sky {
    pub const ALL: [Sky; 3] = [Sky::Sunny, Sky::Cloudy, Sky::Rainy];

    pub fn as_str(&self) -> &'static str {
        match self {
            Sky::Sunny => "sunny",
            Sky::Cloudy => "cloudy",
            Sky::Rainy => "rainy",
        }
    }
}

impl fmt::Display for Sky {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A normalized sky label.
///
/// `Unrecognized` is a valid value: it switches off sky-based filtering
/// instead of failing the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkyCondition {
    Sunny,
    Cloudy,
    Rainy,
    Unrecognized,
}

impl SkyCondition {
    /// The canonical sky, if the label was recognized.
    pub fn sky(&self) -> Option<Sky> {
        match self {
            SkyCondition::Sunny => Some(Sky::Sunny),
            SkyCondition::Cloudy => Some(Sky::Cloudy),
            SkyCondition::Rainy => Some(Sky::Rainy),
            SkyCondition::Unrecognized => None,
        }
    }

    pub fn is_recognized(&self) -> bool {
        self.sky().is_some()
    }
}

impl From<Sky> for SkyCondition {
    fn from(sky: Sky) -> Self {
        match sky {
            Sky::Sunny => SkyCondition::Sunny,
            Sky::Cloudy => SkyCondition::Cloudy,
            Sky::Rainy => SkyCondition::Rainy,
        }
    }
}

/// Current or queried weather: a temperature in °C plus a sky label.
///
/// The raw label is kept next to its normalized form so callers can echo
/// back what they were asked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherCondition {
    pub temperature: f64,
    pub label: String,
    pub sky: SkyCondition,
}

impl WeatherCondition {
    /// Build a condition by normalizing a free-text sky label.
    pub fn from_label(temperature: f64, label: impl Into<String>) -> Self {
        let label = label.into();
        let sky = normalize_sky(&label);
        Self {
            temperature,
            label,
            sky,
        }
    }
}

/// Three independent "this activity likes this sky" flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkyFlags {
    #[serde(default)]
    pub prefers_sunny: bool,
    #[serde(default)]
    pub prefers_cloudy: bool,
    #[serde(default)]
    pub prefers_rainy: bool,
}

impl SkyFlags {
    pub fn new(prefers_sunny: bool, prefers_cloudy: bool, prefers_rainy: bool) -> Self {
        Self {
            prefers_sunny,
            prefers_cloudy,
            prefers_rainy,
        }
    }

    /// Flags with only the given skies set.
    pub fn only(skies: &[Sky]) -> Self {
        let mut flags = SkyFlags::default();
        for sky in skies {
            flags.set(*sky, true);
        }
        flags
    }

    pub fn prefers(&self, sky: Sky) -> bool {
        match sky {
            Sky::Sunny => self.prefers_sunny,
            Sky::Cloudy => self.prefers_cloudy,
            Sky::Rainy => self.prefers_rainy,
        }
    }

    pub fn set(&mut self, sky: Sky, value: bool) {
        match sky {
            Sky::Sunny => self.prefers_sunny = value,
            Sky::Cloudy => self.prefers_cloudy = value,
            Sky::Rainy => self.prefers_rainy = value,
        }
    }

    /// At least one flag is set.
    pub fn any(&self) -> bool {
        self.prefers_sunny || self.prefers_cloudy || self.prefers_rainy
    }
}

/// How an activity records its weather preference.
///
/// Catalog rows carry three boolean flags; some records instead declare a
/// single recommended sky. Both shapes feed the same predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum WeatherPreference {
    Flags(SkyFlags),
    Declared { sky: Sky },
}

impl WeatherPreference {
    /// Whether this preference favours the given sky.
    pub fn prefers(&self, sky: Sky) -> bool {
        match self {
            WeatherPreference::Flags(flags) => flags.prefers(sky),
            WeatherPreference::Declared { sky: declared } => *declared == sky,
        }
    }
}

// =============================================================================
// Activity Types
// =============================================================================

/// Where an activity takes place
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Indoor,
    Outdoor,
}

impl ActivityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityKind::Indoor => "indoor",
            ActivityKind::Outdoor => "outdoor",
        }
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An activity from the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub id: ActivityId,
    pub name: String,
    pub kind: ActivityKind,
    pub description: String,
    /// Lowest comfortable temperature in °C, inclusive
    pub temperature_min: f64,
    /// Highest comfortable temperature in °C, inclusive
    pub temperature_max: f64,
    pub preference: WeatherPreference,
}

impl Activity {
    /// Both bounds are finite and `temperature_min <= temperature_max`.
    pub fn has_valid_range(&self) -> bool {
        self.temperature_min.is_finite()
            && self.temperature_max.is_finite()
            && self.temperature_min <= self.temperature_max
    }
}

/// A user's override of an activity's temperature range and sky flags.
///
/// Unique per `(user_id, activity_id)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPreference {
    pub id: PreferenceId,
    pub user_id: UserId,
    pub activity_id: ActivityId,
    pub temperature_min: f64,
    pub temperature_max: f64,
    #[serde(flatten)]
    pub flags: SkyFlags,
}

impl UserPreference {
    /// The activity as this user sees it: their range and flags replace the
    /// catalog's.
    pub fn apply_to(&self, activity: &Activity) -> Activity {
        Activity {
            temperature_min: self.temperature_min,
            temperature_max: self.temperature_max,
            preference: WeatherPreference::Flags(self.flags),
            ..activity.clone()
        }
    }
}

/// An activity created by a user for themselves.
///
/// Names are unique per user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalActivity {
    pub user_id: UserId,
    #[serde(flatten)]
    pub activity: Activity,
}

/// A city users can look up by name to get forecast coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub id: CityId,
    pub name: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
}

// =============================================================================
// Mutation Requests
// =============================================================================

/// Request to create a preference row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPreference {
    pub user_id: UserId,
    pub activity_id: ActivityId,
    pub temperature_min: f64,
    pub temperature_max: f64,
    #[serde(flatten)]
    pub flags: SkyFlags,
}

/// Partial update of a preference row; `None` keeps the stored value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PreferenceUpdate {
    pub temperature_min: Option<f64>,
    pub temperature_max: Option<f64>,
    pub prefers_sunny: Option<bool>,
    pub prefers_cloudy: Option<bool>,
    pub prefers_rainy: Option<bool>,
}

impl PreferenceUpdate {
    pub fn is_empty(&self) -> bool {
        self.temperature_min.is_none()
            && self.temperature_max.is_none()
            && self.prefers_sunny.is_none()
            && self.prefers_cloudy.is_none()
            && self.prefers_rainy.is_none()
    }
}

/// Request to create a personal activity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPersonalActivity {
    pub user_id: UserId,
    pub name: String,
    pub kind: ActivityKind,
    #[serde(default)]
    pub description: String,
    pub temperature_min: f64,
    pub temperature_max: f64,
    #[serde(flatten)]
    pub flags: SkyFlags,
}

/// Partial update of a personal activity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonalActivityUpdate {
    pub name: Option<String>,
    pub kind: Option<ActivityKind>,
    pub description: Option<String>,
    pub temperature_min: Option<f64>,
    pub temperature_max: Option<f64>,
    pub prefers_sunny: Option<bool>,
    pub prefers_cloudy: Option<bool>,
    pub prefers_rainy: Option<bool>,
}

// =============================================================================
// CatalogIndex - The In-Memory Store
// =============================================================================

/// Holds every activity, preference and personal activity, with secondary
/// indices for the lookups the service needs.
///
/// `BTreeMap` keeps preference and personal rows in id order so listings are
/// deterministic.
#[derive(Debug)]
pub struct CatalogIndex {
    pub(crate) activities: HashMap<ActivityId, Activity>,
    /// Activities grouped by kind
    pub(crate) kind_index: HashMap<ActivityKind, Vec<ActivityId>>,
    pub(crate) preferences: BTreeMap<PreferenceId, UserPreference>,
    pub(crate) personal: BTreeMap<ActivityId, PersonalActivity>,
    pub(crate) cities: BTreeMap<CityId, City>,
    pub(crate) next_preference_id: PreferenceId,
    pub(crate) next_personal_id: ActivityId,
}

impl CatalogIndex {
    /// Creates a new, empty CatalogIndex
    pub fn new() -> Self {
        Self {
            activities: HashMap::new(),
            kind_index: HashMap::new(),
            preferences: BTreeMap::new(),
            personal: BTreeMap::new(),
            cities: BTreeMap::new(),
            next_preference_id: 1,
            next_personal_id: 1,
        }
    }

    /// Get an activity by ID
    pub fn get_activity(&self, id: ActivityId) -> Option<&Activity> {
        self.activities.get(&id)
    }

    /// All catalog activities, ordered by name (ties broken by id)
    pub fn activities_sorted_by_name(&self) -> Vec<Activity> {
        let mut activities: Vec<Activity> = self.activities.values().cloned().collect();
        activities.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        activities
    }

    /// Get all activity ids of one kind
    pub fn activities_by_kind(&self, kind: ActivityKind) -> &[ActivityId] {
        self.kind_index
            .get(&kind)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Get a preference row by ID
    pub fn get_preference(&self, id: PreferenceId) -> Option<&UserPreference> {
        self.preferences.get(&id)
    }

    /// All preference rows of a user, in id order
    pub fn preferences_for_user(&self, user_id: &str) -> Vec<&UserPreference> {
        self.preferences
            .values()
            .filter(|p| p.user_id == user_id)
            .collect()
    }

    /// A user's preferred activities with their overrides applied.
    ///
    /// Rows pointing at a missing activity are skipped.
    pub fn personalized_activities(&self, user_id: &str) -> Vec<(UserPreference, Activity)> {
        self.preferences_for_user(user_id)
            .into_iter()
            .filter_map(|pref| {
                let activity = self.activities.get(&pref.activity_id)?;
                Some((pref.clone(), pref.apply_to(activity)))
            })
            .collect()
    }

    /// Get a personal activity by ID
    pub fn get_personal_activity(&self, id: ActivityId) -> Option<&PersonalActivity> {
        self.personal.get(&id)
    }

    /// A user's personal activities, newest first
    pub fn personal_activities_for_user(&self, user_id: &str) -> Vec<&PersonalActivity> {
        self.personal
            .values()
            .rev()
            .filter(|p| p.user_id == user_id)
            .collect()
    }

    /// Cities whose name contains `query`, case-insensitively, ordered by name
    pub fn search_cities(&self, query: &str) -> Vec<&City> {
        let needle = query.trim().to_lowercase();
        let mut matches: Vec<&City> = self
            .cities
            .values()
            .filter(|c| c.name.to_lowercase().contains(&needle))
            .collect();
        matches.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        matches
    }

    /// Look up a city by its full name, ignoring case and surrounding spaces
    pub fn city_by_name(&self, name: &str) -> Option<&City> {
        let name = name.trim().to_lowercase();
        self.cities.values().find(|c| c.name.to_lowercase() == name)
    }

    /// Insert an activity into the index
    pub fn insert_activity(&mut self, activity: Activity) {
        let id = activity.id;
        let kind = activity.kind;
        if let Some(previous) = self.activities.insert(id, activity) {
            if let Some(ids) = self.kind_index.get_mut(&previous.kind) {
                ids.retain(|existing| *existing != id);
            }
        }
        self.kind_index.entry(kind).or_default().push(id);
    }

    /// Insert a preference row as-is (used while loading)
    ///
    /// The id counter stops at `u32::MAX`; creation then reports the id
    /// space as exhausted.
    pub fn insert_preference(&mut self, preference: UserPreference) {
        self.next_preference_id = self
            .next_preference_id
            .max(preference.id.saturating_add(1));
        self.preferences.insert(preference.id, preference);
    }

    /// Insert a personal activity as-is (used while loading)
    pub fn insert_personal_activity(&mut self, personal: PersonalActivity) {
        self.next_personal_id = self
            .next_personal_id
            .max(personal.activity.id.saturating_add(1));
        self.personal.insert(personal.activity.id, personal);
    }

    /// Insert a city as-is (used while loading)
    pub fn insert_city(&mut self, city: City) {
        self.cities.insert(city.id, city);
    }

    /// Number of known cities
    pub fn city_count(&self) -> usize {
        self.cities.len()
    }

    /// Get counts for debugging/validation: (activities, preferences, personal)
    pub fn counts(&self) -> (usize, usize, usize) {
        (
            self.activities.len(),
            self.preferences.len(),
            self.personal.len(),
        )
    }
}

impl Default for CatalogIndex {
    fn default() -> Self {
        Self::new()
    }
}
