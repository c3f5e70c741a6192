//! JSON response envelopes.
//!
//! Every successful operation answers with a `message` plus its payload.

use catalog::{
    Activity, ActivityKind, City, PersonalActivity, SkyCondition, UserPreference, WeatherCondition,
};
use pipeline::{FilterMode, Recommendation, WeatherQuery};
use serde::Serialize;
use weather_client::{DailyForecast, ForecastEntry};

#[derive(Debug, Clone, Serialize)]
pub struct ActivitiesEnvelope {
    pub message: String,
    pub count: usize,
    pub activities: Vec<Activity>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActivityEnvelope {
    pub message: String,
    pub activity: Activity,
}

/// The filters a view was computed with, echoed back to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppliedFilters {
    pub temperature: Option<f64>,
    pub sky: Option<String>,
    pub normalized_sky: Option<SkyCondition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ActivityKind>,
    pub mode: FilterMode,
}

impl AppliedFilters {
    pub fn new(query: &WeatherQuery, mode: FilterMode) -> Self {
        Self {
            temperature: query.temperature,
            sky: query.label.clone(),
            normalized_sky: query.sky(),
            kind: None,
            mode,
        }
    }

    pub fn with_kind(mut self, kind: Option<ActivityKind>) -> Self {
        self.kind = kind;
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FilterEnvelope {
    pub message: String,
    pub filters: AppliedFilters,
    pub count: usize,
    pub activities: Vec<Activity>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Conditions {
    pub temperature: f64,
    /// Label as given by the caller
    pub sky: String,
    pub normalized_sky: SkyCondition,
}

impl From<WeatherCondition> for Conditions {
    fn from(condition: WeatherCondition) -> Self {
        Self {
            temperature: condition.temperature,
            sky: condition.label,
            normalized_sky: condition.sky,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllActivities {
    pub perfect: Vec<Activity>,
    pub compatible: Vec<Activity>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecommendEnvelope {
    pub message: String,
    pub conditions: Conditions,
    pub include_all_compatible: bool,
    pub recommendations: Vec<Activity>,
    pub all_activities: AllActivities,
    /// Number of activities whose temperature range fits
    pub total: usize,
}

impl RecommendEnvelope {
    pub fn new(message: impl Into<String>, result: Recommendation) -> Self {
        let total = result.total();
        Self {
            message: message.into(),
            conditions: result.condition.into(),
            include_all_compatible: result.include_all_compatible,
            recommendations: result.primary,
            all_activities: AllActivities {
                perfect: result.perfect,
                compatible: result.compatible,
            },
            total,
        }
    }
}

/// Where a user-facing activity comes from. Catalog and personal activities
/// have separate id spaces, so the pair `(source, id)` is what identifies one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivitySource {
    /// A catalog activity with the user's preference applied
    Catalog,
    /// An activity the user created
    Personal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourcedActivity {
    pub source: ActivitySource,
    #[serde(flatten)]
    pub activity: Activity,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourcedGroups {
    pub perfect: Vec<SourcedActivity>,
    pub compatible: Vec<SourcedActivity>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserRecommendEnvelope {
    pub message: String,
    pub user_id: String,
    pub conditions: Conditions,
    pub include_all_compatible: bool,
    pub recommendations: Vec<SourcedActivity>,
    pub all_activities: SourcedGroups,
    pub total: usize,
}

/// A preference row next to the activity it personalizes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonalizedActivity {
    pub preference: UserPreference,
    /// The catalog activity with the user's range and flags applied
    pub activity: Activity,
}

#[derive(Debug, Clone, Serialize)]
pub struct PreferencesEnvelope {
    pub message: String,
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters: Option<AppliedFilters>,
    pub count: usize,
    pub preferences: Vec<PersonalizedActivity>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PreferenceEnvelope {
    pub message: String,
    pub preference: UserPreference,
}

#[derive(Debug, Clone, Serialize)]
pub struct PersonalActivitiesEnvelope {
    pub message: String,
    pub user_id: String,
    pub count: usize,
    pub activities: Vec<PersonalActivity>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PersonalActivityEnvelope {
    pub message: String,
    pub activity: PersonalActivity,
}

#[derive(Debug, Clone, Serialize)]
pub struct HourlyEnvelope {
    pub message: String,
    pub entries: Vec<ForecastEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DailyEnvelope {
    pub message: String,
    pub days: Vec<DailyForecast>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CitiesEnvelope {
    pub message: String,
    pub query: String,
    pub count: usize,
    pub cities: Vec<City>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CoordinatesEnvelope {
    pub message: String,
    pub city: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
}
