//! # Activity Service
//!
//! Coordinates the catalog, the recommendation engine and the forecast
//! client behind one API:
//! 1. Read a snapshot of the catalog (or a user's personalized view)
//! 2. Validate the request and build a weather query or condition
//! 3. Run the engine or a filter pipeline over the snapshot
//! 4. Wrap the result in a response envelope
//!
//! The catalog sits behind a tokio `RwLock`. Reads clone what they need
//! before calling the engine, so the engine never holds a lock.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use catalog::{
    Activity, ActivityId, ActivityKind, CatalogError, CatalogIndex, City, NewPersonalActivity, NewPreference,
    PersonalActivityUpdate, PreferenceId, PreferenceUpdate, UserPreference, WeatherCondition,
};
use pipeline::filters::ActivityKindFilter;
use pipeline::{FilterMode, FilterPipeline, Recommendation, RecommendationEngine, WeatherQuery};
use weather_client::WeatherClient;

use crate::config::ServiceConfig;
use crate::envelope::*;
use crate::error::{Result, ServiceError};

/// Service that answers every activity and recommendation request
#[derive(Clone)]
pub struct ActivityService {
    catalog: Arc<RwLock<CatalogIndex>>,
    engine: Arc<RecommendationEngine>,
    filter_mode: FilterMode,
    weather: Option<WeatherClient>,
}

fn require_user(user_id: &str) -> Result<&str> {
    let user_id = user_id.trim();
    if user_id.is_empty() {
        return Err(ServiceError::InvalidInput("user id is required".to_string()));
    }
    Ok(user_id)
}

fn require_city(name: &str) -> Result<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ServiceError::InvalidInput("city is required".to_string()));
    }
    Ok(name)
}

impl ActivityService {
    pub fn new(catalog: CatalogIndex, filter_mode: FilterMode) -> Self {
        Self {
            catalog: Arc::new(RwLock::new(catalog)),
            engine: Arc::new(RecommendationEngine::new()),
            filter_mode,
            weather: None,
        }
    }

    /// Load the catalog directory and wire up the forecast client when an
    /// API key is configured.
    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        let start = Instant::now();
        let catalog = CatalogIndex::load_from_dir(&config.data_dir)?;
        info!(
            "Loaded catalog from {} in {:.2?}",
            config.data_dir.display(),
            start.elapsed()
        );

        let service = Self::new(catalog, config.filter_mode);
        match &config.weather_api_key {
            Some(key) => Ok(service.with_weather_client(WeatherClient::new(
                key.clone(),
                config.weather_api_url.clone(),
            ))),
            None => {
                warn!("WEATHER_API_KEY not set, forecast operations are disabled");
                Ok(service)
            }
        }
    }

    pub fn with_weather_client(mut self, client: WeatherClient) -> Self {
        self.weather = Some(client);
        self
    }

    pub fn filter_mode(&self) -> FilterMode {
        self.filter_mode
    }

    fn weather_client(&self) -> Result<&WeatherClient> {
        self.weather.as_ref().ok_or(ServiceError::WeatherUnavailable)
    }

    async fn catalog_snapshot(&self) -> Vec<Activity> {
        self.catalog.read().await.activities_sorted_by_name()
    }

    async fn personalized_snapshot(&self, user_id: &str) -> Vec<(UserPreference, Activity)> {
        self.catalog.read().await.personalized_activities(user_id)
    }

    // -------------------------------------------------------------------------
    // Catalog views
    // -------------------------------------------------------------------------

    /// Every catalog activity, sorted by name.
    pub async fn list_activities(&self) -> ActivitiesEnvelope {
        let activities = self.catalog_snapshot().await;
        ActivitiesEnvelope {
            message: "Activities retrieved successfully".to_string(),
            count: activities.len(),
            activities,
        }
    }

    /// Catalog activities of one kind, sorted by name.
    ///
    /// No weather filter applies, so the filter mode plays no part.
    pub async fn list_activities_of_kind(&self, kind: ActivityKind) -> Result<ActivitiesEnvelope> {
        let snapshot = self.catalog_snapshot().await;
        let activities = FilterPipeline::new()
            .add_filter(ActivityKindFilter::new(kind))
            .apply(snapshot, &WeatherQuery::default())?;

        Ok(ActivitiesEnvelope {
            message: "Activities retrieved successfully".to_string(),
            count: activities.len(),
            activities,
        })
    }

    pub async fn get_activity(&self, id: ActivityId) -> Result<ActivityEnvelope> {
        let activity = self
            .catalog
            .read()
            .await
            .get_activity(id)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound {
                entity: "Activity".to_string(),
                id: id.to_string(),
            })?;
        Ok(ActivityEnvelope {
            message: "Activity retrieved successfully".to_string(),
            activity,
        })
    }

    /// Activities matching a weather query under the configured filter mode,
    /// optionally restricted to one kind.
    pub async fn filter_activities(
        &self,
        query: WeatherQuery,
        kind: Option<ActivityKind>,
    ) -> Result<FilterEnvelope> {
        let snapshot = self.catalog_snapshot().await;
        let mut activities = pipeline::filter_activities(&snapshot, &query, self.filter_mode)?;
        if let Some(kind) = kind {
            activities = FilterPipeline::new()
                .add_filter(ActivityKindFilter::new(kind))
                .apply(activities, &query)?;
        }
        debug!(count = activities.len(), mode = %self.filter_mode, "filtered activities");

        Ok(FilterEnvelope {
            message: "Activities filtered successfully".to_string(),
            filters: AppliedFilters::new(&query, self.filter_mode).with_kind(kind),
            count: activities.len(),
            activities,
        })
    }

    /// Recommend catalog activities for a temperature and sky label.
    pub async fn recommend(
        &self,
        temperature: f64,
        label: &str,
        include_all_compatible: bool,
    ) -> Result<RecommendEnvelope> {
        let condition = WeatherCondition::from_label(temperature, label.trim());
        let snapshot = self.catalog_snapshot().await;
        self.run_engine(&snapshot, condition, include_all_compatible)
    }

    fn run_engine(
        &self,
        activities: &[Activity],
        condition: WeatherCondition,
        include_all_compatible: bool,
    ) -> Result<RecommendEnvelope> {
        let result = self.classify(activities, condition, include_all_compatible)?;
        Ok(RecommendEnvelope::new(
            "Recommendations generated successfully",
            result,
        ))
    }

    fn classify(
        &self,
        activities: &[Activity],
        condition: WeatherCondition,
        include_all_compatible: bool,
    ) -> Result<Recommendation> {
        let start = Instant::now();
        let result = self
            .engine
            .recommend(activities, &condition, include_all_compatible)?;
        info!(
            "Recommended {} of {} admissible activities for {}°C '{}' in {:.2?}",
            result.primary.len(),
            result.total(),
            condition.temperature,
            condition.label,
            start.elapsed()
        );
        Ok(result)
    }

    /// Catalog activities that should not be suggested.
    ///
    /// This view always needs both temperature and sky label.
    pub async fn not_recommended(&self, query: WeatherQuery) -> Result<FilterEnvelope> {
        let mode = FilterMode::BothRequired;
        let snapshot = self.catalog_snapshot().await;
        let activities = pipeline::not_recommended(&snapshot, &query, mode)?;

        Ok(FilterEnvelope {
            message: "Not recommended activities retrieved successfully".to_string(),
            filters: AppliedFilters::new(&query, mode),
            count: activities.len(),
            activities,
        })
    }

    // -------------------------------------------------------------------------
    // User views
    // -------------------------------------------------------------------------

    /// All of a user's preferences joined with their activities.
    pub async fn user_preferences(&self, user_id: &str) -> Result<PreferencesEnvelope> {
        let user_id = require_user(user_id)?;
        let preferences: Vec<PersonalizedActivity> = self
            .personalized_snapshot(user_id)
            .await
            .into_iter()
            .map(|(preference, activity)| PersonalizedActivity {
                preference,
                activity,
            })
            .collect();

        Ok(PreferencesEnvelope {
            message: "Preferences retrieved successfully".to_string(),
            user_id: user_id.to_string(),
            filters: None,
            count: preferences.len(),
            preferences,
        })
    }

    /// A user's preferences whose personalized range and flags match the query.
    pub async fn filter_user_preferences(
        &self,
        user_id: &str,
        query: WeatherQuery,
    ) -> Result<PreferencesEnvelope> {
        let user_id = require_user(user_id)?;
        let rows = self.personalized_snapshot(user_id).await;
        let (by_activity, activities) = split_rows(rows);
        let kept = pipeline::filter_activities(&activities, &query, self.filter_mode)?;

        Ok(self.preferences_envelope(
            "Preferences filtered successfully",
            user_id,
            &query,
            &by_activity,
            kept,
        ))
    }

    /// A user's preferences that should not be suggested for the query.
    ///
    /// At least one of temperature and sky label is required.
    pub async fn not_recommended_for_user(
        &self,
        user_id: &str,
        query: WeatherQuery,
    ) -> Result<PreferencesEnvelope> {
        let user_id = require_user(user_id)?;
        let rows = self.personalized_snapshot(user_id).await;
        let (by_activity, activities) = split_rows(rows);
        let unsuitable = pipeline::not_recommended(&activities, &query, self.filter_mode)?;

        Ok(self.preferences_envelope(
            "Not recommended preferences retrieved successfully",
            user_id,
            &query,
            &by_activity,
            unsuitable,
        ))
    }

    fn preferences_envelope(
        &self,
        message: &str,
        user_id: &str,
        query: &WeatherQuery,
        by_activity: &HashMap<ActivityId, UserPreference>,
        activities: Vec<Activity>,
    ) -> PreferencesEnvelope {
        let preferences: Vec<PersonalizedActivity> = activities
            .into_iter()
            .filter_map(|activity| {
                let preference = by_activity.get(&activity.id)?.clone();
                Some(PersonalizedActivity {
                    preference,
                    activity,
                })
            })
            .collect();

        PreferencesEnvelope {
            message: message.to_string(),
            user_id: user_id.to_string(),
            filters: Some(AppliedFilters::new(query, self.filter_mode)),
            count: preferences.len(),
            preferences,
        }
    }

    /// Recommend from a user's personalized activities and their own
    /// personal activities.
    ///
    /// Every entry is tagged with its source, since a catalog activity and a
    /// personal activity may share an id.
    pub async fn recommend_for_user(
        &self,
        user_id: &str,
        temperature: f64,
        label: &str,
        include_all_compatible: bool,
    ) -> Result<UserRecommendEnvelope> {
        let user_id = require_user(user_id)?;
        let (sources, activities): (Vec<ActivitySource>, Vec<Activity>) = {
            let catalog = self.catalog.read().await;
            catalog
                .personalized_activities(user_id)
                .into_iter()
                .map(|(_, activity)| (ActivitySource::Catalog, activity))
                .chain(
                    catalog
                        .personal_activities_for_user(user_id)
                        .into_iter()
                        .map(|p| (ActivitySource::Personal, p.activity.clone())),
                )
                .unzip()
        };
        debug!(user_id, count = activities.len(), "built user activity set");
        pipeline::validate_activities(&activities)?;

        // Positions stand in for ids while the engine runs
        let keyed: Vec<Activity> = activities
            .iter()
            .enumerate()
            .map(|(position, activity)| Activity {
                id: position as ActivityId,
                ..activity.clone()
            })
            .collect();

        let condition = WeatherCondition::from_label(temperature, label.trim());
        let result = self.classify(&keyed, condition, include_all_compatible)?;

        let tag = |list: Vec<Activity>| -> Vec<SourcedActivity> {
            list.iter()
                .filter_map(|entry| {
                    let position = entry.id as usize;
                    Some(SourcedActivity {
                        source: *sources.get(position)?,
                        activity: activities.get(position)?.clone(),
                    })
                })
                .collect()
        };

        let total = result.total();
        Ok(UserRecommendEnvelope {
            message: "Recommendations generated successfully".to_string(),
            user_id: user_id.to_string(),
            conditions: result.condition.into(),
            include_all_compatible: result.include_all_compatible,
            recommendations: tag(result.primary),
            all_activities: SourcedGroups {
                perfect: tag(result.perfect),
                compatible: tag(result.compatible),
            },
            total,
        })
    }

    // -------------------------------------------------------------------------
    // Preference mutations
    // -------------------------------------------------------------------------

    pub async fn create_preference(&self, request: NewPreference) -> Result<PreferenceEnvelope> {
        let preference = self.catalog.write().await.create_preference(request)?;
        info!(id = preference.id, user_id = %preference.user_id, "created preference");
        Ok(PreferenceEnvelope {
            message: "Preference created successfully".to_string(),
            preference,
        })
    }

    pub async fn update_preference(
        &self,
        id: PreferenceId,
        update: PreferenceUpdate,
    ) -> Result<PreferenceEnvelope> {
        let preference = self.catalog.write().await.update_preference(id, update)?;
        Ok(PreferenceEnvelope {
            message: "Preference updated successfully".to_string(),
            preference,
        })
    }

    pub async fn delete_preference(&self, id: PreferenceId) -> Result<PreferenceEnvelope> {
        let preference = self.catalog.write().await.delete_preference(id)?;
        info!(id, "deleted preference");
        Ok(PreferenceEnvelope {
            message: "Preference deleted successfully".to_string(),
            preference,
        })
    }

    // -------------------------------------------------------------------------
    // Personal activities
    // -------------------------------------------------------------------------

    /// A user's personal activities, newest first.
    pub async fn personal_activities(&self, user_id: &str) -> Result<PersonalActivitiesEnvelope> {
        let user_id = require_user(user_id)?;
        let activities: Vec<_> = self
            .catalog
            .read()
            .await
            .personal_activities_for_user(user_id)
            .into_iter()
            .cloned()
            .collect();

        Ok(PersonalActivitiesEnvelope {
            message: "Personal activities retrieved successfully".to_string(),
            user_id: user_id.to_string(),
            count: activities.len(),
            activities,
        })
    }

    pub async fn create_personal_activity(
        &self,
        request: NewPersonalActivity,
    ) -> Result<PersonalActivityEnvelope> {
        let activity = self
            .catalog
            .write()
            .await
            .create_personal_activity(request)?;
        info!(id = activity.activity.id, user_id = %activity.user_id, "created personal activity");
        Ok(PersonalActivityEnvelope {
            message: "Personal activity created successfully".to_string(),
            activity,
        })
    }

    pub async fn update_personal_activity(
        &self,
        id: ActivityId,
        update: PersonalActivityUpdate,
    ) -> Result<PersonalActivityEnvelope> {
        let activity = self
            .catalog
            .write()
            .await
            .update_personal_activity(id, update)?;
        Ok(PersonalActivityEnvelope {
            message: "Personal activity updated successfully".to_string(),
            activity,
        })
    }

    pub async fn delete_personal_activity(&self, id: ActivityId) -> Result<PersonalActivityEnvelope> {
        let activity = self.catalog.write().await.delete_personal_activity(id)?;
        info!(id, "deleted personal activity");
        Ok(PersonalActivityEnvelope {
            message: "Personal activity deleted successfully".to_string(),
            activity,
        })
    }

    // -------------------------------------------------------------------------
    // Cities
    // -------------------------------------------------------------------------

    /// Cities whose name contains the query, ignoring case.
    pub async fn cities(&self, query: &str) -> Result<CitiesEnvelope> {
        let query = require_city(query)?;
        let cities: Vec<City> = self
            .catalog
            .read()
            .await
            .search_cities(query)
            .into_iter()
            .cloned()
            .collect();

        Ok(CitiesEnvelope {
            message: "Cities retrieved successfully".to_string(),
            query: query.to_string(),
            count: cities.len(),
            cities,
        })
    }

    /// Coordinates of a city given its full name.
    pub async fn coordinates(&self, name: &str) -> Result<CoordinatesEnvelope> {
        let city = self.find_city(name).await?;
        Ok(CoordinatesEnvelope {
            message: "Coordinates retrieved successfully".to_string(),
            city: city.name,
            country: city.country,
            latitude: city.latitude,
            longitude: city.longitude,
        })
    }

    async fn find_city(&self, name: &str) -> Result<City> {
        let name = require_city(name)?;
        let city = self
            .catalog
            .read()
            .await
            .city_by_name(name)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound {
                entity: "City".to_string(),
                id: name.to_string(),
            })?;
        Ok(city)
    }

    // -------------------------------------------------------------------------
    // Forecast
    // -------------------------------------------------------------------------

    pub async fn hourly_forecast(&self, lat: f64, lon: f64) -> Result<HourlyEnvelope> {
        let forecast = self.weather_client()?.fetch_forecast(lat, lon).await?;
        Ok(HourlyEnvelope {
            message: "Hourly forecast retrieved successfully".to_string(),
            entries: weather_client::hourly(&forecast).to_vec(),
        })
    }

    pub async fn daily_forecast(&self, lat: f64, lon: f64) -> Result<DailyEnvelope> {
        let forecast = self.weather_client()?.fetch_forecast(lat, lon).await?;
        Ok(DailyEnvelope {
            message: "Daily forecast retrieved successfully".to_string(),
            days: weather_client::daily(&forecast),
        })
    }

    /// Recommend catalog activities for the weather at a location right now.
    pub async fn recommend_now(
        &self,
        lat: f64,
        lon: f64,
        include_all_compatible: bool,
    ) -> Result<RecommendEnvelope> {
        let forecast = self.weather_client()?.fetch_forecast(lat, lon).await?;
        let condition = weather_client::current_condition(&forecast)?;
        info!(lat, lon, "current weather: {}°C '{}'", condition.temperature, condition.label);

        let snapshot = self.catalog_snapshot().await;
        self.run_engine(&snapshot, condition, include_all_compatible)
    }

    /// Like `recommend_now`, with the location given as a city name.
    pub async fn recommend_now_in_city(
        &self,
        name: &str,
        include_all_compatible: bool,
    ) -> Result<RecommendEnvelope> {
        let city = self.find_city(name).await?;
        debug!(city = %city.name, "resolved city coordinates");
        self.recommend_now(city.latitude, city.longitude, include_all_compatible)
            .await
    }
}

/// Index preference rows by activity id and keep the personalized activities.
fn split_rows(
    rows: Vec<(UserPreference, Activity)>,
) -> (HashMap<ActivityId, UserPreference>, Vec<Activity>) {
    let mut by_activity = HashMap::with_capacity(rows.len());
    let mut activities = Vec::with_capacity(rows.len());
    for (preference, activity) in rows {
        by_activity.insert(activity.id, preference);
        activities.push(activity);
    }
    (by_activity, activities)
}
