//! CatalogIndex loading and mutation logic.
//!
//! Loading parses the catalog files in parallel, rejects duplicate ids and
//! checks loaded rows against the same rules mutations enforce: temperature
//! ranges, at least one sky flag on personal activities, and uniqueness of
//! `(user, activity)` preferences and `(user, name)` personal activities.

use crate::error::{CatalogError, Result};
use crate::parser;
use crate::types::*;
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info};

fn duplicate_id(entity: &str, id: u32) -> CatalogError {
    CatalogError::Conflict(format!("duplicate {} id {}", entity, id))
}

fn check_range(min: f64, max: f64) -> Result<()> {
    if !min.is_finite() || !max.is_finite() {
        return Err(CatalogError::Validation(
            "temperature bounds must be finite numbers".to_string(),
        ));
    }
    if min > max {
        return Err(CatalogError::Validation(
            "temperature_min cannot be greater than temperature_max".to_string(),
        ));
    }
    Ok(())
}

fn require_user(user_id: &str) -> Result<()> {
    if user_id.trim().is_empty() {
        return Err(CatalogError::Validation("user_id is required".to_string()));
    }
    Ok(())
}

impl CatalogIndex {
    /// Load a catalog directory.
    ///
    /// Steps:
    /// 1. Parse activities, preferences, personal activities and cities in parallel
    /// 2. Insert everything into a fresh index, refusing repeated ids
    /// 3. Validate references and record rules
    pub fn load_from_dir(data_dir: &Path) -> Result<Self> {
        info!("Loading activity catalog from {:?}", data_dir);

        let activities_path = data_dir.join("activities.dat");
        let preferences_path = data_dir.join("preferences.dat");
        let personal_path = data_dir.join("personal.dat");
        let cities_path = data_dir.join("cities.dat");

        let ((activities, cities), (preferences, personal)) = rayon::join(
            || {
                rayon::join(
                    || parser::parse_activities(&activities_path),
                    || parser::parse_cities(&cities_path),
                )
            },
            || {
                rayon::join(
                    || parser::parse_preferences(&preferences_path),
                    || parser::parse_personal(&personal_path),
                )
            },
        );

        let activities = activities?;
        let preferences = preferences?;
        let personal = personal?;
        let cities = cities?;

        info!(
            "Loaded {} activities, {} preferences, {} personal activities, {} cities",
            activities.len(),
            preferences.len(),
            personal.len(),
            cities.len()
        );

        let mut index = CatalogIndex::new();
        for activity in activities {
            if index.activities.contains_key(&activity.id) {
                return Err(duplicate_id("activity", activity.id));
            }
            index.insert_activity(activity);
        }
        for preference in preferences {
            if index.preferences.contains_key(&preference.id) {
                return Err(duplicate_id("preference", preference.id));
            }
            index.insert_preference(preference);
        }
        for entry in personal {
            if index.personal.contains_key(&entry.activity.id) {
                return Err(duplicate_id("personal activity", entry.activity.id));
            }
            index.insert_personal_activity(entry);
        }
        for city in cities {
            if index.cities.contains_key(&city.id) {
                return Err(duplicate_id("city", city.id));
            }
            index.insert_city(city);
        }

        index.validate()?;
        Ok(index)
    }

    /// Validate references and record rules of loaded rows.
    ///
    /// Catalog activity temperature ranges are not checked here; the
    /// recommendation engine refuses inverted ranges when it sees them.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for pref in self.preferences.values() {
            if !self.activities.contains_key(&pref.activity_id) {
                return Err(CatalogError::MissingReference {
                    entity: "Activity".to_string(),
                    id: pref.activity_id.to_string(),
                });
            }
            if !seen.insert((pref.user_id.as_str(), pref.activity_id)) {
                return Err(CatalogError::Conflict(format!(
                    "duplicate preference for user {} and activity {}",
                    pref.user_id, pref.activity_id
                )));
            }
        }

        let mut names = HashSet::new();
        for entry in self.personal.values() {
            let activity = &entry.activity;
            require_user(&entry.user_id)?;
            if activity.name.is_empty() {
                return Err(CatalogError::Validation(format!(
                    "personal activity {} has no name",
                    activity.id
                )));
            }
            check_range(activity.temperature_min, activity.temperature_max)?;
            if !Sky::ALL.iter().any(|sky| activity.preference.prefers(*sky)) {
                return Err(CatalogError::Validation(format!(
                    "personal activity {} has no weather preference selected",
                    activity.id
                )));
            }
            if !names.insert((entry.user_id.as_str(), activity.name.as_str())) {
                return Err(CatalogError::Conflict(format!(
                    "duplicate personal activity '{}' for user {}",
                    activity.name, entry.user_id
                )));
            }
        }

        let mut city_names = HashSet::new();
        for city in self.cities.values() {
            if !city_names.insert(city.name.to_lowercase()) {
                return Err(CatalogError::Conflict(format!(
                    "duplicate city name '{}'",
                    city.name
                )));
            }
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // User preferences
    // -------------------------------------------------------------------------

    /// Create a preference row for a user and catalog activity.
    pub fn create_preference(&mut self, request: NewPreference) -> Result<UserPreference> {
        require_user(&request.user_id)?;
        check_range(request.temperature_min, request.temperature_max)?;

        if !self.activities.contains_key(&request.activity_id) {
            return Err(CatalogError::not_found("Activity", request.activity_id));
        }

        let duplicate = self
            .preferences
            .values()
            .any(|p| p.user_id == request.user_id && p.activity_id == request.activity_id);
        if duplicate {
            return Err(CatalogError::Conflict(
                "a preference for this activity already exists; update it instead".to_string(),
            ));
        }

        if self.preferences.contains_key(&self.next_preference_id) {
            return Err(CatalogError::Conflict("preference ids exhausted".to_string()));
        }

        let preference = UserPreference {
            id: self.next_preference_id,
            user_id: request.user_id,
            activity_id: request.activity_id,
            temperature_min: request.temperature_min,
            temperature_max: request.temperature_max,
            flags: request.flags,
        };
        self.insert_preference(preference.clone());
        debug!(id = preference.id, "created preference");
        Ok(preference)
    }

    /// Apply a partial update to a preference row.
    ///
    /// The merged range must still satisfy `min <= max`.
    pub fn update_preference(
        &mut self,
        id: PreferenceId,
        update: PreferenceUpdate,
    ) -> Result<UserPreference> {
        if update.is_empty() {
            return Err(CatalogError::Validation(
                "at least one field must be provided".to_string(),
            ));
        }

        let current = self
            .preferences
            .get(&id)
            .ok_or_else(|| CatalogError::not_found("Preference", id))?;

        let mut updated = current.clone();
        if let Some(min) = update.temperature_min {
            updated.temperature_min = min;
        }
        if let Some(max) = update.temperature_max {
            updated.temperature_max = max;
        }
        if let Some(v) = update.prefers_sunny {
            updated.flags.prefers_sunny = v;
        }
        if let Some(v) = update.prefers_cloudy {
            updated.flags.prefers_cloudy = v;
        }
        if let Some(v) = update.prefers_rainy {
            updated.flags.prefers_rainy = v;
        }
        check_range(updated.temperature_min, updated.temperature_max)?;

        self.preferences.insert(id, updated.clone());
        Ok(updated)
    }

    /// Remove a preference row.
    pub fn delete_preference(&mut self, id: PreferenceId) -> Result<UserPreference> {
        self.preferences
            .remove(&id)
            .ok_or_else(|| CatalogError::not_found("Preference", id))
    }

    // -------------------------------------------------------------------------
    // Personal activities
    // -------------------------------------------------------------------------

    fn personal_name_taken(&self, user_id: &str, name: &str, except: Option<ActivityId>) -> bool {
        self.personal.values().any(|p| {
            p.user_id == user_id && p.activity.name == name && Some(p.activity.id) != except
        })
    }

    /// Create a personal activity.
    ///
    /// Name and description are trimmed; at least one sky flag must be set.
    pub fn create_personal_activity(
        &mut self,
        request: NewPersonalActivity,
    ) -> Result<PersonalActivity> {
        require_user(&request.user_id)?;
        let name = request.name.trim().to_string();
        if name.is_empty() {
            return Err(CatalogError::Validation("name is required".to_string()));
        }
        check_range(request.temperature_min, request.temperature_max)?;
        if !request.flags.any() {
            return Err(CatalogError::Validation(
                "at least one weather preference must be selected".to_string(),
            ));
        }
        if self.personal_name_taken(&request.user_id, &name, None) {
            return Err(CatalogError::Conflict(format!(
                "a personal activity named '{}' already exists",
                name
            )));
        }

        if self.personal.contains_key(&self.next_personal_id) {
            return Err(CatalogError::Conflict(
                "personal activity ids exhausted".to_string(),
            ));
        }

        let personal = PersonalActivity {
            user_id: request.user_id,
            activity: Activity {
                id: self.next_personal_id,
                name,
                kind: request.kind,
                description: request.description.trim().to_string(),
                temperature_min: request.temperature_min,
                temperature_max: request.temperature_max,
                preference: WeatherPreference::Flags(request.flags),
            },
        };
        self.insert_personal_activity(personal.clone());
        debug!(id = personal.activity.id, "created personal activity");
        Ok(personal)
    }

    /// Apply a partial update to a personal activity.
    ///
    /// The merged record is validated like a new one.
    pub fn update_personal_activity(
        &mut self,
        id: ActivityId,
        update: PersonalActivityUpdate,
    ) -> Result<PersonalActivity> {
        let current = self
            .personal
            .get(&id)
            .ok_or_else(|| CatalogError::not_found("Personal activity", id))?;

        let mut updated = current.clone();
        let activity = &mut updated.activity;
        if let Some(name) = update.name {
            activity.name = name.trim().to_string();
        }
        if let Some(kind) = update.kind {
            activity.kind = kind;
        }
        if let Some(description) = update.description {
            activity.description = description.trim().to_string();
        }
        if let Some(min) = update.temperature_min {
            activity.temperature_min = min;
        }
        if let Some(max) = update.temperature_max {
            activity.temperature_max = max;
        }

        let mut flags = match activity.preference {
            WeatherPreference::Flags(flags) => flags,
            WeatherPreference::Declared { sky } => SkyFlags::only(&[sky]),
        };
        if let Some(v) = update.prefers_sunny {
            flags.prefers_sunny = v;
        }
        if let Some(v) = update.prefers_cloudy {
            flags.prefers_cloudy = v;
        }
        if let Some(v) = update.prefers_rainy {
            flags.prefers_rainy = v;
        }
        activity.preference = WeatherPreference::Flags(flags);

        if activity.name.is_empty() {
            return Err(CatalogError::Validation("name is required".to_string()));
        }
        check_range(activity.temperature_min, activity.temperature_max)?;
        if !flags.any() {
            return Err(CatalogError::Validation(
                "at least one weather preference must be selected".to_string(),
            ));
        }
        if self.personal_name_taken(&updated.user_id, &updated.activity.name, Some(id)) {
            return Err(CatalogError::Conflict(format!(
                "a personal activity named '{}' already exists",
                updated.activity.name
            )));
        }

        self.personal.insert(id, updated.clone());
        Ok(updated)
    }

    /// Remove a personal activity, returning it.
    pub fn delete_personal_activity(&mut self, id: ActivityId) -> Result<PersonalActivity> {
        self.personal
            .remove(&id)
            .ok_or_else(|| CatalogError::not_found("Personal activity", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_index() -> CatalogIndex {
        let mut index = CatalogIndex::new();
        index.insert_activity(Activity {
            id: 1,
            name: "Cycling".to_string(),
            kind: ActivityKind::Outdoor,
            description: "Road ride".to_string(),
            temperature_min: 12.0,
            temperature_max: 28.0,
            preference: WeatherPreference::Flags(SkyFlags::only(&[Sky::Sunny])),
        });
        index
    }

    fn new_pref(user: &str, activity_id: ActivityId, min: f64, max: f64) -> NewPreference {
        NewPreference {
            user_id: user.to_string(),
            activity_id,
            temperature_min: min,
            temperature_max: max,
            flags: SkyFlags::only(&[Sky::Cloudy]),
        }
    }

    fn new_personal(user: &str, name: &str) -> NewPersonalActivity {
        NewPersonalActivity {
            user_id: user.to_string(),
            name: name.to_string(),
            kind: ActivityKind::Indoor,
            description: "  board games  ".to_string(),
            temperature_min: -5.0,
            temperature_max: 35.0,
            flags: SkyFlags::only(&[Sky::Rainy]),
        }
    }

    #[test]
    fn test_create_preference_assigns_ids() {
        let mut index = test_index();
        let first = index.create_preference(new_pref("u1", 1, 10.0, 20.0)).unwrap();
        let second = index.create_preference(new_pref("u2", 1, 10.0, 20.0)).unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(index.preferences_for_user("u1").len(), 1);
    }

    #[test]
    fn test_create_preference_rules() {
        let mut index = test_index();

        let inverted = index.create_preference(new_pref("u1", 1, 30.0, 10.0));
        assert!(matches!(inverted, Err(CatalogError::Validation(_))));

        let missing = index.create_preference(new_pref("u1", 99, 10.0, 20.0));
        assert!(matches!(missing, Err(CatalogError::NotFound { .. })));

        let no_user = index.create_preference(new_pref("  ", 1, 10.0, 20.0));
        assert!(matches!(no_user, Err(CatalogError::Validation(_))));

        index.create_preference(new_pref("u1", 1, 10.0, 20.0)).unwrap();
        let duplicate = index.create_preference(new_pref("u1", 1, 5.0, 15.0));
        assert!(matches!(duplicate, Err(CatalogError::Conflict(_))));
    }

    #[test]
    fn test_update_preference() {
        let mut index = test_index();
        let pref = index.create_preference(new_pref("u1", 1, 10.0, 20.0)).unwrap();

        let empty = index.update_preference(pref.id, PreferenceUpdate::default());
        assert!(matches!(empty, Err(CatalogError::Validation(_))));

        let inverted = index.update_preference(
            pref.id,
            PreferenceUpdate {
                temperature_min: Some(25.0),
                ..Default::default()
            },
        );
        assert!(matches!(inverted, Err(CatalogError::Validation(_))));

        let updated = index
            .update_preference(
                pref.id,
                PreferenceUpdate {
                    temperature_max: Some(30.0),
                    prefers_sunny: Some(true),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.temperature_max, 30.0);
        assert!(updated.flags.prefers_sunny);
        assert!(updated.flags.prefers_cloudy);

        let missing = index.update_preference(
            42,
            PreferenceUpdate {
                prefers_rainy: Some(true),
                ..Default::default()
            },
        );
        assert!(matches!(missing, Err(CatalogError::NotFound { .. })));
    }

    #[test]
    fn test_delete_preference() {
        let mut index = test_index();
        let pref = index.create_preference(new_pref("u1", 1, 10.0, 20.0)).unwrap();

        assert!(index.delete_preference(pref.id).is_ok());
        assert!(matches!(
            index.delete_preference(pref.id),
            Err(CatalogError::NotFound { .. })
        ));
    }

    #[test]
    fn test_personalized_activities_apply_overrides() {
        let mut index = test_index();
        index.create_preference(new_pref("u1", 1, 0.0, 10.0)).unwrap();

        let personalized = index.personalized_activities("u1");
        assert_eq!(personalized.len(), 1);
        let (_, activity) = &personalized[0];
        assert_eq!(activity.name, "Cycling");
        assert_eq!(activity.temperature_max, 10.0);
        assert!(activity.preference.prefers(Sky::Cloudy));
        assert!(!activity.preference.prefers(Sky::Sunny));
    }

    #[test]
    fn test_personal_activity_lifecycle() {
        let mut index = test_index();
        let created = index
            .create_personal_activity(new_personal("u1", " Chess "))
            .unwrap();
        assert_eq!(created.activity.name, "Chess");
        assert_eq!(created.activity.description, "board games");

        let duplicate = index.create_personal_activity(new_personal("u1", "Chess"));
        assert!(matches!(duplicate, Err(CatalogError::Conflict(_))));

        // Same name is fine for another user
        index
            .create_personal_activity(new_personal("u2", "Chess"))
            .unwrap();

        let second = index
            .create_personal_activity(new_personal("u1", "Puzzles"))
            .unwrap();
        let listed = index.personal_activities_for_user("u1");
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].activity.id, second.activity.id, "newest first");

        let rename = index.update_personal_activity(
            second.activity.id,
            PersonalActivityUpdate {
                name: Some("Chess".to_string()),
                ..Default::default()
            },
        );
        assert!(matches!(rename, Err(CatalogError::Conflict(_))));

        let removed = index.delete_personal_activity(created.activity.id).unwrap();
        assert_eq!(removed.activity.name, "Chess");
    }

    #[test]
    fn test_personal_activity_requires_a_flag() {
        let mut index = test_index();
        let mut request = new_personal("u1", "Reading");
        request.flags = SkyFlags::default();
        assert!(matches!(
            index.create_personal_activity(request),
            Err(CatalogError::Validation(_))
        ));

        let created = index
            .create_personal_activity(new_personal("u1", "Reading"))
            .unwrap();
        let cleared = index.update_personal_activity(
            created.activity.id,
            PersonalActivityUpdate {
                prefers_rainy: Some(false),
                ..Default::default()
            },
        );
        assert!(matches!(cleared, Err(CatalogError::Validation(_))));
    }

    #[test]
    fn test_validate_rejects_dangling_preference() {
        let mut index = test_index();
        index.insert_preference(UserPreference {
            id: 1,
            user_id: "u1".to_string(),
            activity_id: 77,
            temperature_min: 0.0,
            temperature_max: 10.0,
            flags: SkyFlags::default(),
        });
        assert!(matches!(
            index.validate(),
            Err(CatalogError::MissingReference { .. })
        ));
    }

    fn personal_row(id: ActivityId, user: &str, name: &str, flags: SkyFlags) -> PersonalActivity {
        PersonalActivity {
            user_id: user.to_string(),
            activity: Activity {
                id,
                name: name.to_string(),
                kind: ActivityKind::Indoor,
                description: String::new(),
                temperature_min: 0.0,
                temperature_max: 30.0,
                preference: WeatherPreference::Flags(flags),
            },
        }
    }

    #[test]
    fn test_validate_applies_personal_activity_rules() {
        let mut index = test_index();
        index.insert_personal_activity(personal_row(
            1,
            "u1",
            "Chess",
            SkyFlags::only(&[Sky::Rainy]),
        ));
        index.insert_personal_activity(personal_row(
            2,
            "u2",
            "Chess",
            SkyFlags::only(&[Sky::Rainy]),
        ));
        assert!(index.validate().is_ok());

        index.insert_personal_activity(personal_row(
            3,
            "u1",
            "Chess",
            SkyFlags::only(&[Sky::Sunny]),
        ));
        assert!(matches!(index.validate(), Err(CatalogError::Conflict(_))));

        let mut index = test_index();
        index.insert_personal_activity(personal_row(
            1,
            "u1",
            "Reading",
            SkyFlags::default(),
        ));
        assert!(matches!(index.validate(), Err(CatalogError::Validation(_))));
    }

    fn write_catalog(name: &str, files: &[(&str, &str)]) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("catalog-{}-{}", name, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        for (name, content) in files {
            std::fs::write(dir.join(name), content).unwrap();
        }
        dir
    }

    #[test]
    fn test_load_rejects_duplicate_activity_ids() {
        let dir = write_catalog("duplicate-ids", &[(
            "activities.dat",
            "1::Hiking::outdoor::Walk::10::25::sunny\n1::Chess::indoor::Board::-10::40::rainy\n",
        )]);
        let result = CatalogIndex::load_from_dir(&dir);
        std::fs::remove_dir_all(&dir).unwrap();

        match result {
            Err(CatalogError::Conflict(reason)) => assert!(reason.contains("activity id 1")),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_load_rejects_flagless_personal_rows() {
        let dir = write_catalog("flagless", &[
            ("activities.dat", "1::Hiking::outdoor::Walk::10::25::sunny\n"),
            ("personal.dat", "1::u1::Reading::indoor::Books::0::30::-\n"),
        ]);
        let result = CatalogIndex::load_from_dir(&dir);
        std::fs::remove_dir_all(&dir).unwrap();

        assert!(matches!(result, Err(CatalogError::Validation(_))));
    }

    #[test]
    fn test_ids_exhausted_after_max_row() {
        let mut index = test_index();
        let row = parser::parse_preferences_str(
            "4294967295::u1::1::0::10::sunny\n",
            "preferences.dat",
        )
        .unwrap();
        index.insert_preference(row[0].clone());

        let result = index.create_preference(new_pref("u2", 1, 10.0, 20.0));
        assert!(matches!(result, Err(CatalogError::Conflict(_))));
        assert_eq!(index.preferences_for_user("u1").len(), 1);

        index.insert_personal_activity(personal_row(
            u32::MAX,
            "u1",
            "Chess",
            SkyFlags::only(&[Sky::Rainy]),
        ));
        let result = index.create_personal_activity(new_personal("u1", "Puzzles"));
        assert!(matches!(result, Err(CatalogError::Conflict(_))));
    }

    #[test]
    fn test_load_bundled_catalog() {
        let data_dir = Path::new("../../data/catalog");

        if data_dir.exists() {
            let index = CatalogIndex::load_from_dir(data_dir).unwrap();
            let (activities, _, _) = index.counts();
            assert!(activities > 0);
            assert!(index.city_by_name("Madrid").is_some());
        }
    }
}
