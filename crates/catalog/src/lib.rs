//! # Catalog Crate
//!
//! Activity catalog, weather vocabulary and the in-memory store the
//! recommendation engine reads from.
//!
//! ## Main Components
//!
//! - **types**: Domain types (Activity, WeatherPreference, UserPreference, CatalogIndex)
//! - **sky**: Free-text sky label normalization through a static synonym table
//! - **parser**: Parse `.dat` catalog files into Rust structs
//! - **index**: Load a catalog directory and apply validated mutations
//! - **error**: Error types for loading and mutations
//!
//! ## Example Usage
//!
//! ```ignore
//! use catalog::{CatalogIndex, WeatherCondition};
//! use std::path::Path;
//!
//! let index = CatalogIndex::load_from_dir(Path::new("data/catalog"))?;
//! let activities = index.activities_sorted_by_name();
//! let condition = WeatherCondition::from_label(21.5, "Soleado");
//! ```

// Public modules
pub mod error;
pub mod types;
pub mod sky;
pub mod parser;
pub mod index;

// Re-export commonly used types for convenience
pub use error::{CatalogError, Result};
pub use sky::{normalize_sky, synonyms_for};
pub use types::{
    // Type aliases
    ActivityId,
    CityId,
    PreferenceId,
    UserId,
    // Core types
    Activity,
    CatalogIndex,
    City,
    PersonalActivity,
    SkyFlags,
    UserPreference,
    WeatherCondition,
    // Enums
    ActivityKind,
    Sky,
    SkyCondition,
    WeatherPreference,
    // Mutation requests
    NewPersonalActivity,
    NewPreference,
    PersonalActivityUpdate,
    PreferenceUpdate,
};

#[cfg(test)]
mod tests {
    use super::*;

    fn hiking() -> Activity {
        Activity {
            id: 1,
            name: "Hiking".to_string(),
            kind: ActivityKind::Outdoor,
            description: "Mountain trail".to_string(),
            temperature_min: 10.0,
            temperature_max: 24.0,
            preference: WeatherPreference::Flags(SkyFlags::new(true, true, false)),
        }
    }

    #[test]
    fn test_catalog_index_creation() {
        let index = CatalogIndex::new();
        let (activities, preferences, personal) = index.counts();

        assert_eq!(activities, 0);
        assert_eq!(preferences, 0);
        assert_eq!(personal, 0);
    }

    #[test]
    fn test_insert_activity_and_kind_index() {
        let mut index = CatalogIndex::new();
        index.insert_activity(hiking());

        assert_eq!(index.get_activity(1).unwrap().name, "Hiking");
        assert_eq!(index.activities_by_kind(ActivityKind::Outdoor), &[1]);
        assert!(index.activities_by_kind(ActivityKind::Indoor).is_empty());

        // Re-inserting with another kind moves it between kind lists
        let mut moved = hiking();
        moved.kind = ActivityKind::Indoor;
        index.insert_activity(moved);
        assert!(index.activities_by_kind(ActivityKind::Outdoor).is_empty());
        assert_eq!(index.activities_by_kind(ActivityKind::Indoor), &[1]);
    }

    #[test]
    fn test_insert_at_max_id_does_not_overflow() {
        let mut index = CatalogIndex::new();
        index.insert_preference(UserPreference {
            id: u32::MAX,
            user_id: "u1".to_string(),
            activity_id: 1,
            temperature_min: 0.0,
            temperature_max: 10.0,
            flags: SkyFlags::only(&[Sky::Sunny]),
        });
        index.insert_personal_activity(PersonalActivity {
            user_id: "u1".to_string(),
            activity: Activity {
                id: u32::MAX,
                ..hiking()
            },
        });

        assert_eq!(index.next_preference_id, u32::MAX);
        assert_eq!(index.next_personal_id, u32::MAX);
        assert!(index.get_preference(u32::MAX).is_some());
    }

    #[test]
    fn test_city_lookups() {
        let mut index = CatalogIndex::new();
        for (id, name) in [(1, "Valencia"), (2, "Madrid"), (3, "Valladolid")] {
            index.insert_city(City {
                id,
                name: name.to_string(),
                country: "ES".to_string(),
                latitude: 40.0,
                longitude: -3.0,
            });
        }

        let names: Vec<&str> = index
            .search_cities(" VAL ")
            .into_iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, vec!["Valencia", "Valladolid"]);
        assert!(index.search_cities("zzz").is_empty());

        assert_eq!(index.city_by_name("madrid").unwrap().id, 2);
        assert!(index.city_by_name("Madr").is_none());
        assert_eq!(index.city_count(), 3);
    }

    #[test]
    fn test_sorted_by_name() {
        let mut index = CatalogIndex::new();
        let mut yoga = hiking();
        yoga.id = 2;
        yoga.name = "Yoga".to_string();
        let mut archery = hiking();
        archery.id = 3;
        archery.name = "Archery".to_string();
        index.insert_activity(yoga);
        index.insert_activity(hiking());
        index.insert_activity(archery);

        let names: Vec<String> = index
            .activities_sorted_by_name()
            .into_iter()
            .map(|a| a.name)
            .collect();
        assert_eq!(names, vec!["Archery", "Hiking", "Yoga"]);
    }

    #[test]
    fn test_condition_from_label() {
        let condition = WeatherCondition::from_label(18.0, "Nublado");
        assert_eq!(condition.sky, SkyCondition::Cloudy);
        assert_eq!(condition.label, "Nublado");
        assert_eq!(condition.sky.sky(), Some(Sky::Cloudy));

        let unknown = WeatherCondition::from_label(18.0, "foggy");
        assert!(!unknown.sky.is_recognized());
    }

    #[test]
    fn test_weather_preference_shapes() {
        let flags = WeatherPreference::Flags(SkyFlags::only(&[Sky::Rainy]));
        assert!(flags.prefers(Sky::Rainy));
        assert!(!flags.prefers(Sky::Sunny));

        let declared = WeatherPreference::Declared { sky: Sky::Sunny };
        assert!(declared.prefers(Sky::Sunny));
        assert!(!declared.prefers(Sky::Cloudy));
    }

    #[test]
    fn test_activity_serializes_with_tagged_preference() {
        let json = serde_json::to_value(hiking()).unwrap();
        assert_eq!(json["kind"], "outdoor");
        assert_eq!(json["preference"]["shape"], "flags");
        assert_eq!(json["preference"]["prefers_sunny"], true);

        let declared = Activity {
            preference: WeatherPreference::Declared { sky: Sky::Rainy },
            ..hiking()
        };
        let json = serde_json::to_value(declared).unwrap();
        assert_eq!(json["preference"]["shape"], "declared");
        assert_eq!(json["preference"]["sky"], "rainy");
    }

    #[test]
    fn test_has_valid_range() {
        let mut activity = hiking();
        assert!(activity.has_valid_range());
        activity.temperature_min = 30.0;
        assert!(!activity.has_valid_range());
        activity.temperature_min = f64::NAN;
        assert!(!activity.has_valid_range());
    }
}
