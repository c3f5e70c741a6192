//! Integration tests for the recommendation engine.
//!
//! These tests exercise the engine the way the service uses it: a catalog
//! snapshot, a normalized weather condition, and both selection modes.

use catalog::{Activity, ActivityKind, Sky, SkyFlags, WeatherCondition, WeatherPreference};
use pipeline::{recommend, EngineError, FilterMode, WeatherQuery};

fn activity(id: u32, min: f64, max: f64, sunny: bool, cloudy: bool, rainy: bool) -> Activity {
    Activity {
        id,
        name: format!("Activity {id}"),
        kind: ActivityKind::Outdoor,
        description: String::new(),
        temperature_min: min,
        temperature_max: max,
        preference: WeatherPreference::Flags(SkyFlags::new(sunny, cloudy, rainy)),
    }
}

fn ids(activities: &[Activity]) -> Vec<u32> {
    activities.iter().map(|a| a.id).collect()
}

fn mixed_catalog() -> Vec<Activity> {
    vec![
        activity(1, 10.0, 25.0, true, false, false),
        activity(2, 0.0, 15.0, false, true, false),
        activity(3, 12.0, 30.0, false, false, true),
        activity(4, 18.0, 35.0, true, true, false),
        activity(5, -5.0, 40.0, false, true, true),
        activity(6, 14.0, 16.0, true, false, true),
    ]
}

#[test]
fn test_temperature_boundaries_are_inclusive() {
    let catalog = vec![activity(1, 10.0, 20.0, true, false, false)];

    for temperature in [10.0, 20.0] {
        let result = recommend(&catalog, &WeatherCondition::from_label(temperature, "sunny"), true)
            .unwrap();
        assert_eq!(ids(&result.primary), vec![1], "t = {temperature}");
    }
    for temperature in [9.999, 20.001] {
        let result = recommend(&catalog, &WeatherCondition::from_label(temperature, "sunny"), true)
            .unwrap();
        assert!(result.primary.is_empty(), "t = {temperature}");
        assert_eq!(result.total(), 0);
    }
}

#[test]
fn test_recommend_is_idempotent() {
    let catalog = mixed_catalog();
    let condition = WeatherCondition::from_label(15.0, "cloudy");

    let first = recommend(&catalog, &condition, false).unwrap();
    let second = recommend(&catalog, &condition, false).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_partition_is_complete_and_disjoint() {
    let catalog = mixed_catalog();
    let condition = WeatherCondition::from_label(15.0, "rainy");

    let result = recommend(&catalog, &condition, true).unwrap();
    let perfect = ids(&result.perfect);
    let compatible = ids(&result.compatible);

    assert!(perfect.iter().all(|id| !compatible.contains(id)));

    let admissible: Vec<u32> = catalog
        .iter()
        .filter(|a| a.temperature_min <= 15.0 && 15.0 <= a.temperature_max)
        .map(|a| a.id)
        .collect();
    let mut union: Vec<u32> = perfect.iter().chain(compatible.iter()).copied().collect();
    union.sort_unstable();
    assert_eq!(union, admissible);

    assert_eq!(perfect, vec![3, 5, 6]);
    assert_eq!(compatible, vec![1, 2]);
}

#[test]
fn test_mode_switch_selects_primary() {
    let catalog = mixed_catalog();
    let condition = WeatherCondition::from_label(15.0, "Clear");

    let all = recommend(&catalog, &condition, true).unwrap();
    let perfect_only = recommend(&catalog, &condition, false).unwrap();

    // Union in input order, not perfect-then-compatible
    assert_eq!(ids(&all.primary), vec![1, 2, 3, 5, 6]);
    assert_eq!(ids(&perfect_only.primary), ids(&perfect_only.perfect));
    assert_eq!(ids(&perfect_only.primary), vec![1, 6]);

    // Both buckets are returned either way
    assert_eq!(all.perfect, perfect_only.perfect);
    assert_eq!(all.compatible, perfect_only.compatible);
}

#[test]
fn test_unrecognized_sky_puts_everything_in_compatible() {
    let catalog = mixed_catalog();
    let result = recommend(&catalog, &WeatherCondition::from_label(15.0, "foggy"), false).unwrap();

    assert!(result.perfect.is_empty());
    assert!(result.primary.is_empty());
    assert_eq!(ids(&result.compatible), vec![1, 2, 3, 5, 6]);
}

#[test]
fn test_soleado_scenario() {
    let catalog = vec![
        activity(1, 15.0, 25.0, true, false, false),
        activity(2, 0.0, 10.0, false, true, false),
    ];
    let result = recommend(&catalog, &WeatherCondition::from_label(20.0, "soleado"), false).unwrap();

    assert_eq!(ids(&result.perfect), vec![1]);
    assert!(result.compatible.is_empty());
    assert_eq!(ids(&result.primary), vec![1]);
    assert_eq!(result.total(), 1);
}

#[test]
fn test_inverted_range_is_refused() {
    let mut catalog = mixed_catalog();
    catalog.push(activity(99, 30.0, 10.0, true, false, false));

    for include_all in [false, true] {
        let err = recommend(&catalog, &WeatherCondition::from_label(20.0, "sunny"), include_all)
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(ref msg) if msg.contains("99")));
    }
}

#[test]
fn test_declared_and_flag_shapes_share_range_logic() {
    let mut declared = activity(1, 10.0, 20.0, false, false, false);
    declared.preference = WeatherPreference::Declared { sky: Sky::Sunny };
    let flags = activity(2, 10.0, 20.0, true, false, false);
    let catalog = vec![declared, flags];

    let warm = pipeline::not_recommended(
        &catalog,
        &WeatherQuery::new(Some(25.0), Some("sunny")),
        FilterMode::BothRequired,
    )
    .unwrap();
    assert_eq!(ids(&warm), vec![1, 2]);

    let fine = pipeline::not_recommended(
        &catalog,
        &WeatherQuery::new(Some(15.0), Some("despejado")),
        FilterMode::BothRequired,
    )
    .unwrap();
    assert!(fine.is_empty());
}

#[test]
fn test_recommendation_serializes() {
    let catalog = vec![activity(1, 15.0, 25.0, true, false, false)];
    let result = recommend(&catalog, &WeatherCondition::from_label(20.0, "sunny"), false).unwrap();

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["condition"]["sky"], "sunny");
    assert_eq!(json["perfect"][0]["id"], 1);
    assert_eq!(json["compatible"].as_array().unwrap().len(), 0);
}
