//! Sky label normalization.
//!
//! Free-text weather labels arrive in English and Spanish, and from the
//! forecast API as capitalized categories ("Clear", "Clouds", "Rain").
//! They all go through one static synonym table.

use crate::types::{Sky, SkyCondition};
use once_cell::sync::Lazy;
use std::collections::HashMap;

static SKY_SYNONYMS: Lazy<HashMap<&'static str, Sky>> = Lazy::new(|| {
    let groups: [(Sky, &[&'static str]); 3] = [
        (Sky::Sunny, &["sunny", "clear", "despejado", "soleado"]),
        (Sky::Cloudy, &["cloudy", "clouds", "nublado", "nubes"]),
        (Sky::Rainy, &["rainy", "rain", "lluvia", "lluvioso"]),
    ];

    groups
        .iter()
        .flat_map(|(sky, labels)| labels.iter().map(move |label| (*label, *sky)))
        .collect()
});

/// Map a free-text label onto a sky condition.
///
/// Matching is case-insensitive and ignores surrounding whitespace.
/// Labels outside the table yield `SkyCondition::Unrecognized`.
pub fn normalize_sky(label: &str) -> SkyCondition {
    let key = label.trim().to_lowercase();
    match SKY_SYNONYMS.get(key.as_str()) {
        Some(sky) => SkyCondition::from(*sky),
        None => SkyCondition::Unrecognized,
    }
}

/// All labels known for a given sky, sorted.
pub fn synonyms_for(sky: Sky) -> Vec<&'static str> {
    let mut labels: Vec<&'static str> = SKY_SYNONYMS
        .iter()
        .filter(|(_, s)| **s == sky)
        .map(|(label, _)| *label)
        .collect();
    labels.sort_unstable();
    labels
}
