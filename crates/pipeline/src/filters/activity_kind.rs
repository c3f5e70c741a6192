//! Filter to restrict results to indoor or outdoor activities.

use crate::error::Result;
use crate::query::WeatherQuery;
use crate::traits::Filter;
use catalog::{Activity, ActivityKind};

/// Keeps only activities of one kind.
pub struct ActivityKindFilter {
    kind: ActivityKind,
}

impl ActivityKindFilter {
    pub fn new(kind: ActivityKind) -> Self {
        Self { kind }
    }
}

impl Filter for ActivityKindFilter {
    fn name(&self) -> &str {
        "ActivityKindFilter"
    }

    fn apply(&self, activities: Vec<Activity>, _query: &WeatherQuery) -> Result<Vec<Activity>> {
        Ok(activities
            .into_iter()
            .filter(|activity| activity.kind == self.kind)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::{SkyFlags, WeatherPreference};

    #[test]
    fn test_activity_kind_filter() {
        let make = |id: u32, kind: ActivityKind| Activity {
            id,
            name: format!("Activity {id}"),
            kind,
            description: String::new(),
            temperature_min: 0.0,
            temperature_max: 30.0,
            preference: WeatherPreference::Flags(SkyFlags::new(true, true, true)),
        };
        let activities = vec![
            make(1, ActivityKind::Indoor),
            make(2, ActivityKind::Outdoor),
            make(3, ActivityKind::Indoor),
        ];

        let filtered = ActivityKindFilter::new(ActivityKind::Indoor)
            .apply(activities, &WeatherQuery::default())
            .unwrap();

        assert_eq!(filtered.len(), 2);
        assert!(filtered.iter().all(|a| a.kind == ActivityKind::Indoor));
    }
}
