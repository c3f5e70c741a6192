//! Core traits for the filtering pipeline.
//!
//! This module defines the Filter trait that allows composable,
//! extensible filters to be applied to activity sets.

use crate::error::Result;
use crate::query::WeatherQuery;
use catalog::Activity;

/// Core trait for filtering activities.
///
/// All filters must implement this trait to be used in the FilterPipeline.
///
/// ## Design Note
/// - `Send + Sync` allows filters to be shared by concurrent requests
/// - Filters take ownership of the Vec<Activity> and return a filtered Vec
/// - Filters must keep the relative order of the activities they keep
pub trait Filter: Send + Sync {
    /// Returns the name of this filter (for logging/debugging)
    fn name(&self) -> &str;

    /// Apply this filter to a set of activities.
    ///
    /// # Arguments
    /// * `activities` - The activities to filter (takes ownership)
    /// * `query` - The weather being asked about; absent axes filter nothing
    ///
    /// # Returns
    /// * `Ok(Vec<Activity>)` - The filtered activities
    /// * `Err` - If filtering fails
    fn apply(&self, activities: Vec<Activity>, query: &WeatherQuery) -> Result<Vec<Activity>>;
}
