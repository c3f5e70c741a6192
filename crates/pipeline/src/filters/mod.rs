//! Filter implementations for the activity pipeline.
//!
//! This module contains all the concrete filter implementations
//! that can be composed into a FilterPipeline.

pub mod activity_kind;
pub mod sky_preference;
pub mod temperature_range;

// Re-export for convenience
pub use activity_kind::ActivityKindFilter;
pub use sky_preference::SkyPreferenceFilter;
pub use temperature_range::TemperatureRangeFilter;
