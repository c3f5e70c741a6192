//! Weather-driven activity recommendation engine.
//!
//! This crate provides:
//! - Filter trait and implementations for activity filtering
//! - FilterPipeline for composing filters
//! - The recommendation engine (admissibility, perfect/compatible split)
//! - Unsuitability predicates for "not recommended" views
//! - Explicit filter modes for partial weather queries
//!
//! ## Example Usage
//! ```ignore
//! use catalog::WeatherCondition;
//! use pipeline::recommend;
//!
//! let condition = WeatherCondition::from_label(20.0, "soleado");
//! let result = recommend(&activities, &condition, false)?;
//! println!("{} perfect, {} compatible", result.perfect.len(), result.compatible.len());
//! ```

pub mod error;
pub mod traits;
pub mod filters;
pub mod filter_pipeline;
pub mod query;
pub mod suitability;
pub mod engine;

// Re-export main types
pub use error::{EngineError, Result};
pub use traits::Filter;
pub use filter_pipeline::FilterPipeline;
pub use query::{FilterMode, WeatherQuery};
pub use suitability::{is_admissible, is_perfect_match, is_unsuitable, is_unsuitable_for};
pub use engine::{
    filter_activities, not_recommended, recommend, validate_activities, Recommendation,
    RecommendationEngine,
};
