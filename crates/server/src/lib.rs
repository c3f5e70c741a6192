//! Service layer for the activity recommendation workspace.
//!
//! This crate contains the `ActivityService` that coordinates the catalog,
//! the recommendation engine and the forecast client, plus the response
//! envelopes, error mapping and configuration it uses.

pub mod config;
pub mod envelope;
pub mod error;
pub mod orchestrator;

pub use config::{ConfigError, ServiceConfig};
pub use error::{ErrorEnvelope, Result, ServiceError};
pub use orchestrator::ActivityService;
