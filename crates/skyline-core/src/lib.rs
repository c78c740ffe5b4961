//! Core types and definitions for skyline.
//!
//! This crate defines the vocabulary shared across the other crates:
//! geographic points, observer fixes, targets, verdicts, configuration
//! and the process-wide model constants.

pub mod azimuth;
pub mod config;
pub mod constants;
pub mod enums;
pub mod errors;
pub mod types;

pub use config::VisibilityConfig;
pub use enums::{Occlusion, TargetCategory, Visibility};
pub use errors::{ConfigError, NotReady};
pub use types::{GeoPoint, ObserverFix, Sighting, Target};

#[cfg(test)]
mod tests;
