//! Visibility engine for skyline.
//!
//! Decides whether a distant landmark can be seen from the observer's
//! position, accounting for Earth curvature, atmospheric refraction and
//! the terrain in between.

pub use skyline_core as core;

pub mod engine;
pub mod geodesy;
pub mod horizon;
pub mod sampling;

pub use engine::{ObserverState, VisibilityEngine};
pub use geodesy::{destination, distance_and_azimuth, midpoint, GeodesicOrigin};
pub use horizon::Horizon;
