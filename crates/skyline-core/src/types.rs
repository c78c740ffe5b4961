//! Fundamental geographic and result types.

use serde::{Deserialize, Serialize};

use crate::enums::{Occlusion, TargetCategory, Visibility};

/// A position on the Earth's surface in degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// One reading of the observer's position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ObserverFix {
    pub position: GeoPoint,
    /// Altitude above sea level in meters, as reported by the sensor.
    pub altitude: f64,
}

impl ObserverFix {
    pub const fn new(position: GeoPoint, altitude: f64) -> Self {
        Self { position, altitude }
    }

    /// Altitude used by the horizon model. Negative or non-finite
    /// readings count as sea level.
    pub fn model_altitude(&self) -> f64 {
        if self.altitude.is_finite() {
            self.altitude.max(0.0)
        } else {
            0.0
        }
    }
}

/// A candidate landmark handed in by the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Target {
    pub position: GeoPoint,
    /// Height of the top of the landmark above sea level (meters).
    pub height: f64,
    pub category: TargetCategory,
}

impl Target {
    pub const fn new(position: GeoPoint, height: f64, category: TargetCategory) -> Self {
        Self {
            position,
            height,
            category,
        }
    }

    /// A natural or built feature that is subject to the terrain test.
    pub const fn terrain(position: GeoPoint, height: f64) -> Self {
        Self::new(position, height, TargetCategory::Terrain)
    }
}

/// Result of one visibility check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sighting {
    /// Great-circle distance from the observer (meters).
    pub distance: f64,
    /// Bearing from the observer, degrees clockwise from north in [0, 360).
    pub azimuth: f64,
    pub visibility: Visibility,
}

impl Sighting {
    pub fn visible(distance: f64, azimuth: f64) -> Self {
        Self {
            distance,
            azimuth,
            visibility: Visibility::Visible,
        }
    }

    pub fn occluded(distance: f64, azimuth: f64, cause: Occlusion) -> Self {
        Self {
            distance,
            azimuth,
            visibility: Visibility::Occluded(cause),
        }
    }

    pub fn is_visible(&self) -> bool {
        matches!(self.visibility, Visibility::Visible)
    }

    /// Why the target is hidden, if it is.
    pub fn occlusion(&self) -> Option<Occlusion> {
        match self.visibility {
            Visibility::Visible => None,
            Visibility::Occluded(cause) => Some(cause),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_altitude_clamps() {
        let p = GeoPoint::new(35.0, 138.0);
        assert_eq!(ObserverFix::new(p, 1200.0).model_altitude(), 1200.0);
        assert_eq!(ObserverFix::new(p, -35.0).model_altitude(), 0.0);
        assert_eq!(ObserverFix::new(p, f64::NAN).model_altitude(), 0.0);
        assert_eq!(ObserverFix::new(p, f64::NEG_INFINITY).model_altitude(), 0.0);
    }

    #[test]
    fn test_sighting_accessors() {
        let seen = Sighting::visible(1000.0, 45.0);
        assert!(seen.is_visible());
        assert_eq!(seen.occlusion(), None);

        let hidden = Sighting::occluded(1000.0, 45.0, Occlusion::OutOfRange);
        assert!(!hidden.is_visible());
        assert_eq!(hidden.occlusion(), Some(Occlusion::OutOfRange));
    }
}
