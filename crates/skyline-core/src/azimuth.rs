//! Azimuth arithmetic for field-of-view filtering.

use serde::{Deserialize, Serialize};

/// Normalize an angle in degrees to [0, 360).
pub fn normalize_azimuth(degrees: f64) -> f64 {
    let a = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if a >= 360.0 {
        0.0
    } else {
        a
    }
}

/// Signed difference `azimuth - from` in degrees, in (-180, 180].
pub fn signed_angle(azimuth: f64, from: f64) -> f64 {
    let diff = normalize_azimuth(azimuth - from);
    if diff > 180.0 {
        diff - 360.0
    } else {
        diff
    }
}

/// A horizontal field of view running clockwise from `from` to `to`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AzimuthWindow {
    pub from: f64,
    pub to: f64,
}

impl AzimuthWindow {
    pub fn new(from: f64, to: f64) -> Self {
        Self {
            from: normalize_azimuth(from),
            to: normalize_azimuth(to),
        }
    }

    /// Window of `width` degrees centred on `heading`.
    pub fn centered(heading: f64, width: f64) -> Self {
        Self::new(heading - width / 2.0, heading + width / 2.0)
    }

    /// Whether `azimuth` lies strictly inside the window. Windows whose
    /// start is past their end wrap through north.
    pub fn contains(&self, azimuth: f64) -> bool {
        let az = normalize_azimuth(azimuth);
        if self.from < self.to {
            self.from < az && az < self.to
        } else {
            self.from < az || az < self.to
        }
    }
}
