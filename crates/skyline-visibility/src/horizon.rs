//! Curvature and refraction model of the visible horizon.
//!
//! Heights are measured against the observer's local horizontal. At
//! distance `d` the Earth's surface (seen through a refracted sight line)
//! has dropped by `CURVATURE * d²`, which gives the quadratic
//! `a·d² + b·d + h0` used for every threshold below.

use skyline_core::constants::EFFECTIVE_EARTH_RADIUS;

/// Quadratic coefficient `a = 1 / (2·R_eff)`.
pub const CURVATURE: f64 = 1.0 / (2.0 * EFFECTIVE_EARTH_RADIUS);

/// Observer-dependent horizon constants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Horizon {
    altitude: f64,
    distance: f64,
    slope: f64,
}

impl Horizon {
    /// Constants for an eye at `altitude` meters (already clamped to >= 0).
    pub fn new(altitude: f64) -> Self {
        let distance = (2.0 * altitude * EFFECTIVE_EARTH_RADIUS).sqrt();
        Self {
            altitude,
            distance,
            slope: -distance / EFFECTIVE_EARTH_RADIUS,
        }
    }

    pub fn altitude(&self) -> f64 {
        self.altitude
    }

    /// Distance to the geometric horizon `hd = sqrt(2·h·R_eff)`.
    pub fn distance(&self) -> f64 {
        self.distance
    }

    /// Linear coefficient `b = -hd / R_eff`, the dip of the horizon.
    pub fn slope(&self) -> f64 {
        self.slope
    }

    /// Lowest height a target at distance `d` must reach to clear the
    /// horizon by `min_angle`.
    pub fn min_visible_height(&self, d: f64, min_angle: f64) -> f64 {
        CURVATURE * d * d + (self.slope + min_angle) * d + self.altitude
    }

    /// Slope of the sight line towards a target of `height` at distance
    /// `d`, given its `min_height` from [`Horizon::min_visible_height`].
    pub fn sight_slope(&self, height: f64, min_height: f64, d: f64) -> f64 {
        (height - min_height) / d + self.slope
    }

    /// Highest terrain at distance `md` that leaves the sight line of
    /// slope `sight_slope` unobstructed.
    pub fn clearance(&self, sight_slope: f64, md: f64) -> f64 {
        CURVATURE * md * md + sight_slope * md + self.altitude
    }
}
