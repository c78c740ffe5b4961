//! Great-circle geometry on a spherical Earth.
//!
//! Distances use the geometric radius; refraction is applied separately by
//! the horizon model.

use skyline_core::azimuth::normalize_azimuth;
use skyline_core::constants::EARTH_RADIUS;
use skyline_core::GeoPoint;

/// A start point with its latitude trig cached, for solving many paths
/// from the same place.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeodesicOrigin {
    point: GeoPoint,
    sin_lat: f64,
    cos_lat: f64,
}

impl GeodesicOrigin {
    pub fn new(point: GeoPoint) -> Self {
        let (sin_lat, cos_lat) = point.lat.to_radians().sin_cos();
        Self {
            point,
            sin_lat,
            cos_lat,
        }
    }

    pub fn point(&self) -> GeoPoint {
        self.point
    }

    /// Great-circle distance (meters) and initial bearing (degrees in
    /// [0, 360), clockwise from north) to `to`. Coincident points give
    /// (0, 0).
    pub fn solve(&self, to: GeoPoint) -> (f64, f64) {
        let (sin_lat2, cos_lat2) = to.lat.to_radians().sin_cos();
        let dlat = (to.lat - self.point.lat).to_radians();
        let dlng = (to.lng - self.point.lng).to_radians();
        let (sin_dlng, cos_dlng) = dlng.sin_cos();

        // Haversine keeps precision for short paths and near antipodes
        let h = (dlat / 2.0).sin().powi(2) + self.cos_lat * cos_lat2 * (dlng / 2.0).sin().powi(2);
        if h <= 0.0 {
            return (0.0, 0.0);
        }
        let distance = 2.0 * EARTH_RADIUS * h.sqrt().min(1.0).asin();

        let y = sin_dlng * cos_lat2;
        let x = self.cos_lat * sin_lat2 - self.sin_lat * cos_lat2 * cos_dlng;
        let azimuth = if x == 0.0 && y == 0.0 {
            0.0
        } else {
            normalize_azimuth(y.atan2(x).to_degrees())
        };

        (distance, azimuth)
    }
}

/// Great-circle distance (meters) and initial bearing (degrees) from
/// `from` to `to`.
pub fn distance_and_azimuth(from: GeoPoint, to: GeoPoint) -> (f64, f64) {
    GeodesicOrigin::new(from).solve(to)
}

/// Point reached by travelling `distance` meters from `from` along the
/// great circle with initial bearing `azimuth` degrees.
pub fn destination(from: GeoPoint, distance: f64, azimuth: f64) -> GeoPoint {
    let delta = distance / EARTH_RADIUS;
    let theta = azimuth.to_radians();
    let (sin_lat1, cos_lat1) = from.lat.to_radians().sin_cos();
    let (sin_d, cos_d) = delta.sin_cos();

    let sin_lat2 = (sin_lat1 * cos_d + cos_lat1 * sin_d * theta.cos()).clamp(-1.0, 1.0);
    let lat2 = sin_lat2.asin();
    let dlng = (theta.sin() * sin_d * cos_lat1).atan2(cos_d - sin_lat1 * sin_lat2);

    let lng = (from.lng + dlng.to_degrees() + 540.0).rem_euclid(360.0) - 180.0;
    GeoPoint::new(lat2.to_degrees(), lng)
}

/// Midpoint of the great-circle arc between `a` and `b`. The longitude is
/// expressed relative to `a`'s, without wrapping, so it stays in the same
/// frame as the grid projection.
pub fn midpoint(a: GeoPoint, b: GeoPoint) -> GeoPoint {
    let (sin_lat1, cos_lat1) = a.lat.to_radians().sin_cos();
    let (sin_lat2, cos_lat2) = b.lat.to_radians().sin_cos();
    let (sin_dlng, cos_dlng) = (b.lng - a.lng).to_radians().sin_cos();

    let bx = cos_lat2 * cos_dlng;
    let by = cos_lat2 * sin_dlng;
    let lat = (sin_lat1 + sin_lat2).atan2(((cos_lat1 + bx).powi(2) + by * by).sqrt());
    let dlng = by.atan2(cos_lat1 + bx);

    GeoPoint::new(lat.to_degrees(), a.lng + dlng.to_degrees())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_identical_points() {
        let p = GeoPoint::new(35.6605, 139.729056);
        let (d, az) = distance_and_azimuth(p, p);
        assert_eq!(d, 0.0);
        assert_eq!(az, 0.0);

        let pole = GeoPoint::new(90.0, 0.0);
        let (d, az) = distance_and_azimuth(pole, pole);
        assert_eq!(d, 0.0);
        assert!(!az.is_nan());
    }

    #[test]
    fn test_cardinal_bearings() {
        let origin = GeoPoint::new(36.0, 138.0);
        let (_, north) = distance_and_azimuth(origin, GeoPoint::new(36.5, 138.0));
        let (_, south) = distance_and_azimuth(origin, GeoPoint::new(35.5, 138.0));
        let (_, east) = distance_and_azimuth(origin, GeoPoint::new(36.0, 138.01));
        let (_, west) = distance_and_azimuth(origin, GeoPoint::new(36.0, 137.99));
        assert_abs_diff_eq!(north, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(south, 180.0, epsilon = 1e-9);
        assert_abs_diff_eq!(east, 90.0, epsilon = 0.01);
        assert_abs_diff_eq!(west, 270.0, epsilon = 0.01);
    }

    #[test]
    fn test_one_degree_of_latitude() {
        let (d, _) = distance_and_azimuth(GeoPoint::new(0.0, 0.0), GeoPoint::new(1.0, 0.0));
        assert_abs_diff_eq!(d, EARTH_RADIUS * 1f64.to_radians(), epsilon = 1e-6);
    }

    #[test]
    fn test_antipodal_is_finite() {
        let (d, az) = distance_and_azimuth(GeoPoint::new(10.0, 20.0), GeoPoint::new(-10.0, -160.0));
        assert_abs_diff_eq!(d, EARTH_RADIUS * std::f64::consts::PI, epsilon = 1e-3);
        assert!(az.is_finite());
    }

    #[test]
    fn test_destination_north() {
        let p = destination(GeoPoint::new(35.0, 139.0), 111_319.49, 0.0);
        assert_abs_diff_eq!(p.lat, 36.0, epsilon = 1e-4);
        assert_abs_diff_eq!(p.lng, 139.0, epsilon = 1e-9);
    }

    #[test]
    fn test_midpoint_on_meridian() {
        let m = midpoint(GeoPoint::new(35.0, 139.0), GeoPoint::new(37.0, 139.0));
        assert_abs_diff_eq!(m.lat, 36.0, epsilon = 1e-9);
        assert_abs_diff_eq!(m.lng, 139.0, epsilon = 1e-9);
    }

    #[test]
    fn test_midpoint_bows_poleward() {
        let m = midpoint(GeoPoint::new(40.0, 136.0), GeoPoint::new(40.0, 139.0));
        assert!(m.lat > 40.005, "great-circle midpoint should lie north: {}", m.lat);
        assert_abs_diff_eq!(m.lng, 137.5, epsilon = 1e-9);

        let s = midpoint(GeoPoint::new(-40.0, 136.0), GeoPoint::new(-40.0, 139.0));
        assert!(s.lat < -40.005);
    }
}
