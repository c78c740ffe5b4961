//! VisibilityEngine: per-observer visibility oracle.
//!
//! The observer fix and everything derived from it live in one immutable
//! [`ObserverState`] behind an `Arc`. An update swaps the whole snapshot,
//! and each check clones the current one, so a check never mixes constants
//! from two fixes.

use std::sync::{Arc, PoisonError, RwLock};

use glam::DVec2;
use skyline_core::{
    GeoPoint, NotReady, ObserverFix, Occlusion, Sighting, Target, TargetCategory, VisibilityConfig,
};
use skyline_terrain::projection::coordinate;
use skyline_terrain::{ElevationGrid, ElevationSource};
use tracing::{debug, info};

use crate::geodesy::{midpoint, GeodesicOrigin};
use crate::horizon::Horizon;
use crate::sampling::SamplePath;

/// Everything derived from one observer fix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObserverState {
    fix: ObserverFix,
    origin: GeodesicOrigin,
    grid: DVec2,
    horizon: Horizon,
}

impl ObserverState {
    pub fn new(fix: ObserverFix) -> Self {
        Self {
            fix,
            origin: GeodesicOrigin::new(fix.position),
            grid: coordinate(fix.position),
            horizon: Horizon::new(fix.model_altitude()),
        }
    }

    pub fn fix(&self) -> ObserverFix {
        self.fix
    }

    pub fn position(&self) -> GeoPoint {
        self.fix.position
    }

    /// Real-valued grid coordinate of the observer.
    pub fn grid(&self) -> DVec2 {
        self.grid
    }

    pub fn horizon(&self) -> &Horizon {
        &self.horizon
    }

    /// Distance and azimuth to a point.
    pub fn vector_to(&self, point: GeoPoint) -> (f64, f64) {
        self.origin.solve(point)
    }

    /// Full visibility test of one target against `terrain`.
    pub fn assess<S: ElevationSource + ?Sized>(
        &self,
        target: &Target,
        config: &VisibilityConfig,
        terrain: &S,
    ) -> Sighting {
        let (distance, azimuth) = self.vector_to(target.position);

        match target.category {
            TargetCategory::UserMarker => return Sighting::visible(distance, azimuth),
            TargetCategory::Settlement => {
                return if distance <= config.city_max_distance {
                    Sighting::visible(distance, azimuth)
                } else {
                    Sighting::occluded(distance, azimuth, Occlusion::OutOfRange)
                };
            }
            TargetCategory::Terrain => {}
        }

        if distance > config.max_distance || distance < config.min_distance {
            return Sighting::occluded(distance, azimuth, Occlusion::OutOfRange);
        }

        let horizon = &self.horizon;
        let min_height = horizon.min_visible_height(distance, config.min_elevation_angle);
        if distance > horizon.distance() && target.height < min_height {
            return Sighting::occluded(distance, azimuth, Occlusion::BelowHorizon { min_height });
        }
        if distance <= 0.0 {
            return Sighting::visible(distance, azimuth);
        }

        let mid = coordinate(midpoint(self.fix.position, target.position));
        let path = SamplePath::new(self.grid, coordinate(target.position), mid);
        let sight_slope = horizon.sight_slope(target.height, min_height, distance);

        for (fraction, cell) in path.samples() {
            let elevation = terrain.height(cell.x, cell.y);
            // Sea and no-data cells never block
            if elevation <= 0.0 {
                continue;
            }
            let threshold = horizon.clearance(sight_slope, distance * fraction);
            if elevation > threshold {
                return Sighting::occluded(
                    distance,
                    azimuth,
                    Occlusion::Terrain {
                        fraction,
                        elevation,
                        threshold,
                    },
                );
            }
        }

        Sighting::visible(distance, azimuth)
    }
}

/// Decides which targets the current observer can actually see.
///
/// Safe to share between threads: `update_observer` may run concurrently
/// with checks, which always see either the old or the new fix in full.
pub struct VisibilityEngine<S: ElevationSource = ElevationGrid> {
    terrain: Arc<S>,
    config: RwLock<VisibilityConfig>,
    observer: RwLock<Option<Arc<ObserverState>>>,
}

impl<S: ElevationSource> VisibilityEngine<S> {
    pub fn new(terrain: Arc<S>, config: VisibilityConfig) -> Self {
        Self {
            terrain,
            config: RwLock::new(config),
            observer: RwLock::new(None),
        }
    }

    pub fn terrain(&self) -> &Arc<S> {
        &self.terrain
    }

    pub fn config(&self) -> VisibilityConfig {
        *self.config.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_config(&self, config: VisibilityConfig) {
        *self.config.write().unwrap_or_else(PoisonError::into_inner) = config;
    }

    /// Tune the minimum apparent elevation. Negative values are clamped to
    /// zero; non-finite values are ignored.
    pub fn set_min_elevation_angle(&self, angle: f64) {
        if !angle.is_finite() {
            return;
        }
        let mut config = self.config.write().unwrap_or_else(PoisonError::into_inner);
        config.min_elevation_angle = angle.max(0.0);
    }

    /// Current observer fix, if one has been set.
    pub fn observer(&self) -> Option<ObserverFix> {
        self.snapshot().map(|state| state.fix())
    }

    /// Snapshot of the observer-derived constants.
    pub fn snapshot(&self) -> Option<Arc<ObserverState>> {
        self.observer
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the observer fix and all constants derived from it.
    pub fn update_observer(&self, fix: ObserverFix) {
        let state = Arc::new(ObserverState::new(fix));
        info!(
            lng = fix.position.lng,
            lat = fix.position.lat,
            altitude = fix.altitude,
            "observer position updated"
        );
        *self.observer.write().unwrap_or_else(PoisonError::into_inner) = Some(state);
    }

    /// Replace the observer fix only if it moved further than the
    /// configured threshold from the current one. Returns whether it did.
    pub fn update_observer_if_moved(&self, fix: ObserverFix) -> bool {
        let threshold = self.config().movement_threshold;
        let mut observer = self.observer.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(current) = observer.as_ref() {
            let (moved, _) = current.vector_to(fix.position);
            if moved <= threshold {
                debug!(moved, threshold, "observer movement below threshold, keeping fix");
                return false;
            }
        }
        info!(
            lng = fix.position.lng,
            lat = fix.position.lat,
            altitude = fix.altitude,
            "observer position updated"
        );
        *observer = Some(Arc::new(ObserverState::new(fix)));
        true
    }

    /// Distance, azimuth and visibility of one target from the current
    /// observer.
    pub fn check_visibility(&self, target: &Target) -> Result<Sighting, NotReady> {
        let state = self.ready_state()?;
        let config = self.config();
        Ok(self.assess_logged(&state, &config, target))
    }

    /// Check many targets against a single observer snapshot.
    pub fn check_all(&self, targets: &[Target]) -> Result<Vec<Sighting>, NotReady> {
        let state = self.ready_state()?;
        let config = self.config();
        Ok(targets
            .iter()
            .map(|target| self.assess_logged(&state, &config, target))
            .collect())
    }

    fn ready_state(&self) -> Result<Arc<ObserverState>, NotReady> {
        let state = self.snapshot().ok_or(NotReady::ObserverUnset)?;
        if !self.terrain.is_ready() {
            return Err(NotReady::TilesLoading);
        }
        Ok(state)
    }

    fn assess_logged(
        &self,
        state: &ObserverState,
        config: &VisibilityConfig,
        target: &Target,
    ) -> Sighting {
        let sighting = state.assess(target, config, self.terrain.as_ref());
        match sighting.occlusion() {
            None => debug!(
                height = target.height,
                km = sighting.distance / 1000.0,
                azimuth = sighting.azimuth,
                "target visible"
            ),
            Some(Occlusion::OutOfRange) => debug!(
                height = target.height,
                km = sighting.distance / 1000.0,
                "target out of range"
            ),
            Some(Occlusion::BelowHorizon { min_height }) => debug!(
                height = target.height,
                km = sighting.distance / 1000.0,
                min_height,
                "target below horizon"
            ),
            Some(Occlusion::Terrain {
                fraction,
                elevation,
                threshold,
            }) => debug!(
                height = target.height,
                km = sighting.distance / 1000.0,
                lng = target.position.lng,
                lat = target.position.lat,
                fraction,
                threshold,
                elevation,
                "target hidden by terrain"
            ),
        }
        sighting
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Uniform terrain that counts every query.
    struct Uniform {
        height: f64,
        queries: AtomicUsize,
    }

    impl Uniform {
        fn new(height: f64) -> Arc<Self> {
            Arc::new(Self {
                height,
                queries: AtomicUsize::new(0),
            })
        }

        fn queries(&self) -> usize {
            self.queries.load(Ordering::SeqCst)
        }
    }

    impl ElevationSource for Uniform {
        fn height(&self, _x: i32, _y: i32) -> f64 {
            self.queries.fetch_add(1, Ordering::SeqCst);
            self.height
        }
    }

    fn fix(lat: f64, lng: f64, altitude: f64) -> ObserverFix {
        ObserverFix::new(GeoPoint::new(lat, lng), altitude)
    }

    #[test]
    fn test_unset_observer_is_not_ready() {
        let engine = VisibilityEngine::new(Uniform::new(0.0), VisibilityConfig::default());
        let target = Target::terrain(GeoPoint::new(36.0, 138.0), 2000.0);
        assert_eq!(engine.check_visibility(&target), Err(NotReady::ObserverUnset));
        assert_eq!(engine.check_all(&[target]), Err(NotReady::ObserverUnset));
        assert_eq!(engine.observer(), None);
    }

    #[test]
    fn test_update_replaces_whole_state() {
        let engine = VisibilityEngine::new(Uniform::new(0.0), VisibilityConfig::default());
        engine.update_observer(fix(35.0, 138.0, 0.0));
        let first = engine.snapshot().unwrap();
        engine.update_observer(fix(36.0, 139.0, 1000.0));
        let second = engine.snapshot().unwrap();

        assert_eq!(first.horizon().distance(), 0.0);
        assert!(second.horizon().distance() > 100_000.0);
        assert_eq!(second.fix(), fix(36.0, 139.0, 1000.0));
        assert_eq!(second.grid(), coordinate(GeoPoint::new(36.0, 139.0)));
        // The old snapshot is untouched
        assert_eq!(first.fix(), fix(35.0, 138.0, 0.0));
    }

    #[test]
    fn test_negative_altitude_is_sea_level() {
        let state = ObserverState::new(fix(35.0, 138.0, -40.0));
        assert_eq!(state.horizon().altitude(), 0.0);
        assert_eq!(state.horizon().slope(), 0.0);
    }

    #[test]
    fn test_update_if_moved() {
        let engine = VisibilityEngine::new(Uniform::new(0.0), VisibilityConfig::default());
        assert!(engine.update_observer_if_moved(fix(35.0, 138.0, 10.0)));
        // ~55 m north
        assert!(!engine.update_observer_if_moved(fix(35.0005, 138.0, 10.0)));
        assert_eq!(engine.observer().unwrap().position.lat, 35.0);
        // ~222 m north
        assert!(engine.update_observer_if_moved(fix(35.002, 138.0, 10.0)));
        assert_eq!(engine.observer().unwrap().position.lat, 35.002);
    }

    #[test]
    fn test_first_occluding_sample_stops_the_walk() {
        let terrain = Uniform::new(5000.0);
        let engine = VisibilityEngine::new(Arc::clone(&terrain), VisibilityConfig::default());
        engine.update_observer(fix(35.0, 138.0, 0.0));

        let target = Target::terrain(GeoPoint::new(35.45, 138.0), 3000.0);
        let sighting = engine.check_visibility(&target).unwrap();

        assert!(matches!(sighting.occlusion(), Some(Occlusion::Terrain { .. })));
        assert_eq!(terrain.queries(), 1);
    }

    #[test]
    fn test_flat_terrain_walks_whole_path() {
        let terrain = Uniform::new(0.0);
        let engine = VisibilityEngine::new(Arc::clone(&terrain), VisibilityConfig::default());
        engine.update_observer(fix(35.0, 138.0, 0.0));

        let target = Target::terrain(GeoPoint::new(35.45, 138.0), 3000.0);
        let sighting = engine.check_visibility(&target).unwrap();

        assert!(sighting.is_visible());
        // 0.45° of latitude is 405 grid rows; margins drop about 4%
        assert!(terrain.queries() > 380, "queries = {}", terrain.queries());
        assert!(terrain.queries() < 405);
    }

    #[test]
    fn test_min_elevation_angle_tuning() {
        let engine = VisibilityEngine::new(Uniform::new(0.0), VisibilityConfig::default());
        engine.set_min_elevation_angle(0.004);
        assert_eq!(engine.config().min_elevation_angle, 0.004);
        engine.set_min_elevation_angle(-1.0);
        assert_eq!(engine.config().min_elevation_angle, 0.0);
        engine.set_min_elevation_angle(f64::NAN);
        assert_eq!(engine.config().min_elevation_angle, 0.0);
    }

    #[test]
    fn test_angle_change_applies_to_next_check() {
        let engine = VisibilityEngine::new(Uniform::new(0.0), VisibilityConfig::default());
        engine.update_observer(fix(35.0, 138.0, 0.0));
        // ~50 km north, 300 m high: minH ≈ 170 + 50 = 220 m at the default angle
        let target = Target::terrain(GeoPoint::new(35.45, 138.0), 300.0);
        assert!(engine.check_visibility(&target).unwrap().is_visible());

        engine.set_min_elevation_angle(0.01);
        let sighting = engine.check_visibility(&target).unwrap();
        assert!(matches!(sighting.occlusion(), Some(Occlusion::BelowHorizon { .. })));
    }
}
