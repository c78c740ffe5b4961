//! Terrain sample path between observer and target in grid space.
//!
//! The grid is equirectangular, so the straight grid line between two
//! points drifts off the great circle over long east-west spans. The path
//! is bowed towards the great-circle midpoint with a parabolic offset,
//! zero at both ends and full at r = 0.5.

use glam::{DVec2, IVec2};
use skyline_core::constants::{MAX_SAMPLES, MIN_SAMPLES, SAMPLE_MARGIN_HIGH, SAMPLE_MARGIN_LOW};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplePath {
    start: DVec2,
    delta: DVec2,
    bow: DVec2,
    steps: usize,
}

impl SamplePath {
    /// Path from `start` to `end`, bowed through `mid` (all in grid
    /// coordinates).
    pub fn new(start: DVec2, end: DVec2, mid: DVec2) -> Self {
        let delta = end - start;
        let bow = mid - (start + delta * 0.5);
        // The bow term's slope peaks at 4·bow at either end
        let cells = (delta.abs() + bow.abs() * 4.0).max_element().ceil();
        let steps = if cells.is_finite() {
            (cells as usize).clamp(MIN_SAMPLES, MAX_SAMPLES)
        } else {
            MIN_SAMPLES
        };
        Self {
            start,
            delta,
            bow,
            steps,
        }
    }

    /// Number of subdivisions of the path. Consecutive samples are at most
    /// one cell apart along either axis.
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Offset of the midpoint from the straight grid line.
    pub fn bow(&self) -> DVec2 {
        self.bow
    }

    /// Grid position at fraction `r` of the way along the path.
    pub fn point(&self, r: f64) -> DVec2 {
        self.start + self.delta * r + self.bow * (4.0 * r * (1.0 - r))
    }

    /// Sample fractions strictly inside the edge margins with the grid cell
    /// at each, ordered from the observer outwards.
    pub fn samples(&self) -> impl Iterator<Item = (f64, IVec2)> + '_ {
        let steps = self.steps as f64;
        (1..self.steps)
            .map(move |i| i as f64 / steps)
            .filter(|&r| r > SAMPLE_MARGIN_LOW && r < 1.0 - SAMPLE_MARGIN_HIGH)
            .map(move |r| (r, self.point(r).round().as_ivec2()))
    }
}
