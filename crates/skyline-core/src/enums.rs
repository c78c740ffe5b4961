//! Enumeration types used throughout the visibility model.

use serde::{Deserialize, Serialize};

/// What kind of landmark a target is. Decides which tests apply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetCategory {
    /// Peaks, towers and other features tested against curvature and terrain.
    #[default]
    Terrain,
    /// Cities and towns, seen as a glow up to a fixed distance.
    Settlement,
    /// Markers placed by the user. Always visible.
    UserMarker,
}

/// Why a target is hidden.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Occlusion {
    /// Outside the usable distance band (or beyond the settlement cutoff).
    OutOfRange,
    /// Below the refracted horizon; `min_height` is the lowest visible height
    /// at that distance.
    BelowHorizon { min_height: f64 },
    /// Blocked by a grid cell at `fraction` of the way to the target.
    Terrain {
        fraction: f64,
        elevation: f64,
        threshold: f64,
    },
}

/// Verdict of a visibility check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Visibility {
    Visible,
    Occluded(Occlusion),
}
