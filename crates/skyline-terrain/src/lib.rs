//! Elevation grid for skyline.
//!
//! Grid projection, tile codes and file format, lazy tile cache,
//! background preloading and DEM aggregation.

pub use skyline_core as core;

pub mod downsample;
pub mod grid;
pub mod preload;
pub mod projection;
pub mod source;
pub mod tile;

// Re-export key types for convenience.
pub use grid::{ElevationGrid, ElevationSource};
pub use preload::{Preload, PreloadReport, Readiness};
pub use projection::{cell_center, coordinate, tiles_around, TileCode};
pub use source::{DirectorySource, MemorySource, TileSource};
pub use tile::TileError;
