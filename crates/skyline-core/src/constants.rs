//! Model constants and tuning parameters.

// --- Earth model ---

/// Earth radius used for great-circle distances (meters).
pub const EARTH_RADIUS: f64 = 6_378_137.0;

/// Terrestrial refraction coefficient.
pub const REFRACTION_COEFFICIENT: f64 = 0.135;

/// Earth radius seen by a refracted sight line (meters).
pub const EFFECTIVE_EARTH_RADIUS: f64 = EARTH_RADIUS / (1.0 - REFRACTION_COEFFICIENT);

// --- Elevation grid layout ---

/// Cells per primary tile, west to east.
pub const TILE_WIDTH: i32 = 900;

/// Cells per primary tile, south to north.
pub const TILE_HEIGHT: i32 = 600;

/// Cells per primary tile.
pub const TILE_LEN: usize = (TILE_WIDTH * TILE_HEIGHT) as usize;

/// Longitude component of the south-west tile code (4629).
pub const ORIGIN_TILE_X: i32 = 29;

/// Latitude component of the south-west tile code (4629).
pub const ORIGIN_TILE_Y: i32 = 46;

/// Longitude component of the north-east tile code (6845).
pub const LAST_TILE_X: i32 = 45;

/// Latitude component of the north-east tile code (6845).
pub const LAST_TILE_Y: i32 = 68;

/// Primary tiles west to east.
pub const TILES_X: i32 = LAST_TILE_X - ORIGIN_TILE_X + 1;

/// Primary tiles south to north.
pub const TILES_Y: i32 = LAST_TILE_Y - ORIGIN_TILE_Y + 1;

/// Grid cells west to east.
pub const GRID_WIDTH: i32 = TILES_X * TILE_WIDTH;

/// Grid cells south to north.
pub const GRID_HEIGHT: i32 = TILES_Y * TILE_HEIGHT;

/// Cell width in degrees of longitude. A primary tile spans 1°.
pub const X_PITCH: f64 = 1.0 / TILE_WIDTH as f64;

/// Cell height in degrees of latitude. A primary tile spans 40'.
pub const Y_PITCH: f64 = 1.0 / 1.5 / TILE_HEIGHT as f64;

/// Longitude of the centre of cell (0, 0).
pub const ORIGIN_LNG: f64 = 100.0 + ORIGIN_TILE_X as f64 + X_PITCH * 0.5;

/// Latitude of the centre of cell (0, 0).
pub const ORIGIN_LAT: f64 = ORIGIN_TILE_Y as f64 / 1.5 + Y_PITCH * 0.5;

/// Stored tile values are elevation in meters times this factor.
pub const HEIGHT_SCALE: f64 = 10.0;

// --- Visibility defaults ---

/// Minimum apparent elevation slope of a visible target.
pub const DEFAULT_MIN_ELEVATION_ANGLE: f64 = 0.001;

/// Targets closer than this are not reported (meters).
pub const DEFAULT_MIN_DISTANCE: f64 = 100.0;

/// Targets further than this are not reported (meters).
pub const DEFAULT_MAX_DISTANCE: f64 = 400_000.0;

/// Settlements are visible up to this distance (meters).
pub const DEFAULT_CITY_MAX_DISTANCE: f64 = 100_000.0;

/// Smallest observer movement that triggers a recomputation (meters).
pub const DEFAULT_MOVEMENT_THRESHOLD: f64 = 100.0;

// --- Terrain sampling ---

/// Fraction of the path next to the observer that is never sampled.
pub const SAMPLE_MARGIN_LOW: f64 = 0.02;

/// Fraction of the path next to the target that is never sampled.
pub const SAMPLE_MARGIN_HIGH: f64 = 0.02;

/// Lower bound on path subdivisions.
pub const MIN_SAMPLES: usize = 8;

/// Upper bound on path subdivisions.
pub const MAX_SAMPLES: usize = 8_192;
