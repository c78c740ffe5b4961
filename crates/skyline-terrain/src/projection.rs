//! Grid projection: converts between lat/lon and elevation grid coordinates.
//!
//! The grid is equirectangular. Cell (0, 0) is centred on
//! (`ORIGIN_LAT`, `ORIGIN_LNG`), x grows east and y grows north, one cell
//! per `X_PITCH` / `Y_PITCH` degrees. The transform has no parameters: every
//! caller in the process sees the same mapping.

use std::fmt;
use std::str::FromStr;

use glam::DVec2;
use skyline_core::constants::{
    EARTH_RADIUS, LAST_TILE_X, LAST_TILE_Y, ORIGIN_LAT, ORIGIN_LNG, ORIGIN_TILE_X, ORIGIN_TILE_Y,
    TILES_X, TILES_Y, TILE_HEIGHT, TILE_WIDTH, X_PITCH, Y_PITCH,
};
use skyline_core::GeoPoint;

/// Real-valued grid coordinate of a geographic point.
pub fn coordinate(of: GeoPoint) -> DVec2 {
    DVec2::new(
        (of.lng - ORIGIN_LNG) / X_PITCH,
        (of.lat - ORIGIN_LAT) / Y_PITCH,
    )
}

/// Geographic centre of grid cell (x, y).
pub fn cell_center(x: i32, y: i32) -> GeoPoint {
    GeoPoint::new(
        ORIGIN_LAT + y as f64 * Y_PITCH,
        ORIGIN_LNG + x as f64 * X_PITCH,
    )
}

/// Four-digit code of a primary tile: latitude band times 1.5 followed by
/// longitude minus 100, e.g. `5339` covers 35°20'–36°00'N, 139–140°E.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileCode(u16);

impl TileCode {
    /// Code of the tile at tile indices (tx, ty) counted from the grid origin.
    /// Returns None outside the covered region.
    pub fn from_tile_index(tx: i32, ty: i32) -> Option<Self> {
        if tx < 0 || ty < 0 || tx >= TILES_X || ty >= TILES_Y {
            return None;
        }
        let code = (ty + ORIGIN_TILE_Y) * 100 + (tx + ORIGIN_TILE_X);
        Some(Self(code as u16))
    }

    /// Code of the tile owning grid cell (x, y).
    pub fn of_cell(x: i32, y: i32) -> Option<Self> {
        if x < 0 || y < 0 {
            return None;
        }
        Self::from_tile_index(x / TILE_WIDTH, y / TILE_HEIGHT)
    }

    /// Validate a raw code against the covered region.
    pub fn new(code: u16) -> Option<Self> {
        let cy = i32::from(code) / 100;
        let cx = i32::from(code) % 100;
        let inside = (ORIGIN_TILE_X..=LAST_TILE_X).contains(&cx)
            && (ORIGIN_TILE_Y..=LAST_TILE_Y).contains(&cy);
        inside.then_some(Self(code))
    }

    pub fn value(self) -> u16 {
        self.0
    }

    /// Tile indices (tx, ty) counted from the grid origin.
    pub fn tile_index(self) -> (i32, i32) {
        let code = i32::from(self.0);
        (code % 100 - ORIGIN_TILE_X, code / 100 - ORIGIN_TILE_Y)
    }

    /// Grid coordinate of this tile's south-west cell.
    pub fn first_cell(self) -> (i32, i32) {
        let (tx, ty) = self.tile_index();
        (tx * TILE_WIDTH, ty * TILE_HEIGHT)
    }

    /// Name of the tile's data file.
    pub fn file_name(self) -> String {
        format!("{}_MAX_10.bin", self.0)
    }

    /// Parse a data file name produced by [`TileCode::file_name`].
    pub fn from_file_name(name: &str) -> Option<Self> {
        let code = name.strip_suffix("_MAX_10.bin")?;
        code.parse().ok()
    }
}

impl fmt::Display for TileCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TileCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw: u16 = s
            .parse()
            .map_err(|_| format!("tile code is not a number: {s}"))?;
        Self::new(raw).ok_or_else(|| format!("tile code outside the covered region: {s}"))
    }
}

/// Covered tiles intersecting the lat/lon box that encloses a circle of
/// `radius` meters around `center`, in ascending code order.
pub fn tiles_around(center: GeoPoint, radius: f64) -> Vec<TileCode> {
    let dlat = (radius / EARTH_RADIUS).to_degrees();
    let cos_lat = center.lat.to_radians().cos().max(1e-6);
    let dlng = (dlat / cos_lat).min(180.0);

    let sw = coordinate(GeoPoint::new(center.lat - dlat, center.lng - dlng));
    let ne = coordinate(GeoPoint::new(center.lat + dlat, center.lng + dlng));

    let tx0 = ((sw.x.round() as i64).max(0) / TILE_WIDTH as i64) as i32;
    let ty0 = ((sw.y.round() as i64).max(0) / TILE_HEIGHT as i64) as i32;
    let tx1 = (ne.x.round() as i64).max(-1).div_euclid(TILE_WIDTH as i64) as i32;
    let ty1 = (ne.y.round() as i64).max(-1).div_euclid(TILE_HEIGHT as i64) as i32;
    let (tx1, ty1) = (tx1.min(TILES_X - 1), ty1.min(TILES_Y - 1));

    let mut codes = Vec::new();
    for ty in ty0..=ty1 {
        for tx in tx0..=tx1 {
            if let Some(code) = TileCode::from_tile_index(tx, ty) {
                codes.push(code);
            }
        }
    }
    codes
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use skyline_core::constants::{GRID_HEIGHT, GRID_WIDTH};

    #[test]
    fn test_cell_center_roundtrip() {
        for &(x, y) in &[(0, 0), (8400, 4250), (GRID_WIDTH - 1, GRID_HEIGHT - 1)] {
            let c = coordinate(cell_center(x, y));
            assert_abs_diff_eq!(c.x, x as f64, epsilon = 1e-6);
            assert_abs_diff_eq!(c.y, y as f64, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_origin_maps_to_zero() {
        let c = coordinate(GeoPoint::new(ORIGIN_LAT, ORIGIN_LNG));
        assert_abs_diff_eq!(c.x, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(c.y, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_projection_is_stable() {
        let p = GeoPoint::new(35.3606, 138.7274);
        assert_eq!(coordinate(p), coordinate(p));
    }

    #[test]
    fn test_tile_code_of_cell() {
        // Mt. Fuji sits in tile 5338
        let fuji = coordinate(GeoPoint::new(35.3606, 138.7274)).round();
        let code = TileCode::of_cell(fuji.x as i32, fuji.y as i32).unwrap();
        assert_eq!(code.value(), 5338);
        assert_eq!(code.tile_index(), (9, 7));
        assert_eq!(code.first_cell(), (8100, 4200));

        assert_eq!(TileCode::of_cell(0, 0).unwrap().value(), 4629);
        assert_eq!(
            TileCode::of_cell(GRID_WIDTH - 1, GRID_HEIGHT - 1).unwrap().value(),
            6845
        );
        assert_eq!(TileCode::of_cell(-1, 0), None);
        assert_eq!(TileCode::of_cell(GRID_WIDTH, 0), None);
    }

    #[test]
    fn test_tile_code_parse() {
        assert_eq!("5339".parse::<TileCode>().unwrap().value(), 5339);
        assert!("4628".parse::<TileCode>().is_err());
        assert!("6945".parse::<TileCode>().is_err());
        assert!("abcd".parse::<TileCode>().is_err());
    }

    #[test]
    fn test_tile_file_name() {
        let code = TileCode::new(5339).unwrap();
        assert_eq!(code.file_name(), "5339_MAX_10.bin");
        assert_eq!(TileCode::from_file_name("5339_MAX_10.bin"), Some(code));
        assert_eq!(TileCode::from_file_name("5339.bin"), None);
    }

    #[test]
    fn test_tiles_around_small_radius() {
        // Centre of tile 5338, 10 km radius stays inside it
        let (x0, y0) = TileCode::new(5338).unwrap().first_cell();
        let center = cell_center(x0 + 450, y0 + 300);
        let codes = tiles_around(center, 10_000.0);
        assert_eq!(codes, vec![TileCode::new(5338).unwrap()]);
    }

    #[test]
    fn test_tiles_around_spans_neighbours() {
        let (x0, y0) = TileCode::new(5338).unwrap().first_cell();
        let center = cell_center(x0 + 450, y0 + 300);
        let codes = tiles_around(center, 100_000.0);
        assert_eq!(codes.len(), 9);
        assert!(codes.contains(&TileCode::new(5237).unwrap()));
        assert!(codes.contains(&TileCode::new(5439).unwrap()));
    }

    #[test]
    fn test_tiles_around_outside_region() {
        assert!(tiles_around(GeoPoint::new(0.0, 0.0), 10_000.0).is_empty());
    }
}
