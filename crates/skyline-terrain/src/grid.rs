//! ElevationGrid: tiled elevation raster with lazy, cached tile loading.

use std::collections::HashMap;
use std::io;
use std::sync::{Arc, OnceLock, PoisonError, RwLock, RwLockReadGuard};

use skyline_core::constants::{
    GRID_HEIGHT, GRID_WIDTH, HEIGHT_SCALE, TILE_HEIGHT, TILE_LEN, TILE_WIDTH,
};
use skyline_core::GeoPoint;
use tracing::{debug, warn};

use crate::preload::{Preload, PreloadReport, Readiness};
use crate::projection::{coordinate, TileCode};
use crate::source::TileSource;

/// Point elevation queries on integer grid coordinates.
///
/// This is the seam between the visibility engine and the raster, so the
/// engine can be driven by instrumented sources in tests.
pub trait ElevationSource: Send + Sync {
    /// Elevation of cell (x, y) in meters. Zero outside the covered region.
    fn height(&self, x: i32, y: i32) -> f64;

    /// False while background loading is outstanding.
    fn is_ready(&self) -> bool {
        true
    }
}

/// Cache entry for one tile, filled exactly once.
type Slot = Arc<OnceLock<Arc<[i16]>>>;

/// Outcome of fetching one tile from its source.
enum Fetched {
    Loaded(Arc<[i16]>),
    Degraded(Arc<[i16]>),
}

/// The elevation raster over the covered region.
///
/// Tiles are read from the [`TileSource`] on first access and kept for the
/// grid's lifetime. A tile that cannot be read is cached as all zeros, so
/// it is never retried and queries over it return sea level. A tile being
/// read only holds up callers of that same tile.
pub struct ElevationGrid {
    source: Box<dyn TileSource>,
    tiles: RwLock<HashMap<TileCode, Slot>>,
    readiness: Readiness,
}

impl ElevationGrid {
    pub fn new(source: impl TileSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            tiles: RwLock::new(HashMap::new()),
            readiness: Readiness::default(),
        }
    }

    /// Elevation of cell (x, y) in meters.
    pub fn height(&self, x: i32, y: i32) -> f64 {
        if x < 0 || y < 0 || x >= GRID_WIDTH || y >= GRID_HEIGHT {
            return 0.0;
        }
        let Some(code) = TileCode::of_cell(x, y) else {
            return 0.0;
        };
        let tile = self.tile(code);
        let dx = x % TILE_WIDTH;
        let dy = y % TILE_HEIGHT;
        f64::from(tile[(dy * TILE_WIDTH + dx) as usize]) / HEIGHT_SCALE
    }

    /// Elevation of the cell containing a geographic point.
    pub fn elevation_at(&self, point: GeoPoint) -> f64 {
        let c = coordinate(point).round();
        self.height(c.x as i32, c.y as i32)
    }

    /// Shared readiness signal for background preloads.
    pub fn readiness(&self) -> &Readiness {
        &self.readiness
    }

    /// Number of tiles in the cache.
    pub fn cached_tiles(&self) -> usize {
        self.read_cache()
            .values()
            .filter(|slot| slot.get().is_some())
            .count()
    }

    pub fn is_cached(&self, code: TileCode) -> bool {
        self.read_cache()
            .get(&code)
            .is_some_and(|slot| slot.get().is_some())
    }

    /// Start loading `codes` on a background thread. The grid reports
    /// not-ready until the load completes.
    pub fn preload(self: &Arc<Self>, codes: Vec<TileCode>) -> io::Result<Preload> {
        Preload::spawn(Arc::clone(self), codes)
    }

    /// Load `codes` into the cache on the calling thread.
    pub fn load_tiles(&self, codes: &[TileCode]) -> PreloadReport {
        let mut report = PreloadReport::default();
        for &code in codes {
            let slot = self.slot(code);
            let mut fetched = None;
            slot.get_or_init(|| {
                let (tile, loaded) = match self.fetch(code) {
                    Fetched::Loaded(tile) => (tile, true),
                    Fetched::Degraded(tile) => (tile, false),
                };
                fetched = Some(loaded);
                tile
            });
            match fetched {
                Some(true) => report.loaded += 1,
                Some(false) => report.degraded += 1,
                None => report.cached += 1,
            }
        }
        report
    }

    /// The cached tile, loading it first if absent. Concurrent callers for
    /// the same tile wait on its slot, so each tile is read once.
    fn tile(&self, code: TileCode) -> Arc<[i16]> {
        let slot = self.slot(code);
        let tile = slot.get_or_init(|| match self.fetch(code) {
            Fetched::Loaded(tile) | Fetched::Degraded(tile) => tile,
        });
        Arc::clone(tile)
    }

    /// The slot for `code`, creating an empty one if needed. The map lock
    /// is only held for the lookup, never across a tile read.
    fn slot(&self, code: TileCode) -> Slot {
        if let Some(slot) = self.read_cache().get(&code) {
            return Arc::clone(slot);
        }
        let mut tiles = self.tiles.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(tiles.entry(code).or_default())
    }

    fn fetch(&self, code: TileCode) -> Fetched {
        match self.source.load(code) {
            Ok(values) if values.len() == TILE_LEN => {
                debug!(tile = %code, "loaded elevation tile");
                Fetched::Loaded(Arc::from(values))
            }
            Ok(values) => {
                warn!(
                    tile = %code,
                    len = values.len(),
                    expected = TILE_LEN,
                    "elevation tile has wrong length, treating as sea level"
                );
                Fetched::Degraded(zero_tile())
            }
            Err(e) => {
                warn!(
                    tile = %code,
                    error = %e,
                    "failed to load elevation tile, treating as sea level"
                );
                Fetched::Degraded(zero_tile())
            }
        }
    }

    // Slots are never removed or replaced, so a poisoned lock still guards
    // consistent data.
    fn read_cache(&self) -> RwLockReadGuard<'_, HashMap<TileCode, Slot>> {
        self.tiles.read().unwrap_or_else(PoisonError::into_inner)
    }
}

fn zero_tile() -> Arc<[i16]> {
    Arc::from(vec![0i16; TILE_LEN])
}

impl ElevationSource for ElevationGrid {
    fn height(&self, x: i32, y: i32) -> f64 {
        ElevationGrid::height(self, x, y)
    }

    fn is_ready(&self) -> bool {
        self.readiness.is_ready()
    }
}
