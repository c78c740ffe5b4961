//! Where tile data comes from.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use crate::projection::TileCode;
use crate::tile::{load_tile, TileError};

/// Supplies the raw values of a primary tile.
///
/// Implementations are called at most once per tile by
/// [`ElevationGrid`](crate::grid::ElevationGrid), possibly from a
/// background thread.
pub trait TileSource: Send + Sync {
    fn load(&self, code: TileCode) -> Result<Vec<i16>, TileError>;
}

/// Tiles stored as `{dir}/{code}_MAX_10.bin`.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    dir: PathBuf,
}

impl DirectorySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Full path of a tile's data file.
    pub fn path_of(&self, code: TileCode) -> PathBuf {
        self.dir.join(code.file_name())
    }

    /// Codes of every tile file present in the directory.
    pub fn available(&self) -> io::Result<Vec<TileCode>> {
        let mut codes = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let entry = entry?;
            if let Some(code) = entry.file_name().to_str().and_then(TileCode::from_file_name) {
                codes.push(code);
            }
        }
        codes.sort();
        Ok(codes)
    }
}

impl TileSource for DirectorySource {
    fn load(&self, code: TileCode) -> Result<Vec<i16>, TileError> {
        load_tile(&self.path_of(code))
    }
}

/// Tiles held in memory. Absent tiles report not-found.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    tiles: HashMap<TileCode, Vec<i16>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tile(mut self, code: TileCode, values: Vec<i16>) -> Self {
        self.insert(code, values);
        self
    }

    pub fn insert(&mut self, code: TileCode, values: Vec<i16>) {
        self.tiles.insert(code, values);
    }
}

impl TileSource for MemorySource {
    fn load(&self, code: TileCode) -> Result<Vec<i16>, TileError> {
        self.tiles.get(&code).cloned().ok_or_else(|| {
            TileError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no tile {code} in memory"),
            ))
        })
    }
}
