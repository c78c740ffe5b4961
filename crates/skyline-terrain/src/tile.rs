//! Primary tile binary format.
//!
//! A tile file is a flat array of `TILE_WIDTH * TILE_HEIGHT` little-endian
//! i16 values, row-major with row 0 the southernmost latitude band. Each
//! value is the cell's elevation in meters times `HEIGHT_SCALE`.

use std::io;
use std::path::Path;

use skyline_core::constants::TILE_LEN;
use thiserror::Error;

/// Failure reading or decoding a tile.
#[derive(Debug, Error)]
pub enum TileError {
    #[error("tile I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("tile has {actual} bytes, expected {expected}")]
    Size { expected: usize, actual: usize },
}

/// Expected byte length of one tile file.
pub const TILE_BYTES: usize = TILE_LEN * 2;

/// Decode raw tile bytes.
pub fn parse_tile_bytes(data: &[u8]) -> Result<Vec<i16>, TileError> {
    if data.len() != TILE_BYTES {
        return Err(TileError::Size {
            expected: TILE_BYTES,
            actual: data.len(),
        });
    }
    Ok(data
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect())
}

/// Encode tile values to bytes.
pub fn serialize_tile(values: &[i16]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(values.len() * 2);
    for &v in values {
        buf.extend_from_slice(&v.to_le_bytes());
    }
    buf
}

/// Read and decode one tile file.
pub fn load_tile(path: &Path) -> Result<Vec<i16>, TileError> {
    let data = std::fs::read(path)?;
    parse_tile_bytes(&data)
}

/// Write one tile file. Fails if `values` is not exactly one tile.
pub fn write_tile(values: &[i16], path: &Path) -> Result<(), TileError> {
    if values.len() != TILE_LEN {
        return Err(TileError::Size {
            expected: TILE_BYTES,
            actual: values.len() * 2,
        });
    }
    std::fs::write(path, serialize_tile(values))?;
    Ok(())
}
