//! Aggregation of a fine elevation raster into grid cells.
//!
//! Source rasters (e.g. a 10 m DEM) are reduced by `factor` in each
//! direction; each output cell summarises a `factor × factor` block.
//! Visibility cares about the highest point in a cell, so `Max` is the
//! method used for the shipped tiles.

use std::fmt;
use std::str::FromStr;

/// How a block of source samples becomes one cell value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregation {
    /// Highest sample.
    Max,
    /// Rounded mean.
    Average,
    /// The n-th highest sample (0 = highest).
    Nth(usize),
    /// Rounded mean of the highest sample and the average.
    MaxAverage,
}

impl FromStr for Aggregation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "MAX" => Ok(Self::Max),
            "AVG" => Ok(Self::Average),
            "MAXAVG" => Ok(Self::MaxAverage),
            other => match other.strip_prefix("NTH") {
                Some(n) => n
                    .parse()
                    .map(Self::Nth)
                    .map_err(|_| format!("invalid NTH rank: {s}")),
                None => Err(format!("unknown aggregation method: {s}")),
            },
        }
    }
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Max => write!(f, "MAX"),
            Self::Average => write!(f, "AVG"),
            Self::Nth(n) => write!(f, "NTH{n}"),
            Self::MaxAverage => write!(f, "MAXAVG"),
        }
    }
}

impl Aggregation {
    /// Reduce one block. Sorts `block` in place for the rank-based methods.
    fn reduce(self, block: &mut [i16]) -> i16 {
        if block.is_empty() {
            return 0;
        }
        let sum: i64 = block.iter().map(|&v| i64::from(v)).sum();
        let avg = (sum as f64 / block.len() as f64).round() as i64;
        let max = i64::from(block.iter().copied().max().unwrap_or(0));
        let value = match self {
            Self::Max => max,
            Self::Average => avg,
            Self::MaxAverage => ((avg + max) as f64 / 2.0).round() as i64,
            Self::Nth(n) => {
                block.sort_unstable_by(|a, b| b.cmp(a));
                i64::from(block[n.min(block.len() - 1)])
            }
        };
        value.clamp(0, i64::from(i16::MAX)) as i16
    }
}

/// Aggregate a row-major raster of `width × height` samples into
/// `(width / factor) × (height / factor)` cells. Negative samples (sea,
/// no-data) count as zero. Trailing rows/columns that do not fill a whole
/// block are dropped.
pub fn aggregate(
    samples: &[i16],
    width: usize,
    height: usize,
    factor: usize,
    method: Aggregation,
) -> Vec<i16> {
    let factor = factor.max(1);
    let out_w = width / factor;
    let out_h = height / factor;
    let mut result = Vec::with_capacity(out_w * out_h);
    let mut block = Vec::with_capacity(factor * factor);

    for oy in 0..out_h {
        for ox in 0..out_w {
            block.clear();
            for sy in oy * factor..(oy + 1) * factor {
                let row = sy * width;
                for sx in ox * factor..(ox + 1) * factor {
                    let v = samples.get(row + sx).copied().unwrap_or(0);
                    block.push(v.max(0));
                }
            }
            result.push(method.reduce(&mut block));
        }
    }

    result
}

/// Convert meters to the scaled tile representation, saturating at the
/// i16 range.
pub fn to_tile_value(meters: f64, scale: f64) -> i16 {
    (meters * scale)
        .round()
        .clamp(f64::from(i16::MIN), f64::from(i16::MAX)) as i16
}
