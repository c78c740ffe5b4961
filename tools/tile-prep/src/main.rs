//! tile-prep: elevation tile preparation and visibility probe tool.
//!
//! Usage:
//!   tile-prep downsample --input dem.bin --width 9000 --height 6000 --factor 10 \
//!       --output 5338_MAX_10.bin
//!   tile-prep synthetic --code 5338 --output tiles/ --seed 7
//!   tile-prep probe --tiles tiles/ --observer 35.36,138.50,1200 --target 35.3606,138.7274,3776

use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use skyline_core::constants::{HEIGHT_SCALE, TILE_HEIGHT, TILE_LEN, TILE_WIDTH};
use skyline_core::{GeoPoint, ObserverFix, Target, TargetCategory, VisibilityConfig};
use skyline_terrain::downsample::{aggregate, to_tile_value, Aggregation};
use skyline_terrain::tile::write_tile;
use skyline_terrain::{DirectorySource, ElevationGrid, TileCode};
use skyline_visibility::VisibilityEngine;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    match args[1].as_str() {
        "downsample" => cmd_downsample(&args[2..]),
        "synthetic" => cmd_synthetic(&args[2..]),
        "probe" => cmd_probe(&args[2..]),
        "help" | "--help" | "-h" => print_usage(),
        other => {
            eprintln!("Unknown command: {other}");
            print_usage();
            process::exit(1);
        }
    }
}

fn print_usage() {
    eprintln!(
        "tile-prep: skyline elevation tile tool\n\
         \n\
         Commands:\n\
         \n\
         downsample  Aggregate a raw DEM raster into a grid tile\n\
         \n\
           --input <path>     Raw little-endian i16 raster (decimeters)\n\
           --width <N>        Raster width in samples\n\
           --height <N>       Raster height in samples\n\
           --factor <N>       Samples per output cell in each direction (default: 10)\n\
           --method <M>       MAX, AVG, MAXAVG or NTH<n> (default: MAX)\n\
           --output <path>    Output tile path\n\
         \n\
         synthetic   Generate a tile of random conical peaks\n\
         \n\
           --code <code>      Tile code (default: 5338)\n\
           --output <dir>     Output directory (default: .)\n\
           --seed <N>         Random seed (default: 0)\n\
           --peaks <N>        Number of peaks (default: 12)\n\
         \n\
         probe       Check the visibility of one target and print the result as JSON\n\
         \n\
           --tiles <dir>               Tile directory\n\
           --observer <lat,lon,alt>    Observer position and altitude (m)\n\
           --target <lat,lon,height>   Target position and height (m)\n\
           --category <c>              terrain, settlement or marker (default: terrain)\n\
           --config <path>             Visibility config JSON (optional)\n\
         \n\
         Examples:\n\
         \n\
           tile-prep synthetic --code 5338 --output tiles --seed 7\n\
           tile-prep probe --tiles tiles --observer 35.2,138.6,0 --target 35.36,138.73,3776\n"
    );
}

fn parse_flag<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    for i in 0..args.len() {
        if args[i] == name && i + 1 < args.len() {
            return Some(&args[i + 1]);
        }
    }
    None
}

fn parse_number<T: std::str::FromStr>(args: &[String], name: &str, default: T) -> T {
    match parse_flag(args, name) {
        Some(value) => match value.parse() {
            Ok(n) => n,
            Err(_) => {
                eprintln!("Error: invalid value for {name}: {value}");
                process::exit(1);
            }
        },
        None => default,
    }
}

/// Parse a `lat,lon,meters` triple.
fn parse_triple(args: &[String], name: &str) -> Option<(f64, f64, f64)> {
    let parts: Vec<&str> = parse_flag(args, name)?.split(',').collect();
    if parts.len() != 3 {
        return None;
    }
    let lat: f64 = parts[0].trim().parse().ok()?;
    let lon: f64 = parts[1].trim().parse().ok()?;
    let meters: f64 = parts[2].trim().parse().ok()?;
    Some((lat, lon, meters))
}

fn required_path(args: &[String], name: &str) -> PathBuf {
    match parse_flag(args, name) {
        Some(p) => PathBuf::from(p),
        None => {
            eprintln!("Error: {name} <path> is required");
            process::exit(1);
        }
    }
}

// --- Downsample command ---

fn cmd_downsample(args: &[String]) {
    let input = required_path(args, "--input");
    let output = required_path(args, "--output");
    let width: usize = parse_number(args, "--width", 0);
    let height: usize = parse_number(args, "--height", 0);
    let factor: usize = parse_number(args, "--factor", 10);
    let method: Aggregation = parse_number(args, "--method", Aggregation::Max);

    if width == 0 || height == 0 {
        eprintln!("Error: --width and --height are required");
        process::exit(1);
    }

    let samples = match read_raster(&input, width * height) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading {}: {e}", input.display());
            process::exit(1);
        }
    };

    info!(width, height, factor, %method, "aggregating raster");
    let values = aggregate(&samples, width, height, factor, method);
    let max = values.iter().copied().max().unwrap_or(0);
    info!(
        cells = values.len(),
        max_elevation = f64::from(max) / HEIGHT_SCALE,
        "aggregated"
    );

    match write_tile(&values, &output) {
        Ok(()) => eprintln!("Done! Output: {}", output.display()),
        Err(e) => {
            eprintln!("Error writing tile: {e}");
            process::exit(1);
        }
    }
}

fn read_raster(path: &Path, count: usize) -> std::io::Result<Vec<i16>> {
    let data = std::fs::read(path)?;
    if data.len() != count * 2 {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("expected {} bytes, found {}", count * 2, data.len()),
        ));
    }
    Ok(data
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect())
}

// --- Synthetic tile command ---

fn cmd_synthetic(args: &[String]) {
    let raw_code: u16 = parse_number(args, "--code", 5338);
    let code = match TileCode::new(raw_code) {
        Some(code) => code,
        None => {
            eprintln!("Error: tile code {raw_code} is outside the grid");
            process::exit(1);
        }
    };
    let dir = parse_flag(args, "--output")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    let seed: u64 = parse_number(args, "--seed", 0);
    let peaks: usize = parse_number(args, "--peaks", 12);

    let values = generate_synthetic_tile(seed, peaks);
    let max = values.iter().copied().max().unwrap_or(0);
    info!(
        %code,
        seed,
        peaks,
        max_elevation = f64::from(max) / HEIGHT_SCALE,
        "generated synthetic tile"
    );

    let output = dir.join(code.file_name());
    match write_tile(&values, &output) {
        Ok(()) => eprintln!("Done! Output: {}", output.display()),
        Err(e) => {
            eprintln!("Error writing tile: {e}");
            process::exit(1);
        }
    }
}

/// Conical peaks scattered over one tile, scaled to tile values.
fn generate_synthetic_tile(seed: u64, peaks: usize) -> Vec<i16> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let cones: Vec<(f64, f64, f64, f64)> = (0..peaks)
        .map(|_| {
            let cx = rng.gen_range(0.0..TILE_WIDTH as f64);
            let cy = rng.gen_range(0.0..TILE_HEIGHT as f64);
            let peak = rng.gen_range(500.0..3500.0);
            let radius = rng.gen_range(20.0..150.0);
            (cx, cy, peak, radius)
        })
        .collect();

    let mut values = Vec::with_capacity(TILE_LEN);
    for y in 0..TILE_HEIGHT {
        for x in 0..TILE_WIDTH {
            let elevation = cones
                .iter()
                .map(|&(cx, cy, peak, radius)| {
                    let dist = ((x as f64 - cx).powi(2) + (y as f64 - cy).powi(2)).sqrt();
                    peak * (1.0 - dist / radius).max(0.0)
                })
                .fold(0.0, f64::max);
            values.push(to_tile_value(elevation, HEIGHT_SCALE));
        }
    }
    values
}

// --- Probe command ---

fn cmd_probe(args: &[String]) {
    let tiles = required_path(args, "--tiles");
    let (obs_lat, obs_lon, altitude) = match parse_triple(args, "--observer") {
        Some(t) => t,
        None => {
            eprintln!("Error: --observer <lat,lon,alt> is required");
            process::exit(1);
        }
    };
    let (lat, lon, height) = match parse_triple(args, "--target") {
        Some(t) => t,
        None => {
            eprintln!("Error: --target <lat,lon,height> is required");
            process::exit(1);
        }
    };
    let category = match parse_flag(args, "--category").unwrap_or("terrain") {
        "terrain" => TargetCategory::Terrain,
        "settlement" => TargetCategory::Settlement,
        "marker" => TargetCategory::UserMarker,
        other => {
            eprintln!("Error: unknown category: {other}");
            process::exit(1);
        }
    };
    let config = match parse_flag(args, "--config") {
        Some(path) => match VisibilityConfig::load(Path::new(path)) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config: {e}");
                process::exit(1);
            }
        },
        None => VisibilityConfig::default(),
    };

    let grid = Arc::new(ElevationGrid::new(DirectorySource::new(tiles)));
    let engine = VisibilityEngine::new(grid, config);
    engine.update_observer(ObserverFix::new(GeoPoint::new(obs_lat, obs_lon), altitude));

    let target = Target::new(GeoPoint::new(lat, lon), height, category);
    let sighting = match engine.check_visibility(&target) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };
    info!(tiles_loaded = engine.terrain().cached_tiles(), "probe complete");

    match serde_json::to_string_pretty(&sighting) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("Error encoding result: {e}");
            process::exit(1);
        }
    }
}
