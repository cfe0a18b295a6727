//! CLI tool to probe the pixel/geodetic transform.
//!
//! Prints the pixel coordinates of reference geodetic points at each
//! supported resolution, and can time a sub-window lookup precompute.
//!
//! Usage:
//!   cargo run --release --bin coord-probe -- --point 39,124 --point 33,132
//!
//! With no points given, the four corners of the regional coverage are
//! probed (the classic LT/LB/RT/RB check).

use std::time::Instant;

use anyhow::{bail, Context, Result};
use geocoder::{CoordinateLookup, GeoCoordinate, PixelGeolocator, Resolution};

struct Args {
    points: Vec<(String, GeoCoordinate)>,
    resolutions: Vec<Resolution>,
    precompute: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = parse_args()?;

    println!("Pixel/geodetic probe");
    println!("====================");

    for (name, point) in &args.points {
        println!("\n{} (lat {}, lon {}):", name, point.latitude, point.longitude);
        for &resolution in &args.resolutions {
            let locator = PixelGeolocator::gk2a(resolution)?;
            match locator.geo_to_pixel(*point) {
                Ok(pixel) => println!("  Resolution {}: x = {}, y = {}", resolution, pixel.x, pixel.y),
                Err(err) => println!("  Resolution {}: unresolvable ({})", resolution, err),
            }
        }
    }

    if args.precompute {
        println!();
        for &resolution in &args.resolutions {
            let locator = PixelGeolocator::gk2a(resolution)?;
            let window = locator.profile().window;
            let start = Instant::now();
            let lookup = CoordinateLookup::precompute(&locator);
            println!(
                "Precomputed {} entries for resolution {} ({}x{} window) in {:.2}s",
                lookup.len(),
                resolution,
                window.width(),
                window.height(),
                start.elapsed().as_secs_f64()
            );
        }
    }

    Ok(())
}

fn parse_args() -> Result<Args> {
    let argv: Vec<String> = std::env::args().collect();

    let mut points = Vec::new();
    let mut resolutions = Vec::new();
    let mut precompute = false;

    let mut i = 1;
    while i < argv.len() {
        match argv[i].as_str() {
            "--point" | "-p" => {
                i += 1;
                if i >= argv.len() {
                    bail!("--point requires a LAT,LON argument");
                }
                let point = parse_point(&argv[i])
                    .with_context(|| format!("invalid point: {}", argv[i]))?;
                points.push((format!("P{}", points.len() + 1), point));
            }
            "--resolution" | "-r" => {
                i += 1;
                if i >= argv.len() {
                    bail!("--resolution requires a comma-separated list");
                }
                for part in argv[i].split(',') {
                    resolutions.push(Resolution::parse(part)?);
                }
            }
            "--precompute" => {
                precompute = true;
            }
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            other => {
                eprintln!("Unknown argument: {other}");
                print_help();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    if points.is_empty() {
        // Corners of the regional coverage, clockwise from the northwest.
        points = vec![
            ("LT".to_string(), GeoCoordinate::new(39.0, 124.0)),
            ("RT".to_string(), GeoCoordinate::new(39.0, 132.0)),
            ("RB".to_string(), GeoCoordinate::new(33.0, 132.0)),
            ("LB".to_string(), GeoCoordinate::new(33.0, 124.0)),
        ];
    }
    if resolutions.is_empty() {
        resolutions = Resolution::ALL.to_vec();
    }

    Ok(Args {
        points,
        resolutions,
        precompute,
    })
}

fn parse_point(raw: &str) -> Result<GeoCoordinate> {
    let (lat, lon) = raw
        .split_once(',')
        .context("expected LAT,LON")?;
    Ok(GeoCoordinate::new(lat.trim().parse()?, lon.trim().parse()?))
}

fn print_help() {
    println!(
        r#"Pixel/geodetic probe

Resolves reference geodetic points to pixel coordinates at each supported
spatial resolution.

USAGE:
    coord-probe [OPTIONS]

OPTIONS:
    -p, --point <LAT,LON>      Probe point; may be repeated
                               [default: regional coverage corners]
    -r, --resolution <LIST>    Comma-separated resolutions [default: 0.5,1.0,2.0]
        --precompute           Also time a sub-window lookup precompute
    -h, --help                 Print this help message

EXAMPLES:
    # Probe the default corner points
    coord-probe

    # Probe Seoul at 2 km only and time the precompute
    coord-probe -p 37.5665,126.978 -r 2.0 --precompute
"#
    );
}
