//! Pixel Grid to Geodetic Coordinate Resolution
//!
//! This crate turns tables of satellite image pixel indices into tables of
//! latitude/longitude, the compute core of the regional product ground
//! pipeline. It covers:
//!
//! - **Resolution profiles**: fixed grid geometry per supported spatial
//!   resolution (0.5 / 1.0 / 2.0 km), one closed registry
//! - **Geolocation**: linear pixel/plane maps composed with an ellipsoidal
//!   Lambert Conformal Conic projection
//! - **Memoization**: a run-scoped coordinate cache so identical pixel keys
//!   are projected once across millions of rows
//! - **Batch application**: streaming row transform with block replication
//!   for repeating-grid tables
//!
//! # Architecture
//!
//! ```text
//! input table (x, y, ...payload)
//!      │
//!      ▼
//! Geocoder::apply(table)
//!      │
//!      ├─► validate pixel columns (fatal SchemaMismatch before output)
//!      │
//!      ├─► quantize keys, apply offset anchor
//!      │
//!      ├─► per key: CoordinateLookup join, or CoordinateCache
//!      │         │
//!      │         ├─► cache hit: stored coordinate
//!      │         │
//!      │         └─► cache miss: PixelGeolocator -> LambertConformal
//!      │
//!      └─► replicate block 0 across repeating blocks
//!               │
//!               ▼
//!   output table (...payload, latitude, longitude)
//! ```
//!
//! File reading and writing stay outside this crate: callers hand in a
//! [`Table`] and persist the one they get back.

pub mod apply;
pub mod cache;
pub mod config;
pub mod coordinate;
pub mod error;
pub mod geolocate;
pub mod lookup;
pub mod profile;
pub mod table;
pub mod testdata;

// Re-export commonly used types at crate root
pub use apply::{BatchSummary, GeocodeReport, GeocodeStream, Geocoder, ResolvedRow};
pub use cache::{CacheStats, CoordinateCache};
pub use config::GeocodeConfig;
pub use coordinate::{GeoCoordinate, PixelCoordinate};
pub use error::{GeocodeError, Result};
pub use geolocate::PixelGeolocator;
pub use lookup::CoordinateLookup;
pub use profile::{Resolution, ResolutionProfile, SubWindow};
pub use table::{Column, ColumnData, Table};
