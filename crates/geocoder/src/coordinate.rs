//! Pixel and geodetic coordinate types.

use serde::{Deserialize, Serialize};

/// An integer pixel position in image space, after any offset anchoring.
///
/// Used as the exact-equality cache and lookup key, so pixel columns must be
/// quantized before a coordinate is built from them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelCoordinate {
    pub x: i64,
    pub y: i64,
}

impl PixelCoordinate {
    /// Create a pixel coordinate.
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Quantize a pair of raw pixel column values to an exact key.
    ///
    /// Pixel columns arrive as integers or floats that carry integer values;
    /// rounding keeps keys stable against float noise. Returns `None` for
    /// non-finite input.
    pub fn quantize(x: f64, y: f64) -> Option<Self> {
        if !x.is_finite() || !y.is_finite() {
            return None;
        }
        Some(Self {
            x: x.round() as i64,
            y: y.round() as i64,
        })
    }

    /// Shift by an offset anchor.
    pub fn offset_by(self, dx: i64, dy: i64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

impl std::fmt::Display for PixelCoordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A geodetic position in degrees on the WGS84 datum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoCoordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoCoordinate {
    /// Create a geodetic coordinate.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}
