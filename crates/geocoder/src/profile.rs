//! Per-resolution grid geometry.
//!
//! Each supported spatial resolution of the regional product line has a
//! fixed pixel grid and a fixed bounding box on the projected plane. The
//! values are calibration constants from the ground segment and must match
//! exactly; nothing here is mutated at runtime.

use serde::{Deserialize, Serialize};

use crate::coordinate::PixelCoordinate;
use crate::error::{GeocodeError, Result};

/// Supported spatial resolutions, in kilometers per pixel.
///
/// The set is closed: a resolution outside it is an explicit
/// `UnsupportedResolution` error at parse time, never a silent fallthrough.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Resolution {
    /// 0.5 km per pixel (3600 x 3600 full grid).
    #[serde(rename = "0.5")]
    HalfKm,
    /// 1.0 km per pixel (1800 x 1800 full grid).
    #[serde(rename = "1.0")]
    OneKm,
    /// 2.0 km per pixel (900 x 900 full grid).
    #[serde(rename = "2.0")]
    TwoKm,
}

impl Resolution {
    /// All supported resolutions.
    pub const ALL: [Resolution; 3] = [Resolution::HalfKm, Resolution::OneKm, Resolution::TwoKm];

    /// Parse a resolution identifier such as "0.5" or "2.0".
    pub fn parse(identifier: &str) -> Result<Self> {
        let value: f64 = identifier
            .trim()
            .parse()
            .map_err(|_| GeocodeError::UnsupportedResolution(identifier.to_string()))?;
        Self::from_km(value)
            .ok_or_else(|| GeocodeError::UnsupportedResolution(identifier.to_string()))
    }

    /// Match a kilometers-per-pixel value against the supported set.
    pub fn from_km(km: f64) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|r| (r.km() - km).abs() < 1e-9)
    }

    /// Kilometers per pixel.
    pub fn km(self) -> f64 {
        match self {
            Resolution::HalfKm => 0.5,
            Resolution::OneKm => 1.0,
            Resolution::TwoKm => 2.0,
        }
    }

    /// Meters per pixel on the projected plane.
    pub fn meters_per_pixel(self) -> f64 {
        self.km() * 1000.0
    }

    /// The fixed geometry for this resolution.
    pub fn profile(self) -> &'static ResolutionProfile {
        match self {
            Resolution::HalfKm => &PROFILE_HALF_KM,
            Resolution::OneKm => &PROFILE_ONE_KM,
            Resolution::TwoKm => &PROFILE_TWO_KM,
        }
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Resolution::HalfKm => write!(f, "0.5"),
            Resolution::OneKm => write!(f, "1.0"),
            Resolution::TwoKm => write!(f, "2.0"),
        }
    }
}

/// The canonical sub-window of the full-disk grid that the regional
/// products actually cover. End bounds are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubWindow {
    pub x_start: u32,
    pub x_end: u32,
    pub y_start: u32,
    pub y_end: u32,
}

impl SubWindow {
    /// Width of the window in pixels.
    pub fn width(&self) -> u32 {
        self.x_end - self.x_start
    }

    /// Height of the window in pixels.
    pub fn height(&self) -> u32 {
        self.y_end - self.y_start
    }

    /// Number of pixels covered.
    pub fn pixel_count(&self) -> usize {
        self.width() as usize * self.height() as usize
    }
}

/// Fixed grid geometry for one spatial resolution.
///
/// Immutable calibration data: the pixel grid size, the projected-plane
/// bounding box it spans, the offset anchor that places a product
/// sub-window into the canonical grid, and the sub-window itself.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolutionProfile {
    /// The resolution this profile belongs to.
    pub resolution: Resolution,
    /// Full grid width in pixels.
    pub image_width: u32,
    /// Full grid height in pixels.
    pub image_height: u32,
    /// Western edge of the projected-plane bounding box (meters).
    pub x_min: f64,
    /// Eastern edge of the projected-plane bounding box (meters).
    pub x_max: f64,
    /// Southern edge of the projected-plane bounding box (meters).
    pub y_min: f64,
    /// Northern edge of the projected-plane bounding box (meters).
    pub y_max: f64,
    /// Offset anchor: added to window-relative pixel indices to address
    /// the canonical grid.
    pub x_offset: i64,
    /// Offset anchor for the y axis.
    pub y_offset: i64,
    /// Canonical sub-window of the grid covered by the regional product.
    pub window: SubWindow,
}

static PROFILE_HALF_KM: ResolutionProfile = ResolutionProfile {
    resolution: Resolution::HalfKm,
    image_width: 3600,
    image_height: 3600,
    x_min: -899_750.0,
    x_max: 899_750.0,
    y_min: -899_750.0,
    y_max: 899_750.0,
    x_offset: 1430,
    y_offset: 1773,
    window: SubWindow {
        x_start: 1430,
        x_end: 2665,
        y_start: 1545,
        y_end: 2283,
    },
};

static PROFILE_ONE_KM: ResolutionProfile = ResolutionProfile {
    resolution: Resolution::OneKm,
    image_width: 1800,
    image_height: 1800,
    x_min: -899_500.0,
    x_max: 899_500.0,
    y_min: -899_500.0,
    y_max: 899_500.0,
    x_offset: 715,
    y_offset: 886,
    window: SubWindow {
        x_start: 715,
        x_end: 1327,
        y_start: 772,
        y_end: 1441,
    },
};

static PROFILE_TWO_KM: ResolutionProfile = ResolutionProfile {
    resolution: Resolution::TwoKm,
    image_width: 900,
    image_height: 900,
    x_min: -899_000.0,
    x_max: 899_000.0,
    y_min: -899_000.0,
    y_max: 899_000.0,
    x_offset: 357,
    y_offset: 443,
    window: SubWindow {
        x_start: 357,
        x_end: 443,
        y_start: 410,
        y_end: 720,
    },
};

impl ResolutionProfile {
    /// Grid dimensions (width, height).
    pub fn dimensions(&self) -> (u32, u32) {
        (self.image_width, self.image_height)
    }

    /// Linear map from pixel indices to projected-plane coordinates.
    ///
    /// Pixel origin is the top-left corner of the grid; the plane y axis
    /// points up, so the y map is inverted. That inversion is load-bearing.
    pub fn pixel_to_plane(&self, pixel_x: f64, pixel_y: f64) -> (f64, f64) {
        let x = self.x_min
            + (pixel_x / (self.image_width as f64 - 1.0)) * (self.x_max - self.x_min);
        let y = self.y_max
            - (pixel_y / (self.image_height as f64 - 1.0)) * (self.y_max - self.y_min);
        (x, y)
    }

    /// Inverse linear map: plane coordinates to integer pixel indices.
    ///
    /// Indices are truncated with `floor`; a fractional plane position
    /// belongs to the pixel whose top-left corner it passed.
    pub fn plane_to_pixel(&self, plane_x: f64, plane_y: f64) -> PixelCoordinate {
        let px = (plane_x - self.x_min) / (self.x_max - self.x_min)
            * (self.image_width as f64 - 1.0);
        let py = (self.y_max - plane_y) / (self.y_max - self.y_min)
            * (self.image_height as f64 - 1.0);
        PixelCoordinate::new(px.floor() as i64, py.floor() as i64)
    }

    /// Check that a pixel lies on the grid.
    pub fn contains_pixel(&self, pixel: PixelCoordinate) -> bool {
        pixel.x >= 0
            && pixel.x < self.image_width as i64
            && pixel.y >= 0
            && pixel.y < self.image_height as i64
    }

    /// Validate the calibration invariants.
    ///
    /// The constants are static, so this cannot fail for shipped profiles;
    /// it exists so the invariants are stated once and checked exhaustively
    /// by the test suite.
    pub fn validate(&self) -> Result<()> {
        if self.image_width <= 1 || self.image_height <= 1 {
            return Err(GeocodeError::config(format!(
                "profile {}: grid dimensions must exceed 1",
                self.resolution
            )));
        }
        if self.x_min >= self.x_max || self.y_min >= self.y_max {
            return Err(GeocodeError::config(format!(
                "profile {}: bounding box is empty",
                self.resolution
            )));
        }
        if self.window.x_start >= self.window.x_end
            || self.window.y_start >= self.window.y_end
            || self.window.x_end > self.image_width
            || self.window.y_end > self.image_height
        {
            return Err(GeocodeError::config(format!(
                "profile {}: sub-window is outside the grid",
                self.resolution
            )));
        }
        Ok(())
    }
}
