//! Reference ellipsoid parameters.

use serde::{Deserialize, Serialize};

/// A reference ellipsoid defined by its semi-major axis and inverse
/// flattening. Derived quantities (eccentricity) are computed on demand so
/// the struct stays a plain pair of calibration constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ellipsoid {
    /// Semi-major axis in meters.
    pub semi_major_axis: f64,
    /// Inverse flattening (1/f).
    pub inverse_flattening: f64,
}

impl Ellipsoid {
    /// WGS84 ellipsoid, the datum used by the satellite products.
    pub const WGS84: Ellipsoid = Ellipsoid {
        semi_major_axis: 6_378_137.0,
        inverse_flattening: 298.257_223_563,
    };

    /// Flattening f.
    pub fn flattening(&self) -> f64 {
        1.0 / self.inverse_flattening
    }

    /// First eccentricity squared, e^2 = 2f - f^2.
    pub fn eccentricity_squared(&self) -> f64 {
        let f = self.flattening();
        2.0 * f - f * f
    }

    /// First eccentricity e.
    pub fn eccentricity(&self) -> f64 {
        self.eccentricity_squared().sqrt()
    }

    /// Semi-minor axis in meters.
    pub fn semi_minor_axis(&self) -> f64 {
        self.semi_major_axis * (1.0 - self.flattening())
    }
}
