//! Lambert Conformal Conic projection on a reference ellipsoid.
//!
//! This projection is used by the satellite ground segment for its regional
//! imagery products. It maps a cone secant to the ellipsoid onto a flat
//! plane and preserves angles.
//!
//! The projection parameters are:
//! - Two standard parallels (lat_1, lat_2), which may coincide
//! - Origin latitude (lat_0) and central meridian (lon_0)
//! - False easting/northing of the plane origin
//! - The reference ellipsoid
//!
//! Formulas are the classic two-standard-parallel ellipsoidal development
//! (Snyder, Map Projections: A Working Manual, pp. 104-110). The inverse
//! latitude is obtained by fixed-point iteration and reports failure
//! explicitly instead of returning an unflagged value.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

use serde::{Deserialize, Serialize};

use crate::ellipsoid::Ellipsoid;
use crate::error::ProjectionError;

/// Maximum iterations for the inverse latitude series.
const MAX_ITERATIONS: u32 = 15;

/// Convergence tolerance for the inverse latitude series (radians).
const CONVERGENCE_TOLERANCE: f64 = 1e-12;

/// Shared Lambert Conformal Conic parameters.
///
/// One definition is shared by every spatial resolution of a product line;
/// only the pixel grid geometry differs per resolution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectionDefinition {
    /// First standard parallel in degrees.
    pub standard_parallel_1: f64,
    /// Second standard parallel in degrees.
    pub standard_parallel_2: f64,
    /// Latitude of the plane origin in degrees.
    pub origin_latitude: f64,
    /// Central meridian in degrees.
    pub central_meridian: f64,
    /// False easting of the plane origin in meters.
    pub false_easting: f64,
    /// False northing of the plane origin in meters.
    pub false_northing: f64,
    /// Reference ellipsoid.
    pub ellipsoid: Ellipsoid,
}

impl ProjectionDefinition {
    /// Definition used by the GK-2A regional products.
    ///
    /// Standard parallels 30N/60N, origin 38N 126E, WGS84, no false offsets.
    pub fn gk2a() -> Self {
        Self {
            standard_parallel_1: 30.0,
            standard_parallel_2: 60.0,
            origin_latitude: 38.0,
            central_meridian: 126.0,
            false_easting: 0.0,
            false_northing: 0.0,
            ellipsoid: Ellipsoid::WGS84,
        }
    }
}

/// Lambert Conformal Conic projection with precomputed cone constants.
///
/// Construction derives the cone constant `n`, the scale constant `F` and
/// the origin radius `rho0` once; `forward` and `inverse` are then pure
/// trigonometric evaluations.
#[derive(Debug, Clone)]
pub struct LambertConformal {
    definition: ProjectionDefinition,
    /// First eccentricity of the ellipsoid.
    e: f64,
    /// Cone constant.
    n: f64,
    /// Scale constant F.
    f: f64,
    /// Radius of the origin parallel (meters).
    rho0: f64,
}

impl LambertConformal {
    /// Build a projection from a definition.
    ///
    /// Fails if the definition does not describe a usable cone, for example
    /// when the standard parallels are symmetric about the equator (the cone
    /// degenerates into a cylinder) or touch a pole.
    pub fn new(definition: ProjectionDefinition) -> Result<Self, ProjectionError> {
        for (name, deg) in [
            ("standard_parallel_1", definition.standard_parallel_1),
            ("standard_parallel_2", definition.standard_parallel_2),
            ("origin_latitude", definition.origin_latitude),
        ] {
            if !deg.is_finite() || deg.abs() >= 90.0 {
                return Err(ProjectionError::DegenerateDefinition(format!(
                    "{name} must lie strictly between -90 and 90, got {deg}"
                )));
            }
        }

        let e = definition.ellipsoid.eccentricity();
        let phi1 = definition.standard_parallel_1.to_radians();
        let phi2 = definition.standard_parallel_2.to_radians();
        let phi0 = definition.origin_latitude.to_radians();

        let m1 = isometric_scale(phi1, e);
        let t1 = conformal_ratio(phi1, e);
        let t0 = conformal_ratio(phi0, e);

        // Tangent cone when the parallels coincide, secant otherwise.
        let n = if (phi1 - phi2).abs() < 1e-10 {
            phi1.sin()
        } else {
            let m2 = isometric_scale(phi2, e);
            let t2 = conformal_ratio(phi2, e);
            (m1.ln() - m2.ln()) / (t1.ln() - t2.ln())
        };

        if !n.is_finite() || n.abs() < 1e-12 {
            return Err(ProjectionError::DegenerateDefinition(format!(
                "cone constant is {n}; standard parallels {} and {} do not define a cone",
                definition.standard_parallel_1, definition.standard_parallel_2
            )));
        }

        let f = m1 / (n * t1.powf(n));
        let a = definition.ellipsoid.semi_major_axis;
        let rho0 = a * f * t0.powf(n);

        if !f.is_finite() || !rho0.is_finite() {
            return Err(ProjectionError::DegenerateDefinition(
                "projection constants are not finite".to_string(),
            ));
        }

        Ok(Self {
            definition,
            e,
            n,
            f,
            rho0,
        })
    }

    /// The definition this projection was built from.
    pub fn definition(&self) -> &ProjectionDefinition {
        &self.definition
    }

    /// Cone constant n. Positive for a northern-hemisphere cone.
    pub fn cone_constant(&self) -> f64 {
        self.n
    }

    /// Forward projection: geodetic (degrees) to plane coordinates (meters).
    pub fn forward(&self, latitude: f64, longitude: f64) -> Result<(f64, f64), ProjectionError> {
        if !latitude.is_finite() || !longitude.is_finite() || latitude.abs() > 90.0 {
            return Err(ProjectionError::OutOfDomain {
                latitude,
                longitude,
            });
        }

        let phi = latitude.to_radians();

        // The pole opposite the cone apex is a true singularity: rho
        // diverges there. Reject it instead of emitting a huge coordinate.
        if (self.n > 0.0 && phi <= -FRAC_PI_2 + 1e-10)
            || (self.n < 0.0 && phi >= FRAC_PI_2 - 1e-10)
        {
            return Err(ProjectionError::OutOfDomain {
                latitude,
                longitude,
            });
        }

        let a = self.definition.ellipsoid.semi_major_axis;
        let t = conformal_ratio(phi, self.e);
        let rho = a * self.f * t.powf(self.n);

        let dlon = normalize_longitude(
            (longitude - self.definition.central_meridian).to_radians(),
        );
        let theta = self.n * dlon;

        let x = self.definition.false_easting + rho * theta.sin();
        let y = self.definition.false_northing + self.rho0 - rho * theta.cos();

        if !x.is_finite() || !y.is_finite() {
            return Err(ProjectionError::NonFinite {
                x: latitude,
                y: longitude,
            });
        }

        Ok((x, y))
    }

    /// Inverse projection: plane coordinates (meters) to geodetic (degrees).
    ///
    /// The latitude is recovered by fixed-point iteration of the conformal
    /// latitude series; non-convergence is an explicit error.
    pub fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), ProjectionError> {
        if !x.is_finite() || !y.is_finite() {
            return Err(ProjectionError::NonFinite { x, y });
        }

        let a = self.definition.ellipsoid.semi_major_axis;
        let xr = x - self.definition.false_easting;
        let yr = self.rho0 - (y - self.definition.false_northing);

        let sign = if self.n < 0.0 { -1.0 } else { 1.0 };
        let rho = sign * xr.hypot(yr);

        // The cone apex maps back to the pole under the apex.
        if rho == 0.0 {
            return Ok((90.0 * sign, self.definition.central_meridian));
        }

        // F carries the sign of n, so rho / (a F) is always positive here.
        let t = (rho / (a * self.f)).powf(1.0 / self.n);
        let theta = (sign * xr).atan2(sign * yr);

        let longitude =
            normalize_longitude(theta / self.n + self.definition.central_meridian.to_radians())
                .to_degrees();

        let mut phi = FRAC_PI_2 - 2.0 * t.atan();
        let mut converged = false;
        for _ in 0..MAX_ITERATIONS {
            let es = self.e * phi.sin();
            let next =
                FRAC_PI_2 - 2.0 * (t * ((1.0 - es) / (1.0 + es)).powf(self.e / 2.0)).atan();
            if (next - phi).abs() < CONVERGENCE_TOLERANCE {
                phi = next;
                converged = true;
                break;
            }
            phi = next;
        }
        if !converged {
            return Err(ProjectionError::NotConvergent {
                iterations: MAX_ITERATIONS,
            });
        }

        let latitude = phi.to_degrees();
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(ProjectionError::NonFinite { x, y });
        }

        Ok((latitude, longitude))
    }
}

/// m(phi) = cos(phi) / sqrt(1 - e^2 sin^2(phi)).
fn isometric_scale(phi: f64, e: f64) -> f64 {
    let s = phi.sin();
    phi.cos() / (1.0 - e * e * s * s).sqrt()
}

/// t(phi) = tan(pi/4 - phi/2) / ((1 - e sin phi) / (1 + e sin phi))^(e/2).
fn conformal_ratio(phi: f64, e: f64) -> f64 {
    let es = e * phi.sin();
    (FRAC_PI_4 - phi / 2.0).tan() / ((1.0 - es) / (1.0 + es)).powf(e / 2.0)
}

/// Wrap a longitude difference into [-pi, pi].
fn normalize_longitude(mut rad: f64) -> f64 {
    while rad > PI {
        rad -= 2.0 * PI;
    }
    while rad < -PI {
        rad += 2.0 * PI;
    }
    rad
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gk2a() -> LambertConformal {
        LambertConformal::new(ProjectionDefinition::gk2a()).unwrap()
    }

    #[test]
    fn test_cone_constant_range() {
        let proj = gk2a();
        // Secant cone between 30N and 60N: n must sit between the sines.
        let n = proj.cone_constant();
        assert!(n > 30f64.to_radians().sin(), "n too small: {}", n);
        assert!(n < 60f64.to_radians().sin(), "n too large: {}", n);
    }

    #[test]
    fn test_origin_maps_to_plane_origin() {
        let proj = gk2a();
        let (x, y) = proj.forward(38.0, 126.0).unwrap();
        assert!(x.abs() < 1e-6, "x should be ~0, got {}", x);
        assert!(y.abs() < 1e-6, "y should be ~0, got {}", y);
    }

    #[test]
    fn test_inverse_of_plane_origin() {
        let proj = gk2a();
        let (lat, lon) = proj.inverse(0.0, 0.0).unwrap();
        assert!((lat - 38.0).abs() < 1e-9, "lat {}", lat);
        assert!((lon - 126.0).abs() < 1e-9, "lon {}", lon);
    }

    #[test]
    fn test_axis_directions() {
        let proj = gk2a();
        // North of the origin parallel lands at positive y.
        let (_, y) = proj.forward(39.0, 126.0).unwrap();
        assert!(y > 0.0);
        let (_, y) = proj.forward(37.0, 126.0).unwrap();
        assert!(y < 0.0);
        // East of the central meridian lands at positive x.
        let (x, _) = proj.forward(38.0, 127.0).unwrap();
        assert!(x > 0.0);
        let (x, _) = proj.forward(38.0, 125.0).unwrap();
        assert!(x < 0.0);
    }

    #[test]
    fn test_roundtrip_seoul() {
        let proj = gk2a();
        let (lat0, lon0) = (37.5665, 126.9780);
        let (x, y) = proj.forward(lat0, lon0).unwrap();
        let (lat, lon) = proj.inverse(x, y).unwrap();
        assert!((lat - lat0).abs() < 1e-9, "lat roundtrip: {} vs {}", lat0, lat);
        assert!((lon - lon0).abs() < 1e-9, "lon roundtrip: {} vs {}", lon0, lon);
    }

    #[test]
    fn test_roundtrip_far_from_origin() {
        let proj = gk2a();
        for (lat0, lon0) in [(33.0, 124.0), (39.0, 132.0), (45.0, 120.0)] {
            let (x, y) = proj.forward(lat0, lon0).unwrap();
            let (lat, lon) = proj.inverse(x, y).unwrap();
            assert!((lat - lat0).abs() < 1e-9);
            assert!((lon - lon0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_longitude_wrap() {
        let proj = gk2a();
        let (x1, y1) = proj.forward(38.0, 126.0).unwrap();
        let (x2, y2) = proj.forward(38.0, 126.0 + 360.0).unwrap();
        assert!((x1 - x2).abs() < 1e-6);
        assert!((y1 - y2).abs() < 1e-6);
    }

    #[test]
    fn test_opposite_pole_is_rejected() {
        let proj = gk2a();
        let err = proj.forward(-90.0, 126.0).unwrap_err();
        assert!(matches!(err, ProjectionError::OutOfDomain { .. }));
    }

    #[test]
    fn test_out_of_range_latitude_rejected() {
        let proj = gk2a();
        assert!(proj.forward(91.0, 126.0).is_err());
        assert!(proj.forward(f64::NAN, 126.0).is_err());
    }

    #[test]
    fn test_symmetric_parallels_rejected() {
        let definition = ProjectionDefinition {
            standard_parallel_1: 30.0,
            standard_parallel_2: -30.0,
            ..ProjectionDefinition::gk2a()
        };
        let err = LambertConformal::new(definition).unwrap_err();
        assert!(matches!(err, ProjectionError::DegenerateDefinition(_)));
    }

    #[test]
    fn test_polar_parallel_rejected() {
        let definition = ProjectionDefinition {
            standard_parallel_2: 90.0,
            ..ProjectionDefinition::gk2a()
        };
        assert!(LambertConformal::new(definition).is_err());
    }

    #[test]
    fn test_cone_apex_inverse() {
        let proj = gk2a();
        // The apex of a northern cone is the north pole.
        let (x, y) = proj.forward(90.0, 126.0).unwrap();
        let (lat, lon) = proj.inverse(x, y).unwrap();
        assert!((lat - 90.0).abs() < 1e-9);
        assert!((lon - 126.0).abs() < 1e-9);
    }
}
