//! Coordinate reference system transformations.
//!
//! Implements the ellipsoidal Lambert Conformal Conic projection from
//! scratch, without linking a native proj library. The formulation is the
//! standard two-standard-parallel development on a reference ellipsoid,
//! which is what the satellite ground-segment products assume (WGS84).

pub mod ellipsoid;
pub mod error;
pub mod lambert;

pub use ellipsoid::Ellipsoid;
pub use error::ProjectionError;
pub use lambert::{LambertConformal, ProjectionDefinition};
