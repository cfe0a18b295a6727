//! Error types for projection math.

use thiserror::Error;

/// Errors that can occur while constructing or evaluating a projection.
///
/// A projection that cannot resolve a point reports it explicitly; callers
/// decide whether the failure is fatal or maps to a null output row.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProjectionError {
    /// The projection definition does not describe a usable cone.
    #[error("degenerate projection definition: {0}")]
    DegenerateDefinition(String),

    /// The input coordinate lies outside the projectable domain.
    #[error("coordinate (lat {latitude}, lon {longitude}) is outside the projectable domain")]
    OutOfDomain { latitude: f64, longitude: f64 },

    /// The iterative inverse did not converge.
    #[error("latitude iteration did not converge after {iterations} iterations")]
    NotConvergent { iterations: u32 },

    /// The projection produced a non-finite value.
    #[error("projection produced a non-finite result for input ({x}, {y})")]
    NonFinite { x: f64, y: f64 },
}
