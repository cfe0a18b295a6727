//! Error types for the geocoding core.

use projection::ProjectionError;
use thiserror::Error;

/// Errors that can occur while geocoding a batch.
///
/// `UnsupportedResolution` and `SchemaMismatch` are fatal to a batch and are
/// raised before any output is produced. `Projection` and
/// `MissingLookupEntry` are recoverable per row: the affected row gets a
/// null coordinate pair and the batch continues.
#[derive(Error, Debug)]
pub enum GeocodeError {
    /// The resolution identifier is not in the supported set.
    #[error("unsupported resolution: {0}")]
    UnsupportedResolution(String),

    /// Expected pixel columns are absent or have the wrong type.
    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),

    /// Projection math could not resolve a point.
    #[error("projection error: {0}")]
    Projection(#[from] ProjectionError),

    /// A pixel key was absent from a supplied lookup table.
    #[error("missing lookup entry for pixel ({x}, {y})")]
    MissingLookupEntry { x: i64, y: i64 },

    /// A table violates its structural invariants.
    #[error("invalid table: {0}")]
    InvalidTable(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl GeocodeError {
    /// Create a SchemaMismatch error.
    pub fn schema_mismatch(msg: impl Into<String>) -> Self {
        Self::SchemaMismatch(msg.into())
    }

    /// Create an InvalidTable error.
    pub fn invalid_table(msg: impl Into<String>) -> Self {
        Self::InvalidTable(msg.into())
    }

    /// Create a Config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

/// Result type for geocoder operations.
pub type Result<T> = std::result::Result<T, GeocodeError>;
