//! Memoization of pixel to geodetic lookups.

use std::collections::HashMap;

use projection::ProjectionError;
use tracing::warn;

use crate::coordinate::{GeoCoordinate, PixelCoordinate};

/// Memoizes resolved coordinates for one processing run.
///
/// The first resolution of a key invokes the supplied compute function and
/// stores the outcome; later resolutions of the identical key return the
/// stored value without touching the projection again. Failed resolutions
/// are stored too, flagged as `None`, so the projection runs at most once
/// per distinct key either way.
///
/// Key equality is exact: callers quantize pixel columns before lookup or
/// the hit rate collapses. There is no eviction; the population is bounded
/// by the grid cardinality of one resolution (at most a few million keys),
/// which is acceptable for a run-scoped cache. This is a per-run resource
/// owned by its batch applier, not a process-wide or persistent cache, and
/// it is not synchronized: concurrent workers need one instance each.
#[derive(Debug, Default)]
pub struct CoordinateCache {
    entries: HashMap<PixelCoordinate, Option<GeoCoordinate>>,
    hits: u64,
    misses: u64,
}

/// Statistics about a coordinate cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

impl CacheStats {
    /// Cache hit rate (0.0 - 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

impl CoordinateCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a cache with capacity for an expected key count.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity),
            hits: 0,
            misses: 0,
        }
    }

    /// Resolve a pixel key, computing it on first sight.
    ///
    /// Returns `None` when the compute function failed for this key, now or
    /// on a previous call. The failure is logged once, at first computation.
    pub fn resolve<F>(&mut self, pixel: PixelCoordinate, compute: F) -> Option<GeoCoordinate>
    where
        F: FnOnce(PixelCoordinate) -> Result<GeoCoordinate, ProjectionError>,
    {
        if let Some(stored) = self.entries.get(&pixel) {
            self.hits += 1;
            return *stored;
        }
        self.misses += 1;
        let resolved = match compute(pixel) {
            Ok(coordinate) => Some(coordinate),
            Err(err) => {
                warn!(pixel = %pixel, error = %err, "projection failed; rows with this key resolve to null");
                None
            }
        };
        self.entries.insert(pixel, resolved);
        resolved
    }

    /// Look up a key without computing.
    pub fn peek(&self, pixel: &PixelCoordinate) -> Option<Option<GeoCoordinate>> {
        self.entries.get(pixel).copied()
    }

    /// Number of distinct keys stored.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Hit/miss statistics.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            entries: self.entries.len(),
        }
    }

    /// Drop all entries and counters.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.hits = 0;
        self.misses = 0;
    }
}
