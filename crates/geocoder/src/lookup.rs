//! Precomputed pixel to geodetic lookup tables.
//!
//! A lookup table makes the batch applier a pure join: rows whose keys are
//! present take the stored coordinates, rows whose keys are absent become
//! null. Tables come either from an external reader (the upstream pipeline
//! persists them alongside the imagery) or from `precompute`, which fans
//! the projection out over a profile's sub-window.

use std::collections::HashMap;

use rayon::prelude::*;
use tracing::debug;

use crate::coordinate::{GeoCoordinate, PixelCoordinate};
use crate::error::{GeocodeError, Result};
use crate::geolocate::PixelGeolocator;
use crate::profile::SubWindow;

/// An externally supplied or precomputed `(pixel_x, pixel_y)` to
/// `(latitude, longitude)` mapping for one resolution.
#[derive(Debug, Clone, Default)]
pub struct CoordinateLookup {
    entries: HashMap<PixelCoordinate, GeoCoordinate>,
}

impl CoordinateLookup {
    /// Build a lookup from key/coordinate pairs, for example rows read from
    /// a precomputed-coordinates file by an external collaborator.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (PixelCoordinate, GeoCoordinate)>,
    {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// Precompute the lookup for a geolocator's canonical sub-window.
    pub fn precompute(locator: &PixelGeolocator) -> Self {
        Self::precompute_window(locator, &locator.profile().window)
    }

    /// Precompute the lookup for an arbitrary window of the grid.
    ///
    /// Map-style fan-out over independent pixels: each rayon task owns its
    /// computation outright, so no cache or lock is shared. Pixels the
    /// projection cannot resolve are skipped and counted.
    pub fn precompute_window(locator: &PixelGeolocator, window: &SubWindow) -> Self {
        let entries: HashMap<PixelCoordinate, GeoCoordinate> = (window.y_start..window.y_end)
            .into_par_iter()
            .flat_map_iter(|y| {
                (window.x_start..window.x_end).filter_map(move |x| {
                    let pixel = PixelCoordinate::new(x as i64, y as i64);
                    locator.pixel_to_geo(pixel).ok().map(|geo| (pixel, geo))
                })
            })
            .collect();

        let skipped = window.pixel_count() - entries.len();
        if skipped > 0 {
            debug!(
                resolution = %locator.profile().resolution,
                skipped,
                "precompute skipped unresolvable pixels"
            );
        }

        Self { entries }
    }

    /// Look up a pixel key.
    pub fn get(&self, pixel: &PixelCoordinate) -> Option<GeoCoordinate> {
        self.entries.get(pixel).copied()
    }

    /// Look up a pixel key, turning absence into a typed error.
    ///
    /// For callers running their own row loops; the batch applier counts
    /// misses instead of raising them.
    pub fn require(&self, pixel: &PixelCoordinate) -> Result<GeoCoordinate> {
        self.get(pixel).ok_or(GeocodeError::MissingLookupEntry {
            x: pixel.x,
            y: pixel.y,
        })
    }

    /// Check whether a key is present.
    pub fn contains(&self, pixel: &PixelCoordinate) -> bool {
        self.entries.contains_key(pixel)
    }

    /// Insert or replace an entry.
    pub fn insert(&mut self, pixel: PixelCoordinate, geo: GeoCoordinate) {
        self.entries.insert(pixel, geo);
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the lookup is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over all entries.
    pub fn iter(&self) -> impl Iterator<Item = (&PixelCoordinate, &GeoCoordinate)> {
        self.entries.iter()
    }
}
