//! Batch application of the pixel to geodetic transform over tables.
//!
//! The applier owns its run-scoped state outright: one coordinate cache,
//! one optional lookup table, one geolocator. Nothing here is process-wide,
//! so concurrent batches stay isolated and tests stay reproducible.

use tracing::{debug, info};

use projection::ProjectionDefinition;

use crate::cache::{CacheStats, CoordinateCache};
use crate::config::GeocodeConfig;
use crate::coordinate::{GeoCoordinate, PixelCoordinate};
use crate::error::{GeocodeError, Result};
use crate::geolocate::PixelGeolocator;
use crate::lookup::CoordinateLookup;
use crate::profile::Resolution;
use crate::table::{Column, ColumnData, Table};

/// Per-row outcome counters for one batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct RowCounters {
    /// Rows whose pixel columns were not finite numbers.
    invalid: usize,
    /// Rows whose key was absent from the supplied lookup table.
    missing: usize,
    /// Rows the projection could not resolve.
    failed: usize,
}

/// Completion summary of one batch run.
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchSummary {
    /// Total output rows (always equal to the input row count).
    pub rows: usize,
    /// Rows whose geodetic pair is null.
    pub null_rows: usize,
    /// Null rows caused by a key absent from the lookup table.
    pub missing_lookup_rows: usize,
    /// Null rows caused by a projection failure.
    pub failed_projection_rows: usize,
    /// Null rows caused by non-finite pixel values.
    pub invalid_pixel_rows: usize,
    /// Blocks served by replication instead of recomputation.
    pub replicated_blocks: usize,
    /// Coordinate cache statistics at completion.
    pub cache: CacheStats,
}

/// Output of a batch run: the transformed table plus its summary.
#[derive(Debug)]
pub struct GeocodeReport {
    pub table: Table,
    pub summary: BatchSummary,
}

/// One row of a geocode stream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedRow {
    /// Index of the row in the input table.
    pub index: usize,
    /// The resolved coordinate, or `None` for an unresolvable row.
    pub coordinate: Option<GeoCoordinate>,
}

/// Resolves tables of pixel coordinates into geodetic coordinates.
///
/// Owns the cache for its run; create one geocoder per batch (or per
/// worker when fanning out) rather than sharing one across threads.
pub struct Geocoder {
    config: GeocodeConfig,
    locator: PixelGeolocator,
    cache: CoordinateCache,
    lookup: Option<CoordinateLookup>,
}

impl Geocoder {
    /// Create a geocoder for a resolution over the regional product
    /// projection.
    ///
    /// Fails fast on an invalid configuration; an unsupported resolution
    /// has already failed at `Resolution` parse time.
    pub fn new(resolution: Resolution, config: GeocodeConfig) -> Result<Self> {
        Self::with_definition(resolution, ProjectionDefinition::gk2a(), config)
    }

    /// Create a geocoder with an explicit projection definition.
    pub fn with_definition(
        resolution: Resolution,
        definition: ProjectionDefinition,
        config: GeocodeConfig,
    ) -> Result<Self> {
        config.validate()?;
        let locator = PixelGeolocator::new(resolution, definition)?;
        Ok(Self {
            config,
            locator,
            cache: CoordinateCache::new(),
            lookup: None,
        })
    }

    /// Attach a precomputed lookup table.
    ///
    /// With a lookup attached the applier joins against it instead of
    /// projecting; a missing key yields a null row.
    pub fn with_lookup(mut self, lookup: CoordinateLookup) -> Self {
        self.lookup = Some(lookup);
        self
    }

    /// The geolocator backing this geocoder.
    pub fn locator(&self) -> &PixelGeolocator {
        &self.locator
    }

    /// The run-scoped coordinate cache.
    pub fn cache(&self) -> &CoordinateCache {
        &self.cache
    }

    /// Transform a table, replacing its pixel columns with geodetic ones.
    ///
    /// Fatal errors (`SchemaMismatch`, invalid table shape) are raised
    /// before any output exists. Unresolvable rows become null coordinate
    /// pairs and are counted in the summary; they never abort the batch.
    pub fn apply(&mut self, table: &Table) -> Result<GeocodeReport> {
        self.apply_with_progress(table, None::<fn(usize, usize)>)
    }

    /// Like [`apply`](Self::apply), with an optional progress observer.
    ///
    /// The observer receives `(rows_done, rows_total)` every
    /// `progress_interval` rows and once at completion.
    pub fn apply_with_progress<F>(
        &mut self,
        table: &Table,
        mut observer: Option<F>,
    ) -> Result<GeocodeReport>
    where
        F: FnMut(usize, usize),
    {
        let keys = self.pixel_keys(table)?;
        let rows = keys.len();

        // Replicate only when the pixel grid genuinely repeats; a
        // mis-declared block size falls back to the full per-row path.
        let block_rows = self
            .config
            .rows_per_block
            .filter(|&b| is_periodic(&keys, b));

        let compute_rows = block_rows.unwrap_or(rows);
        let mut coordinates: Vec<Option<GeoCoordinate>> = Vec::with_capacity(rows);
        let mut counters = RowCounters::default();

        for (index, key) in keys[..compute_rows].iter().enumerate() {
            coordinates.push(self.resolve_key(*key, &mut counters));
            if let Some(cb) = observer.as_mut() {
                if (index + 1) % self.config.progress_interval == 0 {
                    cb(index + 1, rows);
                }
            }
        }

        let mut replicated_blocks = 0;
        if let Some(block) = block_rows {
            let blocks = rows / block;
            for _ in 1..blocks {
                coordinates.extend_from_within(..block);
            }
            replicated_blocks = blocks - 1;
            // Replicated rows repeat the per-block outcomes verbatim.
            counters.invalid *= blocks;
            counters.missing *= blocks;
            counters.failed *= blocks;
            debug!(
                blocks,
                block_rows = block,
                "replicated geodetic block across repeating grid"
            );
        }
        if let Some(cb) = observer.as_mut() {
            cb(rows, rows);
        }

        let table = self.build_output(table, &coordinates)?;
        let summary = BatchSummary {
            rows,
            null_rows: counters.invalid + counters.missing + counters.failed,
            missing_lookup_rows: counters.missing,
            failed_projection_rows: counters.failed,
            invalid_pixel_rows: counters.invalid,
            replicated_blocks,
            cache: self.cache.stats(),
        };

        info!(
            rows = summary.rows,
            null_rows = summary.null_rows,
            replicated_blocks = summary.replicated_blocks,
            cache_hit_rate = summary.cache.hit_rate(),
            "geocoded batch"
        );

        Ok(GeocodeReport { table, summary })
    }

    /// Lazily resolve a table's rows.
    ///
    /// The stream is finite and non-restartable; it borrows the geocoder
    /// (and its cache) for its lifetime. Fatal schema errors surface here,
    /// before the first row is produced.
    pub fn stream<'g>(&'g mut self, table: &Table) -> Result<GeocodeStream<'g>> {
        let keys = self.pixel_keys(table)?;
        Ok(GeocodeStream {
            total: keys.len(),
            keys: keys.into_iter(),
            index: 0,
            counters: RowCounters::default(),
            geocoder: self,
        })
    }

    /// Validate the pixel columns and quantize them into cache keys.
    fn pixel_keys(&self, table: &Table) -> Result<Vec<Option<PixelCoordinate>>> {
        let xs = self.numeric_column(table, &self.config.pixel_x_column)?;
        let ys = self.numeric_column(table, &self.config.pixel_y_column)?;

        let profile = self.locator.profile();
        let (dx, dy) = if self.config.apply_offset {
            (profile.x_offset, profile.y_offset)
        } else {
            (0, 0)
        };

        Ok(xs
            .iter()
            .zip(ys.iter())
            .map(|(&x, &y)| PixelCoordinate::quantize(x, y).map(|p| p.offset_by(dx, dy)))
            .collect())
    }

    fn numeric_column(&self, table: &Table, name: &str) -> Result<Vec<f64>> {
        let column = table.column(name).ok_or_else(|| {
            GeocodeError::schema_mismatch(format!("pixel column {name:?} is absent"))
        })?;
        column.data.numeric_values().ok_or_else(|| {
            GeocodeError::schema_mismatch(format!("pixel column {name:?} is not numeric"))
        })
    }

    fn resolve_key(
        &mut self,
        key: Option<PixelCoordinate>,
        counters: &mut RowCounters,
    ) -> Option<GeoCoordinate> {
        let Some(pixel) = key else {
            counters.invalid += 1;
            return None;
        };

        if let Some(lookup) = &self.lookup {
            match lookup.get(&pixel) {
                Some(geo) => Some(geo),
                None => {
                    counters.missing += 1;
                    None
                }
            }
        } else {
            let locator = &self.locator;
            let resolved = self.cache.resolve(pixel, |p| locator.pixel_to_geo(p));
            if resolved.is_none() {
                counters.failed += 1;
            }
            resolved
        }
    }

    fn build_output(
        &self,
        input: &Table,
        coordinates: &[Option<GeoCoordinate>],
    ) -> Result<Table> {
        let mut columns = input.columns_except(&[
            self.config.pixel_x_column.as_str(),
            self.config.pixel_y_column.as_str(),
        ]);
        columns.push(Column::new(
            self.config.latitude_column.clone(),
            ColumnData::NullableFloat(
                coordinates.iter().map(|c| c.map(|g| g.latitude)).collect(),
            ),
        ));
        columns.push(Column::new(
            self.config.longitude_column.clone(),
            ColumnData::NullableFloat(
                coordinates.iter().map(|c| c.map(|g| g.longitude)).collect(),
            ),
        ));
        Table::new(columns)
    }
}

/// Check that the key sequence repeats with the given period.
fn is_periodic(keys: &[Option<PixelCoordinate>], block: usize) -> bool {
    if block == 0 || keys.len() % block != 0 || keys.len() / block < 2 {
        return false;
    }
    keys.iter()
        .enumerate()
        .all(|(i, key)| *key == keys[i % block])
}

/// A finite, non-restartable lazy sequence of resolved rows.
pub struct GeocodeStream<'g> {
    keys: std::vec::IntoIter<Option<PixelCoordinate>>,
    total: usize,
    index: usize,
    counters: RowCounters,
    geocoder: &'g mut Geocoder,
}

impl GeocodeStream<'_> {
    /// Total number of rows the stream will produce.
    pub fn total_rows(&self) -> usize {
        self.total
    }

    /// Rows produced so far.
    pub fn rows_done(&self) -> usize {
        self.index
    }

    /// Null rows produced so far.
    pub fn null_rows(&self) -> usize {
        self.counters.invalid + self.counters.missing + self.counters.failed
    }
}

impl Iterator for GeocodeStream<'_> {
    type Item = ResolvedRow;

    fn next(&mut self) -> Option<Self::Item> {
        let key = self.keys.next()?;
        let index = self.index;
        self.index += 1;
        let coordinate = self.geocoder.resolve_key(key, &mut self.counters);
        Some(ResolvedRow { index, coordinate })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.keys.size_hint()
    }
}

impl ExactSizeIterator for GeocodeStream<'_> {}
