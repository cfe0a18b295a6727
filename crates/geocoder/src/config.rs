//! Configuration for the batch applier.

use serde::{Deserialize, Serialize};

use crate::error::{GeocodeError, Result};

/// Configuration for a geocoding run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodeConfig {
    /// Name of the pixel x column in the input table.
    pub pixel_x_column: String,

    /// Name of the pixel y column in the input table.
    pub pixel_y_column: String,

    /// Name of the latitude column in the output table.
    pub latitude_column: String,

    /// Name of the longitude column in the output table.
    pub longitude_column: String,

    /// Shift pixel indices by the profile's offset anchor before resolving.
    ///
    /// Merged product tables store window-relative indices and need the
    /// shift; precomputed lookup tables are keyed on canonical indices
    /// already.
    pub apply_offset: bool,

    /// Fixed block size for repeating-grid tables, in rows.
    ///
    /// When set and the pixel columns actually repeat with this period, the
    /// applier transforms one block and replicates the geodetic result
    /// across the rest.
    pub rows_per_block: Option<usize>,

    /// How many rows between progress observer invocations.
    pub progress_interval: usize,
}

impl Default for GeocodeConfig {
    fn default() -> Self {
        Self {
            pixel_x_column: "x".to_string(),
            pixel_y_column: "y".to_string(),
            latitude_column: "latitude".to_string(),
            longitude_column: "longitude".to_string(),
            apply_offset: false,
            rows_per_block: None,
            progress_interval: 50_000,
        }
    }
}

impl GeocodeConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("PIXEL_X_COLUMN") {
            if !val.is_empty() {
                config.pixel_x_column = val;
            }
        }

        if let Ok(val) = std::env::var("PIXEL_Y_COLUMN") {
            if !val.is_empty() {
                config.pixel_y_column = val;
            }
        }

        if let Ok(val) = std::env::var("LATITUDE_COLUMN") {
            if !val.is_empty() {
                config.latitude_column = val;
            }
        }

        if let Ok(val) = std::env::var("LONGITUDE_COLUMN") {
            if !val.is_empty() {
                config.longitude_column = val;
            }
        }

        if let Ok(val) = std::env::var("APPLY_PIXEL_OFFSET") {
            config.apply_offset = val.to_lowercase() == "true" || val == "1";
        }

        if let Ok(val) = std::env::var("ROWS_PER_BLOCK") {
            if let Ok(rows) = val.parse() {
                config.rows_per_block = Some(rows);
            }
        }

        if let Ok(val) = std::env::var("PROGRESS_INTERVAL") {
            if let Ok(interval) = val.parse() {
                config.progress_interval = interval;
            }
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("pixel_x_column", &self.pixel_x_column),
            ("pixel_y_column", &self.pixel_y_column),
            ("latitude_column", &self.latitude_column),
            ("longitude_column", &self.longitude_column),
        ] {
            if value.is_empty() {
                return Err(GeocodeError::config(format!("{name} must not be empty")));
            }
        }
        if self.pixel_x_column == self.pixel_y_column {
            return Err(GeocodeError::config(
                "pixel_x_column and pixel_y_column must differ",
            ));
        }
        if self.latitude_column == self.longitude_column {
            return Err(GeocodeError::config(
                "latitude_column and longitude_column must differ",
            ));
        }
        if self.rows_per_block == Some(0) {
            return Err(GeocodeError::config("rows_per_block must be > 0"));
        }
        if self.progress_interval == 0 {
            return Err(GeocodeError::config("progress_interval must be > 0"));
        }
        Ok(())
    }
}
