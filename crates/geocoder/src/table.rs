//! Minimal column-oriented tabular model.
//!
//! The core consumes and produces tables but deliberately defines no file
//! format; external collaborators read parquet/CSV into this shape and
//! persist the result however they like. Payload columns are opaque to the
//! geocoder and pass through untouched.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{GeocodeError, Result};

/// Typed column storage.
///
/// `NullableFloat` exists for the geodetic output columns, where a row the
/// projection or lookup could not resolve is an explicit null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ColumnData {
    Float(Vec<f64>),
    Int(Vec<i64>),
    Text(Vec<String>),
    Timestamp(Vec<DateTime<Utc>>),
    NullableFloat(Vec<Option<f64>>),
}

impl ColumnData {
    /// Number of rows in the column.
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Float(v) => v.len(),
            ColumnData::Int(v) => v.len(),
            ColumnData::Text(v) => v.len(),
            ColumnData::Timestamp(v) => v.len(),
            ColumnData::NullableFloat(v) => v.len(),
        }
    }

    /// Check if the column has no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// View the column as f64 values, when it is numeric.
    ///
    /// Integer columns are widened; nullable and non-numeric columns return
    /// `None` because they cannot serve as pixel coordinates.
    pub fn numeric_values(&self) -> Option<Vec<f64>> {
        match self {
            ColumnData::Float(v) => Some(v.clone()),
            ColumnData::Int(v) => Some(v.iter().map(|&i| i as f64).collect()),
            _ => None,
        }
    }
}

/// A named column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

impl Column {
    /// Create a named column.
    pub fn new(name: impl Into<String>, data: ColumnData) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }
}

/// A table: equal-length named columns, row order significant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<Column>,
}

impl Table {
    /// Build a table, enforcing unique names and equal column lengths.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        if let Some(first) = columns.first() {
            let rows = first.data.len();
            for column in &columns {
                if column.data.len() != rows {
                    return Err(GeocodeError::invalid_table(format!(
                        "column {} has {} rows, expected {}",
                        column.name,
                        column.data.len(),
                        rows
                    )));
                }
            }
        }
        for (i, column) in columns.iter().enumerate() {
            if columns[..i].iter().any(|c| c.name == column.name) {
                return Err(GeocodeError::invalid_table(format!(
                    "duplicate column name: {}",
                    column.name
                )));
            }
        }
        Ok(Self { columns })
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.columns.first().map_or(0, |c| c.data.len())
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Find a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Check whether a column exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// All column names in order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// All columns in order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Clone the columns not named in `drop`, preserving order.
    pub fn columns_except(&self, drop: &[&str]) -> Vec<Column> {
        self.columns
            .iter()
            .filter(|c| !drop.contains(&c.name.as_str()))
            .cloned()
            .collect()
    }
}
