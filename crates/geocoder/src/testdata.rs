//! Test data generation utilities.
//!
//! This module builds small synthetic product tables with known pixel
//! layouts for use in unit and integration tests. A real merged product is
//! the same pixel grid repeated once per observation timestamp, with the
//! measurement payload varying per block; the builders mirror that shape at
//! toy sizes (tens of rows, not millions).

use chrono::{DateTime, TimeZone, Utc};

use crate::table::{Column, ColumnData, Table};

/// Row-major pixel column pair covering a `width` x `height` window with
/// its top-left corner at (`x0`, `y0`).
pub fn pixel_window(x0: i64, y0: i64, width: usize, height: usize) -> (Vec<i64>, Vec<i64>) {
    let mut xs = Vec::with_capacity(width * height);
    let mut ys = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            xs.push(x0 + col as i64);
            ys.push(y0 + row as i64);
        }
    }
    (xs, ys)
}

/// Observation timestamps starting at a fixed reference time, one per
/// block, spaced an hour apart.
pub fn block_timestamps(blocks: usize) -> Vec<DateTime<Utc>> {
    let start = Utc.with_ymd_and_hms(2025, 1, 8, 0, 0, 0).unwrap();
    (0..blocks)
        .map(|i| start + chrono::Duration::hours(i as i64))
        .collect()
}

/// A merged-product style table: the same pixel window repeated once per
/// timestamp block, with a per-row measurement payload.
///
/// Value at (block, col, row) = block * 10000 + col * 100 + row, which
/// makes block boundaries easy to verify after a transform.
pub fn merged_product_table(
    x0: i64,
    y0: i64,
    width: usize,
    height: usize,
    blocks: usize,
) -> Table {
    let (block_xs, block_ys) = pixel_window(x0, y0, width, height);
    let rows_per_block = block_xs.len();
    let timestamps = block_timestamps(blocks);

    let mut xs = Vec::with_capacity(rows_per_block * blocks);
    let mut ys = Vec::with_capacity(rows_per_block * blocks);
    let mut datetime = Vec::with_capacity(rows_per_block * blocks);
    let mut values = Vec::with_capacity(rows_per_block * blocks);

    for (block, stamp) in timestamps.iter().enumerate() {
        xs.extend_from_slice(&block_xs);
        ys.extend_from_slice(&block_ys);
        datetime.extend(std::iter::repeat(*stamp).take(rows_per_block));
        for row in 0..height {
            for col in 0..width {
                values.push((block * 10_000 + col * 100 + row) as f64);
            }
        }
    }

    Table::new(vec![
        Column::new("Datetime", ColumnData::Timestamp(datetime)),
        Column::new("x", ColumnData::Int(xs)),
        Column::new("y", ColumnData::Int(ys)),
        Column::new("value", ColumnData::Float(values)),
    ])
    .expect("synthetic table is well formed")
}
