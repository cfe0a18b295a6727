//! Integration tests for the batch applier over merged-product tables.

use geocoder::{
    Column, ColumnData, CoordinateLookup, GeocodeConfig, GeocodeError, Geocoder,
    PixelCoordinate, Resolution, SubWindow, Table,
};
use geocoder::testdata::merged_product_table;
use projection::{Ellipsoid, ProjectionDefinition};

fn latitude_values(table: &Table, name: &str) -> Vec<Option<f64>> {
    match &table.column(name).unwrap().data {
        ColumnData::NullableFloat(values) => values.clone(),
        other => panic!("expected nullable floats for {name:?}, got {other:?}"),
    }
}

#[test]
fn test_block_replication_matches_per_row_computation() {
    let table = merged_product_table(400, 450, 6, 4, 3);
    let rows_per_block = 24;
    assert_eq!(table.rows(), rows_per_block * 3);

    let mut per_row = Geocoder::new(Resolution::TwoKm, GeocodeConfig::default()).unwrap();
    let baseline = per_row.apply(&table).unwrap();
    assert_eq!(baseline.summary.replicated_blocks, 0);

    let config = GeocodeConfig {
        rows_per_block: Some(rows_per_block),
        ..Default::default()
    };
    let mut blocked = Geocoder::new(Resolution::TwoKm, config).unwrap();
    let replicated = blocked.apply(&table).unwrap();
    assert_eq!(replicated.summary.replicated_blocks, 2);
    assert_eq!(replicated.summary.rows, table.rows());

    // Replication must be indistinguishable from recomputation, bit for bit.
    assert_eq!(
        latitude_values(&baseline.table, "latitude"),
        latitude_values(&replicated.table, "latitude")
    );
    assert_eq!(
        latitude_values(&baseline.table, "longitude"),
        latitude_values(&replicated.table, "longitude")
    );

    // Only the first block ever touched the projection.
    assert_eq!(replicated.summary.cache.misses, rows_per_block as u64);
}

#[test]
fn test_mis_declared_block_size_falls_back_to_per_row() {
    let table = merged_product_table(400, 450, 6, 4, 3);

    // 23 does not divide 72, so the declared period is ignored.
    let config = GeocodeConfig {
        rows_per_block: Some(23),
        ..Default::default()
    };
    let mut geocoder = Geocoder::new(Resolution::TwoKm, config).unwrap();
    let report = geocoder.apply(&table).unwrap();
    assert_eq!(report.summary.replicated_blocks, 0);
    assert_eq!(report.summary.rows, 72);
    assert_eq!(report.summary.null_rows, 0);
}

#[test]
fn test_lookup_misses_become_null_rows() {
    let direct = Geocoder::new(Resolution::TwoKm, GeocodeConfig::default()).unwrap();
    let locator = direct.locator();

    // A lookup that covers two of the three keys in the table.
    let covered = [PixelCoordinate::new(400, 450), PixelCoordinate::new(401, 450)];
    let lookup = CoordinateLookup::from_entries(
        covered
            .iter()
            .map(|&p| (p, locator.pixel_to_geo(p).unwrap())),
    );

    let table = Table::new(vec![
        Column::new("x", ColumnData::Int(vec![400, 401, 402])),
        Column::new("y", ColumnData::Int(vec![450, 450, 450])),
        Column::new("value", ColumnData::Float(vec![1.0, 2.0, 3.0])),
    ])
    .unwrap();

    let mut geocoder = Geocoder::new(Resolution::TwoKm, GeocodeConfig::default())
        .unwrap()
        .with_lookup(lookup);
    let report = geocoder.apply(&table).unwrap();

    // A missing key nulls its row; it never shrinks the table.
    assert_eq!(report.summary.rows, 3);
    assert_eq!(report.summary.missing_lookup_rows, 1);
    assert_eq!(report.summary.null_rows, 1);

    let lats = latitude_values(&report.table, "latitude");
    assert!(lats[0].is_some());
    assert!(lats[1].is_some());
    assert!(lats[2].is_none());

    // The payload column still carries every row.
    let values = report
        .table
        .column("value")
        .unwrap()
        .data
        .numeric_values()
        .unwrap();
    assert_eq!(values, vec![1.0, 2.0, 3.0]);
}

#[test]
fn test_lookup_join_matches_direct_projection() {
    let table = merged_product_table(400, 450, 6, 4, 1);

    let mut direct = Geocoder::new(Resolution::TwoKm, GeocodeConfig::default()).unwrap();
    let projected = direct.apply(&table).unwrap();

    let window = SubWindow {
        x_start: 400,
        x_end: 406,
        y_start: 450,
        y_end: 454,
    };
    let lookup = CoordinateLookup::precompute_window(direct.locator(), &window);
    assert_eq!(lookup.len(), 24);

    let mut joined = Geocoder::new(Resolution::TwoKm, GeocodeConfig::default())
        .unwrap()
        .with_lookup(lookup);
    let report = joined.apply(&table).unwrap();

    assert_eq!(report.summary.null_rows, 0);
    assert_eq!(
        latitude_values(&projected.table, "latitude"),
        latitude_values(&report.table, "latitude")
    );
    assert_eq!(
        latitude_values(&projected.table, "longitude"),
        latitude_values(&report.table, "longitude")
    );
}

#[test]
fn test_projection_failures_surface_as_null_rows() {
    // An extreme ellipsoid keeps the inverse latitude iteration from
    // converging, so every row fails at the projection rather than at
    // schema validation.
    let definition = ProjectionDefinition {
        ellipsoid: Ellipsoid {
            semi_major_axis: 6_378_137.0,
            inverse_flattening: 1.5,
        },
        ..ProjectionDefinition::gk2a()
    };
    let table = Table::new(vec![
        Column::new("x", ColumnData::Int(vec![400, 401])),
        Column::new("y", ColumnData::Int(vec![450, 450])),
        Column::new("value", ColumnData::Float(vec![1.0, 2.0])),
    ])
    .unwrap();

    let mut geocoder =
        Geocoder::with_definition(Resolution::TwoKm, definition, GeocodeConfig::default())
            .unwrap();
    let report = geocoder.apply(&table).unwrap();

    // Failed rows are nulled and counted; the batch never aborts.
    assert_eq!(report.summary.rows, 2);
    assert_eq!(report.summary.failed_projection_rows, 2);
    assert_eq!(report.summary.null_rows, 2);
    assert_eq!(report.summary.missing_lookup_rows, 0);
    assert!(latitude_values(&report.table, "latitude")
        .iter()
        .all(Option::is_none));

    // The payload survives alongside the null coordinate pairs.
    let values = report
        .table
        .column("value")
        .unwrap()
        .data
        .numeric_values()
        .unwrap();
    assert_eq!(values, vec![1.0, 2.0]);
}

#[test]
fn test_resolutions_disagree_on_the_same_pixel_index() {
    let table = Table::new(vec![
        Column::new("x", ColumnData::Int(vec![400])),
        Column::new("y", ColumnData::Int(vec![450])),
    ])
    .unwrap();

    let mut half = Geocoder::new(Resolution::HalfKm, GeocodeConfig::default()).unwrap();
    let mut two = Geocoder::new(Resolution::TwoKm, GeocodeConfig::default()).unwrap();

    let lat_half = latitude_values(&half.apply(&table).unwrap().table, "latitude")[0].unwrap();
    let lat_two = latitude_values(&two.apply(&table).unwrap().table, "latitude")[0].unwrap();

    // Pixel index 400 names a different place at 0.5 km and at 2 km.
    assert!((lat_half - lat_two).abs() > 0.1);
}

#[test]
fn test_payload_and_column_order_preserved() {
    let table = merged_product_table(400, 450, 3, 2, 2);
    let input_values = table
        .column("value")
        .unwrap()
        .data
        .numeric_values()
        .unwrap();

    let mut geocoder = Geocoder::new(Resolution::TwoKm, GeocodeConfig::default()).unwrap();
    let report = geocoder.apply(&table).unwrap();

    assert_eq!(
        report.table.column_names(),
        vec!["Datetime", "value", "latitude", "longitude"]
    );
    let output_values = report
        .table
        .column("value")
        .unwrap()
        .data
        .numeric_values()
        .unwrap();
    assert_eq!(input_values, output_values);
}

#[test]
fn test_custom_column_names() {
    let config = GeocodeConfig {
        pixel_x_column: "col".to_string(),
        pixel_y_column: "row".to_string(),
        latitude_column: "lat".to_string(),
        longitude_column: "lon".to_string(),
        ..Default::default()
    };
    let table = Table::new(vec![
        Column::new("col", ColumnData::Int(vec![400])),
        Column::new("row", ColumnData::Int(vec![450])),
    ])
    .unwrap();

    let mut geocoder = Geocoder::new(Resolution::TwoKm, config).unwrap();
    let report = geocoder.apply(&table).unwrap();
    assert_eq!(report.table.column_names(), vec!["lat", "lon"]);

    // The default names only raise a schema error for this table.
    let mut default = Geocoder::new(Resolution::TwoKm, GeocodeConfig::default()).unwrap();
    let err = default.apply(&table).unwrap_err();
    assert!(matches!(err, GeocodeError::SchemaMismatch(_)));
}

#[test]
fn test_transformed_table_survives_json_roundtrip() {
    let table = merged_product_table(400, 450, 2, 2, 1);
    let mut geocoder = Geocoder::new(Resolution::TwoKm, GeocodeConfig::default()).unwrap();
    let report = geocoder.apply(&table).unwrap();

    // Bit-exact float equality relies on serde_json's float_roundtrip
    // parser; the default parser drifts by up to one ulp.
    let encoded = serde_json::to_string(&report.table).unwrap();
    let decoded: Table = serde_json::from_str(&encoded).unwrap();
    assert_eq!(decoded, report.table);
}
