//! File-level tests for the ASCII grid store.

use dewarp_common::{EpsgCode, GeoTransform};
use raster_io::{AsciiGridStore, RasterError, RasterStore};
use test_utils::{fixtures, planar_surface, scratch_dir, with_holes, write_fixture};

// ============================================================================
// Reading
// ============================================================================

#[test]
fn test_read_corner_and_center_headers_agree() {
    let dir = scratch_dir();
    let corner = write_fixture(dir.path(), "corner.asc", fixtures::SMALL_ASCII_GRID);
    let center = write_fixture(dir.path(), "center.asc", fixtures::SMALL_ASCII_GRID_CENTER);
    let store = AsciiGridStore::new();

    let a = store.read_grid(&corner).unwrap();
    let b = store.read_grid(&center).unwrap();

    assert_eq!(a, b);
    assert_eq!(a.geotransform, GeoTransform::north_up(100.0, 220.0, 10.0, 10.0));
    assert_eq!(a.nodata, Some(-9999.0));
}

#[test]
fn test_read_elevation_marks_nodata_missing() {
    let dir = scratch_dir();
    let path = write_fixture(dir.path(), "surf.asc", fixtures::SMALL_ASCII_GRID);

    let grid = AsciiGridStore::new()
        .read_elevation(&path, EpsgCode::new(26912))
        .unwrap();

    assert_eq!(grid.spec().crs, EpsgCode::new(26912));
    assert_eq!(grid.valid_count(), 5);
    assert!(grid.get(2, 0).unwrap().is_nan());
    assert_eq!(grid.get(0, 1), Some(4.0));
    // Top-left cell center
    assert_eq!(grid.spec().cell_center(0, 0), (105.0, 215.0));
}

#[test]
fn test_read_missing_file_is_io_error() {
    let dir = scratch_dir();
    let err = AsciiGridStore::new()
        .read_grid(&dir.path().join("absent.asc"))
        .unwrap_err();
    assert!(matches!(err, RasterError::Io { .. }));
}

#[test]
fn test_overflowing_dimensions_rejected() {
    let dir = scratch_dir();
    let path = write_fixture(
        dir.path(),
        "corrupt.asc",
        "ncols 4294967296\nnrows 4294967296\nxllcorner 0\nyllcorner 0\ncellsize 1\n1 2 3\n",
    );

    let err = AsciiGridStore::new().read_grid(&path).unwrap_err();
    // usize is too narrow for either dimension on 32-bit targets
    assert!(matches!(
        err,
        RasterError::Dimensions { .. } | RasterError::Parse { line: 1, .. }
    ));
}

#[test]
fn test_oversized_header_with_short_body_is_value_count_error() {
    let dir = scratch_dir();
    let path = write_fixture(
        dir.path(),
        "truncated.asc",
        "ncols 200000000\nnrows 200000000\nxllcorner 0\nyllcorner 0\ncellsize 1\n1 2 3\n",
    );

    let err = AsciiGridStore::new().read_grid(&path).unwrap_err();
    assert!(matches!(
        err,
        RasterError::ValueCount {
            width: 200_000_000,
            height: 200_000_000,
            actual: 3,
            ..
        } | RasterError::Dimensions { .. }
    ));
}

// ============================================================================
// Writing
// ============================================================================

#[test]
fn test_write_then_read_preserves_geometry_and_holes() {
    let dir = scratch_dir();
    let path = dir.path().join("out.asc");
    let spec = fixtures::utm_tile_spec();
    let grid = with_holes(&planar_surface(spec, 0.125, -0.25, 1000.0), 9, 4);
    let store = AsciiGridStore::new();

    store.write_elevation(&path, &grid, -9999.0).unwrap();
    let back = store.read_elevation(&path, spec.crs).unwrap();

    assert!(back.spec().same_geometry(&spec));
    assert_eq!(back.valid_count(), grid.valid_count());
    for (a, b) in grid.values().iter().zip(back.values()) {
        assert!(a.is_nan() && b.is_nan() || a == b);
    }
}
