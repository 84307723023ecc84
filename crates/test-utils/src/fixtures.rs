//! Common test fixtures for dewarp tests.
//!
//! Grid geometries and file contents that represent the usual shapes of
//! rasterized LiDAR tiles.

use dewarp_common::{BoundingBox, EpsgCode, GridSpec};

/// 4x3 grid of 1 m cells with its lower-left corner at the origin.
pub fn small_spec() -> GridSpec {
    GridSpec::from_extent(
        BoundingBox::new(0.0, 0.0, 4.0, 3.0),
        1.0,
        1.0,
        EpsgCode::default(),
    )
    .expect("valid fixture grid")
}

/// 40x30 grid of 2 m cells on UTM-scale coordinates.
pub fn utm_tile_spec() -> GridSpec {
    GridSpec::from_extent(
        BoundingBox::new(412_300.0, 3_512_820.0, 412_380.0, 3_512_880.0),
        2.0,
        2.0,
        EpsgCode::default(),
    )
    .expect("valid fixture grid")
}

/// Same tile as [`utm_tile_spec`] at a coarser 4 m resolution.
pub fn utm_tile_coarse_spec() -> GridSpec {
    GridSpec::from_extent(
        BoundingBox::new(412_300.0, 3_512_820.0, 412_380.0, 3_512_880.0),
        4.0,
        4.0,
        EpsgCode::default(),
    )
    .expect("valid fixture grid")
}

/// A 3x2 ESRI ASCII grid with one nodata cell.
///
/// Lower-left corner (100, 200), 10 unit cells, values row-major from
/// the top row.
pub const SMALL_ASCII_GRID: &str = "\
ncols        3
nrows        2
xllcorner    100.0
yllcorner    200.0
cellsize     10.0
NODATA_value -9999
1.5 2.5 -9999
4.0 5.0 6.0
";

/// The same grid as [`SMALL_ASCII_GRID`] anchored on cell centers.
pub const SMALL_ASCII_GRID_CENTER: &str = "\
ncols        3
nrows        2
xllcenter    105.0
yllcenter    205.0
cellsize     10.0
NODATA_value -9999
1.5 2.5 -9999
4.0 5.0 6.0
";
