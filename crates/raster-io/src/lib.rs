//! Raster file I/O for elevation grids.
//!
//! The external gridding tools exchange surfaces as ESRI ASCII grids, so
//! that is the one format read and written natively. Anything else is
//! converted to or from it by the toolchain (`gdal_translate`).
//!
//! # Example
//!
//! ```ignore
//! use raster_io::{AsciiGridStore, RasterStore};
//!
//! let store = AsciiGridStore::new();
//! let grid = store.read_elevation(Path::new("surf.asc"), EpsgCode::default())?;
//! store.write_elevation(Path::new("copy.asc"), &grid, -9999.0)?;
//! ```

pub mod ascii_grid;
pub mod error;
pub mod raster;
pub mod store;

pub use error::{RasterError, RasterResult};
pub use raster::RasterData;
pub use store::{AsciiGridStore, RasterStore};
