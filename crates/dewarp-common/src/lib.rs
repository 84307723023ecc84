//! Common types shared across the dewarp workspace.
//!
//! Grid geometry ([`GridSpec`], [`GeoTransform`], [`BoundingBox`]), the
//! [`ElevationGrid`] container, CRS identifiers and named length units.

pub mod bbox;
pub mod crs;
pub mod error;
pub mod geotransform;
pub mod grid;
pub mod units;

pub use bbox::BoundingBox;
pub use crs::{CrsParseError, EpsgCode};
pub use error::{GridError, GridResult};
pub use geotransform::GeoTransform;
pub use grid::{ElevationGrid, GridSpec};
pub use units::{LengthUnit, UnitParseError};
