//! Wrappers around the external point-cloud and raster tools.
//!
//! Gridding and point-level correction are delegated to the FUSION
//! command-line programs; format conversion to `gdal_translate`:
//!
//! ```text
//! rasterize                 GridSurfaceCreate ─► DTM2ASCII ─► .asc
//! import_raster             gdal_translate -of AAIGrid      ─► .asc
//! build_correction_surface  ASCII2DTM                       ─► .dtm
//! apply_correction          ClipData /height /dtm /biaselev ─► cloud
//! export_raster             gdal_translate -of GTiff        ─► .tif
//! ```
//!
//! Each tool is expected to either succeed and leave a non-empty output
//! file, or fail. Tools that exit cleanly without output are reported as
//! [`ToolError::MissingOutput`].

pub mod command;
pub mod config;
pub mod error;
pub mod fusion;
pub mod params;
pub mod toolchain;

pub use command::ToolCommand;
pub use config::ToolPaths;
pub use error::{ToolError, ToolResult};
pub use fusion::FusionToolchain;
pub use params::{
    CoordinateSystem, FusionUnit, GridSurfaceParams, HorizontalDatum, ParamsParseError,
    VerticalDatum,
};
pub use toolchain::{CorrectionRequest, PointCloudToolchain};
