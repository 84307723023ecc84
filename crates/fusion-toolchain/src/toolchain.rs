//! The point-cloud toolchain seam.
//!
//! The dewarp pipeline never spawns processes itself; it talks to an
//! implementation of [`PointCloudToolchain`]. Production runs use
//! [`FusionToolchain`](crate::FusionToolchain); tests substitute a fake
//! that writes grids directly.

use std::path::{Path, PathBuf};

use dewarp_common::{BoundingBox, EpsgCode};

use crate::error::ToolResult;

/// Everything needed to correct one point cloud.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrectionRequest {
    /// Cloud to correct.
    pub input: PathBuf,
    /// Where the corrected cloud is written.
    pub output: PathBuf,
    /// Non-negative correction surface, in the toolchain's surface format.
    pub surface: PathBuf,
    /// Signed elevation added back to every point after subtracting the surface.
    pub bias: f64,
    /// Only points inside this extent are kept.
    pub clip: BoundingBox,
}

/// External operations on point clouds and rasters.
pub trait PointCloudToolchain {
    /// Grid the points of `cloud` into an ESRI ASCII grid at `output`.
    fn rasterize(&self, cloud: &Path, cell_size: f64, output: &Path) -> ToolResult<()>;

    /// Convert any supported raster into an ESRI ASCII grid.
    fn import_raster(&self, source: &Path, output: &Path) -> ToolResult<()>;

    /// Convert an ESRI ASCII grid into the surface format the corrector reads.
    fn build_correction_surface(&self, grid: &Path, output: &Path) -> ToolResult<()>;

    /// Subtract the correction surface from every point, add the bias, clip.
    fn apply_correction(&self, request: &CorrectionRequest) -> ToolResult<()>;

    /// Convert an ESRI ASCII grid into a georeferenced GeoTIFF.
    fn export_raster(&self, grid: &Path, output: &Path, crs: EpsgCode, nodata: f64) -> ToolResult<()>;
}
