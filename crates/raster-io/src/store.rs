//! Raster storage abstraction.

use std::fs;
use std::path::Path;

use dewarp_common::{ElevationGrid, EpsgCode};
use tracing::debug;

use crate::ascii_grid;
use crate::error::{RasterError, RasterResult};
use crate::raster::RasterData;

/// Reads and writes single-band rasters.
pub trait RasterStore {
    /// Read a raster with its geotransform, projection and nodata value.
    fn read_grid(&self, path: &Path) -> RasterResult<RasterData>;

    /// Write a raster, replacing any existing file.
    fn write_grid(&self, path: &Path, raster: &RasterData) -> RasterResult<()>;

    /// Read a raster straight into an elevation grid.
    fn read_elevation(&self, path: &Path, default_crs: EpsgCode) -> RasterResult<ElevationGrid> {
        self.read_grid(path)?.into_grid(default_crs)
    }

    /// Write an elevation grid, with NaN cells stored as `nodata`.
    fn write_elevation(&self, path: &Path, grid: &ElevationGrid, nodata: f64) -> RasterResult<()> {
        self.write_grid(path, &RasterData::from_grid(grid, nodata))
    }
}

/// [`RasterStore`] over ESRI ASCII grid files.
///
/// ASCII grids carry no projection; rasters read from disk have `crs`
/// unset and callers supply one.
#[derive(Debug, Clone, Copy, Default)]
pub struct AsciiGridStore;

impl AsciiGridStore {
    pub fn new() -> Self {
        Self
    }
}

impl RasterStore for AsciiGridStore {
    fn read_grid(&self, path: &Path) -> RasterResult<RasterData> {
        let text = fs::read_to_string(path).map_err(|e| RasterError::io(path, e))?;
        let raster = ascii_grid::parse(&text)?;

        debug!(
            path = %path.display(),
            width = raster.width,
            height = raster.height,
            nodata_cells = raster.nodata_count(),
            "Read ASCII grid"
        );

        Ok(raster)
    }

    fn write_grid(&self, path: &Path, raster: &RasterData) -> RasterResult<()> {
        fs::write(path, ascii_grid::format(raster)).map_err(|e| RasterError::io(path, e))?;

        debug!(
            path = %path.display(),
            width = raster.width,
            height = raster.height,
            "Wrote ASCII grid"
        );

        Ok(())
    }
}
