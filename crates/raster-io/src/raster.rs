//! In-memory raster representation.

use dewarp_common::{ElevationGrid, EpsgCode, GeoTransform, GridSpec};

use crate::error::RasterResult;

/// A single-band raster as stored on disk.
///
/// Values are row-major from the top (north) row. Missing cells hold the
/// `nodata` value, not NaN.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterData {
    pub values: Vec<f64>,
    pub width: usize,
    pub height: usize,
    pub geotransform: GeoTransform,
    /// Projection, when the format carries one.
    pub crs: Option<EpsgCode>,
    pub nodata: Option<f64>,
}

impl RasterData {
    /// Raster view of an elevation grid, with NaN cells written as `nodata`.
    pub fn from_grid(grid: &ElevationGrid, nodata: f64) -> Self {
        let spec = grid.spec();
        Self {
            values: grid
                .values()
                .iter()
                .map(|&v| if v.is_finite() { v } else { nodata })
                .collect(),
            width: spec.width,
            height: spec.height,
            geotransform: spec.geotransform(),
            crs: Some(spec.crs),
            nodata: Some(nodata),
        }
    }

    /// Convert into an elevation grid, mapping `nodata` cells to NaN.
    ///
    /// `default_crs` is used when the raster carries no projection.
    pub fn into_grid(self, default_crs: EpsgCode) -> RasterResult<ElevationGrid> {
        let crs = self.crs.unwrap_or(default_crs);
        let spec = GridSpec::from_geotransform(&self.geotransform, self.width, self.height, crs)?;

        let nodata = self.nodata;
        let values = self
            .values
            .into_iter()
            .map(|v| match nodata {
                Some(nd) if v == nd => f64::NAN,
                _ => v,
            })
            .collect();

        Ok(ElevationGrid::new(spec, values)?)
    }

    /// Number of cells equal to the nodata value.
    pub fn nodata_count(&self) -> usize {
        match self.nodata {
            Some(nd) => self.values.iter().filter(|&&v| v == nd).count(),
            None => 0,
        }
    }
}
