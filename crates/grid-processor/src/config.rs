//! Configuration for surface processing.

use std::fmt;
use std::str::FromStr;

use dewarp_common::LengthUnit;
use serde::{Deserialize, Serialize};

use crate::error::{GridProcessorError, Result};
use crate::types::ResampleMethod;

/// Tunables for alignment, residual building and correction encoding.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Resampling method for moving surfaces onto the alignment grid.
    pub resample_method: ResampleMethod,

    /// Vertical unit of the rasterized surfaces (and of the point clouds).
    pub surface_unit: LengthUnit,

    /// Unit of the auxiliary prior (difference) map.
    pub prior_unit: LengthUnit,

    /// Unit written to the diagnostic difference raster.
    pub diagnostic_unit: LengthUnit,

    /// Width, in cells, of the border excluded from the point correction.
    ///
    /// The correction is evaluated over the whole grid; points within this
    /// many cells of the grid edge are clipped from the corrected cloud.
    pub clip_margin_cells: f64,

    /// Smallest value of the shifted correction surface.
    pub positive_floor: f64,

    /// Sentinel written for missing cells in output rasters.
    pub nodata_sentinel: f64,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            resample_method: ResampleMethod::Nearest,
            surface_unit: LengthUnit::Meters,
            prior_unit: LengthUnit::Centimeters,
            diagnostic_unit: LengthUnit::Centimeters,
            clip_margin_cells: 1.0,
            positive_floor: 1.0,
            nodata_sentinel: -9999.0,
        }
    }
}

impl ProcessingConfig {
    /// Override fields from `DEWARP_*` environment variables when set.
    ///
    /// A variable that is set but does not parse is an error naming it.
    pub fn with_env_overrides(mut self) -> Result<Self> {
        env_override("DEWARP_RESAMPLE", &mut self.resample_method)?;
        env_override("DEWARP_SURFACE_UNIT", &mut self.surface_unit)?;
        env_override("DEWARP_PRIOR_UNIT", &mut self.prior_unit)?;
        env_override("DEWARP_DIAGNOSTIC_UNIT", &mut self.diagnostic_unit)?;
        env_override("DEWARP_CLIP_MARGIN_CELLS", &mut self.clip_margin_cells)?;
        env_override("DEWARP_NODATA", &mut self.nodata_sentinel)?;
        Ok(self)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if !self.clip_margin_cells.is_finite() || self.clip_margin_cells < 0.0 {
            return Err("clip_margin_cells must be a finite value >= 0".to_string());
        }

        if !self.positive_floor.is_finite() || self.positive_floor <= 0.0 {
            return Err("positive_floor must be > 0".to_string());
        }

        if !self.nodata_sentinel.is_finite() {
            return Err("nodata_sentinel must be finite".to_string());
        }

        Ok(())
    }

    /// Multiplier taking prior-map values into the surface unit.
    pub fn prior_factor(&self) -> f64 {
        self.prior_unit.factor_to(self.surface_unit)
    }

    /// Multiplier taking surface-unit differences into the diagnostic unit.
    pub fn diagnostic_factor(&self) -> f64 {
        self.surface_unit.factor_to(self.diagnostic_unit)
    }
}

fn env_override<T>(var: &str, field: &mut T) -> Result<()>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    if let Ok(val) = std::env::var(var) {
        *field = val.parse().map_err(|e| {
            GridProcessorError::ConfigError(format!("{}='{}': {}", var, val, e))
        })?;
    }
    Ok(())
}
