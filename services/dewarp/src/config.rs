//! Dewarp configuration.
//!
//! Values are resolved once at startup, lowest precedence first:
//!
//! 1. built-in defaults
//! 2. YAML file given with `--config`
//! 3. `DEWARP_*` environment variables (a `.env` file is honoured)

use std::path::Path;

use dewarp_common::EpsgCode;
use fusion_toolchain::{GridSurfaceParams, ToolPaths};
use grid_processor::ProcessingConfig;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{DewarpError, Result};

/// Georeferencing, gridding and processing settings for a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DewarpConfig {
    /// Projection assigned to every grid and output raster.
    pub crs: EpsgCode,

    /// FUSION surface parameters (`xyunits zunits coordsys zone hdatum vdatum`).
    pub grid_params: GridSurfaceParams,

    /// Rasterization cell size, in the horizontal unit of the clouds.
    pub cell_size: f64,

    pub processing: ProcessingConfig,

    pub tools: ToolPaths,
}

impl Default for DewarpConfig {
    fn default() -> Self {
        Self {
            crs: EpsgCode::default(),
            grid_params: GridSurfaceParams::default(),
            cell_size: 1.0,
            processing: ProcessingConfig::default(),
            tools: ToolPaths::default(),
        }
    }
}

impl DewarpConfig {
    /// Resolve configuration from defaults, an optional YAML file and the
    /// environment, then validate it.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => {
                let content = std::fs::read_to_string(path)
                    .map_err(|e| DewarpError::io_at("read config", path, e))?;
                info!(path = %path.display(), "Loaded configuration file");
                Self::from_yaml_str(&content)?
            }
            None => Self::default(),
        };

        let config = config.with_env_overrides()?;
        config.validate().map_err(DewarpError::Config)?;
        Ok(config)
    }

    /// Parse a YAML document; missing fields keep their defaults.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        serde_yaml::from_str(content)
            .map_err(|e| DewarpError::Config(format!("invalid config YAML: {}", e)))
    }

    /// Apply `DEWARP_*` environment overrides.
    ///
    /// A variable that is set but malformed is a configuration error.
    pub fn with_env_overrides(mut self) -> Result<Self> {
        if let Ok(val) = std::env::var("DEWARP_CRS") {
            self.crs = val
                .parse()
                .map_err(|e| DewarpError::Config(format!("DEWARP_CRS: {}", e)))?;
        }

        if let Ok(val) = std::env::var("DEWARP_GRID_PARAMS") {
            self.grid_params = val
                .parse()
                .map_err(|e| DewarpError::Config(format!("DEWARP_GRID_PARAMS: {}", e)))?;
        }

        if let Ok(val) = std::env::var("DEWARP_CELL_SIZE") {
            self.cell_size = val
                .parse()
                .map_err(|_| DewarpError::Config(format!("DEWARP_CELL_SIZE: invalid number '{}'", val)))?;
        }

        self.processing = self.processing.with_env_overrides()?;
        self.tools = self.tools.with_env_overrides();
        Ok(self)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if !self.cell_size.is_finite() || self.cell_size <= 0.0 {
            return Err(format!("cell_size must be > 0, got {}", self.cell_size));
        }

        self.processing.validate()?;
        self.tools.validate()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dewarp_common::LengthUnit;
    use grid_processor::ResampleMethod;

    #[test]
    fn test_defaults() {
        let config = DewarpConfig::default();
        assert_eq!(config.crs, EpsgCode::new(31966));
        assert_eq!(config.grid_params.to_string(), "m m 1 12 2 2");
        assert_eq!(config.cell_size, 1.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = r#"
crs: 32611
grid_params: "m m 1 11 2 2"
processing:
  resample_method: bilinear
  prior_unit: meters
tools:
  fusion_dir: /opt/fusion
"#;
        let config = DewarpConfig::from_yaml_str(yaml).unwrap();

        assert_eq!(config.crs, EpsgCode::new(32611));
        assert_eq!(config.grid_params.zone, 11);
        assert_eq!(config.cell_size, 1.0);
        assert_eq!(config.processing.resample_method, ResampleMethod::Bilinear);
        assert_eq!(config.processing.prior_unit, LengthUnit::Meters);
        assert_eq!(config.processing.clip_margin_cells, 1.0);
        assert_eq!(config.tools.clip_data, "ClipData");
        assert!(config.tools.fusion_dir.is_some());
    }

    #[test]
    fn test_invalid_grid_params_in_yaml() {
        assert!(DewarpConfig::from_yaml_str("grid_params: \"m m 1\"").is_err());
    }

    #[test]
    fn test_validation() {
        let mut config = DewarpConfig::default();
        config.cell_size = 0.0;
        assert!(config.validate().is_err());

        let mut config = DewarpConfig::default();
        config.processing.clip_margin_cells = -2.0;
        assert!(config.validate().is_err());

        let mut config = DewarpConfig::default();
        config.tools.ascii2dtm.clear();
        assert!(config.validate().is_err());
    }
}
