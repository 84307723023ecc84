//! External program locations.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Names or paths of the external executables.
///
/// Bare names are resolved through `PATH`. When `fusion_dir` is set, the
/// FUSION programs are looked up there instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolPaths {
    /// FUSION installation directory (e.g. `C:\FUSION`).
    pub fusion_dir: Option<PathBuf>,
    pub grid_surface_create: String,
    pub dtm2ascii: String,
    pub ascii2dtm: String,
    pub clip_data: String,
    pub gdal_translate: String,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            fusion_dir: None,
            grid_surface_create: "GridSurfaceCreate".to_string(),
            dtm2ascii: "DTM2ASCII".to_string(),
            ascii2dtm: "ASCII2DTM".to_string(),
            clip_data: "ClipData".to_string(),
            gdal_translate: "gdal_translate".to_string(),
        }
    }
}

impl ToolPaths {
    /// Override fields from `DEWARP_FUSION_DIR` and `DEWARP_TOOL_*`.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(dir) = std::env::var("DEWARP_FUSION_DIR") {
            if !dir.is_empty() {
                self.fusion_dir = Some(PathBuf::from(dir));
            }
        }

        let overrides = [
            ("DEWARP_TOOL_GRIDSURFACECREATE", &mut self.grid_surface_create),
            ("DEWARP_TOOL_DTM2ASCII", &mut self.dtm2ascii),
            ("DEWARP_TOOL_ASCII2DTM", &mut self.ascii2dtm),
            ("DEWARP_TOOL_CLIPDATA", &mut self.clip_data),
            ("DEWARP_TOOL_GDAL_TRANSLATE", &mut self.gdal_translate),
        ];
        for (var, field) in overrides {
            if let Ok(val) = std::env::var(var) {
                *field = val;
            }
        }

        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        let named = [
            ("grid_surface_create", &self.grid_surface_create),
            ("dtm2ascii", &self.dtm2ascii),
            ("ascii2dtm", &self.ascii2dtm),
            ("clip_data", &self.clip_data),
            ("gdal_translate", &self.gdal_translate),
        ];
        for (field, value) in named {
            if value.trim().is_empty() {
                return Err(format!("tool name '{}' must not be empty", field));
            }
        }
        Ok(())
    }

    /// Resolve a FUSION program against `fusion_dir`.
    pub fn fusion_program(&self, name: &str) -> PathBuf {
        match &self.fusion_dir {
            Some(dir) => dir.join(name),
            None => PathBuf::from(name),
        }
    }
}
