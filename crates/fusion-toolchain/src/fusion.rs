//! FUSION / GDAL implementation of the toolchain.

use std::path::Path;

use dewarp_common::EpsgCode;
use tracing::info;

use crate::command::{ensure_nonempty_input, ensure_output, ToolCommand};
use crate::config::ToolPaths;
use crate::error::ToolResult;
use crate::params::GridSurfaceParams;
use crate::toolchain::{CorrectionRequest, PointCloudToolchain};

/// Drives the FUSION command-line programs and `gdal_translate`.
#[derive(Debug, Clone)]
pub struct FusionToolchain {
    tools: ToolPaths,
    params: GridSurfaceParams,
}

impl FusionToolchain {
    pub fn new(tools: ToolPaths, params: GridSurfaceParams) -> Self {
        Self { tools, params }
    }

    pub fn tools(&self) -> &ToolPaths {
        &self.tools
    }

    pub fn params(&self) -> &GridSurfaceParams {
        &self.params
    }

    /// `GridSurfaceCreate <surface.dtm> <cellsize> <params...> <cloud>`
    pub fn grid_surface_create_command(&self, cloud: &Path, cell_size: f64, dtm: &Path) -> ToolCommand {
        ToolCommand::new(self.tools.fusion_program(&self.tools.grid_surface_create))
            .path_arg(dtm)
            .arg(cell_size.to_string())
            .args(self.params.to_args())
            .path_arg(cloud)
    }

    /// `DTM2ASCII <surface.dtm> <surface.asc>`
    pub fn dtm2ascii_command(&self, dtm: &Path, output: &Path) -> ToolCommand {
        ToolCommand::new(self.tools.fusion_program(&self.tools.dtm2ascii))
            .path_arg(dtm)
            .path_arg(output)
    }

    /// `ASCII2DTM <surface.dtm> <params...> <grid.asc>`
    pub fn ascii2dtm_command(&self, grid: &Path, output: &Path) -> ToolCommand {
        ToolCommand::new(self.tools.fusion_program(&self.tools.ascii2dtm))
            .path_arg(output)
            .args(self.params.to_args())
            .path_arg(grid)
    }

    /// `ClipData /height /dtm:<surface> /biaselev:<bias> <in> <out> <minx> <miny> <maxx> <maxy>`
    pub fn clip_data_command(&self, request: &CorrectionRequest) -> ToolCommand {
        let clip = &request.clip;
        ToolCommand::new(self.tools.fusion_program(&self.tools.clip_data))
            .arg("/height")
            .arg(format!("/dtm:{}", request.surface.display()))
            .arg(format!("/biaselev:{}", request.bias))
            .path_arg(&request.input)
            .path_arg(&request.output)
            .args([
                clip.min_x.to_string(),
                clip.min_y.to_string(),
                clip.max_x.to_string(),
                clip.max_y.to_string(),
            ])
    }

    fn gdal_translate(&self) -> ToolCommand {
        ToolCommand::new(&self.tools.gdal_translate)
    }
}

impl PointCloudToolchain for FusionToolchain {
    fn rasterize(&self, cloud: &Path, cell_size: f64, output: &Path) -> ToolResult<()> {
        ensure_nonempty_input(cloud)?;

        let dtm = output.with_extension("dtm");
        let create = self.grid_surface_create_command(cloud, cell_size, &dtm);
        create.run()?;
        ensure_output(&create.tool_name(), &dtm)?;

        let export = self.dtm2ascii_command(&dtm, output);
        export.run()?;
        ensure_output(&export.tool_name(), output)
    }

    fn import_raster(&self, source: &Path, output: &Path) -> ToolResult<()> {
        let cmd = self
            .gdal_translate()
            .args(["-of", "AAIGrid"])
            .path_arg(source)
            .path_arg(output);
        cmd.run()?;
        ensure_output(&cmd.tool_name(), output)
    }

    fn build_correction_surface(&self, grid: &Path, output: &Path) -> ToolResult<()> {
        let cmd = self.ascii2dtm_command(grid, output);
        cmd.run()?;
        ensure_output(&cmd.tool_name(), output)
    }

    fn apply_correction(&self, request: &CorrectionRequest) -> ToolResult<()> {
        ensure_nonempty_input(&request.input)?;

        let cmd = self.clip_data_command(request);
        cmd.run()?;
        ensure_output(&cmd.tool_name(), &request.output)?;

        info!(
            input = %request.input.display(),
            output = %request.output.display(),
            bias = request.bias,
            "Applied correction surface"
        );
        Ok(())
    }

    fn export_raster(&self, grid: &Path, output: &Path, crs: EpsgCode, nodata: f64) -> ToolResult<()> {
        let cmd = self
            .gdal_translate()
            .args(["-of", "GTiff"])
            .arg("-a_srs")
            .arg(crs.to_string())
            .arg("-a_nodata")
            .arg(nodata.to_string())
            .path_arg(grid)
            .path_arg(output);
        cmd.run()?;
        ensure_output(&cmd.tool_name(), output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dewarp_common::BoundingBox;
    use std::path::PathBuf;

    fn toolchain() -> FusionToolchain {
        FusionToolchain::new(ToolPaths::default(), GridSurfaceParams::default())
    }

    #[test]
    fn test_grid_surface_create_arguments() {
        let cmd = toolchain().grid_surface_create_command(
            Path::new("ground.laz"),
            1.0,
            Path::new("/tmp/w/surf.dtm"),
        );
        assert_eq!(
            cmd.to_string(),
            "GridSurfaceCreate /tmp/w/surf.dtm 1 m m 1 12 2 2 ground.laz"
        );
    }

    #[test]
    fn test_ascii2dtm_arguments() {
        let cmd = toolchain()
            .ascii2dtm_command(Path::new("/tmp/w/correction.asc"), Path::new("/tmp/w/correction.dtm"));
        assert_eq!(
            cmd.to_string(),
            "ASCII2DTM /tmp/w/correction.dtm m m 1 12 2 2 /tmp/w/correction.asc"
        );
    }

    #[test]
    fn test_clip_data_arguments() {
        let request = CorrectionRequest {
            input: PathBuf::from("in.laz"),
            output: PathBuf::from("out.laz"),
            surface: PathBuf::from("/tmp/w/correction.dtm"),
            bias: 2.5,
            clip: BoundingBox::new(101.0, 201.0, 149.0, 249.0),
        };
        let cmd = toolchain().clip_data_command(&request);
        assert_eq!(
            cmd.get_args(),
            &[
                "/height",
                "/dtm:/tmp/w/correction.dtm",
                "/biaselev:2.5",
                "in.laz",
                "out.laz",
                "101",
                "201",
                "149",
                "249",
            ]
        );
    }

    #[test]
    fn test_fusion_dir_used_for_fusion_tools_only() {
        let tools = ToolPaths {
            fusion_dir: Some(PathBuf::from("/opt/fusion")),
            ..Default::default()
        };
        let chain = FusionToolchain::new(tools, GridSurfaceParams::default());
        let cmd = chain.dtm2ascii_command(Path::new("a.dtm"), Path::new("a.asc"));
        assert_eq!(cmd.program(), Path::new("/opt/fusion/DTM2ASCII"));
        assert_eq!(chain.gdal_translate().program(), Path::new("gdal_translate"));
    }

    #[test]
    fn test_rasterize_rejects_empty_cloud() {
        let dir = test_utils::scratch_dir();
        let cloud = test_utils::write_fixture(dir.path(), "empty.laz", "");
        let err = toolchain()
            .rasterize(&cloud, 1.0, &dir.path().join("surf.asc"))
            .unwrap_err();
        assert!(matches!(err, crate::ToolError::EmptyInput { .. }));
    }
}
