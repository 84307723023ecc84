//! Full dewarp runs against an in-memory toolchain.
//!
//! The fake toolchain "rasterizes" a cloud by writing a pre-registered
//! grid, and "corrects" a cloud by writing a marker file, recording every
//! request it receives.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use dewarp::{DewarpConfig, DewarpError, DewarpPipeline, DewarpRequest, OutputSuffix};
use dewarp_common::{ElevationGrid, EpsgCode};
use fusion_toolchain::{CorrectionRequest, PointCloudToolchain, ToolError, ToolResult};
use raster_io::{AsciiGridStore, RasterStore};
use test_utils::{
    assert_approx_eq, constant_surface, fixtures, planar_surface, scratch_dir, terrain_surface,
    touch_cloud, with_holes, write_fixture,
};

#[derive(Default)]
struct FakeToolchain {
    surfaces: HashMap<PathBuf, ElevationGrid>,
    fail_correction: bool,
    calls: RefCell<Vec<String>>,
    corrections: RefCell<Vec<CorrectionRequest>>,
}

impl FakeToolchain {
    fn with_surface(mut self, path: &Path, grid: ElevationGrid) -> Self {
        self.surfaces.insert(path.to_path_buf(), grid);
        self
    }

    fn write(&self, path: &Path, grid: &ElevationGrid) {
        AsciiGridStore::new()
            .write_elevation(path, grid, -9999.0)
            .unwrap();
    }

    fn record(&self, call: &str) {
        self.calls.borrow_mut().push(call.to_string());
    }
}

impl PointCloudToolchain for FakeToolchain {
    fn rasterize(&self, cloud: &Path, _cell_size: f64, output: &Path) -> ToolResult<()> {
        self.record("rasterize");
        let grid = self
            .surfaces
            .get(cloud)
            .ok_or_else(|| ToolError::missing_output("GridSurfaceCreate", output))?;
        self.write(output, grid);
        Ok(())
    }

    fn import_raster(&self, source: &Path, output: &Path) -> ToolResult<()> {
        self.record("import_raster");
        self.rasterize(source, 0.0, output)
    }

    fn build_correction_surface(&self, grid: &Path, output: &Path) -> ToolResult<()> {
        self.record("build_correction_surface");
        fs::copy(grid, output).unwrap();
        Ok(())
    }

    fn apply_correction(&self, request: &CorrectionRequest) -> ToolResult<()> {
        self.record("apply_correction");
        self.corrections.borrow_mut().push(request.clone());
        if self.fail_correction {
            fs::write(&request.output, "partial").unwrap();
            return Err(ToolError::Failed {
                tool: "ClipData".to_string(),
                code: Some(1),
                stderr: "cannot read input".to_string(),
            });
        }
        let original = fs::read_to_string(&request.input).unwrap();
        fs::write(&request.output, format!("{} corrected", original)).unwrap();
        Ok(())
    }

    fn export_raster(&self, grid: &Path, output: &Path, _crs: EpsgCode, _nodata: f64) -> ToolResult<()> {
        self.record("export_raster");
        fs::copy(grid, output).unwrap();
        Ok(())
    }
}

struct Scene {
    dir: tempfile::TempDir,
    input: PathBuf,
    reference: PathBuf,
}

fn scene() -> Scene {
    let dir = scratch_dir();
    let input = write_fixture(dir.path(), "ground.laz", "input");
    let reference = write_fixture(dir.path(), "reference.laz", "reference");
    Scene {
        dir,
        input,
        reference,
    }
}

/// Input = terrain + a tilted plane; reference = terrain.
fn tilted_toolchain(scene: &Scene) -> FakeToolchain {
    let spec = fixtures::utm_tile_spec();
    let terrain = terrain_surface(spec, 1500.0);
    let warp = planar_surface(spec, 0.01, -0.005, 0.4);
    let input = terrain.zip_map(&warp, |t, w| t + w).unwrap();

    FakeToolchain::default()
        .with_surface(&scene.input, input)
        .with_surface(&scene.reference, terrain)
}

// ============================================================================
// Successful runs
// ============================================================================

#[test]
fn test_tagged_suffix_writes_new_cloud() {
    let scene = scene();
    let toolchain = tilted_toolchain(&scene);
    let config = DewarpConfig::default();
    let request = DewarpRequest::new(
        scene.input.clone(),
        scene.reference.clone(),
        1,
        OutputSuffix::parse("dw").unwrap(),
    );

    let outcome = DewarpPipeline::new(&config, &toolchain).run(&request).unwrap();

    let expected = scene.dir.path().join("ground_dw.laz");
    assert_eq!(outcome.corrected, vec![expected.clone()]);
    assert_eq!(fs::read_to_string(&expected).unwrap(), "input corrected");
    assert_eq!(fs::read_to_string(&scene.input).unwrap(), "input");

    let model = &outcome.fit.model;
    assert_approx_eq!(model.coefficient(0, 0), 0.4, 1e-6);
    assert_approx_eq!(model.coefficient(1, 0), 0.01, 1e-9);
    assert_approx_eq!(model.coefficient(0, 1), -0.005, 1e-9);
    assert_eq!(outcome.bias, -outcome.shift);
    assert!(outcome.workdir.is_none());
}

#[test]
fn test_correction_request_carries_bias_and_clip() {
    let scene = scene();
    let toolchain = tilted_toolchain(&scene);
    let config = DewarpConfig::default();
    let request = DewarpRequest::new(
        scene.input.clone(),
        scene.reference.clone(),
        1,
        OutputSuffix::parse("dw").unwrap(),
    );

    let outcome = DewarpPipeline::new(&config, &toolchain).run(&request).unwrap();

    let corrections = toolchain.corrections.borrow();
    assert_eq!(corrections.len(), 1);
    let sent = &corrections[0];
    assert_eq!(sent.bias, outcome.bias);
    // Grid extent (412300, 3512820, 412380, 3512880) at 2 m, inset one cell
    assert_eq!(sent.clip.min_x, 412_302.0);
    assert_eq!(sent.clip.min_y, 3_512_822.0);
    assert_eq!(sent.clip.max_x, 412_378.0);
    assert_eq!(sent.clip.max_y, 3_512_878.0);
}

#[test]
fn test_encoded_surface_is_positive_with_floor_one() {
    let scene = scene();
    let toolchain = tilted_toolchain(&scene);
    let config = DewarpConfig::default();
    let mut request = DewarpRequest::new(
        scene.input.clone(),
        scene.reference.clone(),
        1,
        OutputSuffix::parse("dw").unwrap(),
    );
    request.keep_workdir = true;

    let outcome = DewarpPipeline::new(&config, &toolchain).run(&request).unwrap();
    let workdir = outcome.workdir.clone().unwrap();

    let surface = AsciiGridStore::new()
        .read_elevation(&workdir.join("correction.asc"), config.crs)
        .unwrap();
    assert_eq!(surface.valid_count(), fixtures::utm_tile_spec().len());
    assert_approx_eq!(surface.min_valid().unwrap(), 1.0, 1e-9);

    // Surface + vcorr reproduces the fitted correction
    let (x, y) = surface.spec().cell_center(5, 7);
    let value = surface.get(5, 7).unwrap();
    assert_approx_eq!(value + outcome.shift, outcome.fit.model.evaluate(x, y), 1e-9);

    fs::remove_dir_all(workdir).unwrap();
}

#[test]
fn test_in_place_suffix_replaces_input() {
    let scene = scene();
    let toolchain = tilted_toolchain(&scene);
    let config = DewarpConfig::default();
    let request = DewarpRequest::new(
        scene.input.clone(),
        scene.reference.clone(),
        2,
        OutputSuffix::parse("None").unwrap(),
    );

    let outcome = DewarpPipeline::new(&config, &toolchain).run(&request).unwrap();

    assert_eq!(outcome.corrected, vec![scene.input.clone()]);
    assert_eq!(fs::read_to_string(&scene.input).unwrap(), "input corrected");
    assert!(!scene.dir.path().join("ground_tmp.laz").exists());

    // The tool read from the staged name and wrote the original one
    let corrections = toolchain.corrections.borrow();
    assert_eq!(corrections[0].input, scene.dir.path().join("ground_tmp.laz"));
    assert_eq!(corrections[0].output, scene.input);
}

#[test]
fn test_additional_clouds_share_the_correction() {
    let scene = scene();
    let canopy = write_fixture(scene.dir.path(), "canopy.laz", "canopy");
    let toolchain = tilted_toolchain(&scene);
    let config = DewarpConfig::default();
    let mut request = DewarpRequest::new(
        scene.input.clone(),
        scene.reference.clone(),
        1,
        OutputSuffix::parse("dw").unwrap(),
    );
    request.additional_clouds = vec![canopy.clone()];

    let outcome = DewarpPipeline::new(&config, &toolchain).run(&request).unwrap();

    assert_eq!(
        outcome.corrected,
        vec![
            scene.dir.path().join("ground_dw.laz"),
            scene.dir.path().join("canopy_dw.laz"),
        ]
    );
    let corrections = toolchain.corrections.borrow();
    assert_eq!(corrections[0].bias, corrections[1].bias);
    assert_eq!(corrections[0].surface, corrections[1].surface);
    assert_eq!(corrections[0].clip, corrections[1].clip);
}

#[test]
fn test_difference_map_in_centimeters() {
    let scene = scene();
    let snow_map = write_fixture(scene.dir.path(), "snow.tif", "tif");
    let spec = fixtures::utm_tile_spec();
    let ground = terrain_surface(spec, 2200.0);
    // Input surveyed over 30 cm of snow, 5 cm above the reference datum
    let input = ground.map(|z| z + 0.30 + 0.05);

    let toolchain = FakeToolchain::default()
        .with_surface(&scene.input, input)
        .with_surface(&scene.reference, ground)
        .with_surface(&snow_map, constant_surface(fixtures::utm_tile_coarse_spec(), 30.0));
    let config = DewarpConfig::default();
    let mut request = DewarpRequest::new(
        scene.input.clone(),
        scene.reference.clone(),
        0,
        OutputSuffix::parse("dw").unwrap(),
    );
    request.difference_map = Some(snow_map);

    let outcome = DewarpPipeline::new(&config, &toolchain).run(&request).unwrap();

    assert_approx_eq!(outcome.fit.model.coefficient(0, 0), 0.05, 1e-9);
    assert!(toolchain
        .calls
        .borrow()
        .contains(&"import_raster".to_string()));
}

#[test]
fn test_output_raster_reports_remaining_difference() {
    let scene = scene();
    let toolchain = tilted_toolchain(&scene);
    let config = DewarpConfig::default();
    let mut request = DewarpRequest::new(
        scene.input.clone(),
        scene.reference.clone(),
        1,
        OutputSuffix::parse("dw").unwrap(),
    );
    request.output_raster = true;

    let outcome = DewarpPipeline::new(&config, &toolchain).run(&request).unwrap();

    let raster = scene.dir.path().join("ground_dw_diff.tif");
    assert_eq!(outcome.diff_raster.as_deref(), Some(raster.as_path()));
    assert!(raster.exists());

    let stats = outcome.diagnostic_stats.unwrap();
    assert_eq!(stats.valid_cells, fixtures::utm_tile_spec().len());
    // Centimeters; the warp is planar so an order-1 fit removes it
    assert!(stats.rms < 1e-4);
}

#[test]
fn test_sparse_input_surface_still_fits() {
    let scene = scene();
    let spec = fixtures::utm_tile_spec();
    let terrain = terrain_surface(spec, 10.0);
    let input = with_holes(&terrain.map(|z| z + 1.25), 3, 1);
    let toolchain = FakeToolchain::default()
        .with_surface(&scene.input, input)
        .with_surface(&scene.reference, terrain);
    let config = DewarpConfig::default();
    let request = DewarpRequest::new(
        scene.input.clone(),
        scene.reference.clone(),
        0,
        OutputSuffix::parse("dw").unwrap(),
    );

    let outcome = DewarpPipeline::new(&config, &toolchain).run(&request).unwrap();

    assert_eq!(outcome.fit.sample_count, spec.len() - spec.len() / 3);
    assert_approx_eq!(outcome.fit.model.coefficient(0, 0), 1.25, 1e-9);
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn test_missing_inputs_reported_together_without_side_effects() {
    let scene = scene();
    let missing_reference = scene.dir.path().join("absent_reference.laz");
    let missing_map = scene.dir.path().join("absent_map.tif");
    let present_canopy = touch_cloud(scene.dir.path(), "canopy.laz");
    let missing_canopy = scene.dir.path().join("absent_canopy.laz");

    let toolchain = FakeToolchain::default();
    let config = DewarpConfig::default();
    let mut request = DewarpRequest::new(
        scene.input.clone(),
        missing_reference.clone(),
        1,
        OutputSuffix::InPlace,
    );
    request.difference_map = Some(missing_map.clone());
    request.additional_clouds = vec![present_canopy, missing_canopy.clone()];

    let err = DewarpPipeline::new(&config, &toolchain)
        .run(&request)
        .unwrap_err();

    match err {
        DewarpError::MissingInputs(paths) => {
            assert_eq!(paths, vec![missing_reference, missing_map, missing_canopy])
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(toolchain.calls.borrow().is_empty());
    assert_eq!(fs::read_to_string(&scene.input).unwrap(), "input");
}

#[test]
fn test_failed_in_place_correction_restores_input() {
    let scene = scene();
    let mut toolchain = tilted_toolchain(&scene);
    toolchain.fail_correction = true;
    let config = DewarpConfig::default();
    let request = DewarpRequest::new(
        scene.input.clone(),
        scene.reference.clone(),
        1,
        OutputSuffix::InPlace,
    );

    let err = DewarpPipeline::new(&config, &toolchain)
        .run(&request)
        .unwrap_err();

    assert!(matches!(err, DewarpError::Tool(ToolError::Failed { .. })));
    assert_eq!(fs::read_to_string(&scene.input).unwrap(), "input");
    assert!(!scene.dir.path().join("ground_tmp.laz").exists());
}

#[test]
fn test_order_above_limit_rejected_before_tools_run() {
    let scene = scene();
    let toolchain = tilted_toolchain(&scene);
    let config = DewarpConfig::default();
    let request = DewarpRequest::new(
        scene.input.clone(),
        scene.reference.clone(),
        grid_processor::MAX_ORDER + 1,
        OutputSuffix::parse("dw").unwrap(),
    );

    let err = DewarpPipeline::new(&config, &toolchain)
        .run(&request)
        .unwrap_err();

    assert!(matches!(err, DewarpError::Processing(_)));
    assert!(toolchain.calls.borrow().is_empty());
}

#[test]
fn test_rasterize_failure_is_fatal() {
    let scene = scene();
    // No surfaces registered: the fake reports missing output
    let toolchain = FakeToolchain::default();
    let config = DewarpConfig::default();
    let request = DewarpRequest::new(
        scene.input.clone(),
        scene.reference.clone(),
        1,
        OutputSuffix::parse("dw").unwrap(),
    );

    let err = DewarpPipeline::new(&config, &toolchain)
        .run(&request)
        .unwrap_err();

    assert!(matches!(
        err,
        DewarpError::Tool(ToolError::MissingOutput { .. })
    ));
    assert!(!scene.dir.path().join("ground_dw.laz").exists());
}
