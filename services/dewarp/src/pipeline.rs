//! The dewarp run.
//!
//! ```text
//! check inputs ─► working dir ─► rasterize input + reference
//!      ─► align (reference, prior) to input grid ─► residual
//!      ─► polynomial fit ─► correction surface ─► encode (>= floor)
//!      ─► correction .dtm ─► correct input + additional clouds
//!      ─► [diagnostic raster]
//! ```
//!
//! All external work goes through a [`PointCloudToolchain`]; grids are read
//! and written as ESRI ASCII files in the working directory.

use std::path::{Path, PathBuf};

use dewarp_common::{BoundingBox, ElevationGrid};
use fusion_toolchain::{CorrectionRequest, PointCloudToolchain};
use grid_processor::{
    clip_extent, fit_polynomial, residual_after_correction, Aligner, DiagnosticRaster,
    DiagnosticStats, EncodedCorrection, GridProcessorError, PolynomialFit, Prior, ResidualField,
    MAX_ORDER,
};
use raster_io::{AsciiGridStore, RasterStore};
use tracing::{info, warn};

use crate::config::DewarpConfig;
use crate::error::Result;
use crate::output::{OutputSuffix, StagedInput};
use crate::preconditions::check_inputs;
use crate::workspace::WorkingDir;

/// One invocation of the tool.
#[derive(Debug, Clone)]
pub struct DewarpRequest {
    /// Ground cloud to correct; its grid defines the alignment target.
    pub input_cloud: PathBuf,
    /// Ground cloud treated as truth.
    pub reference_cloud: PathBuf,
    /// Polynomial order of the warp model.
    pub order: u32,
    pub suffix: OutputSuffix,
    /// First-guess difference added to the reference before fitting.
    pub difference_map: Option<PathBuf>,
    /// Further clouds corrected with the same surface.
    pub additional_clouds: Vec<PathBuf>,
    /// Write the post-correction difference raster.
    pub output_raster: bool,
    /// Leave the working directory on disk.
    pub keep_workdir: bool,
}

impl DewarpRequest {
    pub fn new(input_cloud: PathBuf, reference_cloud: PathBuf, order: u32, suffix: OutputSuffix) -> Self {
        Self {
            input_cloud,
            reference_cloud,
            order,
            suffix,
            difference_map: None,
            additional_clouds: Vec::new(),
            output_raster: false,
            keep_workdir: false,
        }
    }

    /// Every path that must exist before the run starts.
    pub fn required_paths(&self) -> Vec<&Path> {
        let mut paths = vec![self.input_cloud.as_path(), self.reference_cloud.as_path()];
        paths.extend(self.difference_map.as_deref());
        paths.extend(self.additional_clouds.iter().map(PathBuf::as_path));
        paths
    }

    /// Clouds to correct, input first.
    pub fn clouds_to_correct(&self) -> impl Iterator<Item = &Path> {
        std::iter::once(self.input_cloud.as_path())
            .chain(self.additional_clouds.iter().map(PathBuf::as_path))
    }
}

/// What a successful run produced.
#[derive(Debug, Clone)]
pub struct DewarpOutcome {
    pub fit: PolynomialFit,
    /// `min(correction) - floor`, subtracted before handing the surface on.
    pub shift: f64,
    /// Elevation added back to every corrected point (`-shift`).
    pub bias: f64,
    /// Corrected clouds, in the order they were written.
    pub corrected: Vec<PathBuf>,
    pub diff_raster: Option<PathBuf>,
    pub diagnostic_stats: Option<DiagnosticStats>,
    /// Working directory, when it was kept.
    pub workdir: Option<PathBuf>,
}

/// Runs dewarp requests against a toolchain.
pub struct DewarpPipeline<'a> {
    config: &'a DewarpConfig,
    toolchain: &'a dyn PointCloudToolchain,
    store: AsciiGridStore,
}

impl<'a> DewarpPipeline<'a> {
    pub fn new(config: &'a DewarpConfig, toolchain: &'a dyn PointCloudToolchain) -> Self {
        Self {
            config,
            toolchain,
            store: AsciiGridStore::new(),
        }
    }

    /// Execute the full run.
    ///
    /// Preconditions are checked before anything touches the filesystem.
    pub fn run(&self, request: &DewarpRequest) -> Result<DewarpOutcome> {
        if request.order > MAX_ORDER {
            return Err(GridProcessorError::InvalidOrder {
                order: request.order,
                max: MAX_ORDER,
            }
            .into());
        }
        check_inputs(request.required_paths())?;

        let workdir = WorkingDir::create(request.keep_workdir)?;
        let processing = &self.config.processing;

        // Surfaces
        info!(cloud = %request.input_cloud.display(), "Rasterizing input cloud");
        let input = self.rasterize(&request.input_cloud, &workdir.file("surf.asc"))?;
        let spec = *input.spec();
        info!(grid = %spec.describe(), "Alignment grid");

        info!(cloud = %request.reference_cloud.display(), "Rasterizing reference cloud");
        let reference = self.rasterize(&request.reference_cloud, &workdir.file("surf_reference.asc"))?;

        let aligner = Aligner::from_reference(&input, processing.resample_method);
        let reference = aligner.align(&reference);

        let prior = match &request.difference_map {
            Some(map) => {
                info!(map = %map.display(), "Importing difference map");
                let ascii = workdir.file("difference_map.asc");
                self.toolchain.import_raster(map, &ascii)?;
                let grid = self.store.read_elevation(&ascii, self.config.crs)?;
                Some(aligner.align(&grid))
            }
            None => None,
        };

        let mut surfaces = vec![("input", &input), ("reference", &reference)];
        if let Some(prior) = &prior {
            surfaces.push(("difference map", prior));
        }
        aligner.verify(surfaces)?;

        // Fit
        let residual = ResidualField::build(
            &input,
            &reference,
            prior.as_ref().map(|grid| Prior {
                grid,
                factor: processing.prior_factor(),
            }),
        )?;
        info!(
            valid_cells = residual.valid_count(),
            total_cells = spec.len(),
            "Built residual field"
        );

        let fit = fit_polynomial(&residual.samples(), request.order, spec.lower_left())?;
        let correction = fit.model.evaluate_on(&spec);
        let encoded = EncodedCorrection::encode(&correction, processing.positive_floor)?;

        let correction_ascii = workdir.file("correction.asc");
        let correction_dtm = workdir.file("correction.dtm");
        self.store
            .write_elevation(&correction_ascii, encoded.surface(), processing.nodata_sentinel)?;
        self.toolchain
            .build_correction_surface(&correction_ascii, &correction_dtm)?;

        // Correct
        let clip = clip_extent(&spec, processing.clip_margin_cells)?;
        let mut corrected = Vec::new();
        for cloud in request.clouds_to_correct() {
            let output = self.correct_cloud(cloud, &request.suffix, &correction_dtm, &encoded, clip)?;
            corrected.push(output);
        }

        // Diagnostics
        let (diff_raster, diagnostic_stats) = if request.output_raster {
            let path = request.suffix.diff_raster_path(&request.input_cloud);
            let stats = self.write_diagnostic(&workdir, &path, &input, &correction, &reference)?;
            (Some(path), stats)
        } else {
            (None, None)
        };

        let outcome = DewarpOutcome {
            shift: encoded.shift(),
            bias: encoded.bias_elevation(),
            fit,
            corrected,
            diff_raster,
            diagnostic_stats,
            workdir: workdir.is_kept().then(|| workdir.path().to_path_buf()),
        };
        log_summary(&outcome);

        Ok(outcome)
    }

    fn rasterize(&self, cloud: &Path, ascii: &Path) -> Result<ElevationGrid> {
        self.toolchain.rasterize(cloud, self.config.cell_size, ascii)?;
        let grid = self.store.read_elevation(ascii, self.config.crs)?;
        if grid.valid_count() == 0 {
            warn!(cloud = %cloud.display(), "Rasterized surface has no valid cells");
        }
        Ok(grid)
    }

    fn correct_cloud(
        &self,
        cloud: &Path,
        suffix: &OutputSuffix,
        surface: &Path,
        encoded: &EncodedCorrection,
        clip: BoundingBox,
    ) -> Result<PathBuf> {
        let output = suffix.output_path(cloud);
        info!(input = %cloud.display(), output = %output.display(), "Correcting cloud");

        let mut request = CorrectionRequest {
            input: cloud.to_path_buf(),
            output: output.clone(),
            surface: surface.to_path_buf(),
            bias: encoded.bias_elevation(),
            clip,
        };

        if suffix.is_in_place() {
            let staged = StagedInput::stage(cloud)?;
            request.input = staged.staged_path().to_path_buf();
            self.toolchain.apply_correction(&request)?;
            staged.commit()?;
        } else {
            self.toolchain.apply_correction(&request)?;
        }

        Ok(output)
    }

    fn write_diagnostic(
        &self,
        workdir: &WorkingDir,
        path: &Path,
        input: &ElevationGrid,
        correction: &ElevationGrid,
        reference: &ElevationGrid,
    ) -> Result<Option<DiagnosticStats>> {
        let processing = &self.config.processing;
        let difference = residual_after_correction(input, correction, reference)?;
        let raster = DiagnosticRaster::encode(
            &difference,
            processing.diagnostic_factor(),
            processing.nodata_sentinel,
        );

        let ascii = workdir.file("difference.asc");
        self.store
            .write_elevation(&ascii, raster.grid(), raster.nodata())?;
        self.toolchain
            .export_raster(&ascii, path, self.config.crs, raster.nodata())?;

        info!(
            path = %path.display(),
            unit = %processing.diagnostic_unit,
            "Wrote difference raster"
        );
        Ok(raster.stats())
    }
}

fn log_summary(outcome: &DewarpOutcome) {
    let outputs: Vec<String> = outcome
        .corrected
        .iter()
        .map(|p| p.display().to_string())
        .collect();

    info!(
        order = outcome.fit.model.order(),
        samples = outcome.fit.sample_count,
        rank = outcome.fit.rank,
        rms_residual = outcome.fit.rms_residual,
        coefficients = ?outcome.fit.model.coefficients(),
        vcorr = outcome.shift,
        bias = outcome.bias,
        outputs = ?outputs,
        "Dewarp complete"
    );

    if let Some(stats) = &outcome.diagnostic_stats {
        info!(
            valid_cells = stats.valid_cells,
            mean = stats.mean,
            rms = stats.rms,
            min = stats.min,
            max = stats.max,
            "Remaining difference after correction"
        );
    }
}
