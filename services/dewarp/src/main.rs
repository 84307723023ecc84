//! dewarp
//!
//! Flattens a point cloud against a reference cloud with a polynomial
//! correction surface.
//!
//! ```text
//! dewarp ground.laz reference.laz 3 dewarped -a canopy.laz -r
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use fusion_toolchain::FusionToolchain;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use dewarp::{DewarpConfig, DewarpPipeline, DewarpRequest, OutputSuffix};

#[derive(Parser, Debug)]
#[command(name = "dewarp")]
#[command(about = "Remove smooth vertical distortion from a point cloud using a reference cloud")]
struct Args {
    /// Ground point cloud to correct
    input_cloud: PathBuf,

    /// Reference ground point cloud
    reference_cloud: PathBuf,

    /// Polynomial order of the correction surface
    order: u32,

    /// Suffix for corrected files; "none" overwrites the inputs
    suffix: String,

    /// First-guess difference map added to the reference surface
    #[arg(short = 'd', long)]
    difference_map: Option<PathBuf>,

    /// Additional clouds to correct with the same surface (comma separated)
    #[arg(short = 'a', long, value_delimiter = ',')]
    additional_clouds: Vec<PathBuf>,

    /// Write a GeoTIFF of the remaining difference after correction
    #[arg(short = 'r', long)]
    output_raster: bool,

    /// Configuration file path
    #[arg(short, long, env = "DEWARP_CONFIG")]
    config: Option<PathBuf>,

    /// Keep the temporary working directory
    #[arg(long)]
    keep_workdir: bool,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Log format (text or json)
    #[arg(long, default_value = "text", env = "DEWARP_LOG_FORMAT")]
    log_format: String,
}

fn main() {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(&args.log_level, &args.log_format);

    if let Err(e) = run(args) {
        error!("{:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_tracing(log_level: &str, log_format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let builder = fmt().with_env_filter(filter).with_target(true).with_level(true);
    if log_format.eq_ignore_ascii_case("json") {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn run(args: Args) -> Result<()> {
    let config = DewarpConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    info!(
        crs = %config.crs,
        grid_params = %config.grid_params,
        cell_size = config.cell_size,
        "Loaded configuration"
    );

    let mut request = DewarpRequest::new(
        args.input_cloud,
        args.reference_cloud,
        args.order,
        OutputSuffix::parse(&args.suffix)?,
    );
    request.difference_map = args.difference_map;
    request.additional_clouds = args.additional_clouds;
    request.output_raster = args.output_raster;
    request.keep_workdir = args.keep_workdir;

    let toolchain = FusionToolchain::new(config.tools.clone(), config.grid_params);
    let outcome = DewarpPipeline::new(&config, &toolchain)
        .run(&request)
        .context("Dewarp failed")?;

    for path in &outcome.corrected {
        println!("{}", path.display());
    }
    if let Some(path) = &outcome.diff_raster {
        println!("{}", path.display());
    }
    if let Some(dir) = &outcome.workdir {
        info!(path = %dir.display(), "Working directory kept");
    }

    Ok(())
}
