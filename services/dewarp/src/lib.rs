//! Polynomial dewarping of LiDAR / SfM point clouds.
//!
//! Grids an input and a reference ground cloud, fits a smooth polynomial
//! to their elevation difference and subtracts it from the input (and any
//! companion clouds) with the FUSION toolchain.
//!
//! The binary in `main.rs` is a thin CLI over [`DewarpPipeline`].

pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod preconditions;
pub mod workspace;

pub use config::DewarpConfig;
pub use error::{DewarpError, Result};
pub use output::{OutputSuffix, StagedInput};
pub use pipeline::{DewarpOutcome, DewarpPipeline, DewarpRequest};
pub use workspace::WorkingDir;
