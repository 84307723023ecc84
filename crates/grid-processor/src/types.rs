//! Core types for grid processing.

use serde::{Deserialize, Serialize};

use crate::error::{GridProcessorError, Result};

/// Resampling method used when moving a surface onto the alignment grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResampleMethod {
    /// Nearest neighbor (preserves exact values, same as a plain VRT mosaic).
    #[default]
    Nearest,
    /// Bilinear interpolation between the four surrounding cell centers.
    Bilinear,
}

impl std::str::FromStr for ResampleMethod {
    type Err = GridProcessorError;

    /// Parse from string (case-insensitive).
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "nearest" | "near" => Ok(Self::Nearest),
            "bilinear" | "linear" => Ok(Self::Bilinear),
            _ => Err(GridProcessorError::UnknownResampleMethod(s.to_string())),
        }
    }
}

impl std::fmt::Display for ResampleMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Nearest => write!(f, "nearest"),
            Self::Bilinear => write!(f, "bilinear"),
        }
    }
}

/// Scattered `(x, y, z)` samples in map coordinates.
///
/// The three vectors always have the same length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleSet {
    x: Vec<f64>,
    y: Vec<f64>,
    z: Vec<f64>,
}

impl SampleSet {
    pub fn new(x: Vec<f64>, y: Vec<f64>, z: Vec<f64>) -> Result<Self> {
        if x.len() != y.len() || x.len() != z.len() {
            return Err(GridProcessorError::SampleLengthMismatch {
                x: x.len(),
                y: y.len(),
                z: z.len(),
            });
        }
        Ok(Self { x, y, z })
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            x: Vec::with_capacity(capacity),
            y: Vec::with_capacity(capacity),
            z: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, x: f64, y: f64, z: f64) {
        self.x.push(x);
        self.y.push(y);
        self.z.push(z);
    }

    pub fn len(&self) -> usize {
        self.z.len()
    }

    pub fn is_empty(&self) -> bool {
        self.z.is_empty()
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    pub fn z(&self) -> &[f64] {
        &self.z
    }

    pub fn iter(&self) -> impl Iterator<Item = (f64, f64, f64)> + '_ {
        self.x
            .iter()
            .zip(&self.y)
            .zip(&self.z)
            .map(|((&x, &y), &z)| (x, y, z))
    }
}
