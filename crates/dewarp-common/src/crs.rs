//! Coordinate Reference System identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An EPSG coordinate reference system code.
///
/// Point clouds in a comparison are assumed to share one projected CRS;
/// this value is attached to every grid and passed to GDAL as `-a_srs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EpsgCode(pub u32);

impl EpsgCode {
    pub fn new(code: u32) -> Self {
        Self(code)
    }

    pub fn code(&self) -> u32 {
        self.0
    }
}

impl Default for EpsgCode {
    /// SIRGAS 2000 / UTM zone 12N, the projection the survey tooling was set up for.
    fn default() -> Self {
        Self(31966)
    }
}

impl fmt::Display for EpsgCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.0)
    }
}

impl FromStr for EpsgCode {
    type Err = CrsParseError;

    /// Accepts "EPSG:31966", "epsg:31966" or a bare "31966".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = match trimmed.split_once(':') {
            Some((authority, code)) if authority.eq_ignore_ascii_case("epsg") => code,
            Some(_) => return Err(CrsParseError::UnsupportedAuthority(trimmed.to_string())),
            None => trimmed,
        };

        digits
            .parse::<u32>()
            .map(EpsgCode)
            .map_err(|_| CrsParseError::InvalidCode(trimmed.to_string()))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CrsParseError {
    #[error("Unsupported CRS authority: {0}")]
    UnsupportedAuthority(String),

    #[error("Invalid EPSG code: {0}")]
    InvalidCode(String),
}
