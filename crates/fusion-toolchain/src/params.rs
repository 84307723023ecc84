//! FUSION surface parameters.
//!
//! `GridSurfaceCreate` and `ASCII2DTM` both take the same six positional
//! parameters describing the horizontal and vertical reference of the
//! surface they write:
//!
//! ```text
//! xyunits zunits coordsys zone horizdatum vertdatum
//!    m       m       1     12      2          2
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Planimetric or vertical unit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FusionUnit {
    Meters,
    Feet,
}

impl FusionUnit {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Meters => "m",
            Self::Feet => "f",
        }
    }
}

/// Coordinate system code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinateSystem {
    Unknown = 0,
    Utm = 1,
    StatePlane = 2,
}

/// Horizontal datum code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HorizontalDatum {
    Unknown = 0,
    Nad27 = 1,
    Nad83 = 2,
}

/// Vertical datum code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerticalDatum {
    Unknown = 0,
    Ngvd29 = 1,
    Navd88 = 2,
    Grs80 = 3,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParamsParseError {
    #[error("expected 6 fields (xyunits zunits coordsys zone horizdatum vertdatum), got {0}")]
    FieldCount(usize),

    #[error("invalid {field}: '{value}'")]
    InvalidField { field: &'static str, value: String },
}

/// The six-field surface description passed to the FUSION gridding tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GridSurfaceParams {
    pub xy_units: FusionUnit,
    pub z_units: FusionUnit,
    pub coordinate_system: CoordinateSystem,
    pub zone: u32,
    pub horizontal_datum: HorizontalDatum,
    pub vertical_datum: VerticalDatum,
}

impl Default for GridSurfaceParams {
    /// Meters, UTM zone 12, NAD83, NAVD88.
    fn default() -> Self {
        Self {
            xy_units: FusionUnit::Meters,
            z_units: FusionUnit::Meters,
            coordinate_system: CoordinateSystem::Utm,
            zone: 12,
            horizontal_datum: HorizontalDatum::Nad83,
            vertical_datum: VerticalDatum::Navd88,
        }
    }
}

impl GridSurfaceParams {
    /// The parameters as separate command-line arguments.
    pub fn to_args(&self) -> Vec<String> {
        vec![
            self.xy_units.code().to_string(),
            self.z_units.code().to_string(),
            (self.coordinate_system as u8).to_string(),
            self.zone.to_string(),
            (self.horizontal_datum as u8).to_string(),
            (self.vertical_datum as u8).to_string(),
        ]
    }
}

impl fmt::Display for GridSurfaceParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_args().join(" "))
    }
}

fn invalid(field: &'static str, value: &str) -> ParamsParseError {
    ParamsParseError::InvalidField {
        field,
        value: value.to_string(),
    }
}

fn parse_unit(field: &'static str, s: &str) -> Result<FusionUnit, ParamsParseError> {
    match s.to_ascii_lowercase().as_str() {
        "m" => Ok(FusionUnit::Meters),
        "f" => Ok(FusionUnit::Feet),
        _ => Err(invalid(field, s)),
    }
}

impl FromStr for GridSurfaceParams {
    type Err = ParamsParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split_whitespace().collect();
        let [xy, z, coordsys, zone, hdatum, vdatum] = fields.as_slice() else {
            return Err(ParamsParseError::FieldCount(fields.len()));
        };

        let coordinate_system = match *coordsys {
            "0" => CoordinateSystem::Unknown,
            "1" => CoordinateSystem::Utm,
            "2" => CoordinateSystem::StatePlane,
            other => return Err(invalid("coordsys", other)),
        };
        let horizontal_datum = match *hdatum {
            "0" => HorizontalDatum::Unknown,
            "1" => HorizontalDatum::Nad27,
            "2" => HorizontalDatum::Nad83,
            other => return Err(invalid("horizdatum", other)),
        };
        let vertical_datum = match *vdatum {
            "0" => VerticalDatum::Unknown,
            "1" => VerticalDatum::Ngvd29,
            "2" => VerticalDatum::Navd88,
            "3" => VerticalDatum::Grs80,
            other => return Err(invalid("vertdatum", other)),
        };

        Ok(Self {
            xy_units: parse_unit("xyunits", xy)?,
            z_units: parse_unit("zunits", z)?,
            coordinate_system,
            zone: zone.parse().map_err(|_| invalid("zone", zone))?,
            horizontal_datum,
            vertical_datum,
        })
    }
}

impl TryFrom<String> for GridSurfaceParams {
    type Error = ParamsParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<GridSurfaceParams> for String {
    fn from(params: GridSurfaceParams) -> Self {
        params.to_string()
    }
}
