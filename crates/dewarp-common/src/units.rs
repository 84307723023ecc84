//! Length units and named conversions.
//!
//! Surfaces, priors and diagnostic rasters may each be expressed in a
//! different unit (a snow-depth prior in centimeters against a ground
//! model in meters is the common case). Every conversion goes through
//! [`LengthUnit::factor_to`] so the scale factor is never an inline constant.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthUnit {
    Meters,
    Centimeters,
    Millimeters,
    /// International foot (0.3048 m)
    Feet,
    /// US survey foot (1200/3937 m)
    UsSurveyFeet,
}

impl LengthUnit {
    /// Length of one unit in meters.
    pub fn meters_per_unit(&self) -> f64 {
        match self {
            Self::Meters => 1.0,
            Self::Centimeters => 0.01,
            Self::Millimeters => 0.001,
            Self::Feet => 0.3048,
            Self::UsSurveyFeet => 1200.0 / 3937.0,
        }
    }

    /// Multiplier converting a value in `self` to a value in `target`.
    pub fn factor_to(&self, target: LengthUnit) -> f64 {
        if *self == target {
            return 1.0;
        }
        self.meters_per_unit() / target.meters_per_unit()
    }

    /// Convert a value expressed in `self` to `target`.
    pub fn convert(&self, value: f64, target: LengthUnit) -> f64 {
        value * self.factor_to(target)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Meters => "m",
            Self::Centimeters => "cm",
            Self::Millimeters => "mm",
            Self::Feet => "ft",
            Self::UsSurveyFeet => "us-ft",
        }
    }
}

impl fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for LengthUnit {
    type Err = UnitParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "m" | "meter" | "meters" | "metre" | "metres" => Ok(Self::Meters),
            "cm" | "centimeter" | "centimeters" => Ok(Self::Centimeters),
            "mm" | "millimeter" | "millimeters" => Ok(Self::Millimeters),
            "ft" | "f" | "foot" | "feet" => Ok(Self::Feet),
            "us-ft" | "usft" | "us_survey_feet" | "ussurveyfeet" => Ok(Self::UsSurveyFeet),
            _ => Err(UnitParseError(s.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown length unit: {0}")]
pub struct UnitParseError(pub String);
