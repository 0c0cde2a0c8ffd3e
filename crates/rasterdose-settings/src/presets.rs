//! Named beam profiles
//!
//! `focused` is the tightly focused, off-centre beam (also known as "bad");
//! `defocused` is the broad, centred beam (also known as "good").

use rasterdose_core::Point2;
use rasterdose_sim::BeamProfileParams;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::SettingsError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BeamPreset {
    #[serde(alias = "bad")]
    Focused,
    #[serde(alias = "good")]
    Defocused,
}

impl BeamPreset {
    pub const ALL: [BeamPreset; 2] = [BeamPreset::Focused, BeamPreset::Defocused];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Focused => "focused",
            Self::Defocused => "defocused",
        }
    }

    /// Profile parameters behind an aperture of `aperture_radius` (mm)
    pub fn params(&self, aperture_radius: f64) -> BeamProfileParams {
        match self {
            Self::Focused => BeamProfileParams {
                center_core: Point2::new(-3.0, -3.0),
                center_halo: Point2::new(-3.0, 0.0),
                cutoff_core: 3.0,
                mu: (0.0, 0.0),
                sigma: (2.0, 4.0),
                amplitude: (3.0, 0.3),
                aperture_radius,
            },
            Self::Defocused => BeamProfileParams {
                center_core: Point2::origin(),
                center_halo: Point2::origin(),
                cutoff_core: 0.0,
                mu: (0.0, 0.0),
                sigma: (2.0, 5.0),
                amplitude: (0.0, 1.0),
                aperture_radius,
            },
        }
    }
}

impl fmt::Display for BeamPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BeamPreset {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "focused" | "bad" => Ok(Self::Focused),
            "defocused" | "good" => Ok(Self::Defocused),
            _ => Err(SettingsError::UnknownPreset(s.to_string())),
        }
    }
}
