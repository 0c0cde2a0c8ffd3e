//! Simulation configuration
//!
//! Every tunable of a run lives in [`SimulationConfig`]:
//! - Beam shape (a named preset or explicit parameters)
//! - Aperture and mask radii
//! - Deposition reference runs
//! - Dose grid and normalization window
//! - Raster sampling and settle time
//!
//! Configurations are read from and written to `.json` or `.toml` files and
//! validated on both paths.

use rasterdose_core::constants::{
    DEFAULT_APERTURE_RADIUS_MM, DEFAULT_MASK_RADIUS_MM, DEFAULT_NORMALIZATION_HALF_EXTENT_MM,
    DEFAULT_NORMALIZATION_RESOLUTION,
};
use rasterdose_sim::{BeamProfile, BeamProfileParams, DepositionReference, GridSpec, RasterSettings};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::error::{Result, SettingsError};
use crate::presets::BeamPreset;

/// Beam shape selection
///
/// Serialized as a bare preset name or as a table of explicit parameters.
/// Explicit parameters carry their own aperture radius.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BeamSettings {
    Preset(BeamPreset),
    Custom(BeamProfileParams),
}

impl Default for BeamSettings {
    fn default() -> Self {
        Self::Preset(BeamPreset::Defocused)
    }
}

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Toml,
}

impl ConfigFormat {
    /// Format implied by the file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Self::Json),
            Some("toml") => Ok(Self::Toml),
            _ => Err(SettingsError::UnsupportedFormat(format!(
                "{} (config file must be .json or .toml)",
                path.display()
            ))),
        }
    }
}

fn default_aperture_radius() -> f64 {
    DEFAULT_APERTURE_RADIUS_MM
}

fn default_mask_radius() -> f64 {
    DEFAULT_MASK_RADIUS_MM
}

fn default_normalization() -> GridSpec {
    GridSpec::new(
        DEFAULT_NORMALIZATION_HALF_EXTENT_MM,
        DEFAULT_NORMALIZATION_RESOLUTION,
    )
}

/// Complete simulation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Radius of the beam-limiting aperture applied to presets (mm)
    #[serde(default = "default_aperture_radius")]
    pub aperture_radius: f64,
    /// Radius of the deposition target used for statistics (mm)
    #[serde(default = "default_mask_radius")]
    pub mask_radius: f64,
    #[serde(default)]
    pub beam: BeamSettings,
    #[serde(default)]
    pub deposition: DepositionReference,
    /// Grid the dose is accumulated on
    #[serde(default)]
    pub grid: GridSpec,
    /// Window the beam profile is averaged over
    #[serde(default = "default_normalization")]
    pub normalization: GridSpec,
    #[serde(default)]
    pub raster: RasterSettings,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            aperture_radius: DEFAULT_APERTURE_RADIUS_MM,
            mask_radius: DEFAULT_MASK_RADIUS_MM,
            beam: BeamSettings::default(),
            deposition: DepositionReference::default(),
            grid: GridSpec::default(),
            normalization: default_normalization(),
            raster: RasterSettings::default(),
        }
    }
}

impl SimulationConfig {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Default config with the given beam preset
    pub fn with_preset(preset: BeamPreset) -> Self {
        Self {
            beam: BeamSettings::Preset(preset),
            ..Self::default()
        }
    }

    /// Effective beam parameters
    pub fn beam_params(&self) -> BeamProfileParams {
        match &self.beam {
            BeamSettings::Preset(preset) => preset.params(self.aperture_radius),
            BeamSettings::Custom(params) => params.clone(),
        }
    }

    /// Validated beam profile
    pub fn beam_profile(&self) -> Result<BeamProfile> {
        Ok(BeamProfile::new(self.beam_params())?)
    }

    /// Parse config text in the given format
    pub fn from_str_with_format(content: &str, format: ConfigFormat) -> Result<Self> {
        let config: Self = match format {
            ConfigFormat::Json => serde_json::from_str(content)?,
            ConfigFormat::Toml => toml::from_str(content)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Render config text in the given format
    pub fn to_string_with_format(&self, format: ConfigFormat) -> Result<String> {
        self.validate()?;
        Ok(match format {
            ConfigFormat::Json => serde_json::to_string_pretty(self)?,
            ConfigFormat::Toml => toml::to_string_pretty(self)?,
        })
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let format = ConfigFormat::from_path(path)?;
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_str_with_format(&content, format)?;
        debug!(path = %path.display(), ?format, "Loaded simulation config");
        Ok(config)
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let format = ConfigFormat::from_path(path)?;
        let content = self.to_string_with_format(format)?;
        std::fs::write(path, content)?;
        debug!(path = %path.display(), ?format, "Saved simulation config");
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        positive("aperture_radius", self.aperture_radius)?;
        positive("mask_radius", self.mask_radius)?;

        validate_grid("grid", &self.grid)?;
        validate_grid("normalization", &self.normalization)?;

        positive("raster.samples_per_unit", self.raster.samples_per_unit)?;
        if self.raster.spacing_density == 0 {
            return Err(SettingsError::invalid("raster.spacing_density", "must be > 0"));
        }
        if !self.raster.settle_dwell.is_finite() || self.raster.settle_dwell < 0.0 {
            return Err(SettingsError::invalid("raster.settle_dwell", "must be >= 0"));
        }
        if self.raster.max_points_per_move < 2 {
            return Err(SettingsError::invalid(
                "raster.max_points_per_move",
                "must be >= 2",
            ));
        }

        if self.deposition.runs.is_empty() {
            return Err(SettingsError::invalid(
                "deposition.runs",
                "at least one reference run is required",
            ));
        }
        for run in &self.deposition.runs {
            positive("deposition.runs.elapsed_hours", run.elapsed_hours)?;
            if !run.coverage_percent.is_finite() || run.coverage_percent < 0.0 {
                return Err(SettingsError::invalid(
                    "deposition.runs.coverage_percent",
                    "must be >= 0",
                ));
            }
        }
        positive("deposition rate", self.deposition.rate()?)?;

        self.beam_params().validate()?;
        Ok(())
    }
}

fn positive(key: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(SettingsError::invalid(key, format!("must be > 0, got {value}")));
    }
    Ok(())
}

fn validate_grid(key: &str, grid: &GridSpec) -> Result<()> {
    positive(&format!("{key}.half_extent"), grid.half_extent)?;
    if grid.resolution == 0 {
        return Err(SettingsError::invalid(
            format!("{key}.resolution"),
            "must be > 0",
        ));
    }
    Ok(())
}
