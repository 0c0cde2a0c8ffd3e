//! RasterDose Settings Crate
//!
//! Simulation configuration, beam presets and their file persistence.

pub mod config;
pub mod error;
pub mod presets;

pub use config::{BeamSettings, ConfigFormat, SimulationConfig};
pub use error::{Result, SettingsError};
pub use presets::BeamPreset;
