//! # RasterDose
//!
//! Coverage simulator for raster-scanned deposition beams. A pattern file
//! describes the stage moves of one raster pass; RasterDose traces the beam
//! along those moves, integrates its intensity profile onto a dose grid and
//! reports how much of the deposit lands on the target.
//!
//! ## Architecture
//!
//! RasterDose is organized as a workspace with multiple crates:
//!
//! 1. **rasterdose-core** - Motion types, errors, default constants
//! 2. **rasterdose-pattern** - Pattern file lexer and parser
//! 3. **rasterdose-sim** - Beam profile, raster path, deposition, coverage
//! 4. **rasterdose-settings** - Simulation configuration and beam presets
//! 5. **rasterdose** - Simulation pipeline, report and command-line runner

pub mod pipeline;

pub use pipeline::{run_simulation, run_simulation_file, simulate_pattern, SimulationReport};

pub use rasterdose_core::{Axis, Directive, Error, Point2, Result};
pub use rasterdose_pattern::{parse_pattern, ClosedLoopViolation, PatternFile, PatternParser};
pub use rasterdose_settings::{BeamPreset, BeamSettings, SettingsError, SimulationConfig};
pub use rasterdose_sim::{
    BeamProfile, BeamProfileParams, CoverageStats, DepositionReference, DoseGrid, GridSpec,
    RasterPath, RasterSettings,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Console output with pretty formatting
/// - RUST_LOG environment variable support
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(tracing::Level::INFO.to_string()));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .pretty();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
