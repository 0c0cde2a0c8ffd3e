//! # RasterDose Simulation
//!
//! Turns a parsed pattern into a dose map:
//!
//! - **Beam profile**: two-lobe Gaussian intensity clipped by an aperture
//! - **Raster path**: timed beam positions tracing the pattern's stage moves
//! - **Deposition**: integrates the beam along the path onto a [`DoseGrid`]
//! - **Coverage**: peak, in-mask average and charge fraction of a grid

pub mod beam_profile;
pub mod coverage;
pub mod deposition;
pub mod grid;
pub mod raster_path;

pub use beam_profile::{gaussian, BeamProfile, BeamProfileParams};
pub use coverage::{analyze, CoverageAnalyzer, CoverageStats};
pub use deposition::{DepositionAccumulator, DepositionReference, ReferenceRun};
pub use grid::{DoseGrid, GridSpec};
pub use raster_path::{RasterPath, RasterPathBuilder, RasterSample, RasterSettings};
