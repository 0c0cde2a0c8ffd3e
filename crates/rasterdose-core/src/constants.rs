//! Default values used across the workspace.
//!
//! These only seed configuration defaults; every component receives its
//! parameters explicitly.

/// Radius of the beam-limiting aperture (mm)
pub const DEFAULT_APERTURE_RADIUS_MM: f64 = 2.25;

/// Radius of the deposition target used for coverage statistics (mm)
pub const DEFAULT_MASK_RADIUS_MM: f64 = 2.5;

/// Coverage observed on the reference run (%)
pub const DEFAULT_REFERENCE_COVERAGE_PERCENT: f64 = 10.67;

/// Elapsed time of the reference run (hours)
pub const DEFAULT_REFERENCE_ELAPSED_HOURS: f64 = 0.5864;

/// Half width of the simulation grid (mm)
pub const DEFAULT_GRID_HALF_EXTENT_MM: f64 = 10.0;

/// Points per side of the simulation grid
pub const DEFAULT_GRID_RESOLUTION: usize = 100;

/// Half width of the window the beam profile is normalized over (mm)
pub const DEFAULT_NORMALIZATION_HALF_EXTENT_MM: f64 = 3.0;

/// Points per side of the normalization window
pub const DEFAULT_NORMALIZATION_RESOLUTION: usize = 100;

/// Raster samples per mm of travel, before the spacing density is applied
pub const DEFAULT_SAMPLES_PER_UNIT: f64 = 10.0;

/// Divisor thinning out the raster samples
pub const DEFAULT_SPACING_DENSITY: u32 = 2;

/// Pause appended at the end of every straight move (s)
pub const DEFAULT_SETTLE_DWELL_S: f64 = 1.2;

/// Upper bound on the sample points of a single move
pub const DEFAULT_MAX_POINTS_PER_MOVE: usize = 1_000_000;

/// Seconds per hour
pub const SECONDS_PER_HOUR: f64 = 3600.0;
