//! End-to-end simulation run
//!
//! Parses a pattern, traces it at the pattern's own speed, integrates the
//! configured beam along the path and summarizes the resulting dose map.

use rasterdose_core::constants::SECONDS_PER_HOUR;
use rasterdose_core::Result;
use rasterdose_pattern::{ClosedLoopViolation, PatternFile, PatternParser};
use rasterdose_settings::SimulationConfig;
use rasterdose_sim::{
    BeamProfile, BeamProfileParams, CoverageAnalyzer, CoverageStats, DepositionAccumulator,
    DoseGrid, RasterPathBuilder,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Outcome of one simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    /// Set when the pattern does not return to its start point
    pub closed_loop: Option<ClosedLoopViolation>,
    /// Beam parameters the dose was computed with
    pub beam: BeamProfileParams,
    pub move_count: usize,
    pub sample_count: usize,
    /// Duration of one pass of the pattern (s)
    pub pass_time_s: f64,
    /// Duration of one pass of the pattern (min)
    pub pass_time_min: f64,
    /// Deposition rate derived from the reference runs (% per hour)
    pub deposition_rate: f64,
    /// Exposure the dose is scaled to (s)
    pub target_elapsed_s: f64,
    /// Number of passes fitting into the target exposure
    pub scale_factor: f64,
    /// In-mask average coverage contributed by a single pass (%)
    ///
    /// `None` when no grid point falls inside the mask.
    pub per_pass_average: Option<f64>,
    pub stats: CoverageStats,
    /// Final dose map, for external plotting
    pub grid: DoseGrid,
}

impl SimulationReport {
    pub fn is_closed_loop(&self) -> bool {
        self.closed_loop.is_none()
    }
}

/// Run a simulation on pattern text
pub fn run_simulation(text: &str, config: &SimulationConfig) -> Result<SimulationReport> {
    let pattern = PatternParser::new().parse(text)?;
    simulate_pattern(&pattern, config)
}

/// Run a simulation on a pattern file
pub fn run_simulation_file(path: &Path, config: &SimulationConfig) -> Result<SimulationReport> {
    let pattern = PatternParser::new().parse_file(path)?;
    simulate_pattern(&pattern, config)
}

/// Run a simulation on an already parsed pattern
pub fn simulate_pattern(
    pattern: &PatternFile,
    config: &SimulationConfig,
) -> Result<SimulationReport> {
    let path = RasterPathBuilder::new(config.raster.clone()).build_with_pattern_speed(pattern)?;
    info!(
        moves = path.move_count(),
        samples = path.len(),
        "Pattern traced, starting simulation"
    );

    let beam = BeamProfile::new(config.beam_params())?;
    let rate = config.deposition.rate()?;
    let target = config.deposition.target_elapsed_seconds();

    let grid = DepositionAccumulator::new(&beam, config.grid, config.normalization)
        .accumulate(&path, rate, target)?;
    let stats = CoverageAnalyzer::new(config.mask_radius).analyze(&grid)?;

    let pass_time_s = path.total_dwell();
    let per_pass_average = stats.in_mask_average.map(|average| {
        average * pass_time_s / SECONDS_PER_HOUR / config.deposition.total_hours()
    });
    debug!(pass_time_s, rate, target, "Simulation finished");

    Ok(SimulationReport {
        closed_loop: pattern.closed_loop,
        beam: beam.params().clone(),
        move_count: path.move_count(),
        sample_count: path.len(),
        pass_time_s,
        pass_time_min: pass_time_s / 60.0,
        deposition_rate: rate,
        target_elapsed_s: target,
        scale_factor: target / pass_time_s,
        per_pass_average,
        stats,
        grid,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rasterdose_core::Error;
    use rasterdose_settings::BeamPreset;
    use rasterdose_sim::GridSpec;

    fn small_config() -> SimulationConfig {
        let mut config = SimulationConfig::with_preset(BeamPreset::Defocused);
        config.grid = GridSpec::new(6.0, 25);
        config.normalization = GridSpec::new(3.0, 40);
        config
    }

    const LINE: &str = "<<<DATA>>>\nstep_size = 1.0\nspeed = 1.0\n<<<PATTERN>>>\nZ: 1.0\nZ: -1.0\n<<<END>>>";

    #[test]
    fn test_report_timing() {
        let report = run_simulation(LINE, &small_config()).unwrap();

        assert!(report.is_closed_loop());
        assert_eq!(report.move_count, 2);
        // Two moves of 10 points each plus their settle samples
        assert_eq!(report.sample_count, 22);
        // Each move: 10 samples at 1/9 s plus 1.2 s settle
        let expected = 2.0 * (10.0 / 9.0 + 1.2);
        assert!((report.pass_time_s - expected).abs() < 1e-9);
        assert!((report.pass_time_min - expected / 60.0).abs() < 1e-9);
        assert!((report.scale_factor * report.pass_time_s - report.target_elapsed_s).abs() < 1e-6);
    }

    #[test]
    fn test_per_pass_average() {
        let config = small_config();
        let report = run_simulation(LINE, &config).unwrap();

        let passes = report.scale_factor;
        let per_pass = report.per_pass_average.unwrap();
        let total = report.stats.in_mask_average.unwrap();
        assert!((per_pass * passes - total).abs() < 1e-9);
    }

    #[test]
    fn test_mask_without_grid_points() {
        // An even resolution leaves no grid point at the origin
        let mut config = small_config();
        config.grid = GridSpec::new(6.0, 24);
        config.mask_radius = 0.1;

        let report = run_simulation(LINE, &config).unwrap();
        assert_eq!(report.stats.in_mask_cells, 0);
        assert_eq!(report.stats.in_mask_average, None);
        assert_eq!(report.per_pass_average, None);
        assert_eq!(report.stats.charge_fraction, Some(0.0));
    }

    #[test]
    fn test_open_pattern_reported_not_fatal() {
        let text = "<<<DATA>>>\nstep_size = 1.0\nspeed = 1.0\n<<<PATTERN>>>\nZ: 1.0\n<<<END>>>";
        let report = run_simulation(text, &small_config()).unwrap();
        assert_eq!(
            report.closed_loop,
            Some(ClosedLoopViolation { z: 1.0, y: 0.0 })
        );
    }

    #[test]
    fn test_errors_propagate() {
        let config = small_config();

        let unterminated = run_simulation("<<<PATTERN>>>\nZ: 1.0\n", &config).unwrap_err();
        assert!(unterminated.is_format_error());

        let no_speed = run_simulation("<<<DATA>>>\nstep_size = 1.0\n<<<PATTERN>>>\nZ: 1.0\n<<<END>>>", &config)
            .unwrap_err();
        assert!(no_speed.is_path_error());

        let mut dark = config.clone();
        dark.aperture_radius = 0.01;
        dark.normalization = GridSpec::new(3.0, 4);
        let err = run_simulation(LINE, &dark).unwrap_err();
        assert!(matches!(err, Error::Simulation(_)));
    }
}
