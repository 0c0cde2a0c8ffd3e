//! Dose deposition along a raster path
//!
//! The beam footprint is integrated onto the dose grid at every timed sample.
//! Each row of the grid is owned by exactly one rayon worker and every cell
//! sums the samples in path order, so the result does not depend on the
//! thread count.

use rasterdose_core::constants::{
    DEFAULT_REFERENCE_COVERAGE_PERCENT, DEFAULT_REFERENCE_ELAPSED_HOURS, SECONDS_PER_HOUR,
};
use rasterdose_core::SimulationError;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::beam_profile::BeamProfile;
use crate::grid::{DoseGrid, GridSpec};
use crate::raster_path::RasterPath;

/// One calibration run: measured coverage after a known exposure time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferenceRun {
    /// Measured coverage (%)
    pub coverage_percent: f64,
    /// Exposure time (h)
    pub elapsed_hours: f64,
}

impl ReferenceRun {
    pub fn new(coverage_percent: f64, elapsed_hours: f64) -> Self {
        Self {
            coverage_percent,
            elapsed_hours,
        }
    }
}

impl Default for ReferenceRun {
    fn default() -> Self {
        Self::new(
            DEFAULT_REFERENCE_COVERAGE_PERCENT,
            DEFAULT_REFERENCE_ELAPSED_HOURS,
        )
    }
}

/// Calibration data the deposition rate is derived from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepositionReference {
    pub runs: Vec<ReferenceRun>,
}

impl Default for DepositionReference {
    fn default() -> Self {
        Self {
            runs: vec![ReferenceRun::default()],
        }
    }
}

impl DepositionReference {
    pub fn new(runs: Vec<ReferenceRun>) -> Self {
        Self { runs }
    }

    /// Total exposure time over all runs (h)
    pub fn total_hours(&self) -> f64 {
        self.runs.iter().map(|run| run.elapsed_hours).sum()
    }

    /// Total measured coverage over all runs (%)
    pub fn total_coverage(&self) -> f64 {
        self.runs.iter().map(|run| run.coverage_percent).sum()
    }

    /// Deposition rate (% per hour)
    pub fn rate(&self) -> Result<f64, SimulationError> {
        let hours = self.total_hours();
        if hours == 0.0 {
            return Err(SimulationError::DivisionByZero {
                quantity: "reference elapsed time".to_string(),
            });
        }
        Ok(self.total_coverage() / hours)
    }

    /// Exposure time the simulated dose is scaled to (s)
    pub fn target_elapsed_seconds(&self) -> f64 {
        self.total_hours() * SECONDS_PER_HOUR
    }
}

/// Integrates a beam profile along raster paths
#[derive(Debug, Clone)]
pub struct DepositionAccumulator<'a> {
    beam: &'a BeamProfile,
    grid: GridSpec,
    normalization: GridSpec,
}

impl<'a> DepositionAccumulator<'a> {
    /// `grid` receives the dose; `normalization` is the window the beam
    /// profile is averaged over
    pub fn new(beam: &'a BeamProfile, grid: GridSpec, normalization: GridSpec) -> Self {
        Self {
            beam,
            grid,
            normalization,
        }
    }

    pub fn grid_spec(&self) -> &GridSpec {
        &self.grid
    }

    /// Dose of a single pass of `path` at `rate` (% per hour)
    pub fn accumulate_unscaled(
        &self,
        path: &RasterPath,
        rate: f64,
    ) -> Result<DoseGrid, SimulationError> {
        if !rate.is_finite() || rate <= 0.0 {
            return Err(SimulationError::not_positive("deposition rate", rate));
        }
        let area = self.beam.normalization_area(&self.normalization)?;
        let weight = rate / area / SECONDS_PER_HOUR;

        let spec = self.grid;
        let samples = path.samples();
        let mut grid = DoseGrid::zeros(spec);

        grid.values_mut()
            // one row per chunk
            .par_chunks_mut(spec.resolution.max(1))
            .enumerate()
            .for_each(|(row, cells)| {
                let y = spec.coordinate(row);
                for (col, cell) in cells.iter_mut().enumerate() {
                    let x = spec.coordinate(col);
                    let exposure: f64 = samples
                        .iter()
                        .map(|s| {
                            self.beam.intensity(x - s.position.x, y - s.position.y) * s.dwell
                        })
                        .sum();
                    *cell = exposure * weight;
                }
            });

        debug!(
            samples = samples.len(),
            cells = spec.cell_count(),
            area,
            "Accumulated single pass"
        );
        Ok(grid)
    }

    /// Dose after repeating `path` for `target_elapsed` seconds
    pub fn accumulate(
        &self,
        path: &RasterPath,
        rate: f64,
        target_elapsed: f64,
    ) -> Result<DoseGrid, SimulationError> {
        if !target_elapsed.is_finite() || target_elapsed <= 0.0 {
            return Err(SimulationError::not_positive(
                "target elapsed time",
                target_elapsed,
            ));
        }
        let pass_time = path.total_dwell();
        if pass_time == 0.0 {
            return Err(SimulationError::DivisionByZero {
                quantity: "total pass time".to_string(),
            });
        }

        let mut grid = self.accumulate_unscaled(path, rate)?;
        let scale = target_elapsed / pass_time;
        grid.scale(scale);

        debug!(pass_time, scale, "Scaled pass to target exposure");
        Ok(grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::beam_profile::BeamProfileParams;
    use crate::raster_path::{RasterPathBuilder, RasterSample};
    use rasterdose_core::{Directive, Point2};
    use rasterdose_pattern::{PatternFile, PatternMetadata};

    fn beam() -> BeamProfile {
        BeamProfile::new(BeamProfileParams {
            center_core: Point2::origin(),
            center_halo: Point2::origin(),
            cutoff_core: 0.0,
            mu: (0.0, 0.0),
            sigma: (2.0, 5.0),
            amplitude: (0.0, 1.0),
            aperture_radius: 2.25,
        })
        .unwrap()
    }

    fn path(directives: Vec<Directive>) -> RasterPath {
        let pattern = PatternFile {
            directives,
            metadata: PatternMetadata {
                step_size: Some(1.0),
                speed: Some(1.0),
                offset: vec![],
                error: false,
            },
            closed_loop: None,
        };
        RasterPathBuilder::default().build(&pattern, 1.0).unwrap()
    }

    fn grid_spec() -> GridSpec {
        GridSpec::new(5.0, 21)
    }

    fn window() -> GridSpec {
        GridSpec::new(3.0, 40)
    }

    #[test]
    fn test_reference_rate() {
        let reference = DepositionReference::default();
        let rate = reference.rate().unwrap();
        assert!((rate - 10.67 / 0.5864).abs() < 1e-12);
        assert!((reference.target_elapsed_seconds() - 0.5864 * 3600.0).abs() < 1e-9);

        let pooled = DepositionReference::new(vec![
            ReferenceRun::new(10.0, 1.0),
            ReferenceRun::new(20.0, 3.0),
        ]);
        assert_eq!(pooled.rate().unwrap(), 7.5);
    }

    #[test]
    fn test_reference_without_time_fails() {
        let reference = DepositionReference::new(vec![]);
        assert!(matches!(
            reference.rate(),
            Err(SimulationError::DivisionByZero { .. })
        ));
    }

    #[test]
    fn test_scale_invariance() {
        let beam = beam();
        let accumulator = DepositionAccumulator::new(&beam, grid_spec(), window());
        let path = path(vec![Directive::z(2.0), Directive::y(2.0)]);

        let once = accumulator.accumulate(&path, 10.0, 1000.0).unwrap();
        let twice = accumulator.accumulate(&path, 10.0, 2000.0).unwrap();

        for (a, b) in once.values().iter().zip(twice.values()) {
            assert_eq!(*b, 2.0 * a);
        }
    }

    #[test]
    fn test_additivity_of_samples() {
        let beam = beam();
        let accumulator = DepositionAccumulator::new(&beam, grid_spec(), window());

        let left = RasterSample::new(Point2::new(-2.5, 0.0), 1.0);
        let right = RasterSample::new(Point2::new(2.5, 1.0), 0.5);

        let a = accumulator
            .accumulate_unscaled(&RasterPath::from_samples(Point2::origin(), vec![left]), 5.0)
            .unwrap();
        let b = accumulator
            .accumulate_unscaled(&RasterPath::from_samples(Point2::origin(), vec![right]), 5.0)
            .unwrap();
        let both = accumulator
            .accumulate_unscaled(
                &RasterPath::from_samples(Point2::origin(), vec![left, right]),
                5.0,
            )
            .unwrap();

        for ((x, y), sum) in a.values().iter().zip(b.values()).zip(both.values()) {
            assert!((x + y - sum).abs() <= 1e-12 * sum.abs().max(1.0));
        }
        assert!(both.sum() > a.sum());
        assert!(both.sum() > b.sum());
    }

    #[test]
    fn test_dose_follows_beam() {
        let beam = beam();
        let accumulator = DepositionAccumulator::new(&beam, grid_spec(), window());
        let grid = accumulator
            .accumulate(&path(vec![Directive::z(0.0)]), 10.0, 3600.0)
            .unwrap();

        // Stationary beam at the origin: peak at the centre, nothing far away
        let centre = grid.get(10, 10).unwrap();
        assert_eq!(grid.max(), Some(centre));
        assert_eq!(grid.get(0, 0), Some(0.0));
    }

    #[test]
    fn test_numeric_contract() {
        let beam = beam();
        let accumulator = DepositionAccumulator::new(&beam, grid_spec(), window());
        let line = path(vec![Directive::z(1.0)]);

        assert!(matches!(
            accumulator.accumulate(&line, 0.0, 10.0),
            Err(SimulationError::InvalidParameter { .. })
        ));
        assert!(matches!(
            accumulator.accumulate(&line, 1.0, -1.0),
            Err(SimulationError::InvalidParameter { .. })
        ));
        assert_eq!(
            accumulator.accumulate(&path(vec![]), 1.0, 10.0),
            Err(SimulationError::DivisionByZero {
                quantity: "total pass time".to_string()
            })
        );
    }
}
