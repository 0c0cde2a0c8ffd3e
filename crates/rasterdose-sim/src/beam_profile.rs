//! Beam intensity profile
//!
//! The beam is modelled as two radially symmetric Gaussian lobes: a broad,
//! weak halo and a bright core. Inside the core cutoff radius the core value
//! replaces the halo value. Everything outside the aperture is dark.
//!
//! Offsets are relative to the beam position, so the aperture is centred on
//! the origin of the offset frame.

use rasterdose_core::{Point2, SimulationError};
use serde::{Deserialize, Serialize};

use crate::grid::{DoseGrid, GridSpec};

/// Unnormalized Gaussian, peak 1 at `x = mu`
pub fn gaussian(x: f64, mu: f64, sigma: f64) -> f64 {
    (-(x - mu).powi(2) / (2.0 * sigma.powi(2))).exp()
}

/// Shape parameters of the two-lobe beam
///
/// Tuple fields hold `(core, halo)` pairs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeamProfileParams {
    /// Centre of the bright lobe (mm)
    pub center_core: Point2,
    /// Centre of the halo lobe (mm)
    pub center_halo: Point2,
    /// Radius around `center_core` where the core lobe applies (mm)
    pub cutoff_core: f64,
    pub mu: (f64, f64),
    pub sigma: (f64, f64),
    pub amplitude: (f64, f64),
    /// Radius of the beam-limiting aperture (mm)
    pub aperture_radius: f64,
}

impl BeamProfileParams {
    /// Check the parameters describe a usable profile
    pub fn validate(&self) -> Result<(), SimulationError> {
        if !self.sigma.0.is_finite() || self.sigma.0 <= 0.0 {
            return Err(SimulationError::not_positive("sigma (core)", self.sigma.0));
        }
        if !self.sigma.1.is_finite() || self.sigma.1 <= 0.0 {
            return Err(SimulationError::not_positive("sigma (halo)", self.sigma.1));
        }
        if !self.aperture_radius.is_finite() || self.aperture_radius <= 0.0 {
            return Err(SimulationError::not_positive(
                "aperture radius",
                self.aperture_radius,
            ));
        }
        Ok(())
    }
}

/// Validated beam profile
#[derive(Debug, Clone, PartialEq)]
pub struct BeamProfile {
    params: BeamProfileParams,
}

impl BeamProfile {
    /// Create a profile, rejecting zero widths and a closed aperture
    pub fn new(params: BeamProfileParams) -> Result<Self, SimulationError> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &BeamProfileParams {
        &self.params
    }

    /// Intensity at offset `(dx, dy)` from the beam position
    pub fn intensity(&self, dx: f64, dy: f64) -> f64 {
        let p = &self.params;

        if dx * dx + dy * dy > p.aperture_radius * p.aperture_radius {
            return 0.0;
        }

        let core_sq = (dx - p.center_core.x).powi(2) + (dy - p.center_core.y).powi(2);
        if core_sq <= p.cutoff_core * p.cutoff_core {
            return gaussian(core_sq.sqrt(), p.mu.0, p.sigma.0) * p.amplitude.0;
        }

        let halo = ((dx - p.center_halo.x).powi(2) + (dy - p.center_halo.y).powi(2)).sqrt();
        gaussian(halo, p.mu.1, p.sigma.1) * p.amplitude.1
    }

    /// Average intensity over the aperture disk, sampled on `window`
    ///
    /// Dividing by this value turns the raw amplitude into a per-pass
    /// reference intensity.
    pub fn normalization_area(&self, window: &GridSpec) -> Result<f64, SimulationError> {
        let radius_sq = self.params.aperture_radius * self.params.aperture_radius;

        let (sum, count) = window
            .points()
            .filter(|p| p.norm_squared() <= radius_sq)
            .fold((0.0, 0usize), |(sum, count), p| {
                (sum + self.intensity(p.x, p.y), count + 1)
            });

        if count == 0 || sum == 0.0 {
            return Err(SimulationError::ZeroNormalization);
        }
        Ok(sum / count as f64)
    }

    /// Profile sampled on `window`, for external plotting
    pub fn sample_window(&self, window: &GridSpec) -> DoseGrid {
        let mut grid = DoseGrid::zeros(*window);
        for (value, point) in grid.values_mut().iter_mut().zip(window.points()) {
            *value = self.intensity(point.x, point.y);
        }
        grid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn focused() -> BeamProfileParams {
        BeamProfileParams {
            center_core: Point2::new(-3.0, -3.0),
            center_halo: Point2::new(-3.0, 0.0),
            cutoff_core: 3.0,
            mu: (0.0, 0.0),
            sigma: (2.0, 4.0),
            amplitude: (3.0, 0.3),
            aperture_radius: 2.25,
        }
    }

    fn defocused() -> BeamProfileParams {
        BeamProfileParams {
            center_core: Point2::origin(),
            center_halo: Point2::origin(),
            cutoff_core: 0.0,
            mu: (0.0, 0.0),
            sigma: (2.0, 5.0),
            amplitude: (0.0, 1.0),
            aperture_radius: 2.25,
        }
    }

    #[test]
    fn test_gaussian_peak_and_falloff() {
        assert_eq!(gaussian(1.0, 1.0, 2.0), 1.0);
        let one_sigma = gaussian(2.0, 0.0, 2.0);
        assert!((one_sigma - (-0.5f64).exp()).abs() < 1e-12);
        assert_eq!(gaussian(-2.0, 0.0, 2.0), one_sigma);
    }

    #[test]
    fn test_aperture_forces_zero() {
        let beam = BeamProfile::new(defocused()).unwrap();
        assert!(beam.intensity(2.0, 0.0) > 0.0);
        assert_eq!(beam.intensity(2.3, 0.0), 0.0);
        assert_eq!(beam.intensity(1.6, 1.6), 0.0);
    }

    #[test]
    fn test_halo_lobe() {
        let beam = BeamProfile::new(defocused()).unwrap();
        let expected = gaussian(1.0, 0.0, 5.0);
        assert!((beam.intensity(1.0, 0.0) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_core_overwrites_halo_inside_cutoff() {
        let beam = BeamProfile::new(focused()).unwrap();

        // (0, -1) is sqrt(13) from the core centre: halo only
        let halo_only = beam.intensity(0.0, -1.0);
        let halo = gaussian(10f64.sqrt(), 0.0, 4.0) * 0.3;
        assert!((halo_only - halo).abs() < 1e-12);

        // (-1, -1) is sqrt(8) from the core centre: core value, not the sum
        let inside = beam.intensity(-1.0, -1.0);
        let core = gaussian(8f64.sqrt(), 0.0, 2.0) * 3.0;
        assert!((inside - core).abs() < 1e-12);
    }

    #[test]
    fn test_cutoff_boundary_is_inclusive() {
        let mut params = defocused();
        params.cutoff_core = 1.0;
        params.amplitude = (2.0, 1.0);
        let beam = BeamProfile::new(params).unwrap();

        let on_boundary = beam.intensity(1.0, 0.0);
        assert!((on_boundary - gaussian(1.0, 0.0, 2.0) * 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_params_rejected() {
        let mut params = defocused();
        params.sigma.1 = 0.0;
        assert!(BeamProfile::new(params).is_err());

        let mut params = defocused();
        params.aperture_radius = -1.0;
        assert!(matches!(
            BeamProfile::new(params),
            Err(SimulationError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_normalization_area_is_mean_inside_aperture() {
        let beam = BeamProfile::new(defocused()).unwrap();
        let area = beam.normalization_area(&GridSpec::new(3.0, 100)).unwrap();

        // Broad halo: the mean sits between the edge and centre values
        assert!(area < 1.0);
        assert!(area > gaussian(2.25, 0.0, 5.0));
    }

    #[test]
    fn test_normalization_of_dark_beam_fails() {
        let mut params = defocused();
        params.amplitude = (0.0, 0.0);
        let beam = BeamProfile::new(params).unwrap();
        assert_eq!(
            beam.normalization_area(&GridSpec::new(3.0, 50)),
            Err(SimulationError::ZeroNormalization)
        );
    }

    #[test]
    fn test_sample_window_matches_intensity() {
        let beam = BeamProfile::new(focused()).unwrap();
        let window = GridSpec::new(3.0, 7);
        let sampled = beam.sample_window(&window);
        for (point, value) in sampled.cells() {
            assert_eq!(value, beam.intensity(point.x, point.y));
        }
    }
}
