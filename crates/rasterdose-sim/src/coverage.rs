//! Coverage statistics over a circular mask

use rasterdose_core::constants::DEFAULT_MASK_RADIUS_MM;
use rasterdose_core::SimulationError;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::grid::DoseGrid;

/// Summary of a dose grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageStats {
    /// Largest cell value anywhere on the grid
    pub peak: f64,
    /// Mean of the cells inside the mask
    ///
    /// `None` when no grid point falls inside the mask.
    pub in_mask_average: Option<f64>,
    /// Share of the total dose landing inside the mask (%)
    ///
    /// `None` when the grid holds no dose at all; `Some(0.0)` when there is
    /// dose but no grid point inside the mask.
    pub charge_fraction: Option<f64>,
    /// Number of cells inside the mask
    pub in_mask_cells: usize,
}

/// Computes [`CoverageStats`] for a fixed mask radius
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoverageAnalyzer {
    mask_radius: f64,
}

impl Default for CoverageAnalyzer {
    fn default() -> Self {
        Self::new(DEFAULT_MASK_RADIUS_MM)
    }
}

impl CoverageAnalyzer {
    pub fn new(mask_radius: f64) -> Self {
        Self { mask_radius }
    }

    pub fn mask_radius(&self) -> f64 {
        self.mask_radius
    }

    /// Whether a point at `(x, y)` lies inside the mask (boundary included)
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x * x + y * y <= self.mask_radius * self.mask_radius
    }

    /// Fails only for a grid without cells
    pub fn analyze(&self, grid: &DoseGrid) -> Result<CoverageStats, SimulationError> {
        let peak = grid.max().ok_or(SimulationError::EmptyGrid)?;

        let (in_mask_sum, in_mask_cells) = grid
            .cells()
            .filter(|(point, _)| self.contains(point.x, point.y))
            .fold((0.0, 0usize), |(sum, count), (_, value)| {
                (sum + value, count + 1)
            });

        if in_mask_cells == 0 {
            debug!(mask_radius = self.mask_radius, "No grid point inside the mask");
        }

        let total = grid.sum();
        let charge_fraction = if total == 0.0 {
            None
        } else {
            Some(in_mask_sum / total * 100.0)
        };

        let stats = CoverageStats {
            peak,
            in_mask_average: (in_mask_cells > 0).then(|| in_mask_sum / in_mask_cells as f64),
            charge_fraction,
            in_mask_cells,
        };
        debug!(?stats, "Coverage analyzed");
        Ok(stats)
    }
}

/// Analyze `grid` with a mask of `mask_radius`
pub fn analyze(grid: &DoseGrid, mask_radius: f64) -> Result<CoverageStats, SimulationError> {
    CoverageAnalyzer::new(mask_radius).analyze(grid)
}
