//! Square dose grid over the physical plane
//!
//! Grid points are spaced like `linspace(-half_extent, half_extent, resolution)`
//! on both axes, both ends included. Values are stored row-major: row index
//! follows `y`, column index follows `x`.

use rasterdose_core::constants::{DEFAULT_GRID_HALF_EXTENT_MM, DEFAULT_GRID_RESOLUTION};
use rasterdose_core::Point2;
use serde::{Deserialize, Serialize};

/// Extent and resolution of a square sampling grid
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    /// Half width of the covered square (mm)
    pub half_extent: f64,
    /// Points per side
    pub resolution: usize,
}

impl Default for GridSpec {
    fn default() -> Self {
        Self {
            half_extent: DEFAULT_GRID_HALF_EXTENT_MM,
            resolution: DEFAULT_GRID_RESOLUTION,
        }
    }
}

impl GridSpec {
    pub fn new(half_extent: f64, resolution: usize) -> Self {
        Self {
            half_extent,
            resolution,
        }
    }

    /// Distance between neighbouring points (0 for a single-point grid)
    pub fn spacing(&self) -> f64 {
        if self.resolution < 2 {
            0.0
        } else {
            2.0 * self.half_extent / (self.resolution - 1) as f64
        }
    }

    /// Coordinate of the `index`-th point along either axis
    pub fn coordinate(&self, index: usize) -> f64 {
        if self.resolution >= 2 && index == self.resolution - 1 {
            self.half_extent
        } else {
            -self.half_extent + index as f64 * self.spacing()
        }
    }

    /// Number of cells
    pub fn cell_count(&self) -> usize {
        self.resolution * self.resolution
    }

    /// Position of a cell
    pub fn position(&self, col: usize, row: usize) -> Point2 {
        Point2::new(self.coordinate(col), self.coordinate(row))
    }

    /// All grid positions in storage order
    pub fn points(&self) -> impl Iterator<Item = Point2> + '_ {
        (0..self.resolution)
            .flat_map(move |row| (0..self.resolution).map(move |col| self.position(col, row)))
    }
}

/// Accumulated dose per grid point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoseGrid {
    spec: GridSpec,
    values: Vec<f64>,
}

impl DoseGrid {
    /// Zero-filled grid
    pub fn zeros(spec: GridSpec) -> Self {
        Self {
            spec,
            values: vec![0.0; spec.cell_count()],
        }
    }

    pub fn spec(&self) -> &GridSpec {
        &self.spec
    }

    /// Values in row-major order
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub(crate) fn values_mut(&mut self) -> &mut [f64] {
        &mut self.values
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value at a cell, `None` outside the grid
    pub fn get(&self, col: usize, row: usize) -> Option<f64> {
        if col >= self.spec.resolution || row >= self.spec.resolution {
            return None;
        }
        Some(self.values[row * self.spec.resolution + col])
    }

    /// Cells with their positions, in storage order
    pub fn cells(&self) -> impl Iterator<Item = (Point2, f64)> + '_ {
        self.spec.points().zip(self.values.iter().copied())
    }

    /// Largest value; `None` for an empty grid
    pub fn max(&self) -> Option<f64> {
        if self.values.is_empty() {
            return None;
        }
        Some(self.values.iter().copied().fold(f64::NEG_INFINITY, f64::max))
    }

    pub fn sum(&self) -> f64 {
        self.values.iter().sum()
    }

    /// Multiply every cell by `factor`
    pub fn scale(&mut self, factor: f64) {
        for value in &mut self.values {
            *value *= factor;
        }
    }
}
