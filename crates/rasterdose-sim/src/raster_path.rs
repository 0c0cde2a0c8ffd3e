//! Raster path construction
//!
//! Converts the parsed move sequence into timed beam positions. Every move is
//! sampled along a straight line with both ends included; each sample dwells
//! for the time the stage needs to cover one sample spacing. A settle sample
//! at the end of every move models the brief stop between direction changes.

use rasterdose_core::constants::{
    DEFAULT_MAX_POINTS_PER_MOVE, DEFAULT_SAMPLES_PER_UNIT, DEFAULT_SETTLE_DWELL_S,
    DEFAULT_SPACING_DENSITY,
};
use rasterdose_core::{Axis, Directive, PathError, Point2};
use rasterdose_pattern::PatternFile;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Sampling and timing of the raster path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RasterSettings {
    /// Samples per mm of travel, before thinning
    pub samples_per_unit: f64,
    /// Divisor thinning out the samples
    pub spacing_density: u32,
    /// Pause at the end of every move (s)
    pub settle_dwell: f64,
    /// Moves needing more sample points than this are rejected
    pub max_points_per_move: usize,
}

impl Default for RasterSettings {
    fn default() -> Self {
        Self {
            samples_per_unit: DEFAULT_SAMPLES_PER_UNIT,
            spacing_density: DEFAULT_SPACING_DENSITY,
            settle_dwell: DEFAULT_SETTLE_DWELL_S,
            max_points_per_move: DEFAULT_MAX_POINTS_PER_MOVE,
        }
    }
}

impl RasterSettings {
    /// Number of sample points (both ends included) for a move of `travel` mm
    ///
    /// `floor(samples_per_unit * floor(|travel| + 1) / spacing_density)`, never
    /// fewer than two points so every move has at least one interval.
    /// Fails when the count is not finite or exceeds `max_points_per_move`.
    pub fn point_count(&self, travel: f64) -> Result<usize, PathError> {
        let whole_units = (travel.abs() + 1.0).floor();
        let density = f64::from(self.spacing_density.max(1));
        let count = (self.samples_per_unit * whole_units / density).floor();
        if !count.is_finite() || count > self.max_points_per_move as f64 {
            return Err(PathError::TooManySamples {
                travel,
                limit: self.max_points_per_move,
            });
        }
        Ok((count as usize).max(2))
    }
}

/// One timed beam position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RasterSample {
    /// Beam position (mm); stage Z in `x`, stage Y in `y`
    pub position: Point2,
    /// Time spent at this position (s)
    pub dwell: f64,
}

impl RasterSample {
    pub fn new(position: Point2, dwell: f64) -> Self {
        Self { position, dwell }
    }
}

/// Ordered timed samples tracing one pass of the pattern
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RasterPath {
    start: Point2,
    samples: Vec<RasterSample>,
    moves: usize,
}

impl RasterPath {
    /// Path from explicit samples; it reports zero moves
    pub fn from_samples(start: Point2, samples: Vec<RasterSample>) -> Self {
        Self {
            start,
            samples,
            moves: 0,
        }
    }

    /// Position before the first move, after applying offsets
    pub fn start(&self) -> Point2 {
        self.start
    }

    /// Final beam position
    pub fn end(&self) -> Point2 {
        self.samples
            .last()
            .map(|sample| sample.position)
            .unwrap_or(self.start)
    }

    pub fn samples(&self) -> &[RasterSample] {
        &self.samples
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RasterSample> {
        self.samples.iter()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Number of moves the path was built from
    pub fn move_count(&self) -> usize {
        self.moves
    }

    /// Duration of one pass (s)
    pub fn total_dwell(&self) -> f64 {
        self.samples.iter().map(|sample| sample.dwell).sum()
    }
}

impl<'a> IntoIterator for &'a RasterPath {
    type Item = &'a RasterSample;
    type IntoIter = std::slice::Iter<'a, RasterSample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}

/// Builds raster paths from parsed patterns
#[derive(Debug, Clone, Default)]
pub struct RasterPathBuilder {
    settings: RasterSettings,
}

impl RasterPathBuilder {
    pub fn new(settings: RasterSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &RasterSettings {
        &self.settings
    }

    /// Build the path using the speed from the pattern's data section
    pub fn build_with_pattern_speed(&self, pattern: &PatternFile) -> Result<RasterPath, PathError> {
        let speed = pattern
            .metadata
            .speed
            .ok_or(PathError::MissingMetadata { field: "speed" })?;
        self.build(pattern, speed)
    }

    /// Build the path for `pattern` at stage `speed` (mm/s)
    pub fn build(&self, pattern: &PatternFile, speed: f64) -> Result<RasterPath, PathError> {
        if !speed.is_finite() || speed <= 0.0 {
            return Err(PathError::InvalidSpeed { speed });
        }
        let step_size = pattern
            .metadata
            .step_size
            .ok_or(PathError::MissingMetadata { field: "step_size" })?;

        let start = start_position(&pattern.metadata.offset, step_size)?;
        let mut current = start;
        let mut samples = Vec::new();

        for directive in &pattern.directives {
            current = self.trace_move(&mut samples, current, directive, step_size, speed)?;
        }

        let path = RasterPath {
            start,
            samples,
            moves: pattern.directives.len(),
        };
        debug!(
            moves = path.moves,
            samples = path.len(),
            pass_time_s = path.total_dwell(),
            "Raster path built"
        );
        Ok(path)
    }

    /// Append the samples for one move and return its end point
    fn trace_move(
        &self,
        samples: &mut Vec<RasterSample>,
        current: Point2,
        directive: &Directive,
        step_size: f64,
        speed: f64,
    ) -> Result<Point2, PathError> {
        let travel = directive.distance * step_size;
        let (from, to) = match &directive.axis {
            Axis::Z => (current.x, current.x + travel),
            Axis::Y => (current.y, current.y + travel),
            Axis::Other(label) => {
                return Err(PathError::UnknownAxis {
                    axis: label.clone(),
                    context: "pattern",
                })
            }
        };

        let count = self.settings.point_count(to - from)?;
        let spacing = (to - from) / (count - 1) as f64;
        let dwell = (spacing / speed).abs();

        for i in 0..count {
            let coordinate = if i == count - 1 {
                to
            } else {
                from + i as f64 * spacing
            };
            let position = match directive.axis {
                Axis::Z => Point2::new(coordinate, current.y),
                _ => Point2::new(current.x, coordinate),
            };
            samples.push(RasterSample::new(position, dwell));
        }

        let end = match directive.axis {
            Axis::Z => Point2::new(to, current.y),
            _ => Point2::new(current.x, to),
        };
        samples.push(RasterSample::new(end, self.settings.settle_dwell));
        Ok(end)
    }
}

/// Sum the offsets per axis and scale by the step size
fn start_position(offsets: &[Directive], step_size: f64) -> Result<Point2, PathError> {
    let mut z = 0.0;
    let mut y = 0.0;
    for offset in offsets {
        match &offset.axis {
            Axis::Z => z += offset.distance,
            Axis::Y => y += offset.distance,
            Axis::Other(label) => {
                return Err(PathError::UnknownAxis {
                    axis: label.clone(),
                    context: "offset",
                })
            }
        }
    }
    Ok(Point2::new(z * step_size, y * step_size))
}
