//! Parse result types

use rasterdose_core::{Axis, Directive};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Metadata read from the data section and the pattern's offset lines
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatternMetadata {
    /// Physical length of one pattern unit (mm), if given
    pub step_size: Option<f64>,
    /// Stage speed (mm/s), if given
    pub speed: Option<f64>,
    /// Starting offset moves, in file order
    pub offset: Vec<Directive>,
    /// Set when the pattern does not return to its starting point
    pub error: bool,
}

/// Net displacement of a pattern that does not close its loop
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClosedLoopViolation {
    /// Sum of Z distances (pattern units)
    pub z: f64,
    /// Sum of Y distances (pattern units)
    pub y: f64,
}

impl fmt::Display for ClosedLoopViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Pattern doesn't add up to zero ({}, {})",
            self.z, self.y
        )
    }
}

/// A fully parsed pattern file
///
/// `directives` is the flattened move sequence with every repeat block
/// expanded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatternFile {
    pub directives: Vec<Directive>,
    pub metadata: PatternMetadata,
    /// Diagnostic for an open loop; mirrors `metadata.error`
    pub closed_loop: Option<ClosedLoopViolation>,
}

impl PatternFile {
    /// Net raw displacement per axis as `(z, y)`; unknown axes are ignored.
    pub fn net_displacement(&self) -> (f64, f64) {
        net_displacement(&self.directives)
    }

    /// True when the pattern returns to its starting point
    pub fn is_closed_loop(&self) -> bool {
        !self.metadata.error
    }

    /// Number of moves after repeat expansion
    pub fn len(&self) -> usize {
        self.directives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.directives.is_empty()
    }
}

/// Sum raw distances per stage axis
pub fn net_displacement(directives: &[Directive]) -> (f64, f64) {
    directives
        .iter()
        .fold((0.0, 0.0), |(z, y), directive| match directive.axis {
            Axis::Z => (z + directive.distance, y),
            Axis::Y => (z, y + directive.distance),
            Axis::Other(_) => (z, y),
        })
}

/// Check that the pattern returns to its start: both sums must round to zero.
///
/// Rounding is half away from zero, so a residual of exactly half a unit
/// already counts as open.
pub fn check_closed_loop(directives: &[Directive]) -> Option<ClosedLoopViolation> {
    let (z, y) = net_displacement(directives);
    if z.round() != 0.0 || y.round() != 0.0 {
        Some(ClosedLoopViolation { z, y })
    } else {
        None
    }
}
