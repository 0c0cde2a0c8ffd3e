//! Motion vocabulary shared by the parser and the simulation engine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Axis label of a pattern directive.
///
/// The deposition stage moves along two axes, `Z` and `Y`. Any other label is
/// kept verbatim so the path builder can reject it with a useful message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Axis {
    /// Horizontal stage axis (maps onto the grid's x coordinate)
    Z,
    /// Vertical stage axis (maps onto the grid's y coordinate)
    Y,
    /// Label that is not a stage axis
    Other(String),
}

impl Axis {
    /// Classify a raw label; surrounding whitespace is ignored.
    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "Z" => Self::Z,
            "Y" => Self::Y,
            other => Self::Other(other.to_string()),
        }
    }

    /// Returns the label as written in pattern files.
    pub fn label(&self) -> &str {
        match self {
            Self::Z => "Z",
            Self::Y => "Y",
            Self::Other(label) => label,
        }
    }

    /// True for `Z` and `Y`.
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<String> for Axis {
    fn from(label: String) -> Self {
        Self::from_label(&label)
    }
}

impl From<Axis> for String {
    fn from(axis: Axis) -> Self {
        axis.label().to_string()
    }
}

/// One motion instruction: move `distance` pattern units along `axis`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Directive {
    pub axis: Axis,
    /// Signed distance in pattern units (not yet scaled by the step size)
    pub distance: f64,
}

impl Directive {
    /// Creates a new directive.
    pub fn new(axis: Axis, distance: f64) -> Self {
        Self { axis, distance }
    }

    /// Shorthand for a `Z` move.
    pub fn z(distance: f64) -> Self {
        Self::new(Axis::Z, distance)
    }

    /// Shorthand for a `Y` move.
    pub fn y(distance: f64) -> Self {
        Self::new(Axis::Y, distance)
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.axis, self.distance)
    }
}

/// A point in the physical plane (mm).
///
/// Stage `Z` is stored in `x`, stage `Y` in `y`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn origin() -> Self {
        Self::default()
    }

    /// Squared distance to the origin.
    pub fn norm_squared(&self) -> f64 {
        self.x * self.x + self.y * self.y
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: &Point2) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

impl From<(f64, f64)> for Point2 {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}
