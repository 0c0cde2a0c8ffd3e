//! Error handling for RasterDose
//!
//! Provides error types for every stage of the simulation pipeline:
//! - Format errors (pattern file parsing)
//! - Path errors (raster path construction)
//! - Simulation errors (dose accumulation and coverage analysis)
//!
//! All error types use `thiserror` for ergonomic error handling. A pattern
//! that does not close its loop is not an error; it is reported as data by
//! the parser.

use thiserror::Error;

/// Pattern file format error
///
/// Fatal at parse time. Every variant carries the 1-based line number where
/// the problem was detected.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormatError {
    /// Input ended before the section was terminated
    #[error("Empty line encountered {context} (line {line}). Mark end of FILE/PATTERN with \"<<<END>>>\"")]
    EmptyLine {
        /// Line number at which the input ran out.
        line: usize,
        /// Where the parser was when the input ran out.
        context: String,
    },

    /// Repeat block was never closed with `}*<n>`
    #[error("Multiplier section opened at line {line} not finished")]
    UnfinishedRepeat {
        /// Line number of the opening brace.
        line: usize,
    },

    /// Line could not be read as a directive or data entry
    #[error("Malformed line {line} '{content}': {reason}")]
    MalformedLine {
        /// Line number of the offending line.
        line: usize,
        /// The raw line content.
        content: String,
        /// What was wrong with it.
        reason: String,
    },

    /// Pattern file could not be read
    #[error("Failed to read pattern file {path}: {reason}")]
    Io {
        /// Path of the pattern file.
        path: String,
        /// The underlying I/O failure.
        reason: String,
    },
}

impl FormatError {
    /// Line number the error points at, if any.
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::EmptyLine { line, .. }
            | Self::UnfinishedRepeat { line }
            | Self::MalformedLine { line, .. } => Some(*line),
            Self::Io { .. } => None,
        }
    }
}

/// Raster path construction error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PathError {
    /// Directive or offset names an axis other than Z or Y
    #[error("Unknown axis identifier encountered in {context}: {axis}")]
    UnknownAxis {
        /// The offending axis label.
        axis: String,
        /// Either "offset" or "pattern".
        context: &'static str,
    },

    /// Pattern file did not provide a required data entry
    #[error("Pattern metadata '{field}' is not set")]
    MissingMetadata {
        /// Name of the missing data key.
        field: &'static str,
    },

    /// Stage speed must be finite and strictly positive
    #[error("Invalid stage speed: {speed} (must be > 0)")]
    InvalidSpeed {
        /// The rejected speed.
        speed: f64,
    },

    /// A move would need more sample points than allowed
    #[error("Move of {travel} mm needs more than {limit} sample points")]
    TooManySamples {
        /// Travel of the move after step scaling.
        travel: f64,
        /// The configured per-move limit.
        limit: usize,
    },
}

/// Dose accumulation and coverage analysis error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimulationError {
    /// A divisor of the scaling pipeline was zero
    #[error("Division by zero: {quantity} is zero")]
    DivisionByZero {
        /// Name of the zero quantity.
        quantity: String,
    },

    /// Beam profile integrates to zero over the aperture
    #[error("Beam profile has zero average intensity inside the aperture")]
    ZeroNormalization,

    /// Grid has no cells
    #[error("Grid is empty")]
    EmptyGrid,

    /// A numeric input was out of range
    #[error("Invalid parameter '{name}': {value} ({reason})")]
    InvalidParameter {
        /// The parameter name.
        name: String,
        /// The rejected value.
        value: f64,
        /// Why it was rejected.
        reason: String,
    },
}

impl SimulationError {
    /// Shorthand for a strictly-positive check failure.
    pub fn not_positive(name: impl Into<String>, value: f64) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            value,
            reason: "must be > 0".to_string(),
        }
    }
}

/// Main error type for RasterDose
///
/// A unified error type that can represent any error from all layers.
#[derive(Error, Debug)]
pub enum Error {
    /// Pattern format error
    #[error(transparent)]
    Format(#[from] FormatError),

    /// Raster path error
    #[error(transparent)]
    Path(#[from] PathError),

    /// Simulation error
    #[error(transparent)]
    Simulation(#[from] SimulationError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a pattern format error
    pub fn is_format_error(&self) -> bool {
        matches!(self, Error::Format(_))
    }

    /// Check if this is a raster path error
    pub fn is_path_error(&self) -> bool {
        matches!(self, Error::Path(_))
    }

    /// Check if this is a simulation error
    pub fn is_simulation_error(&self) -> bool {
        matches!(self, Error::Simulation(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
