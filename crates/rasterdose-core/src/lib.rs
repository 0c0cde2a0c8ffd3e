//! # RasterDose Core
//!
//! Core types, errors and default constants shared by every RasterDose crate.
//! Provides the motion vocabulary (axes, directives, planar points) used by
//! the pattern parser and the simulation engine.

pub mod constants;
pub mod error;
pub mod types;

pub use error::{Error, FormatError, PathError, Result, SimulationError};
pub use types::{Axis, Directive, Point2};
