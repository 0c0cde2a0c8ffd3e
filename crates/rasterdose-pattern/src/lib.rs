//! # RasterDose Pattern
//!
//! Reads `.pattern` files describing a beam raster. A file has a data section
//! (step size and stage speed) and a pattern section of axis moves, optional
//! starting offsets and `{ ... }*n` repeat blocks.
//!
//! ```text
//! # comment lines allowed anywhere
//! <<<DATA>>>
//! step_size = 1.0
//! speed = 2.0
//! <<<PATTERN>>>
//!   --> Z: -2.0
//!   {
//!     Z: 4.0
//!     Y: 0.5
//!     Z: -4.0
//!     Y: 0.5
//!   }*4
//!   Y: -4.0
//! <<<END>>>
//! ```
//!
//! Parsing is split in two stages: [`lexer`] classifies each line into typed
//! tokens and [`parser`] runs the section state machine over them.

pub mod lexer;
pub mod parser;
pub mod pattern;

pub use lexer::{LexedLine, Lexer, SectionMarker, Token};
pub use parser::{parse_pattern, PatternParser};
pub use pattern::{ClosedLoopViolation, PatternFile, PatternMetadata};
