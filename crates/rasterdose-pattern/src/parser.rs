//! Pattern file parser with section state tracking
//!
//! Runs a small state machine over the lexer output:
//!
//! - `SeekingSection`: everything but section markers is ignored
//! - `InData`: the next two non-comment lines are `key = value` entries
//! - `InPattern`: moves, offsets and repeat blocks until `<<<END>>>`
//!
//! Repeat blocks may nest; each open block is a frame on a stack and is
//! expanded into its parent when its closing line is read.

use std::path::Path;

use rasterdose_core::{Axis, Directive, FormatError};
use tracing::debug;

use crate::lexer::{LexedLine, Lexer, SectionMarker, Token};
use crate::pattern::{check_closed_loop, PatternFile, PatternMetadata};

/// Number of data lines read after `<<<DATA>>>`
const DATA_LINES: u8 = 2;

/// Where the parser currently is in the file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserState {
    /// Outside any section
    SeekingSection,
    /// Inside the data section with `remaining` data lines left
    InData { remaining: u8 },
    /// Inside the pattern section
    InPattern,
}

impl ParserState {
    fn describe(&self) -> &'static str {
        match self {
            Self::SeekingSection => "before pattern section",
            Self::InData { .. } => "in data section",
            Self::InPattern => "during pattern",
        }
    }
}

/// An open `{ ... }` block
#[derive(Debug)]
struct RepeatFrame {
    opened_at: usize,
    directives: Vec<Directive>,
}

/// Pattern file parser
pub struct PatternParser {
    state: ParserState,
    directives: Vec<Directive>,
    metadata: PatternMetadata,
    repeats: Vec<RepeatFrame>,
}

impl PatternParser {
    /// Create a new pattern parser
    pub fn new() -> Self {
        Self {
            state: ParserState::SeekingSection,
            directives: Vec::new(),
            metadata: PatternMetadata::default(),
            repeats: Vec::new(),
        }
    }

    /// Current parser state
    pub fn state(&self) -> ParserState {
        self.state
    }

    /// Read and parse a pattern file from disk
    pub fn parse_file(&mut self, path: impl AsRef<Path>) -> Result<PatternFile, FormatError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| FormatError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        self.parse(&text)
    }

    /// Parse pattern text
    ///
    /// Returns as soon as `<<<END>>>` closes the pattern section; anything
    /// after it is not read. An open loop is reported through
    /// `metadata.error` and `closed_loop`, not as an error.
    pub fn parse(&mut self, text: &str) -> Result<PatternFile, FormatError> {
        self.reset();

        let mut last_line = 0;
        for line in Lexer::new(text) {
            last_line = line.number;
            if self.consume_line(&line)? {
                return Ok(self.finish());
            }
        }

        Err(self.end_of_input(last_line + 1))
    }

    fn reset(&mut self) {
        self.state = ParserState::SeekingSection;
        self.directives.clear();
        self.metadata = PatternMetadata::default();
        self.repeats.clear();
    }

    /// Returns `true` once the end marker has been consumed
    fn consume_line(&mut self, line: &LexedLine<'_>) -> Result<bool, FormatError> {
        match self.state {
            ParserState::SeekingSection => {
                for token in &line.tokens {
                    if let Token::Section(marker) = token {
                        self.open_section(*marker, line.number);
                    }
                }
                Ok(false)
            }
            ParserState::InData { remaining } => {
                self.data_line(line, remaining)?;
                Ok(false)
            }
            ParserState::InPattern => {
                for token in &line.tokens {
                    if self.pattern_token(line, token)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
        }
    }

    fn open_section(&mut self, marker: SectionMarker, line: usize) {
        debug!(line, ?marker, "Entering section");
        self.state = match marker {
            SectionMarker::Data => ParserState::InData {
                remaining: DATA_LINES,
            },
            SectionMarker::Pattern => ParserState::InPattern,
        };
    }

    fn data_line(&mut self, line: &LexedLine<'_>, remaining: u8) -> Result<(), FormatError> {
        match line.tokens.first() {
            Some(Token::Comment) => return Ok(()),
            Some(Token::Section(marker)) => {
                // Fewer than two data lines; the section ends here
                self.open_section(*marker, line.number);
                return Ok(());
            }
            Some(Token::KeyValue { key, value }) => self.data_entry(line, key, value)?,
            _ => debug!(line = line.number, "Ignoring data line '{}'", line.raw.trim()),
        }

        self.state = if remaining > 1 {
            ParserState::InData {
                remaining: remaining - 1,
            }
        } else {
            ParserState::SeekingSection
        };
        Ok(())
    }

    fn data_entry(
        &mut self,
        line: &LexedLine<'_>,
        key: &str,
        value: &str,
    ) -> Result<(), FormatError> {
        match key {
            "step_size" => self.metadata.step_size = Some(parse_number(line, value, key)?),
            "speed" => self.metadata.speed = Some(parse_number(line, value, key)?),
            other => debug!(line = line.number, "Ignoring unknown data key '{}'", other),
        }
        Ok(())
    }

    /// Returns `true` on the end marker
    fn pattern_token(
        &mut self,
        line: &LexedLine<'_>,
        token: &Token<'_>,
    ) -> Result<bool, FormatError> {
        match token {
            Token::Comment | Token::Blank => {}
            Token::End => {
                if let Some(frame) = self.repeats.last() {
                    return Err(FormatError::UnfinishedRepeat {
                        line: frame.opened_at,
                    });
                }
                return Ok(true);
            }
            Token::Offset { body } => {
                if !self.repeats.is_empty() {
                    return Err(malformed(line, "starting offset inside a repeat block"));
                }
                let offset = parse_offset(line, body)?;
                self.metadata.offset.push(offset);
            }
            Token::RepeatOpen => self.repeats.push(RepeatFrame {
                opened_at: line.number,
                directives: Vec::new(),
            }),
            Token::RepeatClose { multiplier } => self.close_repeat(line, *multiplier)?,
            Token::Directive { axis, distance } => {
                let distance = parse_number(line, distance, "distance")?;
                let directive = Directive::new(Axis::from_label(axis), distance);
                self.current_block().push(directive);
            }
            Token::Section(_) => {
                return Err(malformed(line, "section marker inside pattern section"));
            }
            Token::KeyValue { .. } | Token::Text(_) => {
                return Err(malformed(line, "expected 'axis: distance'"));
            }
        }
        Ok(false)
    }

    fn close_repeat(
        &mut self,
        line: &LexedLine<'_>,
        multiplier: Option<&str>,
    ) -> Result<(), FormatError> {
        let frame = self
            .repeats
            .pop()
            .ok_or_else(|| malformed(line, "closing brace without an open repeat block"))?;

        let text = multiplier
            .ok_or_else(|| malformed(line, "repeat block closed without '*<count>'"))?;
        let count: usize = text
            .parse()
            .map_err(|_| malformed(line, format!("invalid repeat multiplier '{}'", text)))?;

        debug!(
            opened_at = frame.opened_at,
            closed_at = line.number,
            moves = frame.directives.len(),
            count,
            "Expanding repeat block"
        );

        let block = self.current_block();
        for _ in 0..count {
            block.extend(frame.directives.iter().cloned());
        }
        Ok(())
    }

    /// Innermost open repeat block, or the top-level sequence
    fn current_block(&mut self) -> &mut Vec<Directive> {
        match self.repeats.last_mut() {
            Some(frame) => &mut frame.directives,
            None => &mut self.directives,
        }
    }

    fn finish(&mut self) -> PatternFile {
        let directives = std::mem::take(&mut self.directives);
        let mut metadata = std::mem::take(&mut self.metadata);
        let closed_loop = check_closed_loop(&directives);

        if let Some(violation) = &closed_loop {
            debug!("{}", violation);
            metadata.error = true;
        }

        debug!(
            moves = directives.len(),
            offsets = metadata.offset.len(),
            "Pattern parsed"
        );
        self.state = ParserState::SeekingSection;

        PatternFile {
            directives,
            metadata,
            closed_loop,
        }
    }

    fn end_of_input(&self, line: usize) -> FormatError {
        match self.repeats.last() {
            Some(frame) => FormatError::UnfinishedRepeat {
                line: frame.opened_at,
            },
            None => FormatError::EmptyLine {
                line,
                context: self.state.describe().to_string(),
            },
        }
    }
}

impl Default for PatternParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse pattern text with a fresh parser
pub fn parse_pattern(text: &str) -> Result<PatternFile, FormatError> {
    PatternParser::new().parse(text)
}

/// Parse `axis: distance` after an offset arrow; the axis is the first
/// non-space character.
fn parse_offset(line: &LexedLine<'_>, body: &str) -> Result<Directive, FormatError> {
    let (axis_part, distance) = body
        .split_once(':')
        .ok_or_else(|| malformed(line, "expected '--> axis: distance'"))?;

    let axis_part = axis_part.trim_start();
    let axis = axis_part
        .chars()
        .next()
        .ok_or_else(|| malformed(line, "missing offset axis"))?;
    let label = &axis_part[..axis.len_utf8()];

    Ok(Directive::new(
        Axis::from_label(label),
        parse_number(line, distance, "offset distance")?,
    ))
}

fn parse_number(line: &LexedLine<'_>, text: &str, what: &str) -> Result<f64, FormatError> {
    let text = text.trim();
    match text.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(malformed(line, format!("invalid {} '{}'", what, text))),
    }
}

fn malformed(line: &LexedLine<'_>, reason: impl Into<String>) -> FormatError {
    FormatError::MalformedLine {
        line: line.number,
        content: line.raw.trim().to_string(),
        reason: reason.into(),
    }
}
