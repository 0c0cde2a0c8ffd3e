//! Line classifier for pattern files
//!
//! Turns raw text into a sequence of [`LexedLine`]s, each holding the typed
//! tokens found on that line. The lexer never fails: numeric conversion and
//! placement rules are the parser's job, so a line the lexer cannot classify
//! becomes [`Token::Text`].
//!
//! A `#` starts a comment anywhere on a line. A line beginning with `#` is a
//! [`Token::Comment`]; elsewhere everything from the first `#` onward is
//! dropped before classification, so `Z: 1.0 # note` lexes as a directive
//! and `# note` after a section marker or data entry is ignored.

const DATA_MARKER: &str = "<<<DATA>>>";
const PATTERN_MARKER: &str = "<<<PATTERN>>>";
const END_MARKER: &str = "<<<END>>>";
const OFFSET_ARROW: &str = "-->";

/// Section markers that open a section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionMarker {
    /// `<<<DATA>>>`
    Data,
    /// `<<<PATTERN>>>`
    Pattern,
}

/// A token found on a single line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    /// Whole-line comment starting with `#`
    Comment,
    /// Empty or whitespace-only line
    Blank,
    /// `<<<DATA>>>` or `<<<PATTERN>>>`
    Section(SectionMarker),
    /// `<<<END>>>`
    End,
    /// `key = value`
    KeyValue { key: &'a str, value: &'a str },
    /// `--> axis: distance`, the text after the arrow
    Offset { body: &'a str },
    /// `{`
    RepeatOpen,
    /// `}` with the text after `*`, if any
    RepeatClose { multiplier: Option<&'a str> },
    /// `axis: distance`
    Directive { axis: &'a str, distance: &'a str },
    /// Anything else
    Text(&'a str),
}

/// One source line and its tokens
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexedLine<'a> {
    /// 1-based line number
    pub number: usize,
    /// Line content without the line terminator
    pub raw: &'a str,
    pub tokens: Vec<Token<'a>>,
}

/// Iterator over the classified lines of a pattern file
pub struct Lexer<'a> {
    lines: std::iter::Enumerate<std::str::Lines<'a>>,
}

impl<'a> Lexer<'a> {
    /// Create a lexer over the full file text
    pub fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines().enumerate(),
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = LexedLine<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let (index, raw) = self.lines.next()?;
        Some(LexedLine {
            number: index + 1,
            raw,
            tokens: tokenize_line(raw),
        })
    }
}

/// Classify a single line into tokens
pub fn tokenize_line(raw: &str) -> Vec<Token<'_>> {
    let trimmed = raw.trim();

    if trimmed.starts_with('#') {
        return vec![Token::Comment];
    }

    // Trailing comments are allowed after any structural content
    let content = match raw.find('#') {
        Some(pos) => &raw[..pos],
        None => raw,
    };
    let trimmed = content.trim();

    if trimmed.is_empty() {
        return vec![Token::Blank];
    }
    if trimmed.starts_with(DATA_MARKER) {
        return vec![Token::Section(SectionMarker::Data)];
    }
    if trimmed.starts_with(PATTERN_MARKER) {
        return vec![Token::Section(SectionMarker::Pattern)];
    }
    if trimmed.starts_with(END_MARKER) {
        return vec![Token::End];
    }

    if let Some(pos) = content.find(OFFSET_ARROW) {
        let body = &content[pos + OFFSET_ARROW.len()..];
        return vec![Token::Offset { body }];
    }

    let mut tokens = Vec::with_capacity(2);

    if let Some(pos) = content.find('{') {
        push_fragment(&mut tokens, &content[..pos]);
        tokens.push(Token::RepeatOpen);
        push_fragment(&mut tokens, &content[pos + 1..]);
        return tokens;
    }

    if let Some(pos) = content.find('}') {
        push_fragment(&mut tokens, &content[..pos]);
        let multiplier = content[pos + 1..]
            .split_once('*')
            .map(|(_, count)| count.trim());
        tokens.push(Token::RepeatClose { multiplier });
        return tokens;
    }

    push_fragment(&mut tokens, content);
    tokens
}

/// Classify a fragment of a line that carries no markers or braces
fn push_fragment<'a>(tokens: &mut Vec<Token<'a>>, fragment: &'a str) {
    let fragment = fragment.trim();
    if fragment.is_empty() {
        return;
    }

    let token = if let Some((axis, distance)) = fragment.split_once(':') {
        Token::Directive {
            axis: axis.trim(),
            distance: distance.trim(),
        }
    } else if let Some((key, value)) = fragment.split_once('=') {
        Token::KeyValue {
            key: key.trim(),
            value: value.trim(),
        }
    } else {
        Token::Text(fragment)
    };
    tokens.push(token);
}
