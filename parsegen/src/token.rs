//! Token type shared by the tokenizer (C7) and both drivers (C8/C9).

use std::fmt;

/// A single point in the source. Mirrors [`crate::error::Position`]; kept
/// separate because the tokenizer constructs one per character scanned
/// while the error module only needs it at the point of failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LineCol {
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for LineCol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

impl From<LineCol> for crate::error::Position {
    fn from(lc: LineCol) -> Self {
        crate::error::Position { line: lc.line, column: lc.column }
    }
}

/// The span of a token, present only when `captureLocations` is enabled
///.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub start: LineCol,
    pub end: LineCol,
}

impl Location {
    /// The span from the first non-null to the last non-null location, used
    /// to compute a production's `__loc` at reduction.
    pub fn span(locations: &[Option<Location>]) -> Option<Location> {
        let start = locations.iter().flatten().next()?.start;
        let end = locations.iter().flatten().next_back()?.end;
        Some(Location { start, end })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub ty: String,
    pub value: String,
    pub start: usize,
    pub end: usize,
    pub loc: Option<Location>,
}

impl Token {
    pub fn eof(at: usize, loc: Option<Location>) -> Self {
        Token { ty: "$".to_string(), value: String::new(), start: at, end: at, loc }
    }
}
