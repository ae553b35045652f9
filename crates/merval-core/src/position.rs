//! Source positions for AST nodes and diagnostics.
//!
//! Positions are 1-indexed and expressed in the numbering of the enclosing
//! document: a diagram block that starts after `n` lines of surrounding text
//! is parsed with a line offset of `n`, so its first line reports line `n + 1`.

use std::fmt;

/// A 1-indexed `(line, column)` location in source text.
///
/// Positions order by line first, then by column, which matches the order in
/// which the parsers visit the source.
///
/// # Examples
///
/// ```
/// use merval_core::position::Position;
///
/// let header = Position::new(1, 1);
/// let body = Position::new(3, 5);
/// assert!(header < body);
/// assert_eq!(body.to_string(), "3:5");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    line: usize,
    column: usize,
}

impl Position {
    /// Create a position from a 1-indexed line and column.
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// The 1-indexed line number.
    pub fn line(&self) -> usize {
        self.line
    }

    /// The 1-indexed column number.
    pub fn column(&self) -> usize {
        self.column
    }

    /// Return this position shifted down by `lines`.
    pub fn offset_lines(self, lines: usize) -> Self {
        Self {
            line: self.line + lines,
            column: self.column,
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new(1, 1)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_default_is_origin() {
        let pos = Position::default();
        assert_eq!(pos.line(), 1);
        assert_eq!(pos.column(), 1);
    }

    #[test]
    fn test_position_offset_lines() {
        let pos = Position::new(2, 4).offset_lines(10);
        assert_eq!(pos, Position::new(12, 4));
    }

    #[test]
    fn test_position_display() {
        assert_eq!(Position::new(7, 3).to_string(), "7:3");
    }
}
