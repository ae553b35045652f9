//! The hard-failure type returned by parsers.

use std::fmt;

use merval_core::position::Position;
use thiserror::Error;

use crate::error::{Diagnostic, ErrorCode};

/// A type alias for `Result<T, ParseError>`.
pub type Result<T> = std::result::Result<T, ParseError>;

/// Which phase of a parse failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseErrorKind {
    Header,
    Syntax,
    Structural,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseErrorKind::Header => write!(f, "header error"),
            ParseErrorKind::Syntax => write!(f, "syntax error"),
            ParseErrorKind::Structural => write!(f, "structural error"),
        }
    }
}

/// First error encountered while parsing a diagram.
///
/// Parsing aborts on the first problem; there is never a partial AST.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The first significant line does not fit the kind's header grammar.
    #[error("{position}: {message}")]
    Header {
        code: ErrorCode,
        position: Position,
        message: String,
    },

    /// A body line matches no construct valid at that point.
    #[error("{position}: {message}")]
    Syntax {
        code: ErrorCode,
        position: Position,
        message: String,
        /// The offending line, trimmed.
        text: String,
        /// Names of the constructs that were tried.
        expected: Vec<&'static str>,
    },

    /// Well-formed lines that compose into an invalid diagram.
    #[error("{position}: {message}")]
    Structural {
        code: ErrorCode,
        position: Position,
        message: String,
    },
}

impl ParseError {
    pub fn header(code: ErrorCode, position: Position, message: impl Into<String>) -> Self {
        ParseError::Header {
            code,
            position,
            message: message.into(),
        }
    }

    pub fn syntax(
        code: ErrorCode,
        position: Position,
        text: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        ParseError::Syntax {
            code,
            position,
            message: message.into(),
            text: text.into(),
            expected: Vec::new(),
        }
    }

    pub fn structural(code: ErrorCode, position: Position, message: impl Into<String>) -> Self {
        ParseError::Structural {
            code,
            position,
            message: message.into(),
        }
    }

    /// Attach the list of constructs that were expected at this point.
    pub fn with_expected(mut self, names: Vec<&'static str>) -> Self {
        if let ParseError::Syntax { expected, .. } = &mut self {
            *expected = names;
        }
        self
    }

    pub fn kind(&self) -> ParseErrorKind {
        match self {
            ParseError::Header { .. } => ParseErrorKind::Header,
            ParseError::Syntax { .. } => ParseErrorKind::Syntax,
            ParseError::Structural { .. } => ParseErrorKind::Structural,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            ParseError::Header { code, .. }
            | ParseError::Syntax { code, .. }
            | ParseError::Structural { code, .. } => *code,
        }
    }

    pub fn position(&self) -> Position {
        match self {
            ParseError::Header { position, .. }
            | ParseError::Syntax { position, .. }
            | ParseError::Structural { position, .. } => *position,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ParseError::Header { message, .. }
            | ParseError::Syntax { message, .. }
            | ParseError::Structural { message, .. } => message,
        }
    }

    /// Render this error as an error-severity [`Diagnostic`].
    pub fn to_diagnostic(&self) -> Diagnostic {
        let diagnostic = Diagnostic::error(self.message())
            .with_code(self.code())
            .with_label(self.position(), self.kind().to_string());

        match self {
            ParseError::Syntax { expected, .. } if !expected.is_empty() => {
                diagnostic.with_help(format!("expected one of: {}", expected.join(", ")))
            }
            _ => diagnostic,
        }
    }
}

impl From<ParseError> for Diagnostic {
    fn from(error: ParseError) -> Self {
        error.to_diagnostic()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display() {
        let err = ParseError::structural(
            ErrorCode::E202,
            Position::new(2, 1),
            "task `Task` outside of any section",
        );

        assert_eq!(err.to_string(), "2:1: task `Task` outside of any section");
        assert_eq!(err.kind(), ParseErrorKind::Structural);
        assert_eq!(err.code(), ErrorCode::E202);
    }

    #[test]
    fn test_syntax_error_to_diagnostic() {
        let err = ParseError::syntax(ErrorCode::E100, Position::new(3, 5), "???", "unexpected line")
            .with_expected(vec!["transition", "note"]);

        let diag = err.to_diagnostic();
        assert!(diag.severity().is_error());
        assert_eq!(diag.code(), Some(ErrorCode::E100));
        assert_eq!(diag.position(), Position::new(3, 5));
        assert_eq!(diag.help(), Some("expected one of: transition, note"));
    }

    #[test]
    fn test_with_expected_ignored_for_header() {
        let err = ParseError::header(ErrorCode::E002, Position::new(1, 1), "bad header")
            .with_expected(vec!["x"]);

        assert_eq!(err.to_diagnostic().help(), None);
    }
}
