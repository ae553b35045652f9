//! Error codes for the Merval diagnostic system.
//!
//! Error codes are organized by phase:
//! - `E0xx` - Header errors
//! - `E1xx` - Syntax errors
//! - `E2xx` - Structural errors
//! - `E3xx` - Validation findings

use std::{fmt, str::FromStr};

/// Error codes for categorizing parse errors and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Header Errors (E0xx)
    // =========================================================================
    /// Missing header.
    ///
    /// The input has no significant line to read a diagram kind from.
    E001,

    /// Header mismatch.
    ///
    /// The first significant line is not the keyword this parser accepts.
    E002,

    /// Invalid header modifier.
    ///
    /// The keyword is right but the direction or option after it is not.
    E003,

    // =========================================================================
    // Syntax Errors (E1xx)
    // =========================================================================
    /// Unrecognised line.
    ///
    /// A body line matches no construct allowed at this point.
    E100,

    /// Invalid value.
    ///
    /// A number is malformed or outside the accepted range.
    E101,

    /// Malformed parameter list.
    ///
    /// A quoted field was never closed or a constructor call is unbalanced.
    E102,

    /// Self-referencing link.
    ///
    /// A link uses the same node as source and target where that is not
    /// allowed.
    E103,

    // =========================================================================
    // Structural Errors (E2xx)
    // =========================================================================
    /// Unclosed block.
    ///
    /// A body, boundary or block was opened and never closed.
    E200,

    /// Unmatched close.
    ///
    /// A closing marker appears with no open block.
    E201,

    /// Statement outside section.
    ///
    /// A task or period appears before any section that could own it.
    E202,

    /// Redefinition.
    ///
    /// A setting that may appear once (an axis, a metadata key, a root)
    /// appears again.
    E203,

    /// Missing mandatory content.
    ///
    /// The diagram lacks content its kind requires.
    E204,

    // =========================================================================
    // Validation Findings (E3xx)
    // =========================================================================
    /// Duplicate definition.
    ///
    /// The same name is defined more than once in one category.
    E300,

    /// Undefined reference.
    ///
    /// An identifier is referenced but never declared.
    E301,

    /// Disallowed value.
    ///
    /// A field holds a value outside its fixed vocabulary.
    E302,

    /// Rule violation.
    ///
    /// A kind-specific structural rule failed.
    E303,

    /// Unknown diagram kind.
    ///
    /// The header was not recognised and the diagram was captured generically.
    E304,
}

impl ErrorCode {
    /// Every code, in numeric order.
    pub const ALL: [ErrorCode; 17] = [
        ErrorCode::E001,
        ErrorCode::E002,
        ErrorCode::E003,
        ErrorCode::E100,
        ErrorCode::E101,
        ErrorCode::E102,
        ErrorCode::E103,
        ErrorCode::E200,
        ErrorCode::E201,
        ErrorCode::E202,
        ErrorCode::E203,
        ErrorCode::E204,
        ErrorCode::E300,
        ErrorCode::E301,
        ErrorCode::E302,
        ErrorCode::E303,
        ErrorCode::E304,
    ];

    /// Returns the numeric code as a string (e.g., "E001").
    pub fn as_str(&self) -> &'static str {
        match self {
            // Header errors
            ErrorCode::E001 => "E001",
            ErrorCode::E002 => "E002",
            ErrorCode::E003 => "E003",
            // Syntax errors
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
            ErrorCode::E102 => "E102",
            ErrorCode::E103 => "E103",
            // Structural errors
            ErrorCode::E200 => "E200",
            ErrorCode::E201 => "E201",
            ErrorCode::E202 => "E202",
            ErrorCode::E203 => "E203",
            ErrorCode::E204 => "E204",
            // Validation findings
            ErrorCode::E300 => "E300",
            ErrorCode::E301 => "E301",
            ErrorCode::E302 => "E302",
            ErrorCode::E303 => "E303",
            ErrorCode::E304 => "E304",
        }
    }

    /// Returns a short description of what this error code means.
    pub fn description(&self) -> &'static str {
        match self {
            // Header errors
            ErrorCode::E001 => "missing diagram header",
            ErrorCode::E002 => "header does not match diagram kind",
            ErrorCode::E003 => "invalid header modifier",
            // Syntax errors
            ErrorCode::E100 => "unrecognised line",
            ErrorCode::E101 => "invalid value",
            ErrorCode::E102 => "malformed parameter list",
            ErrorCode::E103 => "self-referencing link",
            // Structural errors
            ErrorCode::E200 => "unclosed block",
            ErrorCode::E201 => "unmatched closing marker",
            ErrorCode::E202 => "statement outside section",
            ErrorCode::E203 => "setting defined more than once",
            ErrorCode::E204 => "missing mandatory content",
            // Validation findings
            ErrorCode::E300 => "duplicate definition",
            ErrorCode::E301 => "undefined reference",
            ErrorCode::E302 => "disallowed value",
            ErrorCode::E303 => "rule violation",
            ErrorCode::E304 => "unknown diagram kind",
        }
    }
}

impl FromStr for ErrorCode {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ErrorCode::ALL
            .iter()
            .copied()
            .find(|code| code.as_str() == s)
            .ok_or("Unsupported error code")
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::E001.to_string(), "E001");
        assert_eq!(ErrorCode::E100.to_string(), "E100");
        assert_eq!(ErrorCode::E200.to_string(), "E200");
        assert_eq!(ErrorCode::E300.to_string(), "E300");
    }

    #[test]
    fn test_error_code_description() {
        assert_eq!(ErrorCode::E001.description(), "missing diagram header");
        assert_eq!(ErrorCode::E202.description(), "statement outside section");
        assert_eq!(ErrorCode::E301.description(), "undefined reference");
    }

    #[test]
    fn test_error_code_from_str() {
        for code in ErrorCode::ALL {
            assert_eq!(code.as_str().parse::<ErrorCode>(), Ok(code));
        }
        assert!("E999".parse::<ErrorCode>().is_err());
    }
}
