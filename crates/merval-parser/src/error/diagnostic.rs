//! The core diagnostic type for validation output.
//!
//! A [`Diagnostic`] represents a single error or warning with an optional
//! error code, labeled source positions, and help text.

use std::fmt;

use merval_core::position::Position;

use crate::error::{Severity, error_code::ErrorCode, label::Label};

/// A positioned finding about a diagram.
///
/// # Example
///
/// ```text
/// error[E300]: state `Idle` is defined multiple times
///   --> 7:5 duplicate definition
///   --> 3:5 first defined here
///    = help: remove the duplicate or use a different name
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    severity: Severity,
    code: Option<ErrorCode>,
    message: String,
    labels: Vec<Label>,
    help: Option<String>,
}

impl Diagnostic {
    /// Create an error diagnostic.
    ///
    /// # Example
    ///
    /// ```
    /// # use merval_core::position::Position;
    /// # use merval_parser::error::{Diagnostic, ErrorCode};
    ///
    /// let diag = Diagnostic::error("undefined participant `Bob`")
    ///     .with_code(ErrorCode::E301)
    ///     .with_label(Position::new(4, 1), "not declared")
    ///     .with_help("add `participant Bob`");
    /// ```
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    /// Create a warning diagnostic.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn code(&self) -> Option<ErrorCode> {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Labels in the order they were attached.
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    /// Position of the first primary label, or the first line when the
    /// diagnostic has none.
    pub fn position(&self) -> Position {
        self.labels
            .iter()
            .find(|label| label.is_primary())
            .map(Label::position)
            .unwrap_or_default()
    }

    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code);
        self
    }

    /// Override the severity.
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Add a primary label to this diagnostic.
    pub fn with_label(mut self, position: Position, message: impl Into<String>) -> Self {
        self.labels.push(Label::primary(position, message));
        self
    }

    /// Add a secondary label to this diagnostic.
    pub fn with_secondary_label(mut self, position: Position, message: impl Into<String>) -> Self {
        self.labels.push(Label::secondary(position, message));
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            code: None,
            message: message.into(),
            labels: Vec::new(),
            help: None,
        }
    }
}

impl fmt::Display for Diagnostic {
    /// One header line, then one line per label and a trailing help line.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "{}[{code}]: {}", self.severity, self.message)?,
            None => write!(f, "{}: {}", self.severity, self.message)?,
        }
        for label in &self.labels {
            write!(f, "\n  --> {label}")?;
        }
        if let Some(help) = &self.help {
            write!(f, "\n   = help: {help}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Diagnostic {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_new() {
        let diag = Diagnostic::new(Severity::Error, "test error");

        assert!(diag.severity().is_error());
        assert_eq!(diag.message(), "test error");
        assert!(diag.code().is_none());
        assert!(diag.labels().is_empty());
        assert!(diag.help().is_none());
        assert_eq!(diag.position(), Position::new(1, 1));
    }

    #[test]
    fn test_diagnostic_position_uses_primary_label() {
        let diag = Diagnostic::error("duplicate definition")
            .with_secondary_label(Position::new(3, 1), "first defined here")
            .with_label(Position::new(7, 1), "duplicate here");

        assert_eq!(diag.labels().len(), 2);
        assert!(diag.labels()[0].is_secondary());
        assert_eq!(diag.position(), Position::new(7, 1));
    }

    #[test]
    fn test_diagnostic_with_severity() {
        let diag = Diagnostic::error("x").with_severity(Severity::Warning);

        assert!(diag.severity().is_warning());
    }

    #[test]
    fn test_diagnostic_display_with_code() {
        let diag = Diagnostic::error("undefined class `Foo`").with_code(ErrorCode::E301);

        assert_eq!(diag.to_string(), "error[E301]: undefined class `Foo`");
    }

    #[test]
    fn test_diagnostic_display_without_code() {
        let diag = Diagnostic::warning("unknown diagram kind");

        assert_eq!(diag.to_string(), "warning: unknown diagram kind");
    }

    #[test]
    fn test_diagnostic_display_with_labels_and_help() {
        let diag = Diagnostic::error("state `Idle` is defined multiple times")
            .with_code(ErrorCode::E300)
            .with_label(Position::new(7, 5), "duplicate definition")
            .with_secondary_label(Position::new(3, 5), "first defined here")
            .with_help("remove the duplicate or use a different name");

        assert_eq!(
            diag.to_string(),
            "error[E300]: state `Idle` is defined multiple times\n  --> 7:5 duplicate definition\n  --> 3:5 first defined here\n   = help: remove the duplicate or use a different name"
        );
    }

    #[test]
    fn test_diagnostic_builder_chain() {
        let diag = Diagnostic::error("entity `User` has two bodies")
            .with_code(ErrorCode::E300)
            .with_label(Position::new(10, 1), "duplicate body")
            .with_secondary_label(Position::new(5, 1), "first body here")
            .with_help("merge the attribute lists");

        assert_eq!(diag.code(), Some(ErrorCode::E300));
        assert_eq!(diag.labels().len(), 2);
        assert_eq!(diag.help(), Some("merge the attribute lists"));
    }
}
