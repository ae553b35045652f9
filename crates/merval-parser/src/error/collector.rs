//! Collector for accumulating diagnostics during validation.

use crate::error::Diagnostic;

/// Accumulates diagnostics from every rule of a validation run.
///
/// Unlike parsing, validation never stops early: rules emit into the
/// collector and the caller receives everything at the end.
#[derive(Debug, Default)]
pub(crate) struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    /// Create a new empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit a diagnostic to this collector.
    pub fn emit(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Emit several diagnostics, keeping their order.
    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        self.diagnostics.extend(diagnostics);
    }

    /// Returns `true` if any collected diagnostic is an error.
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|diagnostic| diagnostic.severity().is_error())
    }

    /// Finish collection and return every diagnostic in emission order.
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collector_empty() {
        let collector = DiagnosticCollector::new();

        assert!(!collector.has_errors());
        assert!(collector.into_diagnostics().is_empty());
    }

    #[test]
    fn test_collector_warning_only() {
        let mut collector = DiagnosticCollector::new();
        collector.emit(Diagnostic::warning("warning 1"));

        assert!(!collector.has_errors());
    }

    #[test]
    fn test_collector_keeps_order() {
        let mut collector = DiagnosticCollector::new();

        collector.emit(Diagnostic::error("error 1"));
        collector.extend([Diagnostic::warning("warning 1"), Diagnostic::error("error 2")]);

        assert!(collector.has_errors());
        let diagnostics = collector.into_diagnostics();
        let messages: Vec<_> = diagnostics.iter().map(Diagnostic::message).collect();
        assert_eq!(messages, ["error 1", "warning 1", "error 2"]);
    }
}
