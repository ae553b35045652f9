//! Merval - structural parsing and linting for Mermaid-style diagrams
//!
//! This crate ties the parser and the validation rules together behind a
//! configurable [`Linter`]. It is meant for tooling that checks diagram
//! blocks embedded in documents before anything tries to render them.

pub mod config;

mod error;

pub use merval_core::{ast, position};
pub use merval_parser::{
    Diagnostic, Diagram, DiagramKind, ParseError, detect_kind,
    error::{ErrorCode, Severity},
    supported_types,
};

pub use error::MervalError;

use std::{fs, path::Path};

use log::{debug, info, trace};

use merval_parser::validate::RuleSet;

use config::LintConfig;

/// One diagram block cut out of a larger document.
///
/// `line_offset` is the number of document lines before the block's first
/// line, so positions in the results use document numbering.
/// `detected_kind` is the tag the extractor saw on the block (for instance
/// the info string of a fenced code block), if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmbeddedBlock<'a> {
    pub source: &'a str,
    pub line_offset: usize,
    pub detected_kind: Option<&'a str>,
}

impl<'a> EmbeddedBlock<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            line_offset: 0,
            detected_kind: None,
        }
    }

    pub fn with_line_offset(mut self, line_offset: usize) -> Self {
        self.line_offset = line_offset;
        self
    }

    pub fn with_detected_kind(mut self, kind: &'a str) -> Self {
        self.detected_kind = Some(kind);
        self
    }

    /// The kind the extractor's tag names, when it names a known one.
    fn hinted_kind(&self) -> Option<DiagramKind> {
        self.detected_kind
            .and_then(|tag| tag.trim().parse::<DiagramKind>().ok())
            .filter(|kind| *kind != DiagramKind::Unknown)
    }
}

/// Outcome of linting one block.
///
/// A block that fails to parse still produces a report: the parse error is
/// its only diagnostic and [`LintReport::diagram`] is `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct LintReport {
    kind: DiagramKind,
    diagram: Option<Diagram>,
    diagnostics: Vec<Diagnostic>,
}

impl LintReport {
    pub fn kind(&self) -> DiagramKind {
        self.kind
    }

    pub fn diagram(&self) -> Option<&Diagram> {
        self.diagram.as_ref()
    }

    /// Findings in the order they were produced.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity().is_error())
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity().is_warning())
            .count()
    }

    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    /// `true` when the block parsed and produced no findings at all.
    pub fn is_clean(&self) -> bool {
        self.diagram.is_some() && self.diagnostics.is_empty()
    }
}

/// Parses and lints diagram blocks.
///
/// # Examples
///
/// ```
/// use merval::{EmbeddedBlock, Linter, config::LintConfig};
///
/// let config = LintConfig::from_toml_str("[rules.severity]\nE300 = \"warning\"").unwrap();
/// let linter = Linter::new(config);
///
/// let block = EmbeddedBlock::new("pie\n\"Dogs\": 3\n\"Dogs\": 4").with_line_offset(12);
/// let report = linter.lint_block(&block);
///
/// assert!(!report.has_errors());
/// assert_eq!(report.warning_count(), 1);
/// assert_eq!(report.diagnostics()[0].position().line(), 15);
/// ```
#[derive(Debug, Default)]
pub struct Linter {
    config: LintConfig,
}

impl Linter {
    pub fn new(config: LintConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LintConfig {
        &self.config
    }

    /// Parse a standalone diagram without validating it.
    ///
    /// # Errors
    ///
    /// Returns [`MervalError::Parse`] with the first header, syntax or
    /// structural error.
    pub fn parse(&self, source: &str) -> Result<Diagram, MervalError> {
        self.parse_block(&EmbeddedBlock::new(source))
            .map_err(|err| MervalError::new_parse_error(err, source))
    }

    /// Lint a standalone diagram.
    pub fn lint(&self, source: &str) -> LintReport {
        self.lint_block(&EmbeddedBlock::new(source))
    }

    /// Parse and validate one embedded block.
    ///
    /// Disabled rules are skipped and severity overrides from the
    /// configuration are applied to every diagnostic, parse errors included.
    pub fn lint_block(&self, block: &EmbeddedBlock<'_>) -> LintReport {
        let (kind, diagram, diagnostics) = match self.parse_block(block) {
            Ok(diagram) => {
                let rules = RuleSet::for_kind(diagram.kind())
                    .without(self.config.rules.disabled.as_slice());
                trace!(rules:? = rules.names().collect::<Vec<_>>(); "Running rules");
                let diagnostics = rules.validate(&diagram);
                (diagram.kind(), Some(diagram), diagnostics)
            }
            Err(err) => {
                debug!(
                    code = err.code().as_str(),
                    line = err.position().line();
                    "Block failed to parse"
                );
                let kind = block.hinted_kind().unwrap_or_else(|| detect_kind(block.source));
                (kind, None, vec![err.to_diagnostic()])
            }
        };

        let report = LintReport {
            kind,
            diagram,
            diagnostics: diagnostics
                .into_iter()
                .map(|diagnostic| self.apply_severity(diagnostic))
                .collect(),
        };
        info!(
            kind = report.kind.as_str(),
            line_offset = block.line_offset,
            errors = report.error_count(),
            warnings = report.warning_count();
            "Linted diagram block"
        );
        report
    }

    /// Read a diagram file and lint its whole content as one block.
    ///
    /// # Errors
    ///
    /// Returns [`MervalError::Io`] when the file cannot be read.
    pub fn lint_file(&self, path: impl AsRef<Path>) -> Result<LintReport, MervalError> {
        let path = path.as_ref();
        debug!(path = path.display().to_string(); "Reading diagram file");
        let source = fs::read_to_string(path)?;
        Ok(self.lint(&source))
    }

    fn parse_block(&self, block: &EmbeddedBlock<'_>) -> Result<Diagram, ParseError> {
        match block.hinted_kind() {
            Some(kind) => merval_parser::parse_as(kind, block.source, block.line_offset),
            None => merval_parser::parse_with_offset(block.source, block.line_offset),
        }
    }

    fn apply_severity(&self, diagnostic: Diagnostic) -> Diagnostic {
        match diagnostic.code().and_then(|code| self.config.severity_for(code)) {
            Some(severity) => diagnostic.with_severity(severity),
            None => diagnostic,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Position;

    #[test]
    fn test_parse_wraps_errors_with_source() {
        let err = Linter::default().parse("sankey-beta\nA,A,5").unwrap_err();

        let MervalError::Parse { err, src } = err else {
            panic!("expected a parse error");
        };
        assert_eq!(err.code(), ErrorCode::E103);
        assert_eq!(src, "sankey-beta\nA,A,5");
    }

    #[test]
    fn test_parse_failure_becomes_report() {
        let report = Linter::default().lint_block(
            &EmbeddedBlock::new("classDiagram\n???")
                .with_line_offset(20)
                .with_detected_kind("classDiagram"),
        );

        assert_eq!(report.kind(), DiagramKind::Class);
        assert!(report.diagram().is_none());
        assert_eq!(report.error_count(), 1);
        assert_eq!(report.diagnostics()[0].code(), Some(ErrorCode::E100));
        assert_eq!(report.diagnostics()[0].position(), Position::new(22, 1));
    }

    #[test]
    fn test_hint_must_match_header() {
        let report = Linter::default()
            .lint_block(&EmbeddedBlock::new("pie\n\"A\": 1").with_detected_kind("gantt"));

        assert_eq!(report.kind(), DiagramKind::Gantt);
        assert_eq!(report.diagnostics()[0].code(), Some(ErrorCode::E002));
    }

    #[test]
    fn test_unrecognised_hint_falls_back_to_detection() {
        let report = Linter::default()
            .lint_block(&EmbeddedBlock::new("pie\n\"A\": 1").with_detected_kind("mermaid"));

        assert_eq!(report.kind(), DiagramKind::Pie);
        assert!(report.is_clean());
    }

    #[test]
    fn test_disabled_rules_do_not_run() {
        let config =
            LintConfig::from_toml_str("[rules]\ndisabled = [\"sequence-undeclared-participant\"]")
                .unwrap();
        let source = "sequenceDiagram\nparticipant A\nA->>B: hi";

        assert_eq!(Linter::default().lint(source).error_count(), 1);
        assert!(Linter::new(config).lint(source).is_clean());
    }
}
