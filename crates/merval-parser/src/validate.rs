//! Validation of parsed diagrams.
//!
//! Parsing guarantees a diagram is well formed line by line; validation
//! checks what only the whole diagram can tell: duplicate names, references
//! to things never declared, values outside a fixed vocabulary and
//! kind-specific constraints such as activation pairing.
//!
//! Each check is a named [`Rule`]. The rules for one diagram kind form a
//! [`RuleSet`], run in a fixed order. Unlike parsing, validation never
//! stops at the first finding: every rule runs and every [`Diagnostic`] is
//! returned.
//!
//! ## Validations Performed
//!
//! - **Duplicates**: names defined twice in one category (`E300`)
//! - **References**: identifiers used but never declared (`E301`)
//! - **Vocabularies**: values outside a fixed set, such as ER keys (`E302`)
//! - **Kind rules**: activation pairing, series lengths, score and
//!   coordinate ranges (`E303`)
//! - **Unknown kinds**: a warning for generically captured diagrams (`E304`)

mod checkers;
mod rules;

pub use checkers::{DuplicateChecker, EnumValidator, ReferenceChecker};

use log::debug;
use merval_core::ast::{Diagram, DiagramKind};

use crate::error::{Diagnostic, DiagnosticCollector};

/// A single validation check.
pub trait Rule: Send + Sync {
    /// Stable rule name, used to disable the rule from configuration.
    fn name(&self) -> &'static str;

    /// Inspect `diagram` and report every finding.
    ///
    /// Rules ignore diagrams of kinds they do not understand.
    fn check(&self, diagram: &Diagram) -> Vec<Diagnostic>;
}

/// A [`Rule`] backed by a plain function.
#[derive(Clone, Copy)]
pub struct FnRule {
    name: &'static str,
    check: fn(&Diagram, &mut DiagnosticCollector),
}

impl FnRule {
    pub(crate) const fn new(
        name: &'static str,
        check: fn(&Diagram, &mut DiagnosticCollector),
    ) -> Self {
        Self { name, check }
    }
}

impl Rule for FnRule {
    fn name(&self) -> &'static str {
        self.name
    }

    fn check(&self, diagram: &Diagram) -> Vec<Diagnostic> {
        let mut collector = DiagnosticCollector::new();
        (self.check)(diagram, &mut collector);
        collector.into_diagnostics()
    }
}

impl std::fmt::Debug for FnRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnRule").field("name", &self.name).finish()
    }
}

/// The ordered rules that apply to one diagram kind.
pub struct RuleSet {
    kind: DiagramKind,
    rules: Vec<&'static dyn Rule>,
}

impl RuleSet {
    /// Every built-in rule for `kind`, in execution order.
    pub fn for_kind(kind: DiagramKind) -> Self {
        Self {
            kind,
            rules: rules::for_kind(kind)
                .iter()
                .map(|rule| rule as &'static dyn Rule)
                .collect(),
        }
    }

    /// Drop rules whose name appears in `disabled`.
    pub fn without<S: AsRef<str>>(mut self, disabled: &[S]) -> Self {
        self.rules
            .retain(|rule| !disabled.iter().any(|name| name.as_ref() == rule.name()));
        self
    }

    pub fn kind(&self) -> DiagramKind {
        self.kind
    }

    /// Names of the rules in this set, in execution order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rules.iter().map(|rule| rule.name())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Run every rule against `diagram` and collect all findings.
    pub fn validate(&self, diagram: &Diagram) -> Vec<Diagnostic> {
        let mut collector = DiagnosticCollector::new();
        for rule in &self.rules {
            let found = rule.check(diagram);
            if !found.is_empty() {
                debug!(rule = rule.name(), count = found.len(); "Rule reported findings");
            }
            collector.extend(found);
        }
        if collector.has_errors() {
            debug!(kind = self.kind.as_str(); "Validation reported errors");
        }
        collector.into_diagnostics()
    }
}

impl std::fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleSet")
            .field("kind", &self.kind)
            .field("rules", &self.names().collect::<Vec<_>>())
            .finish()
    }
}

/// Validate `diagram` with the full rule set for its kind.
///
/// # Example
///
/// ```
/// # use merval_parser::{parse, validate_diagram, error::ErrorCode};
///
/// let diagram = parse("pie\n\"Dogs\": 3\n\"Dogs\": 4").unwrap();
/// let diagnostics = validate_diagram(&diagram);
///
/// assert_eq!(diagnostics.len(), 1);
/// assert_eq!(diagnostics[0].code(), Some(ErrorCode::E300));
/// ```
pub fn validate_diagram(diagram: &Diagram) -> Vec<Diagnostic> {
    RuleSet::for_kind(diagram.kind()).validate(diagram)
}

/// Names of every built-in rule, across all kinds.
pub fn rule_names() -> impl Iterator<Item = &'static str> {
    rules::all().map(|rule| rule.name)
}
