//! Reusable checks shared by the per-kind rules.

use indexmap::IndexMap;
use merval_core::position::Position;

use crate::error::{Diagnostic, ErrorCode};

/// Detects names defined more than once within one category.
///
/// The first definition of each name is remembered; every later one is
/// reported at its own position with a secondary label pointing back at the
/// first.
#[derive(Debug)]
pub struct DuplicateChecker {
    category: &'static str,
    seen: IndexMap<String, Position>,
}

impl DuplicateChecker {
    /// Create a checker whose messages call things `category`
    /// (for example "participant").
    pub fn new(category: &'static str) -> Self {
        Self {
            category,
            seen: IndexMap::new(),
        }
    }

    /// Mark `name` as already defined, for names that exist implicitly.
    pub fn predefine(&mut self, name: &str, position: Position) {
        self.seen.entry(name.to_string()).or_insert(position);
    }

    /// Record `name` at `position`, returning a diagnostic if it was seen
    /// before.
    pub fn check(&mut self, name: &str, position: Position) -> Option<Diagnostic> {
        if let Some(&first) = self.seen.get(name) {
            return Some(
                Diagnostic::error(format!(
                    "{} `{name}` is defined multiple times",
                    self.category
                ))
                .with_code(ErrorCode::E300)
                .with_label(position, "duplicate definition")
                .with_secondary_label(first, "first defined here")
                .with_help(format!(
                    "remove the duplicate or give this {} a different name",
                    self.category
                )),
            );
        }
        self.seen.insert(name.to_string(), position);
        None
    }

    /// Names seen so far, in first-definition order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.seen.keys().map(String::as_str)
    }
}

/// Resolves identifier references against a set of declarations.
#[derive(Debug)]
pub struct ReferenceChecker {
    category: &'static str,
    declared: IndexMap<String, Position>,
}

impl ReferenceChecker {
    pub fn new(category: &'static str) -> Self {
        Self {
            category,
            declared: IndexMap::new(),
        }
    }

    /// Declare `name`. Re-declaring keeps the first position.
    pub fn register(&mut self, name: &str, position: Position) {
        if !self.declared.contains_key(name) {
            self.declared.insert(name.to_string(), position);
        }
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.declared.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.declared.is_empty()
    }

    /// Check a reference to `name` made by `context` at `position`.
    pub fn check(&self, name: &str, position: Position, context: &str) -> Option<Diagnostic> {
        if self.is_registered(name) {
            return None;
        }
        Some(
            Diagnostic::error(format!(
                "{context} references undefined {} `{name}`",
                self.category
            ))
            .with_code(ErrorCode::E301)
            .with_label(position, format!("`{name}` is not declared"))
            .with_help(format!("declare {} `{name}` before using it", self.category)),
        )
    }
}

/// Checks a field against a fixed vocabulary.
#[derive(Debug, Clone, Copy)]
pub struct EnumValidator {
    field: &'static str,
    allowed: &'static [&'static str],
}

impl EnumValidator {
    pub const fn new(field: &'static str, allowed: &'static [&'static str]) -> Self {
        Self { field, allowed }
    }

    pub fn check(&self, value: &str, position: Position) -> Option<Diagnostic> {
        if self.allowed.contains(&value) {
            return None;
        }
        Some(
            Diagnostic::error(format!("invalid {} `{value}`", self.field))
                .with_code(ErrorCode::E302)
                .with_label(position, format!("not a valid {}", self.field))
                .with_help(format!("expected one of: {}", self.allowed.join(", "))),
        )
    }
}
