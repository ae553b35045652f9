//! Positions a diagnostic points at.

use std::fmt;

use merval_core::position::Position;

/// What a label contributes to its diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LabelRole {
    /// Where the problem is. A diagnostic normally has exactly one.
    Primary,
    /// Related context, such as an earlier definition.
    Secondary,
}

/// A short message pinned to a source position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    role: LabelRole,
    position: Position,
    message: String,
}

impl Label {
    pub fn new(role: LabelRole, position: Position, message: impl Into<String>) -> Self {
        Self {
            role,
            position,
            message: message.into(),
        }
    }

    pub fn primary(position: Position, message: impl Into<String>) -> Self {
        Self::new(LabelRole::Primary, position, message)
    }

    pub fn secondary(position: Position, message: impl Into<String>) -> Self {
        Self::new(LabelRole::Secondary, position, message)
    }

    pub fn role(&self) -> LabelRole {
        self.role
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_primary(&self) -> bool {
        self.role == LabelRole::Primary
    }

    pub fn is_secondary(&self) -> bool {
        self.role == LabelRole::Secondary
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.position, self.message)
    }
}
