//! State diagram AST.

use crate::{
    ast::{DiagramHeader, Direction},
    position::Position,
};

/// Pseudo-state written as `[*]` in transitions.
pub const TERMINAL_STATE: &str = "[*]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateDiagram {
    pub header: DiagramHeader,
    pub direction: Option<Direction>,
    pub states: Vec<StateDeclaration>,
    pub transitions: Vec<Transition>,
    /// `ID : description` lines. A state may have several.
    pub descriptions: Vec<StateDescription>,
    pub notes: Vec<StateNote>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateKind {
    Simple,
    Composite,
    Fork,
    Join,
    Choice,
}

/// An explicit state declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateDeclaration {
    pub id: String,
    pub kind: StateKind,
    /// Display text from `state "Text" as ID`.
    pub description: Option<String>,
    /// Enclosing composite state.
    pub parent: Option<String>,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateDescription {
    pub state: String,
    pub text: String,
    pub position: Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransitionKind {
    /// `[*] --> A`
    Start,
    /// `A --> [*]`
    End,
    Regular,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub from: String,
    pub to: String,
    pub kind: TransitionKind,
    pub label: Option<String>,
    pub parent: Option<String>,
    pub position: Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoteSide {
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateNote {
    pub side: NoteSide,
    pub target: String,
    pub text: String,
    pub position: Position,
}
