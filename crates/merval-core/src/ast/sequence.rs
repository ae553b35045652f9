//! Sequence diagram AST.

use crate::{ast::DiagramHeader, position::Position};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceDiagram {
    pub header: DiagramHeader,
    pub title: Option<String>,
    pub autonumber: bool,
    pub participants: Vec<Participant>,
    pub messages: Vec<Message>,
    pub notes: Vec<SequenceNote>,
    pub activations: Vec<Activation>,
    pub blocks: Vec<SequenceBlock>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParticipantKind {
    Participant,
    Actor,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub kind: ParticipantKind,
    pub id: String,
    pub alias: Option<String>,
    pub position: Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageArrow {
    /// `->`
    Solid,
    /// `-->`
    Dotted,
    /// `->>`
    SolidArrow,
    /// `-->>`
    DottedArrow,
    /// `-x`
    SolidCross,
    /// `--x`
    DottedCross,
    /// `-)`
    SolidAsync,
    /// `--)`
    DottedAsync,
    /// `<<->>`
    SolidBidirectional,
    /// `<<-->>`
    DottedBidirectional,
}

/// Activation shorthand attached to a message (`->>+` / `->>-`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActivationMarker {
    Activate,
    Deactivate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub from: String,
    pub to: String,
    pub arrow: MessageArrow,
    pub activation: Option<ActivationMarker>,
    pub text: Option<String>,
    pub position: Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotePlacement {
    LeftOf,
    RightOf,
    Over,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceNote {
    pub placement: NotePlacement,
    /// One participant, or two for `over A,B`.
    pub participants: Vec<String>,
    pub text: String,
    pub position: Position,
}

/// An explicit `activate` / `deactivate` statement, or the shorthand on a
/// message (recorded against the message target).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activation {
    pub participant: String,
    pub active: bool,
    pub position: Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    Loop,
    Alt,
    Opt,
    Par,
    Critical,
    Break,
    Rect,
}

/// A control block such as `loop` ... `end`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceBlock {
    pub kind: BlockKind,
    pub label: Option<String>,
    /// `else` / `and` / `option` continuations, in order.
    pub sections: Vec<BlockSection>,
    /// Nesting depth, 0 for top-level blocks.
    pub depth: usize,
    pub position: Position,
    pub end_position: Position,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockSection {
    pub label: Option<String>,
    pub position: Position,
}
