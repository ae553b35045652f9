//! Flowchart (`flowchart` / `graph`) AST.

use crate::{
    ast::{DiagramHeader, Direction},
    position::Position,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowchartDiagram {
    pub header: DiagramHeader,
    pub direction: Option<Direction>,
    pub nodes: Vec<FlowNode>,
    pub edges: Vec<FlowEdge>,
    pub subgraphs: Vec<Subgraph>,
    pub directives: Vec<FlowDirective>,
}

/// Node outline selected by the bracket pair around the label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeShape {
    /// Bare identifier, rendered as a rectangle.
    Default,
    Rectangle,
    Rounded,
    Stadium,
    Subroutine,
    Cylinder,
    Circle,
    Asymmetric,
    Rhombus,
    Hexagon,
}

/// A node, recorded at its first occurrence (declaration or edge endpoint).
///
/// A later occurrence that adds a label fills in `label` and `shape`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowNode {
    pub id: String,
    pub label: Option<String>,
    pub shape: NodeShape,
    /// Style class attached with `:::class`.
    pub class: Option<String>,
    pub position: Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlowArrow {
    /// `-->`
    Arrow,
    /// `---`
    Open,
    /// `-.->`
    DottedArrow,
    /// `-.-`
    Dotted,
    /// `==>`
    ThickArrow,
    /// `===`
    Thick,
    /// `--o`
    Circle,
    /// `--x`
    Cross,
    /// `<-->`
    Bidirectional,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowEdge {
    pub from: String,
    pub to: String,
    pub arrow: FlowArrow,
    pub label: Option<String>,
    pub position: Position,
}

/// A `subgraph` ... `end` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subgraph {
    pub id: String,
    pub title: Option<String>,
    /// Id of the enclosing subgraph, if nested.
    pub parent: Option<String>,
    pub direction: Option<Direction>,
    pub position: Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlowDirectiveKind {
    ClassDef,
    Class,
    Style,
    LinkStyle,
    Click,
}

/// Styling and interaction statements that reference nodes by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowDirective {
    pub kind: FlowDirectiveKind,
    /// Ids the directive applies to; for `classDef` the class names.
    pub targets: Vec<String>,
    /// Remainder of the line after the targets.
    pub value: String,
    pub position: Position,
}
