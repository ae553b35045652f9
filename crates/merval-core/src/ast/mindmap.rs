//! Mindmap AST.

use crate::{ast::DiagramHeader, position::Position};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MindmapDiagram {
    pub header: DiagramHeader,
    pub root: MindmapNode,
}

impl MindmapDiagram {
    /// Every node in depth-first order, starting with the root.
    pub fn nodes(&self) -> Vec<&MindmapNode> {
        let mut out = Vec::new();
        let mut stack = vec![&self.root];
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(node.children.iter().rev());
        }
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MindmapShape {
    Default,
    /// `[text]`
    Square,
    /// `(text)`
    Rounded,
    /// `((text))`
    Circle,
    /// `))text((`
    Bang,
    /// `)text(`
    Cloud,
    /// `{{text}}`
    Hexagon,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MindmapNode {
    /// Explicit id written before the shape brackets.
    pub id: Option<String>,
    pub text: String,
    pub shape: MindmapShape,
    pub icon: Option<String>,
    pub class: Option<String>,
    /// Indentation width of the source line.
    pub indent: usize,
    pub children: Vec<MindmapNode>,
    pub position: Position,
}
