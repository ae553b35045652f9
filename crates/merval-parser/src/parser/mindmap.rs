//! `mindmap` parser.
//!
//! The tree comes from indentation: a node is a child of the nearest
//! preceding node with a smaller indent. Nodes under construction live on a
//! stack and are folded into their parent once a shallower line appears.

use merval_core::ast::{
    Diagram, DiagramKind, MindmapDiagram,
    mindmap::{MindmapNode, MindmapShape},
};

use crate::{
    error::{ErrorCode, ParseError, Result},
    lexer::{Source, SourceLine, is_identifier, non_empty},
    parser::{DiagramParser, Rule, diagram_header, expect_bare_header, run_cascade},
};

/// Shape delimiters, checked in order so `((` wins over `(`.
const SHAPES: [(&str, &str, MindmapShape); 6] = [
    ("((", "))", MindmapShape::Circle),
    ("))", "((", MindmapShape::Bang),
    ("{{", "}}", MindmapShape::Hexagon),
    ("(", ")", MindmapShape::Rounded),
    (")", "(", MindmapShape::Cloud),
    ("[", "]", MindmapShape::Square),
];

const RULES: &[Rule<MindmapState>] = &[
    Rule {
        name: "::icon",
        handler: MindmapState::icon,
    },
    Rule {
        name: ":::class",
        handler: MindmapState::class,
    },
    Rule {
        name: "node",
        handler: MindmapState::node,
    },
];

#[derive(Debug, Default)]
struct MindmapState {
    /// Path from the root to the most recent node.
    stack: Vec<MindmapNode>,
}

impl MindmapState {
    /// Fold the top of the stack into its parent.
    fn fold_one(&mut self) {
        if self.stack.len() > 1
            && let Some(done) = self.stack.pop()
            && let Some(parent) = self.stack.last_mut()
        {
            parent.children.push(done);
        }
    }

    fn last_node(&mut self, line: &SourceLine<'_>) -> Result<&mut MindmapNode> {
        self.stack.last_mut().ok_or_else(|| {
            line.syntax_error(ErrorCode::E100, "decoration before any node")
        })
    }

    fn icon(&mut self, line: &SourceLine<'_>) -> Result<bool> {
        let Some(icon) = line
            .text
            .strip_prefix("::icon(")
            .and_then(|rest| rest.strip_suffix(')'))
        else {
            return Ok(false);
        };
        self.last_node(line)?.icon = non_empty(icon);
        Ok(true)
    }

    fn class(&mut self, line: &SourceLine<'_>) -> Result<bool> {
        let Some(class) = line.text.strip_prefix(":::") else {
            return Ok(false);
        };
        self.last_node(line)?.class = non_empty(class);
        Ok(true)
    }

    fn node(&mut self, line: &SourceLine<'_>) -> Result<bool> {
        let (id, text, shape) = parse_shape(line.text);
        let node = MindmapNode {
            id: id.map(str::to_string),
            text: text.to_string(),
            shape,
            icon: None,
            class: None,
            indent: line.indent,
            children: Vec::new(),
            position: line.position(),
        };

        while self
            .stack
            .last()
            .is_some_and(|top| self.stack.len() > 1 && top.indent >= line.indent)
        {
            self.fold_one();
        }
        if let Some(root) = self.stack.first()
            && self.stack.len() == 1
            && root.indent >= line.indent
        {
            return Err(line.structural_error(
                ErrorCode::E203,
                format!("second root node `{}`, a mindmap has exactly one root", node.text),
            ));
        }

        self.stack.push(node);
        Ok(true)
    }

    fn finish(mut self) -> Option<MindmapNode> {
        while self.stack.len() > 1 {
            self.fold_one();
        }
        self.stack.pop()
    }
}

/// Split `id(text)` style node text into id, label and shape.
fn parse_shape(text: &str) -> (Option<&str>, &str, MindmapShape) {
    for (open, close, shape) in SHAPES {
        let Some(start) = text.find(open) else {
            continue;
        };
        let inner_start = start + open.len();
        if !text.ends_with(close) || text.len() < inner_start + close.len() {
            continue;
        }
        let id = &text[..start];
        if !id.is_empty() && !is_identifier(id) {
            continue;
        }
        let inner = text[inner_start..text.len() - close.len()].trim();
        return ((!id.is_empty()).then_some(id), inner, shape);
    }
    (None, text, MindmapShape::Default)
}

/// Parser for `mindmap`.
pub struct MindmapParser;

impl DiagramParser for MindmapParser {
    fn supported_types(&self) -> &'static [DiagramKind] {
        &[DiagramKind::Mindmap]
    }

    fn parse(&self, source: &Source<'_>) -> Result<Diagram> {
        let header = expect_bare_header(source, "mindmap")?;

        let mut state = MindmapState::default();
        for line in source.body() {
            run_cascade(&mut state, RULES, line)?;
        }

        let root = state.finish().ok_or_else(|| {
            ParseError::structural(ErrorCode::E204, header.position(), "mindmap has no root node")
        })?;

        Ok(Diagram::Mindmap(MindmapDiagram {
            header: diagram_header(DiagramKind::Mindmap, source, &header),
            root,
        }))
    }
}
