//! `flowchart` / `graph` parser.

use log::debug;
use merval_core::{
    ast::{
        Diagram, DiagramKind, Direction, FlowchartDiagram,
        flowchart::{
            FlowArrow, FlowDirective, FlowDirectiveKind, FlowEdge, FlowNode, NodeShape, Subgraph,
        },
    },
    position::Position,
};

use crate::{
    error::{ErrorCode, ParseError, Result},
    lexer::{
        Source, SourceLine, find_unquoted, is_identifier, non_empty, split_statements,
        strip_keyword, unquote,
    },
    parser::{
        DiagramParser, Rule, diagram_header, parse_direction, run_cascade, unexpected_modifier,
    },
};

/// Edge operators, longest first where they share a prefix.
const OPERATORS: [(&str, FlowArrow); 9] = [
    ("<-->", FlowArrow::Bidirectional),
    ("-.->", FlowArrow::DottedArrow),
    ("-.-", FlowArrow::Dotted),
    ("==>", FlowArrow::ThickArrow),
    ("===", FlowArrow::Thick),
    ("-->", FlowArrow::Arrow),
    ("---", FlowArrow::Open),
    ("--o", FlowArrow::Circle),
    ("--x", FlowArrow::Cross),
];

/// Bracket pairs around node labels, longer delimiters first.
const SHAPES: [(&str, &str, NodeShape); 9] = [
    ("((", "))", NodeShape::Circle),
    ("([", "])", NodeShape::Stadium),
    ("[[", "]]", NodeShape::Subroutine),
    ("[(", ")]", NodeShape::Cylinder),
    ("{{", "}}", NodeShape::Hexagon),
    (">", "]", NodeShape::Asymmetric),
    ("[", "]", NodeShape::Rectangle),
    ("(", ")", NodeShape::Rounded),
    ("{", "}", NodeShape::Rhombus),
];

/// Openers of inline edge text (`A -- text --> B`).
const TEXT_OPENERS: [&str; 3] = [" -- ", " == ", " -. "];

const RULES: &[Rule<FlowchartState>] = &[
    Rule {
        name: "subgraph",
        handler: FlowchartState::subgraph,
    },
    Rule {
        name: "end",
        handler: FlowchartState::end,
    },
    Rule {
        name: "direction",
        handler: FlowchartState::direction,
    },
    Rule {
        name: "classDef",
        handler: FlowchartState::class_def,
    },
    Rule {
        name: "class",
        handler: FlowchartState::class,
    },
    Rule {
        name: "style",
        handler: FlowchartState::style,
    },
    Rule {
        name: "linkStyle",
        handler: FlowchartState::link_style,
    },
    Rule {
        name: "click",
        handler: FlowchartState::click,
    },
    Rule {
        name: "edge",
        handler: FlowchartState::edge,
    },
    Rule {
        name: "node",
        handler: FlowchartState::node,
    },
];

#[derive(Debug, Default)]
struct FlowchartState {
    direction: Option<Direction>,
    nodes: Vec<FlowNode>,
    edges: Vec<FlowEdge>,
    subgraphs: Vec<Subgraph>,
    directives: Vec<FlowDirective>,
    /// Indices into `subgraphs` of the open `subgraph` blocks.
    open: Vec<usize>,
}

impl FlowchartState {
    fn subgraph(&mut self, line: &SourceLine<'_>) -> Result<bool> {
        let Some(rest) = strip_keyword(line.text, "subgraph") else {
            return Ok(false);
        };
        if rest.is_empty() {
            return Err(line.syntax_error(ErrorCode::E100, "`subgraph` needs an id or title"));
        }

        let (id, title) = match rest.find('[') {
            Some(open) if rest.ends_with(']') => (
                rest[..open].trim().to_string(),
                non_empty(unquote(rest[open + 1..rest.len() - 1].trim())),
            ),
            _ => {
                let title = unquote(rest);
                (title.to_string(), Some(title.to_string()))
            }
        };

        let parent = self
            .open
            .last()
            .map(|&index| self.subgraphs[index].id.clone());
        self.subgraphs.push(Subgraph {
            id,
            title,
            parent,
            direction: None,
            position: line.position(),
        });
        self.open.push(self.subgraphs.len() - 1);
        Ok(true)
    }

    fn end(&mut self, line: &SourceLine<'_>) -> Result<bool> {
        if line.text != "end" {
            return Ok(false);
        }
        if self.open.pop().is_none() {
            return Err(line.structural_error(ErrorCode::E201, "`end` without an open `subgraph`"));
        }
        Ok(true)
    }

    fn direction(&mut self, line: &SourceLine<'_>) -> Result<bool> {
        let Some(rest) = strip_keyword(line.text, "direction") else {
            return Ok(false);
        };
        let direction = parse_direction(line, rest)?;
        match self.open.last() {
            Some(&index) => self.subgraphs[index].direction = Some(direction),
            None => self.direction = Some(direction),
        }
        Ok(true)
    }

    fn class_def(&mut self, line: &SourceLine<'_>) -> Result<bool> {
        self.directive(line, "classDef", FlowDirectiveKind::ClassDef)
    }

    fn class(&mut self, line: &SourceLine<'_>) -> Result<bool> {
        self.directive(line, "class", FlowDirectiveKind::Class)
    }

    fn style(&mut self, line: &SourceLine<'_>) -> Result<bool> {
        self.directive(line, "style", FlowDirectiveKind::Style)
    }

    fn link_style(&mut self, line: &SourceLine<'_>) -> Result<bool> {
        self.directive(line, "linkStyle", FlowDirectiveKind::LinkStyle)
    }

    fn click(&mut self, line: &SourceLine<'_>) -> Result<bool> {
        self.directive(line, "click", FlowDirectiveKind::Click)
    }

    /// `keyword targets value`, where targets is a comma-separated list.
    fn directive(
        &mut self,
        line: &SourceLine<'_>,
        keyword: &str,
        kind: FlowDirectiveKind,
    ) -> Result<bool> {
        let Some(rest) = strip_keyword(line.text, keyword) else {
            return Ok(false);
        };
        let (targets, value) = rest
            .split_once(char::is_whitespace)
            .map(|(targets, value)| (targets, value.trim()))
            .unwrap_or((rest, ""));
        if targets.is_empty() || value.is_empty() {
            return Err(line.syntax_error(
                ErrorCode::E100,
                format!("`{keyword}` needs a target list and a value"),
            ));
        }

        self.directives.push(FlowDirective {
            kind,
            targets: targets
                .split(',')
                .map(str::trim)
                .filter(|target| !target.is_empty())
                .map(str::to_string)
                .collect(),
            value: value.to_string(),
            position: line.position(),
        });
        Ok(true)
    }

    /// One or more chained edges: `a --> b -->|label| c`.
    fn edge(&mut self, line: &SourceLine<'_>) -> Result<bool> {
        let Some((index, operator, mut arrow)) = find_operator(line.text) else {
            return Ok(false);
        };
        let (left, mut label) = split_edge_text(&line.text[..index]);
        let Some(mut from) = parse_node_token(left, line.position()) else {
            return Ok(false);
        };

        let mut pending = Vec::new();
        let mut rest = &line.text[index + operator.len()..];
        loop {
            let (pipe_label, after) = extract_pipe_label(rest);
            label = pipe_label.or(label);
            let (target, next) = match find_operator(after) {
                Some((index, operator, next_arrow)) => {
                    let (target, next_label) = split_edge_text(&after[..index]);
                    (target, Some((next_arrow, next_label, &after[index + operator.len()..])))
                }
                None => (after, None),
            };
            let Some(to) = parse_node_token(target, line.position()) else {
                return Ok(false);
            };

            pending.push((from, FlowEdge {
                from: String::new(),
                to: to.id.clone(),
                arrow,
                label: label.take(),
                position: line.position(),
            }));
            from = to;

            match next {
                Some((next_arrow, next_label, remainder)) => {
                    arrow = next_arrow;
                    label = next_label;
                    rest = remainder;
                }
                None => break,
            }
        }

        for (node, mut edge) in pending {
            edge.from = node.id.clone();
            self.register(node);
            self.edges.push(edge);
        }
        self.register(from);
        Ok(true)
    }

    fn node(&mut self, line: &SourceLine<'_>) -> Result<bool> {
        match parse_node_token(line.text, line.position()) {
            Some(node) => {
                self.register(node);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Record the first occurrence of a node; later labels fill in gaps.
    fn register(&mut self, node: FlowNode) {
        match self.nodes.iter_mut().find(|known| known.id == node.id) {
            Some(known) => {
                if known.label.is_none() && node.label.is_some() {
                    known.label = node.label;
                    known.shape = node.shape;
                }
                if known.class.is_none() {
                    known.class = node.class;
                }
            }
            None => self.nodes.push(node),
        }
    }
}

/// Leftmost operator in `text` outside node labels; the longest wins a tie.
fn find_operator(text: &str) -> Option<(usize, &'static str, FlowArrow)> {
    let mut selected: Option<(usize, &'static str, FlowArrow)> = None;
    for (operator, arrow) in OPERATORS {
        if let Some(index) = find_unquoted(text, operator) {
            match selected {
                Some((best_index, best_operator, _))
                    if index > best_index
                        || (index == best_index && operator.len() <= best_operator.len()) => {}
                _ => selected = Some((index, operator, arrow)),
            }
        }
    }
    selected
}

/// Split `A -- text` into the node part and the inline edge text.
fn split_edge_text(text: &str) -> (&str, Option<String>) {
    TEXT_OPENERS
        .iter()
        .find_map(|opener| {
            find_unquoted(text, opener).map(|index| {
                (
                    text[..index].trim(),
                    non_empty(unquote(text[index + opener.len()..].trim())),
                )
            })
        })
        .unwrap_or((text.trim(), None))
}

/// Strip a leading `|label|` from the right-hand side of an edge.
fn extract_pipe_label(text: &str) -> (Option<String>, &str) {
    let trimmed = text.trim();
    let Some(after_open) = trimmed.strip_prefix('|') else {
        return (None, trimmed);
    };
    let Some(close) = after_open.find('|') else {
        return (None, trimmed);
    };
    (
        non_empty(unquote(after_open[..close].trim())),
        after_open[close + 1..].trim(),
    )
}

/// `id`, `id[label]`, `id((label))`, ... with an optional `:::class`.
fn parse_node_token(raw: &str, position: Position) -> Option<FlowNode> {
    let trimmed = raw.trim();
    let (core, class) = match trimmed.split_once(":::") {
        Some((core, class)) => (core.trim(), non_empty(class)),
        None => (trimmed, None),
    };

    let Some(open) = core.find(['[', '(', '{', '>']) else {
        return is_identifier(core).then(|| FlowNode {
            id: core.to_string(),
            label: None,
            shape: NodeShape::Default,
            class,
            position,
        });
    };

    let id = core[..open].trim_end();
    if !is_identifier(id) {
        return None;
    }
    let body = &core[open..];
    SHAPES.iter().find_map(|(start, end, shape)| {
        let inner = body
            .strip_prefix(start)?
            .strip_suffix(end)
            .filter(|_| body.len() >= start.len() + end.len())?;
        Some(FlowNode {
            id: id.to_string(),
            label: non_empty(unquote(inner.trim())),
            shape: *shape,
            class: class.clone(),
            position,
        })
    })
}

/// Parser for `flowchart` and `graph` diagrams.
pub struct FlowchartParser;

impl DiagramParser for FlowchartParser {
    fn supported_types(&self) -> &'static [DiagramKind] {
        &[DiagramKind::Flowchart, DiagramKind::Graph]
    }

    fn parse(&self, source: &Source<'_>) -> Result<Diagram> {
        let (header, keyword, rest) = source.expect_header_any(&["flowchart", "graph"])?;
        let kind = if keyword == "graph" {
            DiagramKind::Graph
        } else {
            DiagramKind::Flowchart
        };
        let modifier = rest.trim_end_matches(';').trim();
        let direction = match modifier {
            "" => None,
            text => Some(
                text.parse::<Direction>()
                    .map_err(|_| unexpected_modifier(header, keyword, text))?,
            ),
        };
        debug!(kind:? = kind, direction:?; "Parsing flowchart");

        let mut state = FlowchartState {
            direction,
            ..FlowchartState::default()
        };
        for line in source.body() {
            for statement in split_statements(line.text) {
                let statement_line = SourceLine {
                    text: statement,
                    ..*line
                };
                run_cascade(&mut state, RULES, &statement_line)?;
            }
        }

        if let Some(&index) = state.open.last() {
            let subgraph = &state.subgraphs[index];
            return Err(ParseError::structural(
                ErrorCode::E200,
                subgraph.position,
                format!("subgraph `{}` is never closed with `end`", subgraph.id),
            ));
        }

        Ok(Diagram::Flowchart(FlowchartDiagram {
            header: diagram_header(kind, source, header),
            direction: state.direction,
            nodes: state.nodes,
            edges: state.edges,
            subgraphs: state.subgraphs,
            directives: state.directives,
        }))
    }
}
