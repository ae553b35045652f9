//! C4 family parser (`C4Context`, `C4Container`, `C4Component`,
//! `C4Dynamic`, `C4Deployment`).
//!
//! Every body line is a constructor call `Name(arg, arg, ...)`. Boundary
//! constructors followed by `{` open a nested scope; the matching `}` is
//! found by counting opening and closing lines, and the lines in between
//! are parsed recursively into the boundary. Relationships, styles and the
//! title are always hoisted to the diagram root.

use log::trace;
use merval_core::ast::{
    C4Diagram, Diagram, DiagramKind,
    c4::{
        C4Boundary, C4BoundaryKind, C4Element, C4ElementKind, C4Relationship,
        C4RelationshipKind, C4Style, C4StyleKind,
    },
};
use winnow::{
    Parser,
    ascii::space0,
    combinator::terminated,
    error::ModalResult,
    token::take_while,
};

use crate::{
    error::{ErrorCode, ParseError, Result},
    lexer::{Source, SourceLine, non_empty, split_params, strip_keyword_colon, unquote},
    parser::{DiagramParser, diagram_header, unexpected_modifier},
};

const KEYWORDS: [(&str, DiagramKind); 5] = [
    ("C4Context", DiagramKind::C4Context),
    ("C4Container", DiagramKind::C4Container),
    ("C4Component", DiagramKind::C4Component),
    ("C4Dynamic", DiagramKind::C4Dynamic),
    ("C4Deployment", DiagramKind::C4Deployment),
];

// Positional parameter layouts. `$name=value` arguments override by name.
const ELEMENT: &[&str] = &["id", "label", "descr", "sprite", "tags", "link"];
const ELEMENT_WITH_TECHNOLOGY: &[&str] = &["id", "label", "techn", "descr", "sprite", "tags", "link"];
const BOUNDARY: &[&str] = &["id", "label", "type", "tags", "link"];
const NAMED_BOUNDARY: &[&str] = &["id", "label", "tags", "link"];
const DEPLOYMENT_NODE: &[&str] = &["id", "label", "type", "descr", "sprite", "tags", "link"];
const RELATIONSHIP: &[&str] = &["from", "to", "label", "techn", "descr", "sprite", "tags", "link"];

/// A parsed `Name(args)` line.
#[derive(Debug)]
struct Call<'a> {
    name: &'a str,
    args: Vec<String>,
    opens_scope: bool,
}

/// `Name(` with optional space before the parenthesis.
fn call_name<'s>(input: &mut &'s str) -> ModalResult<&'s str> {
    terminated(
        take_while(1.., |c: char| c.is_alphanumeric() || c == '_'),
        (space0, '('),
    )
    .parse_next(input)
}

fn parse_call<'a>(line: &SourceLine<'a>, opens_on_next_line: bool) -> Result<Call<'a>> {
    let (text, opens_scope) = match line.text.strip_suffix('{') {
        Some(text) => (text.trim_end(), true),
        None => (line.text, opens_on_next_line),
    };

    let mut rest = text;
    let name = call_name.parse_next(&mut rest).map_err(|_| {
        line.syntax_error(
            ErrorCode::E100,
            format!("expected a C4 constructor call, found `{}`", line.text),
        )
    })?;
    let Some(args) = rest.trim_end().strip_suffix(')') else {
        return Err(line.syntax_error(
            ErrorCode::E102,
            format!("`{name}(` is never closed with `)`"),
        ));
    };
    let args = split_params(args).map_err(|err| line.syntax_error(ErrorCode::E102, err.to_string()))?;

    Ok(Call {
        name,
        args,
        opens_scope,
    })
}

/// Constructor arguments bound to a positional layout.
#[derive(Debug)]
struct Bound {
    slots: &'static [&'static str],
    values: Vec<Option<String>>,
}

impl Bound {
    fn new(line: &SourceLine<'_>, call: &Call<'_>, slots: &'static [&'static str]) -> Result<Self> {
        let mut values = vec![None; slots.len()];
        let mut position = 0;
        for arg in &call.args {
            if let Some((key, value)) = keyword_arg(arg) {
                let index = slots.iter().position(|slot| *slot == key).ok_or_else(|| {
                    line.syntax_error(
                        ErrorCode::E101,
                        format!("`{}` has no `${key}` parameter", call.name),
                    )
                })?;
                values[index] = non_empty(value);
                continue;
            }
            let slot = values.get_mut(position).ok_or_else(|| {
                line.syntax_error(
                    ErrorCode::E101,
                    format!(
                        "`{}` takes at most {} arguments, found {}",
                        call.name,
                        slots.len(),
                        call.args.len()
                    ),
                )
            })?;
            *slot = non_empty(arg);
            position += 1;
        }
        Ok(Self { slots, values })
    }

    fn take(&mut self, slot: &str) -> Option<String> {
        let index = self.slots.iter().position(|name| *name == slot)?;
        self.values[index].take()
    }

    fn require(&mut self, line: &SourceLine<'_>, slot: &str) -> Result<String> {
        self.take(slot).ok_or_else(|| {
            line.syntax_error(ErrorCode::E101, format!("missing required `{slot}` argument"))
        })
    }
}

/// `$key=value`, value unquoted.
fn keyword_arg(arg: &str) -> Option<(&str, &str)> {
    let (key, value) = arg.strip_prefix('$')?.split_once('=')?;
    Some((key.trim(), unquote(value.trim())))
}

/// Things that always attach to the diagram root.
#[derive(Debug, Default)]
struct Hoisted {
    title: Option<String>,
    relationships: Vec<C4Relationship>,
    styles: Vec<C4Style>,
}

/// Elements and boundaries of one scope (the root or a boundary body).
#[derive(Debug, Default)]
struct Scope {
    elements: Vec<C4Element>,
    boundaries: Vec<C4Boundary>,
}

/// Index of the `}` closing a scope opened just before `lines[0]`.
fn find_close(lines: &[SourceLine<'_>]) -> Option<usize> {
    let mut depth = 1_usize;
    for (index, line) in lines.iter().enumerate() {
        if line.text.ends_with('{') {
            depth += 1;
        } else if line.text.starts_with('}') {
            depth -= 1;
            if depth == 0 {
                return Some(index);
            }
        }
    }
    None
}

fn parse_scope(lines: &[SourceLine<'_>], scope: &mut Scope, hoisted: &mut Hoisted) -> Result<()> {
    let mut index = 0;
    while let Some(line) = lines.get(index) {
        index += 1;

        if line.text.starts_with('}') {
            return Err(line.structural_error(ErrorCode::E201, "`}` without an open boundary"));
        }
        if let Some(title) = strip_keyword_colon(line.text, "title") {
            hoisted.title = non_empty(title);
            continue;
        }

        let brace_on_next_line = lines.get(index).is_some_and(|next| next.text == "{");
        let call = parse_call(line, brace_on_next_line)?;
        trace!(constructor = call.name, line = line.number; "C4 constructor");

        if let Some(kind) = C4BoundaryKind::from_keyword(call.name)
            && call.opens_scope
        {
            if brace_on_next_line && !line.text.ends_with('{') {
                index += 1;
            }
            let mut opened = boundary(line, kind, &call)?;
            let body = &lines[index..];
            let close = find_close(body).ok_or_else(|| {
                ParseError::structural(
                    ErrorCode::E200,
                    line.position(),
                    format!("boundary `{}` is never closed with `}}`", opened.id),
                )
            })?;

            let mut inner = Scope::default();
            parse_scope(&body[..close], &mut inner, hoisted)?;
            opened.elements = inner.elements;
            opened.boundaries = inner.boundaries;
            scope.boundaries.push(opened);
            index += close + 1;
        } else if call.opens_scope {
            return Err(line.syntax_error(
                ErrorCode::E100,
                format!("`{}` cannot open a `{{` block", call.name),
            ));
        } else if let Some(kind) = C4ElementKind::from_keyword(call.name) {
            scope.elements.push(element(line, kind, &call)?);
        } else if let Some(kind) = C4RelationshipKind::from_keyword(call.name) {
            hoisted.relationships.push(relationship(line, kind, &call)?);
        } else if let Some(kind) = C4StyleKind::from_keyword(call.name) {
            hoisted.styles.push(style(line, kind, &call)?);
        } else {
            return Err(line.syntax_error(
                ErrorCode::E100,
                format!("unknown C4 constructor `{}`", call.name),
            ));
        }
    }
    Ok(())
}

fn element(line: &SourceLine<'_>, kind: C4ElementKind, call: &Call<'_>) -> Result<C4Element> {
    let is_node = matches!(kind, C4ElementKind::Node | C4ElementKind::DeploymentNode);
    let slots = if is_node {
        DEPLOYMENT_NODE
    } else if kind.has_technology() {
        ELEMENT_WITH_TECHNOLOGY
    } else {
        ELEMENT
    };
    let mut args = Bound::new(line, call, slots)?;

    Ok(C4Element {
        kind,
        id: args.require(line, "id")?,
        label: args.take("label"),
        // A node's type plays the role of its technology.
        technology: if is_node {
            args.take("type")
        } else {
            args.take("techn")
        },
        description: args.take("descr"),
        sprite: args.take("sprite"),
        tags: args.take("tags"),
        link: args.take("link"),
        position: line.position(),
    })
}

fn boundary(line: &SourceLine<'_>, kind: C4BoundaryKind, call: &Call<'_>) -> Result<C4Boundary> {
    let slots = match kind {
        C4BoundaryKind::Boundary => BOUNDARY,
        C4BoundaryKind::DeploymentNode | C4BoundaryKind::Node => DEPLOYMENT_NODE,
        _ => NAMED_BOUNDARY,
    };
    let mut args = Bound::new(line, call, slots)?;

    Ok(C4Boundary {
        kind,
        id: args.require(line, "id")?,
        label: args.take("label"),
        boundary_type: args.take("type"),
        description: args.take("descr"),
        sprite: args.take("sprite"),
        tags: args.take("tags"),
        link: args.take("link"),
        elements: Vec::new(),
        boundaries: Vec::new(),
        position: line.position(),
    })
}

fn relationship(
    line: &SourceLine<'_>,
    kind: C4RelationshipKind,
    call: &Call<'_>,
) -> Result<C4Relationship> {
    let mut args = Bound::new(line, call, RELATIONSHIP)?;

    Ok(C4Relationship {
        kind,
        from: args.require(line, "from")?,
        to: args.require(line, "to")?,
        label: args.take("label"),
        technology: args.take("techn"),
        description: args.take("descr"),
        sprite: args.take("sprite"),
        tags: args.take("tags"),
        link: args.take("link"),
        position: line.position(),
    })
}

fn style(line: &SourceLine<'_>, kind: C4StyleKind, call: &Call<'_>) -> Result<C4Style> {
    let mut targets = Vec::new();
    let mut properties = Vec::new();
    for arg in &call.args {
        if let Some((key, value)) = keyword_arg(arg) {
            properties.push((key.to_string(), value.to_string()));
        } else if targets.len() < kind.target_count() {
            targets.push(arg.clone());
        } else if matches!(kind, C4StyleKind::AddElementTag | C4StyleKind::AddRelTag)
            && properties.is_empty()
        {
            properties.push(("tagStereo".to_string(), arg.clone()));
        } else {
            return Err(line.syntax_error(
                ErrorCode::E101,
                format!("unexpected positional argument `{arg}` to `{}`", call.name),
            ));
        }
    }
    if targets.len() < kind.target_count() {
        return Err(line.syntax_error(
            ErrorCode::E101,
            format!(
                "`{}` needs {} target id(s), found {}",
                call.name,
                kind.target_count(),
                targets.len()
            ),
        ));
    }

    Ok(C4Style {
        kind,
        targets,
        properties,
        position: line.position(),
    })
}

/// Parser for the five C4 diagram kinds.
pub struct C4Parser;

impl DiagramParser for C4Parser {
    fn supported_types(&self) -> &'static [DiagramKind] {
        &[
            DiagramKind::C4Context,
            DiagramKind::C4Container,
            DiagramKind::C4Component,
            DiagramKind::C4Dynamic,
            DiagramKind::C4Deployment,
        ]
    }

    fn parse(&self, source: &Source<'_>) -> Result<Diagram> {
        let keywords = KEYWORDS.map(|(keyword, _)| keyword);
        let (header, keyword, rest) = source.expect_header_any(&keywords)?;
        if !rest.is_empty() {
            return Err(unexpected_modifier(header, keyword, rest));
        }
        let kind = KEYWORDS
            .iter()
            .find(|(candidate, _)| *candidate == keyword)
            .map_or(DiagramKind::C4Context, |(_, kind)| *kind);

        let mut scope = Scope::default();
        let mut hoisted = Hoisted::default();
        parse_scope(source.body(), &mut scope, &mut hoisted)?;

        Ok(Diagram::C4(C4Diagram {
            header: diagram_header(kind, source, header),
            title: hoisted.title,
            elements: scope.elements,
            boundaries: scope.boundaries,
            relationships: hoisted.relationships,
            styles: hoisted.styles,
        }))
    }
}
