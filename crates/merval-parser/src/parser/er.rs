//! `erDiagram` parser.

use merval_core::ast::{
    Diagram, DiagramKind, Direction, ErDiagram,
    er::{Attribute, Cardinality, Entity, ErRelationship},
};
use winnow::{Parser, combinator::alt, error::ModalResult};

use crate::{
    error::{ErrorCode, ParseError, Result},
    lexer::{Source, SourceLine, is_identifier, non_empty, split_label, strip_keyword, unquote},
    parser::{DiagramParser, Rule, diagram_header, parse_direction, run_cascade, unexpected_modifier},
};

const RULES: &[Rule<ErState>] = &[
    Rule {
        name: "entity body",
        handler: ErState::open_body,
    },
    Rule {
        name: "relationship",
        handler: ErState::relationship,
    },
    Rule {
        name: "direction",
        handler: ErState::direction,
    },
    Rule {
        name: "}",
        handler: ErState::stray_close,
    },
    Rule {
        name: "entity",
        handler: ErState::entity,
    },
];

const BODY_RULES: &[Rule<ErState>] = &[
    Rule {
        name: "}",
        handler: ErState::close_body,
    },
    Rule {
        name: "attribute",
        handler: ErState::attribute,
    },
];

#[derive(Debug, Default)]
struct ErState {
    direction: Option<Direction>,
    entities: Vec<Entity>,
    relationships: Vec<ErRelationship>,
    /// Index into `entities` of the body being read.
    open: Option<usize>,
}

impl ErState {
    fn push_entity(&mut self, line: &SourceLine<'_>, head: &str, has_body: bool) -> Result<()> {
        let (name, alias) = entity_name(head).ok_or_else(|| {
            line.syntax_error(ErrorCode::E100, format!("`{head}` is not a valid entity name"))
        })?;
        self.entities.push(Entity {
            name: name.to_string(),
            alias,
            has_body,
            attributes: Vec::new(),
            position: line.position(),
        });
        Ok(())
    }

    fn open_body(&mut self, line: &SourceLine<'_>) -> Result<bool> {
        if let Some(head) = line.text.strip_suffix("{}") {
            self.push_entity(line, head.trim_end(), true)?;
            return Ok(true);
        }
        let Some(head) = line.text.strip_suffix('{') else {
            return Ok(false);
        };
        self.push_entity(line, head.trim_end(), true)?;
        self.open = Some(self.entities.len() - 1);
        Ok(true)
    }

    fn relationship(&mut self, line: &SourceLine<'_>) -> Result<bool> {
        let (head, label) = split_label(line.text);
        let words: Vec<&str> = head.split_whitespace().collect();
        let &[left, operator, right] = words.as_slice() else {
            return Ok(false);
        };
        let Ok((left_cardinality, identifying, right_cardinality)) = relation_operator.parse(operator)
        else {
            return Ok(false);
        };
        if !is_identifier(left) || !is_identifier(right) {
            return Err(line.syntax_error(
                ErrorCode::E100,
                format!("invalid relationship endpoints `{left}` and `{right}`"),
            ));
        }

        self.relationships.push(ErRelationship {
            left: left.to_string(),
            right: right.to_string(),
            left_cardinality,
            right_cardinality,
            identifying,
            label: label.and_then(|label| non_empty(unquote(label))),
            position: line.position(),
        });
        Ok(true)
    }

    fn direction(&mut self, line: &SourceLine<'_>) -> Result<bool> {
        let Some(rest) = strip_keyword(line.text, "direction") else {
            return Ok(false);
        };
        self.direction = Some(parse_direction(line, rest)?);
        Ok(true)
    }

    fn stray_close(&mut self, line: &SourceLine<'_>) -> Result<bool> {
        if line.text != "}" {
            return Ok(false);
        }
        Err(line.structural_error(ErrorCode::E201, "`}` without an open entity body"))
    }

    fn entity(&mut self, line: &SourceLine<'_>) -> Result<bool> {
        if entity_name(line.text).is_none() {
            return Ok(false);
        }
        self.push_entity(line, line.text, false)?;
        Ok(true)
    }

    fn close_body(&mut self, line: &SourceLine<'_>) -> Result<bool> {
        if line.text != "}" {
            return Ok(false);
        }
        self.open = None;
        Ok(true)
    }

    fn attribute(&mut self, line: &SourceLine<'_>) -> Result<bool> {
        let attribute = parse_attribute(line).ok_or_else(|| {
            line.syntax_error(
                ErrorCode::E100,
                "expected `type name [keys] [\"comment\"]`",
            )
        })?;
        if let Some(entity) = self.open.and_then(|index| self.entities.get_mut(index)) {
            entity.attributes.push(attribute);
        }
        Ok(true)
    }
}

/// `NAME` or `NAME["alias"]`.
fn entity_name(text: &str) -> Option<(&str, Option<String>)> {
    let (name, alias) = match text.find('[') {
        Some(open) if text.ends_with(']') => (
            text[..open].trim_end(),
            non_empty(unquote(text[open + 1..text.len() - 1].trim())),
        ),
        _ => (text, None),
    };
    is_identifier(name).then_some((name, alias))
}

fn left_cardinality(input: &mut &str) -> ModalResult<Cardinality> {
    alt((
        "|o".value(Cardinality::ZeroOrOne),
        "||".value(Cardinality::ExactlyOne),
        "}o".value(Cardinality::ZeroOrMore),
        "}|".value(Cardinality::OneOrMore),
    ))
    .parse_next(input)
}

fn right_cardinality(input: &mut &str) -> ModalResult<Cardinality> {
    alt((
        "o|".value(Cardinality::ZeroOrOne),
        "||".value(Cardinality::ExactlyOne),
        "o{".value(Cardinality::ZeroOrMore),
        "|{".value(Cardinality::OneOrMore),
    ))
    .parse_next(input)
}

/// Crow's-foot operator such as `||--o{`. The middle flag is `true` for an
/// identifying (`--`) relationship.
fn relation_operator(input: &mut &str) -> ModalResult<(Cardinality, bool, Cardinality)> {
    (
        left_cardinality,
        alt(("--".value(true), "..".value(false))),
        right_cardinality,
    )
        .parse_next(input)
}

/// `type name [keys] ["comment"]`, where `*name` marks a primary key.
fn parse_attribute(line: &SourceLine<'_>) -> Option<Attribute> {
    let mut text = line.text;
    let mut comment = None;
    if let Some(before) = text.strip_suffix('"') {
        let open = before.rfind('"')?;
        comment = Some(before[open + 1..].to_string());
        text = before[..open].trim_end();
    }

    let mut words = text.split_whitespace();
    let data_type = words.next()?;
    let mut name = words.next()?;
    let mut keys: Vec<String> = words
        .flat_map(|word| word.split(','))
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(str::to_string)
        .collect();

    if let Some(stripped) = name.strip_prefix('*') {
        name = stripped;
        if !keys.iter().any(|key| key == "PK") {
            keys.insert(0, "PK".to_string());
        }
    }
    if name.is_empty() {
        return None;
    }

    Some(Attribute {
        data_type: data_type.to_string(),
        name: name.to_string(),
        keys,
        comment,
        position: line.position(),
    })
}

/// Parser for `erDiagram`.
pub struct ErParser;

impl DiagramParser for ErParser {
    fn supported_types(&self) -> &'static [DiagramKind] {
        &[DiagramKind::Er]
    }

    fn parse(&self, source: &Source<'_>) -> Result<Diagram> {
        let (header, rest) = source.expect_header("erDiagram")?;
        let direction = match rest {
            "" => None,
            "TB" | "BT" | "LR" | "RL" => rest.parse().ok(),
            _ => return Err(unexpected_modifier(header, "erDiagram", rest)),
        };

        let mut state = ErState {
            direction,
            ..ErState::default()
        };
        for line in source.body() {
            let rules = if state.open.is_some() {
                BODY_RULES
            } else {
                RULES
            };
            run_cascade(&mut state, rules, line)?;
        }

        if let Some(entity) = state.open.and_then(|index| state.entities.get(index)) {
            return Err(ParseError::structural(
                ErrorCode::E200,
                entity.position,
                format!("body of entity `{}` is never closed with `}}`", entity.name),
            ));
        }

        Ok(Diagram::Er(ErDiagram {
            header: diagram_header(DiagramKind::Er, source, header),
            direction: state.direction,
            entities: state.entities,
            relationships: state.relationships,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> ErDiagram {
        match ErParser.parse_str(text, 0).unwrap() {
            Diagram::Er(diagram) => diagram,
            other => panic!("expected ER diagram, got {other:?}"),
        }
    }

    #[test]
    fn test_header_direction() {
        assert_eq!(
            parse("erDiagram LR\nA").direction,
            Some(Direction::LeftRight)
        );

        let err = ErParser.parse_str("erDiagram TD\nA", 0).unwrap_err();
        assert_eq!(err.code(), ErrorCode::E003);
    }

    #[test]
    fn test_relationship_cardinalities() {
        let diagram = parse("erDiagram\nCUSTOMER ||--o{ ORDER : places\nORDER }|..|{ LINE : \"has\"");

        let first = &diagram.relationships[0];
        assert_eq!(first.left_cardinality, Cardinality::ExactlyOne);
        assert_eq!(first.right_cardinality, Cardinality::ZeroOrMore);
        assert!(first.identifying);
        assert_eq!(first.label.as_deref(), Some("places"));

        let second = &diagram.relationships[1];
        assert_eq!(second.left_cardinality, Cardinality::OneOrMore);
        assert_eq!(second.right_cardinality, Cardinality::OneOrMore);
        assert!(!second.identifying);
        assert_eq!(second.label.as_deref(), Some("has"));
    }

    #[test]
    fn test_entity_body_attributes() {
        let diagram = parse(
            "erDiagram\nCUSTOMER[\"Customer\"] {\n  string *id PK \"primary\"\n  string email UK, FK\n  int age\n}",
        );

        let customer = &diagram.entities[0];
        assert_eq!(customer.alias.as_deref(), Some("Customer"));
        assert!(customer.has_body);

        let id = &customer.attributes[0];
        assert_eq!(id.name, "id");
        assert_eq!(id.keys, ["PK"]);
        assert_eq!(id.comment.as_deref(), Some("primary"));
        assert!(id.is_primary_key());

        assert_eq!(customer.attributes[1].keys, ["UK", "FK"]);
        assert!(customer.attributes[2].keys.is_empty());
    }

    #[test]
    fn test_star_adds_primary_key() {
        let diagram = parse("erDiagram\nITEM {\n  int *sku FK\n}");

        assert_eq!(diagram.entities[0].attributes[0].keys, ["PK", "FK"]);
    }

    #[test]
    fn test_star_merges_with_explicit_primary_key() {
        let diagram = parse("erDiagram
ITEM {
  int *id PK
  string *b FK,PK
}");
        let attributes = &diagram.entities[0].attributes;

        assert_eq!(attributes[0].name, "id");
        assert_eq!(attributes[0].keys, ["PK"]);
        assert_eq!(attributes[1].name, "b");
        assert_eq!(attributes[1].keys, ["FK", "PK"]);
    }

    #[test]
    fn test_bare_and_empty_body_entities() {
        let diagram = parse("erDiagram\nPRODUCT\nEMPTY {}\nSHOP[Store]");

        assert!(!diagram.entities[0].has_body);
        assert!(diagram.entities[1].has_body);
        assert_eq!(diagram.entities[2].alias.as_deref(), Some("Store"));
    }

    #[test]
    fn test_unclosed_body() {
        let err = ErParser
            .parse_str("erDiagram\nA {\n  int x", 0)
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::E200);
    }
}
