//! `classDiagram` parser.
//!
//! Lines outside a class body go through [`RULES`]; while a `class X {`
//! body is open they go through [`BODY_RULES`] until the closing `}`.

use merval_core::{
    ast::{
        ClassDiagram, Diagram, DiagramKind, Direction,
        class::{
            ClassAnnotation, ClassDefinition, ClassMember, ClassNote, ClassRelationship,
            Classifier, LineStyle, MemberKind, OwnedMember, RelationKind, Visibility,
        },
    },
    position::Position,
};
use winnow::{
    Parser,
    combinator::{alt, opt},
    error::ModalResult,
};

use crate::{
    error::{ErrorCode, ParseError, Result},
    lexer::{
        Source, SourceLine, is_identifier, non_empty, split_label, split_words, strip_keyword,
        unquote,
    },
    parser::{DiagramParser, Rule, diagram_header, expect_bare_header, parse_direction, run_cascade},
};

const RULES: &[Rule<ClassState>] = &[
    Rule {
        name: "class",
        handler: ClassState::declaration,
    },
    Rule {
        name: "annotation",
        handler: ClassState::annotation,
    },
    Rule {
        name: "note",
        handler: ClassState::note,
    },
    Rule {
        name: "direction",
        handler: ClassState::direction,
    },
    Rule {
        name: "relationship",
        handler: ClassState::relationship,
    },
    Rule {
        name: "member",
        handler: ClassState::owned_member,
    },
];

const BODY_RULES: &[Rule<ClassState>] = &[
    Rule {
        name: "}",
        handler: ClassState::close_body,
    },
    Rule {
        name: "annotation",
        handler: ClassState::body_annotation,
    },
    Rule {
        name: "member",
        handler: ClassState::body_member,
    },
];

#[derive(Debug, Default)]
struct ClassState {
    direction: Option<Direction>,
    classes: Vec<ClassDefinition>,
    members: Vec<OwnedMember>,
    relationships: Vec<ClassRelationship>,
    annotations: Vec<ClassAnnotation>,
    notes: Vec<ClassNote>,
    /// Index into `classes` of the body being read.
    open: Option<usize>,
}

impl ClassState {
    fn declaration(&mut self, line: &SourceLine<'_>) -> Result<bool> {
        let Some(rest) = strip_keyword(line.text, "class") else {
            return Ok(false);
        };

        let (mut rest, opens_body) = match rest.strip_suffix('{') {
            Some(rest) => (rest.trim_end(), true),
            None => (rest, false),
        };
        if let Some(index) = rest.find(":::") {
            rest = rest[..index].trim_end();
        }

        let mut label = None;
        if let Some(open) = rest.find('[')
            && rest.ends_with(']')
        {
            label = non_empty(unquote(rest[open + 1..rest.len() - 1].trim()));
            rest = rest[..open].trim_end();
        }

        let mut generic = None;
        if let Some(open) = rest.find('~')
            && rest.len() > open + 1
            && rest.ends_with('~')
        {
            generic = non_empty(&rest[open + 1..rest.len() - 1]);
            rest = &rest[..open];
        }

        if !is_identifier(rest) {
            return Err(line.syntax_error(
                ErrorCode::E100,
                format!("`{rest}` is not a valid class name"),
            ));
        }

        self.classes.push(ClassDefinition {
            id: rest.to_string(),
            generic,
            label,
            members: Vec::new(),
            annotation: None,
            position: line.position(),
        });
        if opens_body {
            self.open = Some(self.classes.len() - 1);
        }
        Ok(true)
    }

    fn annotation(&mut self, line: &SourceLine<'_>) -> Result<bool> {
        let Some((annotation, class)) = split_annotation(line.text) else {
            return Ok(false);
        };
        if !is_identifier(class) {
            return Err(line.syntax_error(
                ErrorCode::E100,
                "annotation outside a class body needs a class name",
            ));
        }

        self.annotations.push(ClassAnnotation {
            class: class.to_string(),
            annotation: annotation.to_string(),
            position: line.position(),
        });
        Ok(true)
    }

    fn note(&mut self, line: &SourceLine<'_>) -> Result<bool> {
        let Some(rest) = strip_keyword(line.text, "note") else {
            return Ok(false);
        };

        let (target, text) = match strip_keyword(rest, "for") {
            Some(rest) => match rest.split_once(char::is_whitespace) {
                Some((target, text)) => (Some(target.to_string()), text.trim()),
                None => (Some(rest.to_string()), ""),
            },
            None => (None, rest),
        };
        let text = unquote(text);
        if text.is_empty() {
            return Err(line.syntax_error(ErrorCode::E100, "note needs quoted text"));
        }

        self.notes.push(ClassNote {
            target,
            text: text.to_string(),
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

    fn relationship(&mut self, line: &SourceLine<'_>) -> Result<bool> {
        let (head, label) = split_label(line.text);
        let words = split_words(head);
        let Some((index, (left, style, right))) = words
            .iter()
            .enumerate()
            .find_map(|(index, word)| relation_arrow.parse(*word).ok().map(|arrow| (index, arrow)))
        else {
            return Ok(false);
        };

        let (from, from_cardinality) = match &words[..index] {
            [from] => (*from, None),
            [from, cardinality] if cardinality.starts_with('"') => {
                (*from, Some(unquote(cardinality).to_string()))
            }
            _ => return Err(line.syntax_error(ErrorCode::E100, "expected a class before the relation")),
        };
        let (to, to_cardinality) = match &words[index + 1..] {
            [to] => (*to, None),
            [cardinality, to] if cardinality.starts_with('"') => {
                (*to, Some(unquote(cardinality).to_string()))
            }
            _ => return Err(line.syntax_error(ErrorCode::E100, "expected a class after the relation")),
        };
        if !is_identifier(from) || !is_identifier(to) {
            return Err(line.syntax_error(
                ErrorCode::E100,
                format!("invalid relationship endpoints `{from}` and `{to}`"),
            ));
        }

        let line_style = if style == ".." {
            LineStyle::Dashed
        } else {
            LineStyle::Solid
        };
        self.relationships.push(ClassRelationship {
            from: from.to_string(),
            to: to.to_string(),
            kind: classify(left, line_style, right),
            line: line_style,
            symbol: words[index].to_string(),
            from_cardinality,
            to_cardinality,
            label: label.and_then(non_empty),
            position: line.position(),
        });
        Ok(true)
    }

    fn owned_member(&mut self, line: &SourceLine<'_>) -> Result<bool> {
        let (owner, Some(member)) = split_label(line.text) else {
            return Ok(false);
        };
        if !is_identifier(owner) {
            return Ok(false);
        }

        let member = parse_member(member, line.position())
            .ok_or_else(|| line.syntax_error(ErrorCode::E100, format!("invalid member `{member}`")))?;
        self.members.push(OwnedMember {
            owner: owner.to_string(),
            member,
        });
        Ok(true)
    }

    fn close_body(&mut self, line: &SourceLine<'_>) -> Result<bool> {
        if line.text != "}" {
            return Ok(false);
        }
        self.open = None;
        Ok(true)
    }

    fn body_annotation(&mut self, line: &SourceLine<'_>) -> Result<bool> {
        let Some((annotation, rest)) = split_annotation(line.text) else {
            return Ok(false);
        };
        if !rest.is_empty() {
            return Err(line.syntax_error(
                ErrorCode::E100,
                "annotation inside a class body takes no class name",
            ));
        }
        if let Some(class) = self.open.and_then(|index| self.classes.get_mut(index)) {
            class.annotation = Some(annotation.to_string());
        }
        Ok(true)
    }

    fn body_member(&mut self, line: &SourceLine<'_>) -> Result<bool> {
        let member = parse_member(line.text, line.position()).ok_or_else(|| {
            line.syntax_error(ErrorCode::E100, format!("invalid member `{}`", line.text))
        })?;
        if let Some(class) = self.open.and_then(|index| self.classes.get_mut(index)) {
            class.members.push(member);
        }
        Ok(true)
    }
}

/// `<<annotation>> rest`, split into the annotation text and the rest.
fn split_annotation(text: &str) -> Option<(&str, &str)> {
    let inner = text.strip_prefix("<<")?;
    let close = inner.find(">>")?;
    let annotation = inner[..close].trim();
    (!annotation.is_empty()).then(|| (annotation, inner[close + 2..].trim()))
}

type Arrow<'s> = (Option<&'s str>, &'s str, Option<&'s str>);

/// `[<| * o <] (-- | ..) [|> * o >]`
fn relation_arrow<'s>(input: &mut &'s str) -> ModalResult<Arrow<'s>> {
    (
        opt(alt(("<|", "*", "o", "<"))),
        alt(("--", "..")),
        opt(alt(("|>", "*", "o", ">"))),
    )
        .parse_next(input)
}

fn classify(left: Option<&str>, line: LineStyle, right: Option<&str>) -> RelationKind {
    let has = |symbols: &[&str]| {
        [left, right]
            .into_iter()
            .flatten()
            .any(|end| symbols.contains(&end))
    };

    if has(&["<|", "|>"]) {
        match line {
            LineStyle::Solid => RelationKind::Inheritance,
            LineStyle::Dashed => RelationKind::Realization,
        }
    } else if has(&["*"]) {
        RelationKind::Composition
    } else if has(&["o"]) {
        RelationKind::Aggregation
    } else if line == LineStyle::Dashed {
        RelationKind::Dependency
    } else {
        RelationKind::Association
    }
}

fn split_classifier(text: &str) -> (&str, Option<Classifier>) {
    if let Some(rest) = text.strip_suffix('$') {
        (rest.trim_end(), Some(Classifier::Static))
    } else if let Some(rest) = text.strip_suffix('*') {
        (rest.trim_end(), Some(Classifier::Abstract))
    } else {
        (text, None)
    }
}

/// Parse one member line: `[vis]name(params)[classifier] [return]`,
/// `[vis][type ]name[classifier]` or `[vis]name[classifier] : type`.
fn parse_member(text: &str, position: Position) -> Option<ClassMember> {
    let text = text.trim();
    let (visibility, rest) = match text.chars().next().and_then(Visibility::from_symbol) {
        Some(visibility) => (Some(visibility), text[1..].trim_start()),
        None => (None, text),
    };

    if let Some(open) = rest.find('(') {
        let close = rest.rfind(')').filter(|&close| close > open)?;
        let name = rest[..open].trim();
        if name.is_empty() || name.contains(char::is_whitespace) {
            return None;
        }

        let tail = rest[close + 1..].trim();
        let (classifier, tail) = match tail.chars().next() {
            Some('$') => (Some(Classifier::Static), tail[1..].trim()),
            Some('*') => (Some(Classifier::Abstract), tail[1..].trim()),
            _ => (None, tail),
        };
        return Some(ClassMember {
            visibility,
            name: name.to_string(),
            kind: MemberKind::Method {
                parameters: rest[open + 1..close].trim().to_string(),
            },
            type_name: non_empty(tail),
            classifier,
            position,
        });
    }

    let (body, trailing_type) = match rest.split_once(':') {
        Some((body, type_name)) => (body.trim_end(), non_empty(type_name)),
        None => (rest, None),
    };
    let (body, classifier) = split_classifier(body);
    let (type_name, name) = match (trailing_type, body.rsplit_once(char::is_whitespace)) {
        (Some(type_name), _) => (Some(type_name), body),
        (None, Some((type_name, name))) => (non_empty(type_name), name),
        (None, None) => (None, body),
    };
    if name.is_empty() || name.contains(char::is_whitespace) {
        return None;
    }
    Some(ClassMember {
        visibility,
        name: name.to_string(),
        kind: MemberKind::Field,
        type_name,
        classifier,
        position,
    })
}

/// Parser for `classDiagram`.
pub struct ClassParser;

impl DiagramParser for ClassParser {
    fn supported_types(&self) -> &'static [DiagramKind] {
        &[DiagramKind::Class]
    }

    fn parse(&self, source: &Source<'_>) -> Result<Diagram> {
        let header = expect_bare_header(source, "classDiagram")?;

        let mut state = ClassState::default();
        for line in source.body() {
            let rules = if state.open.is_some() {
                BODY_RULES
            } else {
                RULES
            };
            run_cascade(&mut state, rules, line)?;
        }

        if let Some(class) = state.open.and_then(|index| state.classes.get(index)) {
            return Err(ParseError::structural(
                ErrorCode::E200,
                class.position,
                format!("body of class `{}` is never closed with `}}`", class.id),
            ));
        }

        Ok(Diagram::Class(ClassDiagram {
            header: diagram_header(DiagramKind::Class, source, &header),
            direction: state.direction,
            classes: state.classes,
            members: state.members,
            relationships: state.relationships,
            annotations: state.annotations,
            notes: state.notes,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> ClassDiagram {
        match ClassParser.parse_str(text, 0).unwrap() {
            Diagram::Class(diagram) => diagram,
            other => panic!("expected class diagram, got {other:?}"),
        }
    }

    #[test]
    fn test_relationship_classification() {
        let cases = [
            ("A <|-- B", RelationKind::Inheritance),
            ("A ..|> B", RelationKind::Realization),
            ("A --* B", RelationKind::Composition),
            ("A --o B", RelationKind::Aggregation),
            ("A ..> B", RelationKind::Dependency),
            ("A --> B", RelationKind::Association),
            ("A -- B", RelationKind::Association),
            ("A .. B", RelationKind::Dependency),
            ("A *-- B", RelationKind::Composition),
        ];
        for (text, kind) in cases {
            let diagram = parse(&format!("classDiagram\n{text}"));
            assert_eq!(diagram.relationships[0].kind, kind, "{text}");
        }
    }

    #[test]
    fn test_relationship_cardinalities_and_label() {
        let diagram = parse("classDiagram\nCustomer \"1\" --> \"*\" Ticket : buys");

        let relationship = &diagram.relationships[0];
        assert_eq!(relationship.from, "Customer");
        assert_eq!(relationship.to, "Ticket");
        assert_eq!(relationship.from_cardinality.as_deref(), Some("1"));
        assert_eq!(relationship.to_cardinality.as_deref(), Some("*"));
        assert_eq!(relationship.label.as_deref(), Some("buys"));
        assert_eq!(relationship.symbol, "-->");
    }

    #[test]
    fn test_class_body_members() {
        let diagram = parse(
            "classDiagram\nclass Animal {\n  <<abstract>>\n  +String name\n  -int age$\n  +speak(volume) String\n  +move()*\n}",
        );

        let animal = &diagram.classes[0];
        assert_eq!(animal.annotation.as_deref(), Some("abstract"));
        assert_eq!(animal.members.len(), 4);

        let name = &animal.members[0];
        assert_eq!(name.visibility, Some(Visibility::Public));
        assert_eq!(name.type_name.as_deref(), Some("String"));
        assert!(!name.is_method());

        assert_eq!(animal.members[1].classifier, Some(Classifier::Static));
        assert_eq!(animal.members[1].name, "age");

        let speak = &animal.members[2];
        assert_eq!(
            speak.kind,
            MemberKind::Method {
                parameters: "volume".to_string()
            }
        );
        assert_eq!(speak.type_name.as_deref(), Some("String"));
        assert_eq!(animal.members[3].classifier, Some(Classifier::Abstract));
    }

    #[test]
    fn test_field_with_trailing_type() {
        let diagram = parse("classDiagram\nclass Account {\n  +balance : Decimal\n  -owner$: String\n}");

        let members = &diagram.classes[0].members;
        assert_eq!(members[0].name, "balance");
        assert_eq!(members[0].type_name.as_deref(), Some("Decimal"));
        assert_eq!(members[1].name, "owner");
        assert_eq!(members[1].classifier, Some(Classifier::Static));
        assert_eq!(members[1].type_name.as_deref(), Some("String"));
    }

    #[test]
    fn test_declaration_forms() {
        let diagram = parse("classDiagram\nclass Box~T~\nclass Shape[\"A shape\"]\nclass Plain:::hot");

        assert_eq!(diagram.classes[0].id, "Box");
        assert_eq!(diagram.classes[0].generic.as_deref(), Some("T"));
        assert_eq!(diagram.classes[1].label.as_deref(), Some("A shape"));
        assert_eq!(diagram.classes[2].id, "Plain");
    }

    #[test]
    fn test_out_of_body_members_annotations_and_notes() {
        let diagram = parse(
            "classDiagram\nclass Duck\nDuck : +swim()\n<<interface>> Duck\nnote for Duck \"can fly\"\nnote \"free\"",
        );

        assert_eq!(diagram.members[0].owner, "Duck");
        assert!(diagram.members[0].member.is_method());
        assert_eq!(diagram.annotations[0].annotation, "interface");
        assert_eq!(diagram.notes[0].target.as_deref(), Some("Duck"));
        assert_eq!(diagram.notes[0].text, "can fly");
        assert_eq!(diagram.notes[1].target, None);
    }

    #[test]
    fn test_unclosed_body() {
        let err = ClassParser
            .parse_str("classDiagram\nclass A {\n  +int x", 0)
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::E200);
        assert_eq!(err.position(), Position::new(2, 1));
    }

    #[test]
    fn test_unclassified_line_is_an_error() {
        let err = ClassParser.parse_str("classDiagram\n???", 0).unwrap_err();

        assert_eq!(err.code(), ErrorCode::E100);
    }
}
