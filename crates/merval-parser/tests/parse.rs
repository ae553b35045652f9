use merval_core::{
    ast::{Diagram, DiagramKind, c4::C4ElementKind, class::RelationKind},
    position::Position,
};
use merval_parser::{
    detect_kind,
    error::{ErrorCode, ParseError, ParseErrorKind},
    parse, parse_as, parse_with_offset, validate_diagram,
};
use proptest::prelude::*;

/// A minimal valid diagram for every known kind.
fn minimal(kind: DiagramKind) -> &'static str {
    match kind {
        DiagramKind::Flowchart => "flowchart TD\nA --> B",
        DiagramKind::Graph => "graph LR\nA --> B",
        DiagramKind::Sequence => "sequenceDiagram\nAlice->>Bob: Hi",
        DiagramKind::Class => "classDiagram\nclass Animal",
        DiagramKind::State => "stateDiagram\n[*] --> Idle",
        DiagramKind::StateV2 => "stateDiagram-v2\n[*] --> Idle",
        DiagramKind::Er => "erDiagram\nCUSTOMER ||--o{ ORDER : places",
        DiagramKind::Pie => "pie\n\"Dogs\": 1",
        DiagramKind::Gantt => "gantt\nsection Work\nTask : 1d",
        DiagramKind::Journey => "journey\nsection Day\nWake: 3: Me",
        DiagramKind::GitGraph => "gitGraph\ncommit",
        DiagramKind::Mindmap => "mindmap\nroot",
        DiagramKind::Timeline => "timeline\n2020 : launch",
        DiagramKind::Sankey => "sankey-beta\nA,B,1",
        DiagramKind::Quadrant => "quadrantChart\nA: [0.5, 0.5]",
        DiagramKind::XyChart => "xychart-beta\nx-axis [a]\ny-axis 0 --> 1\nbar [1]",
        DiagramKind::C4Context => "C4Context\nPerson(user, \"User\")",
        DiagramKind::C4Container => "C4Container\nContainer(web, \"Web\", \"Rust\")",
        DiagramKind::C4Component => "C4Component\nComponent(api, \"API\")",
        DiagramKind::C4Dynamic => "C4Dynamic\nRel(a, b, \"calls\")",
        DiagramKind::C4Deployment => "C4Deployment\nNode(n1, \"Server\")",
        DiagramKind::Unknown => "packet-beta\n0-15: \"Port\"",
    }
}

fn expect_error(source: &str) -> ParseError {
    match parse(source) {
        Ok(diagram) => panic!("expected an error, parsed {diagram:?}"),
        Err(err) => err,
    }
}

#[test]
fn test_minimal_diagrams_report_kind_and_position() {
    for kind in DiagramKind::ALL {
        let source = minimal(kind);

        assert_eq!(detect_kind(source), kind);
        let diagram = parse(source).unwrap_or_else(|err| panic!("{kind}: {err}"));
        assert_eq!(diagram.kind(), kind);
        assert_eq!(diagram.position(), Position::new(1, 1));
        assert_eq!(diagram.source(), source);

        let shifted = parse_with_offset(source, 40).unwrap();
        assert_eq!(shifted.position(), Position::new(41, 1));
    }
}

#[test]
fn test_parse_as_honours_detected_kind() {
    let diagram = parse_as(DiagramKind::StateV2, "stateDiagram-v2\nA --> B", 3).unwrap();

    assert_eq!(diagram.kind(), DiagramKind::StateV2);
    assert_eq!(diagram.position(), Position::new(4, 1));
}

#[test]
fn test_header_errors() {
    assert_eq!(expect_error("").code(), ErrorCode::E001);
    assert_eq!(expect_error("sankey\nA,B,1").code(), ErrorCode::E002);
    assert_eq!(expect_error("classDiagram LR").code(), ErrorCode::E003);
    assert_eq!(expect_error("").kind(), ParseErrorKind::Header);
}

#[test]
fn test_errors_carry_offset_line() {
    let err = parse_with_offset("pie\n\"A\": 1\n\n\"B\" 2", 10).unwrap_err();

    assert_eq!(err.code(), ErrorCode::E100);
    assert_eq!(err.position(), Position::new(14, 1));
    assert_eq!(err.kind(), ParseErrorKind::Syntax);
}

#[test]
fn test_c4_nesting_depth_two() {
    let source = r#"C4Context
title System Landscape
Enterprise_Boundary(b0, "Org") {
  Person(customer, "Customer")
  System_Boundary(b1, "Banking") {
    System(core, "Core Banking", "Ledger")
  }
}
Rel(customer, core, "Uses")"#;

    let diagram = match parse(source).unwrap() {
        Diagram::C4(diagram) => diagram,
        other => panic!("expected C4, got {other:?}"),
    };

    assert_eq!(diagram.title.as_deref(), Some("System Landscape"));
    assert_eq!(diagram.depth(), 2);
    assert!(diagram.elements.is_empty());

    let outer = &diagram.boundaries[0];
    assert_eq!(outer.id, "b0");
    assert_eq!(outer.elements[0].id, "customer");

    let inner = &outer.boundaries[0];
    assert_eq!(inner.id, "b1");
    assert_eq!(inner.elements.len(), 1);
    assert_eq!(inner.elements[0].kind, C4ElementKind::System);
    assert_eq!(inner.elements[0].description.as_deref(), Some("Ledger"));
    assert_eq!(inner.elements[0].position, Position::new(6, 5));

    assert_eq!(diagram.relationships.len(), 1);
    assert!(validate_diagram(&Diagram::C4(diagram)).is_empty());
}

#[test]
fn test_c4_unclosed_boundary_names_it() {
    let err = expect_error("C4Context\nBoundary(b1,\"B\"){\n  Person(p, \"P\")");

    assert_eq!(err.kind(), ParseErrorKind::Structural);
    assert_eq!(err.code(), ErrorCode::E200);
    assert!(err.message().contains("b1"), "{}", err.message());
    assert_eq!(err.position(), Position::new(2, 1));
}

#[test]
fn test_pie_values_must_be_positive() {
    for value in ["0", "-1", "-0.5"] {
        let err = expect_error(&format!("pie\n\"A\": {value}"));
        assert_eq!(err.code(), ErrorCode::E101, "value {value}");
    }

    match parse("pie\n\"A\": 0.01").unwrap() {
        Diagram::Pie(pie) => assert_eq!(pie.slices[0].value, 0.01),
        other => panic!("expected pie, got {other:?}"),
    }
}

#[test]
fn test_sankey_values_must_be_positive() {
    for value in ["0", "-2"] {
        let err = expect_error(&format!("sankey-beta\nA,B,{value}"));
        assert_eq!(err.code(), ErrorCode::E101, "value {value}");
    }

    match parse("sankey-beta\n\"Solar, rooftop\",Grid,0.01").unwrap() {
        Diagram::Sankey(sankey) => {
            assert_eq!(sankey.links[0].source, "Solar, rooftop");
            assert_eq!(sankey.links[0].value, 0.01);
        }
        other => panic!("expected sankey, got {other:?}"),
    }
}

#[test]
fn test_sankey_self_loop_rejected() {
    let err = expect_error("sankey-beta\nA,A,5");

    assert_eq!(err.code(), ErrorCode::E103);
    assert_eq!(err.position(), Position::new(2, 1));
}

#[test]
fn test_header_only_charts_rejected() {
    for source in ["pie", "sankey-beta", "xychart-beta"] {
        let err = expect_error(source);
        assert_eq!(err.code(), ErrorCode::E204, "{source}");
    }
}

#[test]
fn test_class_relationship_classification() {
    let cases = [
        ("A <|-- B", RelationKind::Inheritance),
        ("A ..|> B", RelationKind::Realization),
        ("A --* B", RelationKind::Composition),
        ("A --o B", RelationKind::Aggregation),
        ("A ..> B", RelationKind::Dependency),
        ("A --> B", RelationKind::Association),
    ];

    for (line, expected) in cases {
        let diagram = match parse(&format!("classDiagram\n{line}")).unwrap() {
            Diagram::Class(diagram) => diagram,
            other => panic!("expected class diagram, got {other:?}"),
        };
        let relationship = &diagram.relationships[0];
        assert_eq!(relationship.kind, expected, "{line}");
        assert_eq!((relationship.from.as_str(), relationship.to.as_str()), ("A", "B"));
    }
}

#[test]
fn test_gantt_end_to_end() {
    let diagram = match parse("gantt\nsection Work\nTask : t1, 2024-01-01, 5d").unwrap() {
        Diagram::Gantt(diagram) => diagram,
        other => panic!("expected gantt, got {other:?}"),
    };

    assert_eq!(diagram.sections.len(), 1);
    let section = &diagram.sections[0];
    assert_eq!(section.name, "Work");
    assert_eq!(section.tasks.len(), 1);

    let task = &section.tasks[0];
    assert_eq!(task.name, "Task");
    assert_eq!(task.id.as_deref(), Some("t1"));
    assert_eq!(task.start_date.as_deref(), Some("2024-01-01"));
    assert_eq!(task.end_date.as_deref(), Some("5d"));
}

#[test]
fn test_gantt_task_outside_section() {
    let err = expect_error("gantt\nTask : t1, 2024-01-01, 5d");

    assert_eq!(err.kind(), ParseErrorKind::Structural);
    assert_eq!(err.code(), ErrorCode::E202);
}

#[test]
fn test_unclassified_lines_fail_everywhere() {
    let cases = [
        "flowchart TB\nA --> B\nthis is not valid",
        "classDiagram\n???",
        "timeline\njust words",
        "C4Context\nWidget(a)",
    ];

    for source in cases {
        let err = expect_error(source);
        assert_eq!(err.kind(), ParseErrorKind::Syntax, "{source}");
        assert_eq!(err.code(), ErrorCode::E100, "{source}");
    }
}

mod proptest_tests {
    use super::*;

    fn sample_strategy() -> impl Strategy<Value = DiagramKind> {
        prop::sample::select(DiagramKind::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn parsing_is_idempotent(kind in sample_strategy(), offset in 0usize..500) {
            let source = minimal(kind);

            let first = parse_with_offset(source, offset).unwrap();
            let second = parse_with_offset(source, offset).unwrap();

            prop_assert_eq!(&first, &second);
            prop_assert_eq!(first.position(), Position::new(offset + 1, 1));
        }

        #[test]
        fn blank_and_comment_prefix_shifts_header(blank in 0usize..10, comments in 0usize..5) {
            let prefix = "\n".repeat(blank) + &"%% note\n".repeat(comments);
            let source = format!("{prefix}{}", minimal(DiagramKind::Sequence));

            let diagram = parse(&source).unwrap();
            prop_assert_eq!(diagram.position().line(), blank + comments + 1);
        }
    }
}
