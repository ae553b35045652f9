use merval_core::position::Position;
use merval_parser::{
    error::{ErrorCode, Severity},
    parse,
    validate::{DuplicateChecker, ReferenceChecker, RuleSet, rule_names},
    validate_diagram,
};

#[test]
fn test_duplicate_state_reported_once_at_second_definition() {
    let source = "stateDiagram-v2\n[*] --> foo\nstate foo\nfoo --> bar\nbar --> [*]\n%% again\nstate foo";
    let diagram = parse(source).unwrap();

    let diagnostics = validate_diagram(&diagram);

    assert_eq!(diagnostics.len(), 1, "{diagnostics:?}");
    let diagnostic = &diagnostics[0];
    assert_eq!(diagnostic.code(), Some(ErrorCode::E300));
    assert_eq!(diagnostic.severity(), Severity::Error);
    assert_eq!(diagnostic.position(), Position::new(7, 1));
    assert_eq!(diagnostic.labels()[1].position(), Position::new(3, 1));
    assert!(diagnostic.message().contains("foo"));
}

#[test]
fn test_duplicate_checker_public_api() {
    let mut checker = DuplicateChecker::new("state");

    assert!(checker.check("foo", Position::new(3, 1)).is_none());
    assert!(checker.check("bar", Position::new(5, 1)).is_none());
    let duplicate = checker.check("foo", Position::new(7, 1)).unwrap();

    assert_eq!(duplicate.position(), Position::new(7, 1));
    assert_eq!(checker.names().collect::<Vec<_>>(), ["foo", "bar"]);
}

#[test]
fn test_reference_checker_public_api() {
    let mut known = ReferenceChecker::new("participant");
    known.register("A", Position::new(2, 1));
    known.register("B", Position::new(3, 1));

    assert!(known.check("A", Position::new(4, 1), "message").is_none());
    assert!(known.check("B", Position::new(4, 1), "message").is_none());

    let missing = known.check("C", Position::new(5, 1), "message").unwrap();
    assert_eq!(missing.code(), Some(ErrorCode::E301));
    assert_eq!(missing.message(), "message references undefined participant `C`");
}

#[test]
fn test_clean_diagrams_have_no_diagnostics() {
    let sources = [
        "flowchart LR\nsubgraph one\n  A --> B\nend\nclassDef hot fill:#f00\nclass A hot",
        "sequenceDiagram\nparticipant A\nparticipant B\nA->>+B: ping\nB-->>-A: pong",
        "classDiagram\nclass Animal {\n  +String name\n  +eat() void\n}\nclass Dog\nAnimal <|-- Dog",
        "erDiagram\nCUSTOMER ||--o{ ORDER : places\nCUSTOMER {\n  string id PK\n}",
        "gantt\nsection Build\nDesign : d1, 2024-01-01, 3d\nBuild : after d1, 5d",
        "gitGraph\ncommit id: \"a\"\nbranch dev\ncheckout dev\ncommit\ncheckout main\nmerge dev",
        "journey\nsection Morning\nWake: 3: Me",
    ];

    for source in sources {
        let diagram = parse(source).unwrap_or_else(|err| panic!("{source}: {err}"));
        let diagnostics = validate_diagram(&diagram);
        assert!(diagnostics.is_empty(), "{source}: {diagnostics:?}");
    }
}

#[test]
fn test_gitgraph_reference_errors() {
    let diagram = parse("gitGraph\ncommit\ncheckout feature\nmerge feature").unwrap();

    let diagnostics = validate_diagram(&diagram);

    assert_eq!(diagnostics.len(), 2, "{diagnostics:?}");
    assert!(diagnostics.iter().all(|d| d.code() == Some(ErrorCode::E301)));
    assert_eq!(diagnostics[0].position().line(), 3);
    assert_eq!(diagnostics[1].position().line(), 4);
}

#[test]
fn test_journey_score_out_of_range() {
    let diagram = parse("journey\nsection Day\nCommute: 7: Me").unwrap();

    let diagnostics = validate_diagram(&diagram);

    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code(), Some(ErrorCode::E303));
}

#[test]
fn test_rule_set_can_disable_rules() {
    let diagram = parse("pie\n\"A\": 1\n\"A\": 2").unwrap();

    assert_eq!(RuleSet::for_kind(diagram.kind()).validate(&diagram).len(), 1);

    let relaxed = RuleSet::for_kind(diagram.kind()).without(&["pie-duplicate-label"]);
    assert!(relaxed.validate(&diagram).is_empty());
}

#[test]
fn test_rule_names_are_kebab_case() {
    for name in rule_names() {
        assert!(
            name.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'),
            "{name}"
        );
    }
}

#[test]
fn test_unknown_kind_is_only_a_warning() {
    let diagram = parse("block-beta\ncolumns 3").unwrap();

    let diagnostics = validate_diagram(&diagram);

    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code(), Some(ErrorCode::E304));
    assert_eq!(diagnostics[0].severity(), Severity::Warning);
}
