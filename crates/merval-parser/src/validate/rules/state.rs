use merval_core::ast::{
    Diagram, StateDiagram,
    state::TERMINAL_STATE,
};

use crate::{
    error::DiagnosticCollector,
    validate::{DuplicateChecker, FnRule, ReferenceChecker},
};

pub(in crate::validate) const RULES: [FnRule; 2] = [
    FnRule::new("state-duplicate-state", duplicate_states),
    FnRule::new("state-note-target", note_targets),
];

fn state_diagram(diagram: &Diagram) -> Option<&StateDiagram> {
    match diagram {
        Diagram::State(state) => Some(state),
        _ => None,
    }
}

fn duplicate_states(diagram: &Diagram, out: &mut DiagnosticCollector) {
    let Some(state) = state_diagram(diagram) else {
        return;
    };
    let mut checker = DuplicateChecker::new("state");
    for declaration in &state.states {
        out.extend(checker.check(&declaration.id, declaration.position));
    }
}

fn note_targets(diagram: &Diagram, out: &mut DiagnosticCollector) {
    let Some(state) = state_diagram(diagram) else {
        return;
    };
    let mut known = ReferenceChecker::new("state");
    for declaration in &state.states {
        known.register(&declaration.id, declaration.position);
    }
    for transition in &state.transitions {
        for id in [&transition.from, &transition.to] {
            if id != TERMINAL_STATE {
                known.register(id, transition.position);
            }
        }
    }
    for description in &state.descriptions {
        known.register(&description.state, description.position);
    }

    for note in &state.notes {
        out.extend(known.check(&note.target, note.position, "note"));
    }
}

#[cfg(test)]
mod tests {
    use crate::{dispatch::parse, error::ErrorCode, validate::validate_diagram};

    #[test]
    fn test_clean_state_diagram() {
        let diagram = parse(
            "stateDiagram-v2\n[*] --> Idle\nIdle --> Busy : start\nnote right of Busy : working\nBusy --> [*]",
        )
        .unwrap();

        assert!(validate_diagram(&diagram).is_empty());
    }

    #[test]
    fn test_duplicate_declaration() {
        let diagram = parse("stateDiagram\nstate Idle\nstate \"Waiting\" as Idle").unwrap();

        let diagnostics = validate_diagram(&diagram);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code(), Some(ErrorCode::E300));
        assert_eq!(diagnostics[0].position().line(), 3);
    }

    #[test]
    fn test_note_on_unknown_state() {
        let diagram = parse("stateDiagram-v2\n[*] --> A\nnote left of B : who?").unwrap();

        let diagnostics = validate_diagram(&diagram);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code(), Some(ErrorCode::E301));
        assert_eq!(diagnostics[0].message(), "note references undefined state `B`");
    }
}
