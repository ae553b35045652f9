use indexmap::IndexMap;
use merval_core::{
    ast::{Diagram, sequence::SequenceDiagram},
    position::Position,
};

use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode},
    validate::{DuplicateChecker, FnRule, ReferenceChecker},
};

pub(in crate::validate) const RULES: [FnRule; 3] = [
    FnRule::new("sequence-duplicate-participant", duplicate_participants),
    FnRule::new("sequence-undeclared-participant", undeclared_participants),
    FnRule::new("sequence-activation-pairing", activation_pairing),
];

fn sequence(diagram: &Diagram) -> Option<&SequenceDiagram> {
    match diagram {
        Diagram::Sequence(sequence) => Some(sequence),
        _ => None,
    }
}

fn duplicate_participants(diagram: &Diagram, out: &mut DiagnosticCollector) {
    let Some(sequence) = sequence(diagram) else {
        return;
    };
    let mut checker = DuplicateChecker::new("participant");
    for participant in &sequence.participants {
        out.extend(checker.check(&participant.id, participant.position));
    }
}

/// Participants may be implicit; once any is declared, all must be.
fn undeclared_participants(diagram: &Diagram, out: &mut DiagnosticCollector) {
    let Some(sequence) = sequence(diagram) else {
        return;
    };
    let mut declared = ReferenceChecker::new("participant");
    for participant in &sequence.participants {
        declared.register(&participant.id, participant.position);
    }
    if declared.is_empty() {
        return;
    }

    for message in &sequence.messages {
        out.extend(declared.check(&message.from, message.position, "message"));
        if message.to != message.from {
            out.extend(declared.check(&message.to, message.position, "message"));
        }
    }
    for note in &sequence.notes {
        for participant in &note.participants {
            out.extend(declared.check(participant, note.position, "note"));
        }
    }
    for activation in &sequence.activations {
        let context = if activation.active {
            "`activate`"
        } else {
            "`deactivate`"
        };
        out.extend(declared.check(&activation.participant, activation.position, context));
    }
}

/// Each deactivation closes the most recent open activation of the same
/// participant.
fn activation_pairing(diagram: &Diagram, out: &mut DiagnosticCollector) {
    let Some(sequence) = sequence(diagram) else {
        return;
    };
    let mut open: IndexMap<&str, Vec<Position>> = IndexMap::new();

    for activation in &sequence.activations {
        let stack = open.entry(activation.participant.as_str()).or_default();
        if activation.active {
            stack.push(activation.position);
        } else if stack.pop().is_none() {
            out.emit(
                Diagnostic::error(format!(
                    "`{}` is deactivated but not active",
                    activation.participant
                ))
                .with_code(ErrorCode::E303)
                .with_label(activation.position, "unpaired deactivate")
                .with_help("every deactivate must follow a matching activate"),
            );
        }
    }

    for (participant, stack) in open {
        if let Some(&position) = stack.last() {
            out.emit(
                Diagnostic::error(format!(
                    "`{participant}` was activated but never deactivated"
                ))
                .with_code(ErrorCode::E303)
                .with_label(position, "unpaired activate")
                .with_help("every activate must have a corresponding deactivate"),
            );
        }
    }
}
