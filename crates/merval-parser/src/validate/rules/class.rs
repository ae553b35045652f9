use merval_core::ast::{
    ClassDiagram, Diagram,
    class::{ClassMember, MemberKind},
};

use crate::{
    error::DiagnosticCollector,
    validate::{DuplicateChecker, FnRule, ReferenceChecker},
};

pub(in crate::validate) const RULES: [FnRule; 3] = [
    FnRule::new("class-duplicate-class", duplicate_classes),
    FnRule::new("class-duplicate-member", duplicate_members),
    FnRule::new("class-undefined-class", undefined_classes),
];

fn class_diagram(diagram: &Diagram) -> Option<&ClassDiagram> {
    match diagram {
        Diagram::Class(class) => Some(class),
        _ => None,
    }
}

fn duplicate_classes(diagram: &Diagram, out: &mut DiagnosticCollector) {
    let Some(class) = class_diagram(diagram) else {
        return;
    };
    let mut checker = DuplicateChecker::new("class");
    for definition in &class.classes {
        out.extend(checker.check(&definition.id, definition.position));
    }
}

/// Methods are keyed by their parameter list so overloads stay distinct.
fn signature(owner: &str, member: &ClassMember) -> String {
    match &member.kind {
        MemberKind::Field => format!("{owner}.{}", member.name),
        MemberKind::Method { parameters } => format!("{owner}.{}({parameters})", member.name),
    }
}

fn duplicate_members(diagram: &Diagram, out: &mut DiagnosticCollector) {
    let Some(class) = class_diagram(diagram) else {
        return;
    };
    let mut members: Vec<(&str, &ClassMember)> = class
        .classes
        .iter()
        .flat_map(|definition| {
            definition
                .members
                .iter()
                .map(|member| (definition.id.as_str(), member))
        })
        .chain(
            class
                .members
                .iter()
                .map(|owned| (owned.owner.as_str(), &owned.member)),
        )
        .collect();
    members.sort_by_key(|(_, member)| member.position);

    let mut checker = DuplicateChecker::new("member");
    for (owner, member) in members {
        out.extend(checker.check(&signature(owner, member), member.position));
    }
}

/// Relationships introduce classes implicitly until the diagram declares
/// one explicitly; notes, annotations and members may name either kind.
fn undefined_classes(diagram: &Diagram, out: &mut DiagnosticCollector) {
    let Some(class) = class_diagram(diagram) else {
        return;
    };
    let mut declared = ReferenceChecker::new("class");
    for definition in &class.classes {
        declared.register(&definition.id, definition.position);
    }

    if !declared.is_empty() {
        for relationship in &class.relationships {
            out.extend(declared.check(&relationship.from, relationship.position, "relationship"));
            out.extend(declared.check(&relationship.to, relationship.position, "relationship"));
        }
    }

    let mut known = declared;
    for relationship in &class.relationships {
        known.register(&relationship.from, relationship.position);
        known.register(&relationship.to, relationship.position);
    }
    for note in &class.notes {
        if let Some(target) = &note.target {
            out.extend(known.check(target, note.position, "note"));
        }
    }
    for annotation in &class.annotations {
        out.extend(known.check(&annotation.class, annotation.position, "annotation"));
    }
    for owned in &class.members {
        out.extend(known.check(&owned.owner, owned.member.position, "member"));
    }
}
