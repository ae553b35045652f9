use merval_core::{
    ast::{
        C4Diagram, Diagram,
        c4::{C4Boundary, C4Element},
    },
    position::Position,
};

use crate::{
    error::DiagnosticCollector,
    validate::{DuplicateChecker, FnRule, ReferenceChecker},
};

pub(in crate::validate) const RULES: [FnRule; 3] = [
    FnRule::new("c4-duplicate-id", duplicate_ids),
    FnRule::new("c4-relationship-reference", relationship_references),
    FnRule::new("c4-style-reference", style_references),
];

fn c4_diagram(diagram: &Diagram) -> Option<&C4Diagram> {
    match diagram {
        Diagram::C4(c4) => Some(c4),
        _ => None,
    }
}

/// Every element and boundary id in the tree, in source order.
fn identifiers(c4: &C4Diagram) -> Vec<(&str, Position)> {
    fn walk<'a>(
        elements: &'a [C4Element],
        boundaries: &'a [C4Boundary],
        out: &mut Vec<(&'a str, Position)>,
    ) {
        out.extend(elements.iter().map(|element| (element.id.as_str(), element.position)));
        for boundary in boundaries {
            out.push((boundary.id.as_str(), boundary.position));
            walk(&boundary.elements, &boundary.boundaries, out);
        }
    }

    let mut ids = Vec::new();
    walk(&c4.elements, &c4.boundaries, &mut ids);
    ids.sort_by_key(|&(_, position)| position);
    ids
}

fn known_ids(c4: &C4Diagram) -> ReferenceChecker {
    let mut known = ReferenceChecker::new("element");
    for (id, position) in identifiers(c4) {
        known.register(id, position);
    }
    known
}

fn duplicate_ids(diagram: &Diagram, out: &mut DiagnosticCollector) {
    let Some(c4) = c4_diagram(diagram) else {
        return;
    };
    let mut checker = DuplicateChecker::new("element");
    for (id, position) in identifiers(c4) {
        out.extend(checker.check(id, position));
    }
}

fn relationship_references(diagram: &Diagram, out: &mut DiagnosticCollector) {
    let Some(c4) = c4_diagram(diagram) else {
        return;
    };
    let known = known_ids(c4);
    for relationship in &c4.relationships {
        out.extend(known.check(&relationship.from, relationship.position, "relationship"));
        out.extend(known.check(&relationship.to, relationship.position, "relationship"));
    }
}

fn style_references(diagram: &Diagram, out: &mut DiagnosticCollector) {
    let Some(c4) = c4_diagram(diagram) else {
        return;
    };
    let known = known_ids(c4);
    for style in &c4.styles {
        let context = format!("`{}`", style.kind.as_str());
        for target in &style.targets {
            out.extend(known.check(target, style.position, &context));
        }
    }
}
