use merval_core::ast::{Diagram, ErDiagram, er::ATTRIBUTE_KEYS};

use crate::{
    error::DiagnosticCollector,
    validate::{DuplicateChecker, EnumValidator, FnRule},
};

pub(in crate::validate) const RULES: [FnRule; 3] = [
    FnRule::new("er-duplicate-entity-body", duplicate_bodies),
    FnRule::new("er-duplicate-attribute", duplicate_attributes),
    FnRule::new("er-attribute-key", attribute_keys),
];

const KEYS: EnumValidator = EnumValidator::new("attribute key", &ATTRIBUTE_KEYS);

fn er_diagram(diagram: &Diagram) -> Option<&ErDiagram> {
    match diagram {
        Diagram::Er(er) => Some(er),
        _ => None,
    }
}

/// An entity may be mentioned many times but given a body only once.
fn duplicate_bodies(diagram: &Diagram, out: &mut DiagnosticCollector) {
    let Some(er) = er_diagram(diagram) else {
        return;
    };
    let mut checker = DuplicateChecker::new("entity");
    for entity in er.entities.iter().filter(|entity| entity.has_body) {
        out.extend(checker.check(&entity.name, entity.position));
    }
}

fn duplicate_attributes(diagram: &Diagram, out: &mut DiagnosticCollector) {
    let Some(er) = er_diagram(diagram) else {
        return;
    };
    let mut checker = DuplicateChecker::new("attribute");
    for entity in &er.entities {
        for attribute in &entity.attributes {
            let key = format!("{}.{}", entity.name, attribute.name);
            out.extend(checker.check(&key, attribute.position));
        }
    }
}

fn attribute_keys(diagram: &Diagram, out: &mut DiagnosticCollector) {
    let Some(er) = er_diagram(diagram) else {
        return;
    };
    for attribute in er.entities.iter().flat_map(|entity| &entity.attributes) {
        for key in &attribute.keys {
            out.extend(KEYS.check(key, attribute.position));
        }
    }
}
