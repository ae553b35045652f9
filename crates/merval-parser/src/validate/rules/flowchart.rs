use merval_core::ast::{
    Diagram,
    flowchart::{FlowDirectiveKind, FlowchartDiagram},
};

use crate::{
    error::DiagnosticCollector,
    validate::{DuplicateChecker, FnRule, ReferenceChecker},
};

pub(in crate::validate) const RULES: [FnRule; 3] = [
    FnRule::new("flowchart-duplicate-subgraph", duplicate_subgraphs),
    FnRule::new("flowchart-duplicate-class-def", duplicate_class_defs),
    FnRule::new("flowchart-directive-target", directive_targets),
];

fn flowchart(diagram: &Diagram) -> Option<&FlowchartDiagram> {
    match diagram {
        Diagram::Flowchart(flowchart) => Some(flowchart),
        _ => None,
    }
}

fn duplicate_subgraphs(diagram: &Diagram, out: &mut DiagnosticCollector) {
    let Some(flowchart) = flowchart(diagram) else {
        return;
    };
    let mut checker = DuplicateChecker::new("subgraph");
    for subgraph in &flowchart.subgraphs {
        out.extend(checker.check(&subgraph.id, subgraph.position));
    }
}

fn duplicate_class_defs(diagram: &Diagram, out: &mut DiagnosticCollector) {
    let Some(flowchart) = flowchart(diagram) else {
        return;
    };
    let mut checker = DuplicateChecker::new("classDef");
    for directive in &flowchart.directives {
        if directive.kind == FlowDirectiveKind::ClassDef {
            for name in &directive.targets {
                out.extend(checker.check(name, directive.position));
            }
        }
    }
}

/// `class`, `style` and `click` must name a node or subgraph.
fn directive_targets(diagram: &Diagram, out: &mut DiagnosticCollector) {
    let Some(flowchart) = flowchart(diagram) else {
        return;
    };
    let mut known = ReferenceChecker::new("node");
    for node in &flowchart.nodes {
        known.register(&node.id, node.position);
    }
    for subgraph in &flowchart.subgraphs {
        known.register(&subgraph.id, subgraph.position);
    }

    for directive in &flowchart.directives {
        let context = match directive.kind {
            FlowDirectiveKind::Class => "`class`",
            FlowDirectiveKind::Style => "`style`",
            FlowDirectiveKind::Click => "`click`",
            FlowDirectiveKind::ClassDef | FlowDirectiveKind::LinkStyle => continue,
        };
        for target in &directive.targets {
            out.extend(known.check(target, directive.position, context));
        }
    }
}
