//! Built-in rule tables, one per diagram kind.

mod c4;
mod chart;
mod class;
mod er;
mod flowchart;
mod gitgraph;
mod mindmap;
mod schedule;
mod sequence;
mod state;

use merval_core::ast::{Diagram, DiagramKind};

use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode},
    validate::FnRule,
};

const GENERIC_RULES: [FnRule; 1] = [FnRule::new("unknown-diagram-kind", unknown_kind)];

fn unknown_kind(diagram: &Diagram, out: &mut DiagnosticCollector) {
    let Diagram::Generic(generic) = diagram else {
        return;
    };
    let header = generic
        .lines
        .iter()
        .map(|line| line.trim())
        .find(|line| !line.is_empty() && !line.starts_with("%%"))
        .unwrap_or_default();
    out.emit(
        Diagnostic::warning(format!("unrecognised diagram kind `{header}`"))
            .with_code(ErrorCode::E304)
            .with_label(generic.header.position, "no parser for this header")
            .with_help("the diagram was captured without structural checks"),
    );
}

/// Every rule table, in a stable order.
const TABLES: [&[FnRule]; 16] = [
    &flowchart::RULES,
    &sequence::RULES,
    &class::RULES,
    &state::RULES,
    &er::RULES,
    &chart::PIE_RULES,
    &chart::SANKEY_RULES,
    &chart::XYCHART_RULES,
    &chart::QUADRANT_RULES,
    &schedule::GANTT_RULES,
    &schedule::JOURNEY_RULES,
    &schedule::TIMELINE_RULES,
    &gitgraph::RULES,
    &mindmap::RULES,
    &c4::RULES,
    &GENERIC_RULES,
];

pub(super) fn for_kind(kind: DiagramKind) -> &'static [FnRule] {
    match kind {
        DiagramKind::Flowchart | DiagramKind::Graph => &flowchart::RULES,
        DiagramKind::Sequence => &sequence::RULES,
        DiagramKind::Class => &class::RULES,
        DiagramKind::State | DiagramKind::StateV2 => &state::RULES,
        DiagramKind::Er => &er::RULES,
        DiagramKind::Pie => &chart::PIE_RULES,
        DiagramKind::Sankey => &chart::SANKEY_RULES,
        DiagramKind::XyChart => &chart::XYCHART_RULES,
        DiagramKind::Quadrant => &chart::QUADRANT_RULES,
        DiagramKind::Gantt => &schedule::GANTT_RULES,
        DiagramKind::Journey => &schedule::JOURNEY_RULES,
        DiagramKind::Timeline => &schedule::TIMELINE_RULES,
        DiagramKind::GitGraph => &gitgraph::RULES,
        DiagramKind::Mindmap => &mindmap::RULES,
        DiagramKind::C4Context
        | DiagramKind::C4Container
        | DiagramKind::C4Component
        | DiagramKind::C4Dynamic
        | DiagramKind::C4Deployment => &c4::RULES,
        DiagramKind::Unknown => &GENERIC_RULES,
    }
}

pub(super) fn all() -> impl Iterator<Item = &'static FnRule> {
    TABLES.into_iter().flatten()
}
