use merval_core::ast::Diagram;

use crate::{
    error::DiagnosticCollector,
    validate::{DuplicateChecker, FnRule},
};

pub(in crate::validate) const RULES: [FnRule; 1] =
    [FnRule::new("mindmap-duplicate-id", duplicate_ids)];

fn duplicate_ids(diagram: &Diagram, out: &mut DiagnosticCollector) {
    let Diagram::Mindmap(mindmap) = diagram else {
        return;
    };
    let mut checker = DuplicateChecker::new("node id");
    for node in mindmap.nodes() {
        if let Some(id) = &node.id {
            out.extend(checker.check(id, node.position));
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{dispatch::parse, error::ErrorCode, validate::validate_diagram};

    #[test]
    fn test_duplicate_explicit_ids() {
        let diagram = parse(
            "mindmap\n  root((Plan))\n    a[Design]\n      a(Sketch)\n    Plain\n    Plain",
        )
        .unwrap();

        let diagnostics = validate_diagram(&diagram);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code(), Some(ErrorCode::E300));
        assert_eq!(diagnostics[0].position().line(), 4);
    }
}
