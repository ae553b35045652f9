use std::ops::RangeInclusive;

use merval_core::ast::Diagram;

use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode},
    validate::{DuplicateChecker, FnRule, ReferenceChecker},
};

pub(in crate::validate) const GANTT_RULES: [FnRule; 2] = [
    FnRule::new("gantt-duplicate-task-id", duplicate_task_ids),
    FnRule::new("gantt-dependency", dependencies),
];

pub(in crate::validate) const JOURNEY_RULES: [FnRule; 1] =
    [FnRule::new("journey-score-range", score_range)];

pub(in crate::validate) const TIMELINE_RULES: [FnRule; 1] =
    [FnRule::new("timeline-duplicate-section", duplicate_sections)];

const SCORES: RangeInclusive<i64> = 1..=5;

fn duplicate_task_ids(diagram: &Diagram, out: &mut DiagnosticCollector) {
    let Diagram::Gantt(gantt) = diagram else {
        return;
    };
    let mut checker = DuplicateChecker::new("task id");
    for task in gantt.tasks() {
        if let Some(id) = &task.id {
            out.extend(checker.check(id, task.position));
        }
    }
}

/// `after` may name any task in the chart, earlier or later.
fn dependencies(diagram: &Diagram, out: &mut DiagnosticCollector) {
    let Diagram::Gantt(gantt) = diagram else {
        return;
    };
    let mut ids = ReferenceChecker::new("task id");
    for task in gantt.tasks() {
        if let Some(id) = &task.id {
            ids.register(id, task.position);
        }
    }
    for task in gantt.tasks() {
        for dependency in &task.dependencies {
            out.extend(ids.check(dependency, task.position, &format!("task `{}`", task.name)));
        }
    }
}

fn score_range(diagram: &Diagram, out: &mut DiagnosticCollector) {
    let Diagram::Journey(journey) = diagram else {
        return;
    };
    let tasks = journey.sections.iter().flat_map(|section| &section.tasks);
    for task in tasks.filter(|task| !SCORES.contains(&task.score)) {
        out.emit(
            Diagnostic::error(format!(
                "task `{}` has score {}, expected {} to {}",
                task.name,
                task.score,
                SCORES.start(),
                SCORES.end()
            ))
            .with_code(ErrorCode::E303)
            .with_label(task.position, "score out of range"),
        );
    }
}

fn duplicate_sections(diagram: &Diagram, out: &mut DiagnosticCollector) {
    let Diagram::Timeline(timeline) = diagram else {
        return;
    };
    let mut checker = DuplicateChecker::new("section");
    for section in &timeline.sections {
        out.extend(checker.check(&section.name, section.position));
    }
}

#[cfg(test)]
mod tests {
    use merval_core::position::Position;

    use crate::{dispatch::parse, error::ErrorCode, validate::validate_diagram};

    #[test]
    fn test_gantt_ids_and_dependencies() {
        let diagram = parse(
            "gantt\ndateFormat YYYY-MM-DD\nsection Build\nDesign : des1, 2024-01-01, 3d\nCode : des1, after des1, 5d\nTest : after qa1, 2d",
        )
        .unwrap();

        let diagnostics = validate_diagram(&diagram);
        let codes: Vec<_> = diagnostics.iter().filter_map(|d| d.code()).collect();

        assert_eq!(codes, [ErrorCode::E300, ErrorCode::E301]);
        assert_eq!(diagnostics[0].position(), Position::new(5, 1));
        assert_eq!(
            diagnostics[1].message(),
            "task `Test` references undefined task id `qa1`"
        );
    }

    #[test]
    fn test_journey_scores() {
        let diagram = parse(
            "journey\nsection Morning\nWake up: 0: Me\nCoffee: 5: Me\nCommute: 9: Me",
        )
        .unwrap();

        let lines: Vec<_> = validate_diagram(&diagram)
            .iter()
            .map(|d| d.position().line())
            .collect();

        assert_eq!(lines, [3, 5]);
    }

    #[test]
    fn test_timeline_duplicate_section() {
        let diagram =
            parse("timeline\nsection 2020s\n2021 : a\nsection 2010s\n2015 : b\nsection 2020s")
                .unwrap();

        let diagnostics = validate_diagram(&diagram);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].position().line(), 6);
    }
}
