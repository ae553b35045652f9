use merval_core::ast::{Diagram, chart::AxisRange};

use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode},
    validate::{DuplicateChecker, FnRule},
};

pub(in crate::validate) const PIE_RULES: [FnRule; 1] =
    [FnRule::new("pie-duplicate-label", duplicate_slices)];

pub(in crate::validate) const SANKEY_RULES: [FnRule; 1] =
    [FnRule::new("sankey-duplicate-link", duplicate_links)];

pub(in crate::validate) const XYCHART_RULES: [FnRule; 1] =
    [FnRule::new("xychart-series-length", series_lengths)];

pub(in crate::validate) const QUADRANT_RULES: [FnRule; 2] = [
    FnRule::new("quadrant-point-range", point_ranges),
    FnRule::new("quadrant-duplicate-point", duplicate_points),
];

fn duplicate_slices(diagram: &Diagram, out: &mut DiagnosticCollector) {
    let Diagram::Pie(pie) = diagram else {
        return;
    };
    let mut checker = DuplicateChecker::new("slice");
    for slice in &pie.slices {
        out.extend(checker.check(&slice.label, slice.position));
    }
}

fn duplicate_links(diagram: &Diagram, out: &mut DiagnosticCollector) {
    let Diagram::Sankey(sankey) = diagram else {
        return;
    };
    let mut checker = DuplicateChecker::new("link");
    for link in &sankey.links {
        let key = format!("{} -> {}", link.source, link.target);
        out.extend(checker.check(&key, link.position));
    }
}

/// Every series must give one value per category of the category axis.
fn series_lengths(diagram: &Diagram, out: &mut DiagnosticCollector) {
    let Diagram::XyChart(chart) = diagram else {
        return;
    };
    let axis = &chart.x_axis;
    let AxisRange::Categorical(categories) = &axis.range else {
        return;
    };

    for series in &chart.series {
        if series.values.len() == categories.len() {
            continue;
        }
        let name = series
            .name
            .as_deref()
            .map_or_else(String::new, |name| format!(" `{name}`"));
        out.emit(
            Diagnostic::error(format!(
                "series{name} has {} values but the x-axis has {} categories",
                series.values.len(),
                categories.len()
            ))
            .with_code(ErrorCode::E303)
            .with_label(series.position, "length mismatch")
            .with_secondary_label(axis.position, "categories declared here"),
        );
    }
}

fn point_ranges(diagram: &Diagram, out: &mut DiagnosticCollector) {
    let Diagram::Quadrant(quadrant) = diagram else {
        return;
    };
    for point in &quadrant.points {
        for (axis, value) in [("x", point.x), ("y", point.y)] {
            if !(0.0..=1.0).contains(&value) {
                out.emit(
                    Diagnostic::error(format!(
                        "point `{}` has {axis} = {value}, outside [0, 1]",
                        point.name
                    ))
                    .with_code(ErrorCode::E303)
                    .with_label(point.position, "coordinate out of range")
                    .with_help("quadrant coordinates are fractions of the chart"),
                );
            }
        }
    }
}

fn duplicate_points(diagram: &Diagram, out: &mut DiagnosticCollector) {
    let Diagram::Quadrant(quadrant) = diagram else {
        return;
    };
    let mut checker = DuplicateChecker::new("point");
    for point in &quadrant.points {
        out.extend(checker.check(&point.name, point.position));
    }
}
