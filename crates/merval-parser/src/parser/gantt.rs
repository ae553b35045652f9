//! `gantt` parser.
//!
//! A task line is `Name : details` where `details` is a comma separated list:
//! leading status keywords, then one to three positional fields.
//!
//! | fields | meaning            |
//! |--------|--------------------|
//! | 1      | end                |
//! | 2      | start, end         |
//! | 3      | id, start, end     |
//!
//! A start written as `after a b` records dependencies instead of a date.

use merval_core::ast::{
    Diagram, DiagramKind, GanttDiagram,
    schedule::{GanttSection, GanttSetting, GanttTask, TaskStatus},
};

use crate::{
    error::{ErrorCode, Result},
    lexer::{Source, SourceLine, non_empty, split_label, strip_keyword, strip_keyword_colon},
    parser::{DiagramParser, Rule, diagram_header, expect_bare_header, run_cascade},
};

/// Metadata keys that take a value.
const SETTINGS: [&str; 7] = [
    "dateFormat",
    "axisFormat",
    "excludes",
    "includes",
    "todayMarker",
    "tickInterval",
    "weekday",
];

/// Metadata keys written alone.
const FLAGS: [&str; 2] = ["inclusiveEndDates", "topAxis"];

const RULES: &[Rule<GanttState>] = &[
    Rule {
        name: "title",
        handler: GanttState::title,
    },
    Rule {
        name: "setting",
        handler: GanttState::setting,
    },
    Rule {
        name: "flag",
        handler: GanttState::flag,
    },
    Rule {
        name: "section",
        handler: GanttState::section,
    },
    Rule {
        name: "task",
        handler: GanttState::task,
    },
];

#[derive(Debug, Default)]
struct GanttState {
    title: Option<String>,
    settings: Vec<GanttSetting>,
    sections: Vec<GanttSection>,
}

impl GanttState {
    fn record(&mut self, line: &SourceLine<'_>, key: &str, value: &str) -> Result<()> {
        if let Some(previous) = self.settings.iter().find(|setting| setting.key == key) {
            return Err(line.structural_error(
                ErrorCode::E203,
                format!("`{key}` is already set on line {}", previous.position.line()),
            ));
        }
        self.settings.push(GanttSetting {
            key: key.to_string(),
            value: value.to_string(),
            position: line.position(),
        });
        Ok(())
    }

    fn title(&mut self, line: &SourceLine<'_>) -> Result<bool> {
        let Some(rest) = strip_keyword_colon(line.text, "title") else {
            return Ok(false);
        };
        self.title = non_empty(rest);
        Ok(true)
    }

    fn setting(&mut self, line: &SourceLine<'_>) -> Result<bool> {
        let Some((key, value)) = SETTINGS
            .iter()
            .find_map(|key| strip_keyword(line.text, key).map(|value| (*key, value)))
        else {
            return Ok(false);
        };
        if value.is_empty() {
            return Err(line.syntax_error(ErrorCode::E101, format!("`{key}` needs a value")));
        }
        self.record(line, key, value)?;
        Ok(true)
    }

    fn flag(&mut self, line: &SourceLine<'_>) -> Result<bool> {
        let Some(key) = FLAGS.iter().find(|key| line.text == **key) else {
            return Ok(false);
        };
        self.record(line, key, "")?;
        Ok(true)
    }

    fn section(&mut self, line: &SourceLine<'_>) -> Result<bool> {
        let Some(rest) = strip_keyword(line.text, "section") else {
            return Ok(false);
        };
        let name = non_empty(rest)
            .ok_or_else(|| line.syntax_error(ErrorCode::E100, "`section` needs a name"))?;
        self.sections.push(GanttSection {
            name,
            tasks: Vec::new(),
            position: line.position(),
        });
        Ok(true)
    }

    fn task(&mut self, line: &SourceLine<'_>) -> Result<bool> {
        let (name, Some(details)) = split_label(line.text) else {
            return Ok(false);
        };
        let Some(name) = non_empty(name) else {
            return Ok(false);
        };
        let task = parse_task(line, name, details)?;

        let Some(section) = self.sections.last_mut() else {
            return Err(line.structural_error(
                ErrorCode::E202,
                format!("task `{}` outside of any section", task.name),
            ));
        };
        section.tasks.push(task);
        Ok(true)
    }
}

fn parse_task(line: &SourceLine<'_>, name: String, details: &str) -> Result<GanttTask> {
    let fields: Vec<&str> = details.split(',').map(str::trim).collect();
    let mut statuses = Vec::new();
    let mut rest = fields.as_slice();
    while let Some((first, tail)) = rest.split_first()
        && let Ok(status) = first.parse::<TaskStatus>()
    {
        statuses.push(status);
        rest = tail;
    }

    let (id, start, end) = match rest {
        [end] => (None, None, *end),
        [start, end] => (None, Some(*start), *end),
        [id, start, end] => (non_empty(id), Some(*start), *end),
        _ => {
            return Err(line.syntax_error(
                ErrorCode::E101,
                format!(
                    "task `{name}` needs `[id,] start, end` after its statuses, found {} fields",
                    rest.len()
                ),
            ));
        }
    };

    // A lone `after x` field is a start, not an end.
    let (start, end) = match (start, strip_keyword(end, "after")) {
        (None, Some(_)) => (Some(end), None),
        (start, _) => (start, non_empty(end)),
    };
    let (start_date, dependencies) = match start.map(|start| (start, strip_keyword(start, "after"))) {
        Some((_, Some(targets))) => (
            None,
            targets.split_whitespace().map(str::to_string).collect(),
        ),
        Some((start, None)) => (non_empty(start), Vec::new()),
        None => (None, Vec::new()),
    };

    Ok(GanttTask {
        name,
        id,
        statuses,
        start_date,
        end_date: end,
        dependencies,
        position: line.position(),
    })
}

/// Parser for `gantt` charts.
pub struct GanttParser;

impl DiagramParser for GanttParser {
    fn supported_types(&self) -> &'static [DiagramKind] {
        &[DiagramKind::Gantt]
    }

    fn parse(&self, source: &Source<'_>) -> Result<Diagram> {
        let header = expect_bare_header(source, "gantt")?;

        let mut state = GanttState::default();
        for line in source.body() {
            run_cascade(&mut state, RULES, line)?;
        }

        Ok(Diagram::Gantt(GanttDiagram {
            header: diagram_header(DiagramKind::Gantt, source, &header),
            title: state.title,
            settings: state.settings,
            sections: state.sections,
        }))
    }
}
