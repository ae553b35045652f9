//! `journey` parser.

use merval_core::ast::{
    Diagram, DiagramKind, JourneyDiagram,
    schedule::{JourneySection, JourneyTask},
};

use crate::{
    error::{ErrorCode, Result},
    lexer::{Source, SourceLine, non_empty, strip_keyword, strip_keyword_colon},
    parser::{DiagramParser, Rule, diagram_header, expect_bare_header, run_cascade},
};

const RULES: &[Rule<JourneyState>] = &[
    Rule {
        name: "title",
        handler: JourneyState::title,
    },
    Rule {
        name: "section",
        handler: JourneyState::section,
    },
    Rule {
        name: "task",
        handler: JourneyState::task,
    },
];

#[derive(Debug, Default)]
struct JourneyState {
    title: Option<String>,
    sections: Vec<JourneySection>,
}

impl JourneyState {
    fn title(&mut self, line: &SourceLine<'_>) -> Result<bool> {
        let Some(rest) = strip_keyword_colon(line.text, "title") else {
            return Ok(false);
        };
        self.title = non_empty(rest);
        Ok(true)
    }

    fn section(&mut self, line: &SourceLine<'_>) -> Result<bool> {
        let Some(rest) = strip_keyword(line.text, "section") else {
            return Ok(false);
        };
        let name = non_empty(rest)
            .ok_or_else(|| line.syntax_error(ErrorCode::E100, "`section` needs a name"))?;
        self.sections.push(JourneySection {
            name,
            tasks: Vec::new(),
            position: line.position(),
        });
        Ok(true)
    }

    /// `Name: score[: actor, actor]`
    fn task(&mut self, line: &SourceLine<'_>) -> Result<bool> {
        let mut parts = line.text.splitn(3, ':').map(str::trim);
        let (Some(name), Some(score)) = (parts.next(), parts.next()) else {
            return Ok(false);
        };
        if name.is_empty() {
            return Ok(false);
        }

        let score = score.parse::<i64>().map_err(|_| {
            line.syntax_error(ErrorCode::E101, format!("score `{score}` is not an integer"))
        })?;
        let actors: Vec<String> = parts
            .next()
            .map(|actors| {
                actors
                    .split(',')
                    .filter_map(non_empty)
                    .collect()
            })
            .unwrap_or_default();

        let Some(section) = self.sections.last_mut() else {
            return Err(line.structural_error(
                ErrorCode::E202,
                format!("task `{name}` outside of any section"),
            ));
        };
        section.tasks.push(JourneyTask {
            name: name.to_string(),
            score,
            actors,
            position: line.position(),
        });
        Ok(true)
    }
}

/// Parser for `journey` diagrams.
pub struct JourneyParser;

impl DiagramParser for JourneyParser {
    fn supported_types(&self) -> &'static [DiagramKind] {
        &[DiagramKind::Journey]
    }

    fn parse(&self, source: &Source<'_>) -> Result<Diagram> {
        let header = expect_bare_header(source, "journey")?;

        let mut state = JourneyState::default();
        for line in source.body() {
            run_cascade(&mut state, RULES, line)?;
        }

        Ok(Diagram::Journey(JourneyDiagram {
            header: diagram_header(DiagramKind::Journey, source, &header),
            title: state.title,
            sections: state.sections,
        }))
    }
}
