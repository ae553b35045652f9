//! `timeline` parser.

use merval_core::ast::{
    Diagram, DiagramKind, TimelineDiagram,
    schedule::{TimelinePeriod, TimelineSection},
};

use crate::{
    error::{ErrorCode, Result},
    lexer::{Source, SourceLine, non_empty, strip_keyword, strip_keyword_colon},
    parser::{DiagramParser, Rule, diagram_header, expect_bare_header, run_cascade},
};

const RULES: &[Rule<TimelineState>] = &[
    Rule {
        name: "title",
        handler: TimelineState::title,
    },
    Rule {
        name: "section",
        handler: TimelineState::section,
    },
    Rule {
        name: "continuation",
        handler: TimelineState::continuation,
    },
    Rule {
        name: "period",
        handler: TimelineState::period,
    },
];

#[derive(Debug, Default)]
struct TimelineState {
    title: Option<String>,
    sections: Vec<TimelineSection>,
    /// Periods before the first section.
    periods: Vec<TimelinePeriod>,
}

fn events(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(':').filter_map(non_empty)
}

impl TimelineState {
    fn current_periods(&mut self) -> &mut Vec<TimelinePeriod> {
        match self.sections.last_mut() {
            Some(section) => &mut section.periods,
            None => &mut self.periods,
        }
    }

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
        self.sections.push(TimelineSection {
            name,
            periods: Vec::new(),
            position: line.position(),
        });
        Ok(true)
    }

    /// `: event` attaches to the previous period of the current section.
    fn continuation(&mut self, line: &SourceLine<'_>) -> Result<bool> {
        let Some(rest) = line.text.strip_prefix(':') else {
            return Ok(false);
        };
        let Some(period) = self.current_periods().last_mut() else {
            return Err(line.structural_error(
                ErrorCode::E202,
                "event continuation without a preceding period",
            ));
        };
        period.events.extend(events(rest));
        Ok(true)
    }

    fn period(&mut self, line: &SourceLine<'_>) -> Result<bool> {
        let Some((label, rest)) = line.text.split_once(':') else {
            return Ok(false);
        };
        let Some(label) = non_empty(label) else {
            return Ok(false);
        };
        let period = TimelinePeriod {
            label,
            events: events(rest).collect(),
            position: line.position(),
        };
        self.current_periods().push(period);
        Ok(true)
    }
}

/// Parser for `timeline` diagrams.
pub struct TimelineParser;

impl DiagramParser for TimelineParser {
    fn supported_types(&self) -> &'static [DiagramKind] {
        &[DiagramKind::Timeline]
    }

    fn parse(&self, source: &Source<'_>) -> Result<Diagram> {
        let header = expect_bare_header(source, "timeline")?;

        let mut state = TimelineState::default();
        for line in source.body() {
            run_cascade(&mut state, RULES, line)?;
        }

        Ok(Diagram::Timeline(TimelineDiagram {
            header: diagram_header(DiagramKind::Timeline, source, &header),
            title: state.title,
            sections: state.sections,
            periods: state.periods,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> TimelineDiagram {
        match TimelineParser.parse_str(text, 0).unwrap() {
            Diagram::Timeline(diagram) => diagram,
            other => panic!("expected timeline, got {other:?}"),
        }
    }

    #[test]
    fn test_periods_and_continuations() {
        let diagram = parse(
            "timeline\ntitle History\n2002 : LinkedIn\nsection 2000s\n2004 : Facebook : Google\n     : Gmail\n2005 : YouTube",
        );

        assert_eq!(diagram.title.as_deref(), Some("History"));
        assert_eq!(diagram.periods[0].label, "2002");
        let periods = &diagram.sections[0].periods;
        assert_eq!(periods[0].events, ["Facebook", "Google", "Gmail"]);
        assert_eq!(periods[1].label, "2005");
    }

    #[test]
    fn test_continuation_without_period() {
        let err = TimelineParser
            .parse_str("timeline\nsection A\n: orphan", 0)
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::E202);
    }

    #[test]
    fn test_line_without_colon_rejected() {
        let err = TimelineParser.parse_str("timeline\njust words", 0).unwrap_err();

        assert_eq!(err.code(), ErrorCode::E100);
    }
}
