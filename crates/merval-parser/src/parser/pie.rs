//! `pie` chart parser.

use merval_core::ast::{Diagram, DiagramKind, PieDiagram, chart::PieSlice};

use crate::{
    error::{ErrorCode, ParseError, Result},
    lexer::{Source, SourceLine, non_empty, parse_number, split_label, strip_keyword, strip_keyword_colon},
    parser::{DiagramParser, Rule, diagram_header, run_cascade, unexpected_modifier},
};

const RULES: &[Rule<PieState>] = &[
    Rule {
        name: "title",
        handler: PieState::title,
    },
    Rule {
        name: "slice",
        handler: PieState::slice,
    },
];

#[derive(Debug, Default)]
struct PieState {
    title: Option<String>,
    slices: Vec<PieSlice>,
}

impl PieState {
    fn title(&mut self, line: &SourceLine<'_>) -> Result<bool> {
        let Some(rest) = strip_keyword_colon(line.text, "title") else {
            return Ok(false);
        };
        if self.title.is_some() {
            return Err(line.structural_error(ErrorCode::E203, "pie title is set twice"));
        }
        self.title = non_empty(rest);
        Ok(true)
    }

    fn slice(&mut self, line: &SourceLine<'_>) -> Result<bool> {
        let (label, Some(value)) = split_label(line.text) else {
            return Ok(false);
        };
        let Some(label) = label
            .strip_prefix('"')
            .and_then(|label| label.strip_suffix('"'))
        else {
            return Ok(false);
        };

        let value = parse_number(value).ok_or_else(|| {
            line.syntax_error(ErrorCode::E101, format!("`{value}` is not a number"))
        })?;
        if value <= 0.0 {
            return Err(line.syntax_error(
                ErrorCode::E101,
                format!("slice `{label}` must have a positive value, found {value}"),
            ));
        }

        self.slices.push(PieSlice {
            label: label.to_string(),
            value,
            position: line.position(),
        });
        Ok(true)
    }
}

/// Parser for `pie` charts.
pub struct PieParser;

impl DiagramParser for PieParser {
    fn supported_types(&self) -> &'static [DiagramKind] {
        &[DiagramKind::Pie]
    }

    fn parse(&self, source: &Source<'_>) -> Result<Diagram> {
        let (header, rest) = source.expect_header("pie")?;
        let (show_data, rest) = match strip_keyword(rest, "showData") {
            Some(rest) => (true, rest),
            None => (false, rest),
        };
        let title = match rest {
            "" => None,
            _ => match strip_keyword_colon(rest, "title") {
                Some(title) => non_empty(title),
                None => return Err(unexpected_modifier(header, "pie", rest)),
            },
        };

        let mut state = PieState {
            title,
            ..PieState::default()
        };
        for line in source.body() {
            run_cascade(&mut state, RULES, line)?;
        }

        if state.slices.is_empty() {
            return Err(ParseError::structural(
                ErrorCode::E204,
                header.position(),
                "pie chart has no slices",
            ));
        }

        Ok(Diagram::Pie(PieDiagram {
            header: diagram_header(DiagramKind::Pie, source, header),
            show_data,
            title: state.title,
            slices: state.slices,
        }))
    }
}
