//! `xychart-beta` parser.

use merval_core::{
    ast::{
        Diagram, DiagramKind, XyChartDiagram,
        chart::{Axis, AxisRange, Orientation, Series, SeriesKind},
    },
    position::Position,
};

use crate::{
    error::{ErrorCode, ParseError, Result},
    lexer::{
        Source, SourceLine, non_empty, parse_number, split_params, strip_keyword,
        strip_keyword_colon, unquote,
    },
    parser::{DiagramParser, Rule, diagram_header, run_cascade, unexpected_modifier},
};

const RULES: &[Rule<XyChartState>] = &[
    Rule {
        name: "title",
        handler: XyChartState::title,
    },
    Rule {
        name: "x-axis",
        handler: XyChartState::x_axis,
    },
    Rule {
        name: "y-axis",
        handler: XyChartState::y_axis,
    },
    Rule {
        name: "series",
        handler: XyChartState::series,
    },
];

#[derive(Debug, Default)]
struct XyChartState {
    title: Option<String>,
    x_axis: Option<Axis>,
    y_axis: Option<Axis>,
    series: Vec<Series>,
}

impl XyChartState {
    fn title(&mut self, line: &SourceLine<'_>) -> Result<bool> {
        let Some(rest) = strip_keyword_colon(line.text, "title") else {
            return Ok(false);
        };
        self.title = non_empty(unquote(rest));
        Ok(true)
    }

    fn x_axis(&mut self, line: &SourceLine<'_>) -> Result<bool> {
        let Some(rest) = strip_keyword(line.text, "x-axis") else {
            return Ok(false);
        };
        if self.x_axis.is_some() {
            return Err(line.structural_error(ErrorCode::E203, "x-axis is defined twice"));
        }
        self.x_axis = Some(parse_axis(line, rest)?);
        Ok(true)
    }

    fn y_axis(&mut self, line: &SourceLine<'_>) -> Result<bool> {
        let Some(rest) = strip_keyword(line.text, "y-axis") else {
            return Ok(false);
        };
        if self.y_axis.is_some() {
            return Err(line.structural_error(ErrorCode::E203, "y-axis is defined twice"));
        }
        self.y_axis = Some(parse_axis(line, rest)?);
        Ok(true)
    }

    fn series(&mut self, line: &SourceLine<'_>) -> Result<bool> {
        let (kind, rest) = match (
            strip_keyword(line.text, "bar"),
            strip_keyword(line.text, "line"),
        ) {
            (Some(rest), _) => (SeriesKind::Bar, rest),
            (None, Some(rest)) => (SeriesKind::Line, rest),
            (None, None) => return Ok(false),
        };

        let Some((name, values)) = split_bracketed(rest) else {
            return Err(line.syntax_error(ErrorCode::E100, "series needs a `[v1, v2, ...]` list"));
        };
        let values = values
            .split(',')
            .map(|value| {
                parse_number(value).ok_or_else(|| {
                    line.syntax_error(
                        ErrorCode::E101,
                        format!("`{}` is not a number", value.trim()),
                    )
                })
            })
            .collect::<Result<Vec<_>>>()?;

        self.series.push(Series {
            kind,
            name: non_empty(unquote(name)),
            values,
            position: line.position(),
        });
        Ok(true)
    }
}

/// Split `prefix [inner]` into its two parts.
fn split_bracketed(text: &str) -> Option<(&str, &str)> {
    let open = text.find('[')?;
    let inner = text[open + 1..].strip_suffix(']')?;
    Some((text[..open].trim(), inner))
}

/// `["title"] [a, b, ...]` or `["title"] min --> max`.
fn parse_axis(line: &SourceLine<'_>, text: &str) -> Result<Axis> {
    if let Some((title, categories)) = split_bracketed(text) {
        let categories = split_params(categories)
            .map_err(|err| line.syntax_error(ErrorCode::E102, err.to_string()))?;
        return Ok(Axis {
            title: non_empty(unquote(title)),
            range: AxisRange::Categorical(categories),
            position: line.position(),
        });
    }

    let Some((head, max)) = text.split_once("-->") else {
        return Err(line.syntax_error(
            ErrorCode::E101,
            "axis needs a `[categories]` list or a `min --> max` range",
        ));
    };
    let (title, min) = match head.trim().rsplit_once(char::is_whitespace) {
        Some((title, min)) => (non_empty(unquote(title.trim())), min),
        None => (None, head.trim()),
    };
    let number = |text: &str| {
        parse_number(text).ok_or_else(|| {
            line.syntax_error(ErrorCode::E101, format!("`{}` is not a number", text.trim()))
        })
    };

    Ok(Axis {
        title,
        range: AxisRange::Numeric {
            min: number(min)?,
            max: number(max)?,
        },
        position: line.position(),
    })
}

fn missing(header: Position, what: &[&str]) -> ParseError {
    ParseError::structural(
        ErrorCode::E204,
        header,
        format!("xychart is missing {}", what.join(", ")),
    )
}

/// Parser for `xychart-beta`.
pub struct XyChartParser;

impl DiagramParser for XyChartParser {
    fn supported_types(&self) -> &'static [DiagramKind] {
        &[DiagramKind::XyChart]
    }

    fn parse(&self, source: &Source<'_>) -> Result<Diagram> {
        let (header, rest) = source.expect_header("xychart-beta")?;
        let orientation = match rest {
            "" | "vertical" => Orientation::Vertical,
            "horizontal" => Orientation::Horizontal,
            _ => return Err(unexpected_modifier(header, "xychart-beta", rest)),
        };

        let mut state = XyChartState::default();
        for line in source.body() {
            run_cascade(&mut state, RULES, line)?;
        }

        let mut absent = Vec::new();
        if state.x_axis.is_none() {
            absent.push("x-axis");
        }
        if state.y_axis.is_none() {
            absent.push("y-axis");
        }
        if state.series.is_empty() {
            absent.push("a bar or line series");
        }
        let (Some(x_axis), Some(y_axis), false) =
            (state.x_axis, state.y_axis, state.series.is_empty())
        else {
            return Err(missing(header.position(), &absent));
        };

        Ok(Diagram::XyChart(XyChartDiagram {
            header: diagram_header(DiagramKind::XyChart, source, header),
            orientation,
            title: state.title,
            x_axis,
            y_axis,
            series: state.series,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> XyChartDiagram {
        match XyChartParser.parse_str(text, 0).unwrap() {
            Diagram::XyChart(diagram) => diagram,
            other => panic!("expected xychart, got {other:?}"),
        }
    }

    #[test]
    fn test_full_chart() {
        let diagram = parse(
            "xychart-beta horizontal\ntitle \"Sales\"\nx-axis Month [jan, feb, \"mar, late\"]\ny-axis \"Revenue\" 0 --> 100.5\nbar \"2024\" [1, 2, 3]\nline [3, 2.5, 1]",
        );

        assert_eq!(diagram.orientation, Orientation::Horizontal);
        assert_eq!(diagram.title.as_deref(), Some("Sales"));
        assert_eq!(diagram.x_axis.title.as_deref(), Some("Month"));
        assert_eq!(
            diagram.x_axis.range,
            AxisRange::Categorical(vec![
                "jan".to_string(),
                "feb".to_string(),
                "mar, late".to_string()
            ])
        );
        assert_eq!(diagram.y_axis.title.as_deref(), Some("Revenue"));
        assert_eq!(
            diagram.y_axis.range,
            AxisRange::Numeric {
                min: 0.0,
                max: 100.5
            }
        );
        assert_eq!(diagram.series[0].name.as_deref(), Some("2024"));
        assert_eq!(diagram.series[1].kind, SeriesKind::Line);
        assert_eq!(diagram.series[1].values, [3.0, 2.5, 1.0]);
    }

    #[test]
    fn test_default_orientation() {
        let diagram = parse("xychart-beta\nx-axis [a]\ny-axis 0 --> 1\nbar [1]");

        assert_eq!(diagram.orientation, Orientation::Vertical);
        assert_eq!(diagram.y_axis.title, None);
    }

    #[test]
    fn test_axis_defined_twice() {
        let err = XyChartParser
            .parse_str("xychart-beta\nx-axis [a]\nx-axis [b]", 0)
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::E203);
    }

    #[test]
    fn test_missing_parts_named() {
        let err = XyChartParser
            .parse_str("xychart-beta\nx-axis [a]", 0)
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::E204);
        assert_eq!(err.message(), "xychart is missing y-axis, a bar or line series");
        assert_eq!(err.position(), Position::new(1, 1));
    }

    #[test]
    fn test_title_only_axis_rejected() {
        let err = XyChartParser
            .parse_str("xychart-beta\nx-axis Month", 0)
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::E101);
    }

    #[test]
    fn test_bad_series_value() {
        let err = XyChartParser
            .parse_str("xychart-beta\nbar [1, x]", 0)
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::E101);
    }
}
