//! `quadrantChart` parser.

use merval_core::ast::{
    Diagram, DiagramKind, QuadrantDiagram,
    chart::{QuadrantAxis, QuadrantClassDef, QuadrantPoint},
};

use crate::{
    error::{ErrorCode, Result},
    lexer::{Source, SourceLine, non_empty, parse_number, strip_keyword, strip_keyword_colon, unquote},
    parser::{DiagramParser, Rule, diagram_header, expect_bare_header, run_cascade},
};

const QUADRANT_KEYWORDS: [&str; 4] = ["quadrant-1", "quadrant-2", "quadrant-3", "quadrant-4"];

const RULES: &[Rule<QuadrantState>] = &[
    Rule {
        name: "title",
        handler: QuadrantState::title,
    },
    Rule {
        name: "x-axis",
        handler: QuadrantState::x_axis,
    },
    Rule {
        name: "y-axis",
        handler: QuadrantState::y_axis,
    },
    Rule {
        name: "quadrant",
        handler: QuadrantState::quadrant,
    },
    Rule {
        name: "classDef",
        handler: QuadrantState::class_def,
    },
    Rule {
        name: "point",
        handler: QuadrantState::point,
    },
];

#[derive(Debug, Default)]
struct QuadrantState {
    title: Option<String>,
    x_axis: Option<QuadrantAxis>,
    y_axis: Option<QuadrantAxis>,
    quadrants: [Option<String>; 4],
    points: Vec<QuadrantPoint>,
    class_defs: Vec<QuadrantClassDef>,
}

fn parse_axis(line: &SourceLine<'_>, text: &str) -> Result<QuadrantAxis> {
    let (low, high) = match text.split_once("-->") {
        Some((low, high)) => (low, non_empty(unquote(high.trim()))),
        None => (text, None),
    };
    let low = non_empty(unquote(low.trim()))
        .ok_or_else(|| line.syntax_error(ErrorCode::E100, "axis needs a label"))?;
    Ok(QuadrantAxis {
        low,
        high,
        position: line.position(),
    })
}

impl QuadrantState {
    fn title(&mut self, line: &SourceLine<'_>) -> Result<bool> {
        let Some(rest) = strip_keyword_colon(line.text, "title") else {
            return Ok(false);
        };
        self.title = non_empty(rest);
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

    fn quadrant(&mut self, line: &SourceLine<'_>) -> Result<bool> {
        let Some((index, rest)) = QUADRANT_KEYWORDS
            .iter()
            .enumerate()
            .find_map(|(index, keyword)| strip_keyword(line.text, keyword).map(|rest| (index, rest)))
        else {
            return Ok(false);
        };
        if self.quadrants[index].is_some() {
            return Err(line.structural_error(
                ErrorCode::E203,
                format!("{} is labelled twice", QUADRANT_KEYWORDS[index]),
            ));
        }
        self.quadrants[index] = non_empty(unquote(rest));
        Ok(true)
    }

    fn class_def(&mut self, line: &SourceLine<'_>) -> Result<bool> {
        let Some(rest) = strip_keyword(line.text, "classDef") else {
            return Ok(false);
        };
        let Some((name, style)) = rest.split_once(char::is_whitespace) else {
            return Err(line.syntax_error(ErrorCode::E100, "classDef needs a name and a style"));
        };
        self.class_defs.push(QuadrantClassDef {
            name: name.to_string(),
            style: style.trim().to_string(),
            position: line.position(),
        });
        Ok(true)
    }

    /// `Name[:::class]: [x, y] [style]`
    fn point(&mut self, line: &SourceLine<'_>) -> Result<bool> {
        let Some(open) = line.text.find('[') else {
            return Ok(false);
        };
        let Some(head) = line.text[..open].trim_end().strip_suffix(':') else {
            return Ok(false);
        };
        let Some((coordinates, style)) = line.text[open + 1..].split_once(']') else {
            return Err(line.syntax_error(ErrorCode::E100, "point coordinates are not closed"));
        };

        let (name, class) = match head.split_once(":::") {
            Some((name, class)) => (name, non_empty(class)),
            None => (head, None),
        };
        let name = unquote(name.trim());
        if name.is_empty() {
            return Err(line.syntax_error(ErrorCode::E100, "point needs a name"));
        }

        let values: Vec<f64> = coordinates
            .split(',')
            .map(parse_number)
            .collect::<Option<_>>()
            .ok_or_else(|| {
                line.syntax_error(
                    ErrorCode::E101,
                    format!("`[{coordinates}]` is not a pair of numbers"),
                )
            })?;
        let &[x, y] = values.as_slice() else {
            return Err(line.syntax_error(
                ErrorCode::E101,
                format!("point needs exactly two coordinates, found {}", values.len()),
            ));
        };

        self.points.push(QuadrantPoint {
            name: name.to_string(),
            x,
            y,
            class,
            style: non_empty(style),
            position: line.position(),
        });
        Ok(true)
    }
}

/// Parser for `quadrantChart`.
pub struct QuadrantParser;

impl DiagramParser for QuadrantParser {
    fn supported_types(&self) -> &'static [DiagramKind] {
        &[DiagramKind::Quadrant]
    }

    fn parse(&self, source: &Source<'_>) -> Result<Diagram> {
        let header = expect_bare_header(source, "quadrantChart")?;

        let mut state = QuadrantState::default();
        for line in source.body() {
            run_cascade(&mut state, RULES, line)?;
        }

        Ok(Diagram::Quadrant(QuadrantDiagram {
            header: diagram_header(DiagramKind::Quadrant, source, &header),
            title: state.title,
            x_axis: state.x_axis,
            y_axis: state.y_axis,
            quadrants: state.quadrants,
            points: state.points,
            class_defs: state.class_defs,
        }))
    }
}
