//! `sankey-beta` parser. Every body line is a `source,target,value` row.

use merval_core::ast::{Diagram, DiagramKind, SankeyDiagram, chart::SankeyLink};

use crate::{
    error::{ErrorCode, ParseError, Result},
    lexer::{Source, SourceLine, parse_number, split_params},
    parser::{DiagramParser, Rule, diagram_header, expect_bare_header, run_cascade},
};

const RULES: &[Rule<SankeyState>] = &[Rule {
    name: "link",
    handler: SankeyState::link,
}];

#[derive(Debug, Default)]
struct SankeyState {
    links: Vec<SankeyLink>,
}

impl SankeyState {
    fn link(&mut self, line: &SourceLine<'_>) -> Result<bool> {
        let fields = split_params(line.text).map_err(|err| {
            line.syntax_error(ErrorCode::E102, err.to_string())
        })?;
        let [source, target, value] = fields.as_slice() else {
            return Err(line.syntax_error(
                ErrorCode::E100,
                format!("expected `source,target,value`, found {} fields", fields.len()),
            ));
        };

        if source.is_empty() || target.is_empty() {
            return Err(line.syntax_error(
                ErrorCode::E101,
                "link source and target must not be empty",
            ));
        }
        if source == target {
            return Err(line.syntax_error(
                ErrorCode::E103,
                format!("`{source}` links to itself"),
            ));
        }
        let value = parse_number(value)
            .filter(|value| *value > 0.0)
            .ok_or_else(|| {
                line.syntax_error(
                    ErrorCode::E101,
                    format!("link value must be a positive number, found `{value}`"),
                )
            })?;

        self.links.push(SankeyLink {
            source: source.clone(),
            target: target.clone(),
            value,
            position: line.position(),
        });
        Ok(true)
    }
}

/// Parser for `sankey-beta`.
pub struct SankeyParser;

impl DiagramParser for SankeyParser {
    fn supported_types(&self) -> &'static [DiagramKind] {
        &[DiagramKind::Sankey]
    }

    fn parse(&self, source: &Source<'_>) -> Result<Diagram> {
        let header = expect_bare_header(source, "sankey-beta")?;

        let mut state = SankeyState::default();
        for line in source.body() {
            run_cascade(&mut state, RULES, line)?;
        }

        if state.links.is_empty() {
            return Err(ParseError::structural(
                ErrorCode::E204,
                header.position(),
                "sankey diagram has no links",
            ));
        }

        Ok(Diagram::Sankey(SankeyDiagram {
            header: diagram_header(DiagramKind::Sankey, source, &header),
            links: state.links,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> SankeyDiagram {
        match SankeyParser.parse_str(text, 0).unwrap() {
            Diagram::Sankey(diagram) => diagram,
            other => panic!("expected sankey diagram, got {other:?}"),
        }
    }

    #[test]
    fn test_links() {
        let diagram = parse("sankey-beta\nSolar,Grid,12.5\n\"Wind, offshore\",Grid,0.01");

        assert_eq!(diagram.links.len(), 2);
        assert_eq!(diagram.links[0].value, 12.5);
        assert_eq!(diagram.links[1].source, "Wind, offshore");
        assert_eq!(diagram.links[1].value, 0.01);
    }

    #[test]
    fn test_non_positive_values_rejected() {
        for value in ["0", "-4"] {
            let err = SankeyParser
                .parse_str(&format!("sankey-beta\nA,B,{value}"), 0)
                .unwrap_err();
            assert_eq!(err.code(), ErrorCode::E101, "{value}");
        }
    }

    #[test]
    fn test_self_loop_rejected() {
        let err = SankeyParser.parse_str("sankey-beta\nA,A,3", 0).unwrap_err();

        assert_eq!(err.code(), ErrorCode::E103);
    }

    #[test]
    fn test_wrong_field_count() {
        let err = SankeyParser.parse_str("sankey-beta\nA,B", 0).unwrap_err();

        assert_eq!(err.code(), ErrorCode::E100);
    }

    #[test]
    fn test_unterminated_quote() {
        let err = SankeyParser
            .parse_str("sankey-beta\n\"A,B,3", 0)
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::E102);
    }

    #[test]
    fn test_header_only_is_an_error() {
        let err = SankeyParser.parse_str("sankey-beta", 0).unwrap_err();

        assert_eq!(err.code(), ErrorCode::E204);
    }
}
