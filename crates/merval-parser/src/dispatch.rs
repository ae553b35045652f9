//! Header detection and routing.
//!
//! The first significant line picks the parser. Prefixes are tried in
//! table order, so a keyword that extends another (`stateDiagram-v2`,
//! `sankey-beta`) must come before the shorter one. Headers that match no
//! prefix are captured as [`Diagram::Generic`] rather than rejected.

use log::debug;
use merval_core::ast::{Diagram, DiagramHeader, DiagramKind, GenericDiagram};

use crate::{
    error::Result,
    lexer::{Source, SourceLine, strip_keyword_colon},
    parser::parser_for,
};

/// Header keyword to kind, most specific first.
///
/// `sankey` and `xychart` are listed so the kind is detected even without
/// the `-beta` suffix; the parser then reports the header mismatch.
const PREFIXES: [(&str, DiagramKind); 23] = [
    ("stateDiagram-v2", DiagramKind::StateV2),
    ("stateDiagram", DiagramKind::State),
    ("sequenceDiagram", DiagramKind::Sequence),
    ("classDiagram", DiagramKind::Class),
    ("erDiagram", DiagramKind::Er),
    ("flowchart", DiagramKind::Flowchart),
    ("graph", DiagramKind::Graph),
    ("pie", DiagramKind::Pie),
    ("gantt", DiagramKind::Gantt),
    ("journey", DiagramKind::Journey),
    ("gitGraph", DiagramKind::GitGraph),
    ("mindmap", DiagramKind::Mindmap),
    ("timeline", DiagramKind::Timeline),
    ("sankey-beta", DiagramKind::Sankey),
    ("sankey", DiagramKind::Sankey),
    ("quadrantChart", DiagramKind::Quadrant),
    ("xychart-beta", DiagramKind::XyChart),
    ("xychart", DiagramKind::XyChart),
    ("C4Context", DiagramKind::C4Context),
    ("C4Container", DiagramKind::C4Container),
    ("C4Component", DiagramKind::C4Component),
    ("C4Dynamic", DiagramKind::C4Dynamic),
    ("C4Deployment", DiagramKind::C4Deployment),
];

/// Kind named by a header line, or [`DiagramKind::Unknown`].
fn kind_of(header: &str) -> DiagramKind {
    PREFIXES
        .iter()
        .find(|(prefix, _)| strip_keyword_colon(header, prefix).is_some())
        .map_or(DiagramKind::Unknown, |&(_, kind)| kind)
}

/// Detect the diagram kind from the first significant line of `source`.
///
/// Blank input and unrecognised headers both yield
/// [`DiagramKind::Unknown`].
///
/// # Example
///
/// ```
/// # use merval_core::ast::DiagramKind;
/// # use merval_parser::detect_kind;
///
/// assert_eq!(detect_kind("%% comment\nstateDiagram-v2\n[*] --> A"), DiagramKind::StateV2);
/// assert_eq!(detect_kind("packet-beta"), DiagramKind::Unknown);
/// ```
pub fn detect_kind(source: &str) -> DiagramKind {
    Source::new(source, 0)
        .header()
        .map_or(DiagramKind::Unknown, |header| kind_of(header.text))
}

/// Parse `source`, numbering lines from 1.
pub fn parse(source: &str) -> Result<Diagram> {
    parse_with_offset(source, 0)
}

/// Parse `source` as if it started after `line_offset` lines of
/// surrounding text.
pub fn parse_with_offset(source: &str, line_offset: usize) -> Result<Diagram> {
    let source = Source::new(source, line_offset);
    let header = source.require_header()?;
    let kind = kind_of(header.text);
    debug!(kind = kind.as_str(), line = header.number; "Dispatching diagram");
    route(kind, &source, header)
}

/// Parse `source` with the parser registered for `kind`, skipping
/// detection.
///
/// The parser still checks the header, so a mismatch is reported as a
/// header error. [`DiagramKind::Unknown`] produces a generic capture.
pub fn parse_as(kind: DiagramKind, source: &str, line_offset: usize) -> Result<Diagram> {
    let source = Source::new(source, line_offset);
    let header = source.require_header()?;
    debug!(kind = kind.as_str(), line = header.number; "Parsing as requested kind");
    route(kind, &source, header)
}

fn route(kind: DiagramKind, source: &Source<'_>, header: &SourceLine<'_>) -> Result<Diagram> {
    match parser_for(kind) {
        Some(parser) => parser.parse(source),
        None => Ok(generic(source, header)),
    }
}

fn generic(source: &Source<'_>, header: &SourceLine<'_>) -> Diagram {
    debug!(header = header.text; "Unrecognised header, capturing generically");
    Diagram::Generic(GenericDiagram {
        header: DiagramHeader::new(DiagramKind::Unknown, source.text(), header.position()),
        lines: source.text().lines().map(str::to_string).collect(),
    })
}

#[cfg(test)]
mod tests {
    use merval_core::position::Position;

    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_longer_prefixes_win() {
        assert_eq!(kind_of("stateDiagram-v2"), DiagramKind::StateV2);
        assert_eq!(kind_of("stateDiagram"), DiagramKind::State);
        assert_eq!(kind_of("sankey-beta"), DiagramKind::Sankey);
        assert_eq!(kind_of("xychart-beta horizontal"), DiagramKind::XyChart);
        assert_eq!(kind_of("graph LR"), DiagramKind::Graph);
        assert_eq!(kind_of("gitGraph:"), DiagramKind::GitGraph);
        assert_eq!(kind_of("C4Deployment"), DiagramKind::C4Deployment);
        assert_eq!(kind_of("graphviz"), DiagramKind::Unknown);
    }

    #[test]
    fn test_every_kind_has_a_prefix() {
        for kind in DiagramKind::ALL {
            if kind != DiagramKind::Unknown {
                assert_eq!(kind_of(kind.as_str()), kind);
            }
        }
    }

    #[test]
    fn test_front_matter_is_skipped() {
        let text = "---\ntitle: Demo\n---\npie\n\"A\": 1";

        assert_eq!(detect_kind(text), DiagramKind::Pie);
        assert_eq!(parse(text).unwrap().position(), Position::new(4, 1));
    }

    #[test]
    fn test_unknown_header_is_generic() {
        let diagram = parse_with_offset("\nblock-beta\n  a b c", 10).unwrap();

        assert_eq!(diagram.kind(), DiagramKind::Unknown);
        assert_eq!(diagram.position(), Position::new(12, 1));
        match diagram {
            Diagram::Generic(generic) => assert_eq!(generic.lines, ["", "block-beta", "  a b c"]),
            other => panic!("expected generic capture, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_input() {
        for text in ["", "   \n\n", "%% only a comment"] {
            let err = parse(text).unwrap_err();
            assert_eq!(err.code(), ErrorCode::E001, "{text:?}");
        }
    }

    #[test]
    fn test_parse_as_checks_header() {
        let err = parse_as(DiagramKind::Pie, "gantt\nsection A", 0).unwrap_err();
        assert_eq!(err.code(), ErrorCode::E002);

        let diagram = parse_as(DiagramKind::Unknown, "pie\n\"A\": 1", 0).unwrap();
        assert_eq!(diagram.kind(), DiagramKind::Unknown);
    }
}
