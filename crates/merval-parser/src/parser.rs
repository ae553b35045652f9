//! Per-kind diagram parsers.
//!
//! Every parser follows the same shape: check the header, then walk the
//! body lines top to bottom with a small amount of state (open body, open
//! block, current section). Each line is offered to an ordered table of
//! named [`Rule`]s; the first rule that accepts it wins. A line no rule
//! accepts is a syntax error listing the rule names that were tried.
//!
//! Rule tables are `const` data, so tie-breaks such as "start state before
//! end state" are visible in one place.

mod c4;
mod class;
mod er;
mod flowchart;
mod gantt;
mod gitgraph;
mod journey;
mod mindmap;
mod pie;
mod quadrant;
mod sankey;
mod sequence;
mod state;
mod timeline;
mod xychart;

use log::trace;
use merval_core::ast::{Diagram, DiagramHeader, DiagramKind, Direction};

use crate::{
    error::{ErrorCode, ParseError, Result},
    lexer::{Source, SourceLine},
};

pub use c4::C4Parser;
pub use class::ClassParser;
pub use er::ErParser;
pub use flowchart::FlowchartParser;
pub use gantt::GanttParser;
pub use gitgraph::GitGraphParser;
pub use journey::JourneyParser;
pub use mindmap::MindmapParser;
pub use pie::PieParser;
pub use quadrant::QuadrantParser;
pub use sankey::SankeyParser;
pub use sequence::SequenceParser;
pub use state::StateParser;
pub use timeline::TimelineParser;
pub use xychart::XyChartParser;

/// A parser for one or more diagram kinds.
pub trait DiagramParser: Send + Sync {
    /// Kinds whose header this parser accepts.
    fn supported_types(&self) -> &'static [DiagramKind];

    /// Parse a whole diagram. Fails on the first malformed line.
    fn parse(&self, source: &Source<'_>) -> Result<Diagram>;

    /// Parse raw text, numbering lines from `line_offset + 1`.
    fn parse_str(&self, text: &str, line_offset: usize) -> Result<Diagram> {
        self.parse(&Source::new(text, line_offset))
    }
}

static PARSERS: [&dyn DiagramParser; 15] = [
    &FlowchartParser,
    &SequenceParser,
    &ClassParser,
    &StateParser,
    &ErParser,
    &PieParser,
    &GanttParser,
    &JourneyParser,
    &GitGraphParser,
    &MindmapParser,
    &TimelineParser,
    &SankeyParser,
    &QuadrantParser,
    &XyChartParser,
    &C4Parser,
];

/// Every registered parser.
pub fn registry() -> &'static [&'static dyn DiagramParser] {
    &PARSERS
}

/// The parser that handles `kind`, if any.
pub fn parser_for(kind: DiagramKind) -> Option<&'static dyn DiagramParser> {
    registry()
        .iter()
        .copied()
        .find(|parser| parser.supported_types().contains(&kind))
}

/// Line handler: `Ok(true)` when the line was consumed.
pub(crate) type Handler<S> = fn(&mut S, &SourceLine<'_>) -> Result<bool>;

/// One named entry in an ordered rule table.
pub(crate) struct Rule<S> {
    pub name: &'static str,
    pub handler: Handler<S>,
}

/// Offer `line` to each rule in order; the first match wins.
pub(crate) fn run_cascade<S>(
    state: &mut S,
    rules: &[Rule<S>],
    line: &SourceLine<'_>,
) -> Result<()> {
    for rule in rules {
        if (rule.handler)(state, line)? {
            trace!(rule = rule.name, line = line.number; "Matched line");
            return Ok(());
        }
    }

    Err(line
        .syntax_error(ErrorCode::E100, format!("unrecognised line `{}`", line.text))
        .with_expected(rules.iter().map(|rule| rule.name).collect()))
}

/// Build the shared header for a parsed diagram.
pub(crate) fn diagram_header(
    kind: DiagramKind,
    source: &Source<'_>,
    line: &SourceLine<'_>,
) -> DiagramHeader {
    DiagramHeader::new(kind, source.text(), line.position())
}

/// Reject anything after a header keyword that takes no modifiers.
pub(crate) fn expect_bare_header<'a>(source: &Source<'a>, keyword: &'static str) -> Result<SourceLine<'a>> {
    let (line, rest) = source.expect_header(keyword)?;
    if !rest.is_empty() {
        return Err(unexpected_modifier(line, keyword, rest));
    }
    Ok(*line)
}

pub(crate) fn unexpected_modifier(line: &SourceLine<'_>, keyword: &str, rest: &str) -> ParseError {
    ParseError::header(
        ErrorCode::E003,
        line.position(),
        format!("unexpected `{rest}` after `{keyword}` header"),
    )
}

/// Parse a direction keyword, reporting `E101` on this line when invalid.
pub(crate) fn parse_direction(line: &SourceLine<'_>, text: &str) -> Result<Direction> {
    text.parse().map_err(|_| {
        line.syntax_error(
            ErrorCode::E101,
            format!("`{text}` is not a direction (expected TB, TD, BT, LR or RL)"),
        )
    })
}
