//! Typed abstract syntax trees for Mermaid-style diagrams.
//!
//! Every diagram kind has its own concrete root type, wrapped in the closed
//! [`Diagram`] enum. All roots share a [`DiagramHeader`] carrying the kind
//! tag, the raw source text and the header position. Sub-entities (members,
//! transitions, boundaries, relationships, ...) carry their own
//! [`Position`]. Cross-references between entities are plain identifier
//! strings; resolving them is left to validation.
//!
//! # Organization
//!
//! - [`flowchart`] - `flowchart` / `graph` diagrams
//! - [`sequence`] - sequence diagrams
//! - [`class`] - class diagrams
//! - [`state`] - state diagrams (`stateDiagram`, `stateDiagram-v2`)
//! - [`er`] - entity relationship diagrams
//! - [`chart`] - pie, sankey, quadrant and xy charts
//! - [`schedule`] - gantt, journey and timeline diagrams
//! - [`gitgraph`] - git graphs
//! - [`mindmap`] - mindmaps
//! - [`c4`] - the C4 family

pub mod c4;
pub mod chart;
pub mod class;
pub mod er;
pub mod flowchart;
pub mod gitgraph;
pub mod mindmap;
pub mod schedule;
pub mod sequence;
pub mod state;

use std::{fmt, str::FromStr};

use crate::position::Position;

pub use c4::C4Diagram;
pub use chart::{PieDiagram, QuadrantDiagram, SankeyDiagram, XyChartDiagram};
pub use class::ClassDiagram;
pub use er::ErDiagram;
pub use flowchart::FlowchartDiagram;
pub use gitgraph::GitGraphDiagram;
pub use mindmap::MindmapDiagram;
pub use schedule::{GanttDiagram, JourneyDiagram, TimelineDiagram};
pub use sequence::SequenceDiagram;
pub use state::StateDiagram;

/// Identifies one diagram language variant.
///
/// The names returned by [`DiagramKind::as_str`] are the header keywords
/// that introduce each kind in source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagramKind {
    Flowchart,
    Graph,
    Sequence,
    Class,
    State,
    StateV2,
    Er,
    Pie,
    Gantt,
    Journey,
    GitGraph,
    Mindmap,
    Timeline,
    Sankey,
    Quadrant,
    XyChart,
    C4Context,
    C4Container,
    C4Component,
    C4Dynamic,
    C4Deployment,
    /// Fallback for headers no parser recognises.
    Unknown,
}

impl DiagramKind {
    /// Every kind, in declaration order.
    pub const ALL: [DiagramKind; 22] = [
        DiagramKind::Flowchart,
        DiagramKind::Graph,
        DiagramKind::Sequence,
        DiagramKind::Class,
        DiagramKind::State,
        DiagramKind::StateV2,
        DiagramKind::Er,
        DiagramKind::Pie,
        DiagramKind::Gantt,
        DiagramKind::Journey,
        DiagramKind::GitGraph,
        DiagramKind::Mindmap,
        DiagramKind::Timeline,
        DiagramKind::Sankey,
        DiagramKind::Quadrant,
        DiagramKind::XyChart,
        DiagramKind::C4Context,
        DiagramKind::C4Container,
        DiagramKind::C4Component,
        DiagramKind::C4Dynamic,
        DiagramKind::C4Deployment,
        DiagramKind::Unknown,
    ];

    /// The header keyword for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagramKind::Flowchart => "flowchart",
            DiagramKind::Graph => "graph",
            DiagramKind::Sequence => "sequenceDiagram",
            DiagramKind::Class => "classDiagram",
            DiagramKind::State => "stateDiagram",
            DiagramKind::StateV2 => "stateDiagram-v2",
            DiagramKind::Er => "erDiagram",
            DiagramKind::Pie => "pie",
            DiagramKind::Gantt => "gantt",
            DiagramKind::Journey => "journey",
            DiagramKind::GitGraph => "gitGraph",
            DiagramKind::Mindmap => "mindmap",
            DiagramKind::Timeline => "timeline",
            DiagramKind::Sankey => "sankey-beta",
            DiagramKind::Quadrant => "quadrantChart",
            DiagramKind::XyChart => "xychart-beta",
            DiagramKind::C4Context => "C4Context",
            DiagramKind::C4Container => "C4Container",
            DiagramKind::C4Component => "C4Component",
            DiagramKind::C4Dynamic => "C4Dynamic",
            DiagramKind::C4Deployment => "C4Deployment",
            DiagramKind::Unknown => "unknown",
        }
    }

    /// Returns `true` for the five C4 kinds.
    pub fn is_c4(&self) -> bool {
        matches!(
            self,
            DiagramKind::C4Context
                | DiagramKind::C4Container
                | DiagramKind::C4Component
                | DiagramKind::C4Dynamic
                | DiagramKind::C4Deployment
        )
    }
}

impl FromStr for DiagramKind {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DiagramKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or("Unsupported diagram kind")
    }
}

impl fmt::Display for DiagramKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Layout direction keyword shared by several kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    TopBottom,
    /// `TD`, a synonym of `TB` kept distinct so the source spelling survives.
    TopDown,
    BottomTop,
    LeftRight,
    RightLeft,
}

impl FromStr for Direction {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TB" => Ok(Direction::TopBottom),
            "TD" => Ok(Direction::TopDown),
            "BT" => Ok(Direction::BottomTop),
            "LR" => Ok(Direction::LeftRight),
            "RL" => Ok(Direction::RightLeft),
            _ => Err("Unsupported direction"),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Direction::TopBottom => "TB",
            Direction::TopDown => "TD",
            Direction::BottomTop => "BT",
            Direction::LeftRight => "LR",
            Direction::RightLeft => "RL",
        };
        write!(f, "{s}")
    }
}

/// Data common to every diagram root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramHeader {
    /// Kind tag as written in the header (e.g. `stateDiagram-v2`).
    pub kind: DiagramKind,
    /// The complete source text the diagram was parsed from.
    pub source: String,
    /// Position of the header line.
    pub position: Position,
}

impl DiagramHeader {
    pub fn new(kind: DiagramKind, source: impl Into<String>, position: Position) -> Self {
        Self {
            kind,
            source: source.into(),
            position,
        }
    }
}

/// Fallback capture for unrecognised diagram headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenericDiagram {
    pub header: DiagramHeader,
    /// The raw source split into lines.
    pub lines: Vec<String>,
}

/// A parsed diagram of any supported kind.
///
/// The set of kinds is closed; match on the variant to reach the
/// kind-specific fields.
#[derive(Debug, Clone, PartialEq)]
pub enum Diagram {
    Flowchart(FlowchartDiagram),
    Sequence(SequenceDiagram),
    Class(ClassDiagram),
    State(StateDiagram),
    Er(ErDiagram),
    Pie(PieDiagram),
    Gantt(GanttDiagram),
    Journey(JourneyDiagram),
    GitGraph(GitGraphDiagram),
    Mindmap(MindmapDiagram),
    Timeline(TimelineDiagram),
    Sankey(SankeyDiagram),
    Quadrant(QuadrantDiagram),
    XyChart(XyChartDiagram),
    C4(C4Diagram),
    Generic(GenericDiagram),
}

impl Diagram {
    /// Borrow the header shared by all kinds.
    pub fn header(&self) -> &DiagramHeader {
        match self {
            Diagram::Flowchart(d) => &d.header,
            Diagram::Sequence(d) => &d.header,
            Diagram::Class(d) => &d.header,
            Diagram::State(d) => &d.header,
            Diagram::Er(d) => &d.header,
            Diagram::Pie(d) => &d.header,
            Diagram::Gantt(d) => &d.header,
            Diagram::Journey(d) => &d.header,
            Diagram::GitGraph(d) => &d.header,
            Diagram::Mindmap(d) => &d.header,
            Diagram::Timeline(d) => &d.header,
            Diagram::Sankey(d) => &d.header,
            Diagram::Quadrant(d) => &d.header,
            Diagram::XyChart(d) => &d.header,
            Diagram::C4(d) => &d.header,
            Diagram::Generic(d) => &d.header,
        }
    }

    /// The kind tag of this diagram.
    pub fn kind(&self) -> DiagramKind {
        self.header().kind
    }

    /// Position of the header line.
    pub fn position(&self) -> Position {
        self.header().position
    }

    /// The raw source text.
    pub fn source(&self) -> &str {
        &self.header().source
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trips_through_keyword() {
        for kind in DiagramKind::ALL {
            assert_eq!(kind.as_str().parse::<DiagramKind>(), Ok(kind));
        }
    }

    #[test]
    fn test_kind_rejects_unknown_keyword() {
        assert!("flowchart-elk".parse::<DiagramKind>().is_err());
    }

    #[test]
    fn test_is_c4() {
        assert!(DiagramKind::C4Deployment.is_c4());
        assert!(!DiagramKind::Class.is_c4());
    }

    #[test]
    fn test_direction_keeps_spelling() {
        assert_eq!("TD".parse::<Direction>(), Ok(Direction::TopDown));
        assert_eq!(Direction::TopDown.to_string(), "TD");
        assert!("XY".parse::<Direction>().is_err());
    }

    #[test]
    fn test_diagram_accessors() {
        let diagram = Diagram::Generic(GenericDiagram {
            header: DiagramHeader::new(DiagramKind::Unknown, "foo\nbar", Position::new(4, 1)),
            lines: vec!["foo".to_string(), "bar".to_string()],
        });

        assert_eq!(diagram.kind(), DiagramKind::Unknown);
        assert_eq!(diagram.position(), Position::new(4, 1));
        assert_eq!(diagram.source(), "foo\nbar");
    }
}
