//! Chart-like diagrams: pie, sankey, quadrant and xy charts.

use crate::{ast::DiagramHeader, position::Position};

#[derive(Debug, Clone, PartialEq)]
pub struct PieDiagram {
    pub header: DiagramHeader,
    pub show_data: bool,
    pub title: Option<String>,
    pub slices: Vec<PieSlice>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PieSlice {
    pub label: String,
    /// Always strictly positive.
    pub value: f64,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SankeyDiagram {
    pub header: DiagramHeader,
    pub links: Vec<SankeyLink>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SankeyLink {
    pub source: String,
    pub target: String,
    /// Always strictly positive.
    pub value: f64,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuadrantDiagram {
    pub header: DiagramHeader,
    pub title: Option<String>,
    pub x_axis: Option<QuadrantAxis>,
    pub y_axis: Option<QuadrantAxis>,
    /// Labels for quadrants 1 to 4.
    pub quadrants: [Option<String>; 4],
    pub points: Vec<QuadrantPoint>,
    pub class_defs: Vec<QuadrantClassDef>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuadrantAxis {
    pub low: String,
    pub high: Option<String>,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuadrantPoint {
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub class: Option<String>,
    /// Inline style text after the coordinates.
    pub style: Option<String>,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuadrantClassDef {
    pub name: String,
    pub style: String,
    pub position: Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Orientation {
    #[default]
    Vertical,
    Horizontal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct XyChartDiagram {
    pub header: DiagramHeader,
    pub orientation: Orientation,
    pub title: Option<String>,
    pub x_axis: Axis,
    pub y_axis: Axis,
    pub series: Vec<Series>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AxisRange {
    Categorical(Vec<String>),
    Numeric { min: f64, max: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Axis {
    pub title: Option<String>,
    pub range: AxisRange,
    pub position: Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeriesKind {
    Bar,
    Line,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub kind: SeriesKind,
    pub name: Option<String>,
    pub values: Vec<f64>,
    pub position: Position,
}
