//! Time-oriented diagrams: gantt, journey and timeline.

use std::{fmt, str::FromStr};

use crate::{ast::DiagramHeader, position::Position};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GanttDiagram {
    pub header: DiagramHeader,
    pub title: Option<String>,
    pub settings: Vec<GanttSetting>,
    pub sections: Vec<GanttSection>,
}

impl GanttDiagram {
    /// Value of a metadata setting such as `dateFormat`.
    pub fn setting(&self, key: &str) -> Option<&str> {
        self.settings
            .iter()
            .find(|setting| setting.key == key)
            .map(|setting| setting.value.as_str())
    }

    /// All tasks across every section, in source order.
    pub fn tasks(&self) -> impl Iterator<Item = &GanttTask> {
        self.sections.iter().flat_map(|section| section.tasks.iter())
    }
}

/// A metadata line like `dateFormat YYYY-MM-DD` or a bare flag like `topAxis`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GanttSetting {
    pub key: String,
    /// Empty for flags.
    pub value: String,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GanttSection {
    pub name: String,
    pub tasks: Vec<GanttTask>,
    pub position: Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskStatus {
    Done,
    Active,
    Crit,
    Milestone,
}

impl FromStr for TaskStatus {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "done" => Ok(TaskStatus::Done),
            "active" => Ok(TaskStatus::Active),
            "crit" => Ok(TaskStatus::Crit),
            "milestone" => Ok(TaskStatus::Milestone),
            _ => Err("Unsupported task status"),
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskStatus::Done => "done",
            TaskStatus::Active => "active",
            TaskStatus::Crit => "crit",
            TaskStatus::Milestone => "milestone",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GanttTask {
    pub name: String,
    pub id: Option<String>,
    pub statuses: Vec<TaskStatus>,
    /// Explicit start date; `None` when the task starts `after` others.
    pub start_date: Option<String>,
    /// Duration (`5d`) or end date, as written.
    pub end_date: Option<String>,
    /// Task ids from `after a b`, in order.
    pub dependencies: Vec<String>,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JourneyDiagram {
    pub header: DiagramHeader,
    pub title: Option<String>,
    pub sections: Vec<JourneySection>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JourneySection {
    pub name: String,
    pub tasks: Vec<JourneyTask>,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JourneyTask {
    pub name: String,
    pub score: i64,
    pub actors: Vec<String>,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineDiagram {
    pub header: DiagramHeader,
    pub title: Option<String>,
    pub sections: Vec<TimelineSection>,
    /// Periods written before the first section.
    pub periods: Vec<TimelinePeriod>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineSection {
    pub name: String,
    pub periods: Vec<TimelinePeriod>,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelinePeriod {
    pub label: String,
    pub events: Vec<String>,
    pub position: Position,
}
