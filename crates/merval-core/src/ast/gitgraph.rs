//! Git graph AST.

use crate::{
    ast::{DiagramHeader, Direction},
    position::Position,
};

/// Commit types accepted by `type:` options.
pub const COMMIT_TYPES: [&str; 3] = ["NORMAL", "REVERSE", "HIGHLIGHT"];

/// Branch every git graph starts on.
pub const DEFAULT_BRANCH: &str = "main";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitGraphDiagram {
    pub header: DiagramHeader,
    pub direction: Option<Direction>,
    pub commands: Vec<GitCommand>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitCommandKind {
    Commit {
        id: Option<String>,
        message: Option<String>,
        tag: Option<String>,
        commit_type: Option<String>,
    },
    Branch {
        name: String,
        order: Option<i64>,
    },
    Checkout {
        branch: String,
    },
    Merge {
        branch: String,
        id: Option<String>,
        tag: Option<String>,
        commit_type: Option<String>,
    },
    CherryPick {
        id: String,
        parent: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitCommand {
    pub kind: GitCommandKind,
    pub position: Position,
}
