//! C4 family AST (context, container, component, dynamic, deployment).
//!
//! Boundaries form a tree: each [`C4Boundary`] owns the elements and
//! boundaries written between its opening `{` and matching `}`. Tree depth
//! equals brace depth in the source. Relationships are never scoped to a
//! boundary and always live on the [`C4Diagram`] root.

use std::fmt;

use crate::{ast::DiagramHeader, position::Position};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct C4Diagram {
    pub header: DiagramHeader,
    pub title: Option<String>,
    /// Elements declared outside any boundary.
    pub elements: Vec<C4Element>,
    /// Top-level boundaries.
    pub boundaries: Vec<C4Boundary>,
    pub relationships: Vec<C4Relationship>,
    pub styles: Vec<C4Style>,
}

impl C4Diagram {
    /// Maximum boundary nesting depth (0 when there are no boundaries).
    pub fn depth(&self) -> usize {
        self.boundaries
            .iter()
            .map(C4Boundary::depth)
            .max()
            .unwrap_or(0)
    }
}

/// Element constructor name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum C4ElementKind {
    Person,
    PersonExt,
    System,
    SystemExt,
    SystemDb,
    SystemDbExt,
    SystemQueue,
    SystemQueueExt,
    Container,
    ContainerExt,
    ContainerDb,
    ContainerQueue,
    Component,
    ComponentExt,
    ComponentDb,
    ComponentQueue,
    Node,
    DeploymentNode,
}

impl C4ElementKind {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        let kind = match keyword {
            "Person" => C4ElementKind::Person,
            "Person_Ext" => C4ElementKind::PersonExt,
            "System" => C4ElementKind::System,
            "System_Ext" => C4ElementKind::SystemExt,
            "SystemDb" => C4ElementKind::SystemDb,
            "SystemDb_Ext" => C4ElementKind::SystemDbExt,
            "SystemQueue" => C4ElementKind::SystemQueue,
            "SystemQueue_Ext" => C4ElementKind::SystemQueueExt,
            "Container" => C4ElementKind::Container,
            "Container_Ext" => C4ElementKind::ContainerExt,
            "ContainerDb" => C4ElementKind::ContainerDb,
            "ContainerQueue" => C4ElementKind::ContainerQueue,
            "Component" => C4ElementKind::Component,
            "Component_Ext" => C4ElementKind::ComponentExt,
            "ComponentDb" => C4ElementKind::ComponentDb,
            "ComponentQueue" => C4ElementKind::ComponentQueue,
            "Node" => C4ElementKind::Node,
            "Deployment_Node" => C4ElementKind::DeploymentNode,
            _ => return None,
        };
        Some(kind)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            C4ElementKind::Person => "Person",
            C4ElementKind::PersonExt => "Person_Ext",
            C4ElementKind::System => "System",
            C4ElementKind::SystemExt => "System_Ext",
            C4ElementKind::SystemDb => "SystemDb",
            C4ElementKind::SystemDbExt => "SystemDb_Ext",
            C4ElementKind::SystemQueue => "SystemQueue",
            C4ElementKind::SystemQueueExt => "SystemQueue_Ext",
            C4ElementKind::Container => "Container",
            C4ElementKind::ContainerExt => "Container_Ext",
            C4ElementKind::ContainerDb => "ContainerDb",
            C4ElementKind::ContainerQueue => "ContainerQueue",
            C4ElementKind::Component => "Component",
            C4ElementKind::ComponentExt => "Component_Ext",
            C4ElementKind::ComponentDb => "ComponentDb",
            C4ElementKind::ComponentQueue => "ComponentQueue",
            C4ElementKind::Node => "Node",
            C4ElementKind::DeploymentNode => "Deployment_Node",
        }
    }

    /// Container and component constructors take a technology argument
    /// in third position.
    pub fn has_technology(&self) -> bool {
        matches!(
            self,
            C4ElementKind::Container
                | C4ElementKind::ContainerExt
                | C4ElementKind::ContainerDb
                | C4ElementKind::ContainerQueue
                | C4ElementKind::Component
                | C4ElementKind::ComponentExt
                | C4ElementKind::ComponentDb
                | C4ElementKind::ComponentQueue
        )
    }
}

impl fmt::Display for C4ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct C4Element {
    pub kind: C4ElementKind,
    pub id: String,
    pub label: Option<String>,
    pub technology: Option<String>,
    pub description: Option<String>,
    pub sprite: Option<String>,
    pub tags: Option<String>,
    pub link: Option<String>,
    pub position: Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum C4BoundaryKind {
    Boundary,
    EnterpriseBoundary,
    SystemBoundary,
    ContainerBoundary,
    DeploymentNode,
    Node,
}

impl C4BoundaryKind {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        let kind = match keyword {
            "Boundary" => C4BoundaryKind::Boundary,
            "Enterprise_Boundary" => C4BoundaryKind::EnterpriseBoundary,
            "System_Boundary" => C4BoundaryKind::SystemBoundary,
            "Container_Boundary" => C4BoundaryKind::ContainerBoundary,
            "Deployment_Node" => C4BoundaryKind::DeploymentNode,
            "Node" => C4BoundaryKind::Node,
            _ => return None,
        };
        Some(kind)
    }
}

/// A named grouping scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct C4Boundary {
    pub kind: C4BoundaryKind,
    pub id: String,
    pub label: Option<String>,
    /// Third positional argument (`type` for boundaries and nodes).
    pub boundary_type: Option<String>,
    pub description: Option<String>,
    pub sprite: Option<String>,
    pub tags: Option<String>,
    pub link: Option<String>,
    pub elements: Vec<C4Element>,
    pub boundaries: Vec<C4Boundary>,
    pub position: Position,
}

impl C4Boundary {
    /// Nesting depth counting this boundary as 1.
    pub fn depth(&self) -> usize {
        1 + self
            .boundaries
            .iter()
            .map(C4Boundary::depth)
            .max()
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum C4RelationshipKind {
    Rel,
    RelBack,
    RelNeighbor,
    RelDown,
    RelUp,
    RelLeft,
    RelRight,
    BiRel,
}

impl C4RelationshipKind {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        let kind = match keyword {
            "Rel" => C4RelationshipKind::Rel,
            "Rel_Back" => C4RelationshipKind::RelBack,
            "Rel_Neighbor" => C4RelationshipKind::RelNeighbor,
            "Rel_Down" | "Rel_D" => C4RelationshipKind::RelDown,
            "Rel_Up" | "Rel_U" => C4RelationshipKind::RelUp,
            "Rel_Left" | "Rel_L" => C4RelationshipKind::RelLeft,
            "Rel_Right" | "Rel_R" => C4RelationshipKind::RelRight,
            "BiRel" => C4RelationshipKind::BiRel,
            _ => return None,
        };
        Some(kind)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct C4Relationship {
    pub kind: C4RelationshipKind,
    pub from: String,
    pub to: String,
    pub label: Option<String>,
    pub technology: Option<String>,
    pub description: Option<String>,
    pub sprite: Option<String>,
    pub tags: Option<String>,
    pub link: Option<String>,
    pub position: Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum C4StyleKind {
    UpdateElementStyle,
    UpdateRelStyle,
    UpdateBoundaryStyle,
    UpdateLayoutConfig,
    AddElementTag,
    AddRelTag,
}

impl C4StyleKind {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        let kind = match keyword {
            "UpdateElementStyle" => C4StyleKind::UpdateElementStyle,
            "UpdateRelStyle" => C4StyleKind::UpdateRelStyle,
            "UpdateBoundaryStyle" => C4StyleKind::UpdateBoundaryStyle,
            "UpdateLayoutConfig" => C4StyleKind::UpdateLayoutConfig,
            "AddElementTag" => C4StyleKind::AddElementTag,
            "AddRelTag" => C4StyleKind::AddRelTag,
            _ => return None,
        };
        Some(kind)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            C4StyleKind::UpdateElementStyle => "UpdateElementStyle",
            C4StyleKind::UpdateRelStyle => "UpdateRelStyle",
            C4StyleKind::UpdateBoundaryStyle => "UpdateBoundaryStyle",
            C4StyleKind::UpdateLayoutConfig => "UpdateLayoutConfig",
            C4StyleKind::AddElementTag => "AddElementTag",
            C4StyleKind::AddRelTag => "AddRelTag",
        }
    }

    /// Number of leading positional arguments that name diagram ids.
    pub fn target_count(&self) -> usize {
        match self {
            C4StyleKind::UpdateElementStyle | C4StyleKind::UpdateBoundaryStyle => 1,
            C4StyleKind::UpdateRelStyle => 2,
            C4StyleKind::UpdateLayoutConfig
            | C4StyleKind::AddElementTag
            | C4StyleKind::AddRelTag => 0,
        }
    }
}

/// A style or layout override statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct C4Style {
    pub kind: C4StyleKind,
    /// Element or relationship endpoint ids the override applies to.
    pub targets: Vec<String>,
    /// Remaining arguments: `$key=value` pairs keep their key, positional
    /// values have an empty key.
    pub properties: Vec<(String, String)>,
    pub position: Position,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::DiagramKind;

    fn boundary(id: &str, children: Vec<C4Boundary>) -> C4Boundary {
        C4Boundary {
            kind: C4BoundaryKind::Boundary,
            id: id.to_string(),
            label: None,
            boundary_type: None,
            description: None,
            sprite: None,
            tags: None,
            link: None,
            elements: Vec::new(),
            boundaries: children,
            position: Position::default(),
        }
    }

    #[test]
    fn test_depth_follows_deepest_branch() {
        let diagram = C4Diagram {
            header: DiagramHeader::new(DiagramKind::C4Context, "", Position::default()),
            title: None,
            elements: Vec::new(),
            boundaries: vec![
                boundary("a", vec![]),
                boundary("b", vec![boundary("c", vec![boundary("d", vec![])])]),
            ],
            relationships: Vec::new(),
            styles: Vec::new(),
        };

        assert_eq!(diagram.depth(), 3);
    }

    #[test]
    fn test_relationship_aliases() {
        assert_eq!(
            C4RelationshipKind::from_keyword("Rel_D"),
            Some(C4RelationshipKind::RelDown)
        );
        assert_eq!(C4RelationshipKind::from_keyword("Rel_X"), None);
    }

    #[test]
    fn test_technology_only_for_containers_and_components() {
        assert!(C4ElementKind::ContainerDb.has_technology());
        assert!(!C4ElementKind::System.has_technology());
    }
}
