//! Class diagram AST.

use std::fmt;

use crate::{
    ast::{DiagramHeader, Direction},
    position::Position,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDiagram {
    pub header: DiagramHeader,
    pub direction: Option<Direction>,
    pub classes: Vec<ClassDefinition>,
    /// Members written outside a class body (`Foo : +int id`).
    pub members: Vec<OwnedMember>,
    pub relationships: Vec<ClassRelationship>,
    pub annotations: Vec<ClassAnnotation>,
    pub notes: Vec<ClassNote>,
}

/// A `class` declaration, bare or brace-bodied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDefinition {
    pub id: String,
    /// Generic parameter written as `Foo~T~`.
    pub generic: Option<String>,
    pub label: Option<String>,
    pub members: Vec<ClassMember>,
    /// Annotation written inside the body (`<<interface>>`).
    pub annotation: Option<String>,
    pub position: Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    /// `+`
    Public,
    /// `-`
    Private,
    /// `#`
    Protected,
    /// `~`
    Package,
}

impl Visibility {
    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            '+' => Some(Visibility::Public),
            '-' => Some(Visibility::Private),
            '#' => Some(Visibility::Protected),
            '~' => Some(Visibility::Package),
            _ => None,
        }
    }
}

/// Classifier suffix on a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classifier {
    /// `$`
    Static,
    /// `*`
    Abstract,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberKind {
    Field,
    /// Raw text between the parentheses.
    Method { parameters: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassMember {
    pub visibility: Option<Visibility>,
    pub name: String,
    pub kind: MemberKind,
    /// Field type or method return type.
    pub type_name: Option<String>,
    pub classifier: Option<Classifier>,
    pub position: Position,
}

impl ClassMember {
    pub fn is_method(&self) -> bool {
        matches!(self.kind, MemberKind::Method { .. })
    }
}

/// A member declared with the `Owner : member` shorthand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedMember {
    pub owner: String,
    pub member: ClassMember,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationKind {
    Inheritance,
    Realization,
    Composition,
    Aggregation,
    Dependency,
    Association,
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RelationKind::Inheritance => "inheritance",
            RelationKind::Realization => "realization",
            RelationKind::Composition => "composition",
            RelationKind::Aggregation => "aggregation",
            RelationKind::Dependency => "dependency",
            RelationKind::Association => "association",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineStyle {
    /// `--`
    Solid,
    /// `..`
    Dashed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassRelationship {
    pub from: String,
    pub to: String,
    pub kind: RelationKind,
    pub line: LineStyle,
    /// The arrow exactly as written, e.g. `<|--`.
    pub symbol: String,
    pub from_cardinality: Option<String>,
    pub to_cardinality: Option<String>,
    pub label: Option<String>,
    pub position: Position,
}

/// `<<annotation>> ClassName` outside a class body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassAnnotation {
    pub class: String,
    pub annotation: String,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassNote {
    /// `None` for a free-floating note.
    pub target: Option<String>,
    pub text: String,
    pub position: Position,
}
