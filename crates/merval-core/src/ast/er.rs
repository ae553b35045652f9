//! Entity relationship diagram AST.

use crate::{
    ast::{DiagramHeader, Direction},
    position::Position,
};

/// Attribute key markers accepted by ER diagrams.
pub const ATTRIBUTE_KEYS: [&str; 3] = ["PK", "FK", "UK"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErDiagram {
    pub header: DiagramHeader,
    pub direction: Option<Direction>,
    pub entities: Vec<Entity>,
    pub relationships: Vec<ErRelationship>,
}

/// One entity declaration. The same entity may be declared more than once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    pub name: String,
    pub alias: Option<String>,
    /// `true` when declared with a `{ ... }` body, even an empty one.
    pub has_body: bool,
    pub attributes: Vec<Attribute>,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub data_type: String,
    pub name: String,
    /// Key markers as written; validated against [`ATTRIBUTE_KEYS`].
    pub keys: Vec<String>,
    pub comment: Option<String>,
    pub position: Position,
}

impl Attribute {
    pub fn is_primary_key(&self) -> bool {
        self.keys.iter().any(|key| key == "PK")
    }
}

/// Crow's-foot cardinality on one side of a relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cardinality {
    /// `|o` / `o|`
    ZeroOrOne,
    /// `||`
    ExactlyOne,
    /// `}o` / `o{`
    ZeroOrMore,
    /// `}|` / `|{`
    OneOrMore,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErRelationship {
    pub left: String,
    pub right: String,
    pub left_cardinality: Cardinality,
    pub right_cardinality: Cardinality,
    /// `--` is identifying, `..` is not.
    pub identifying: bool,
    pub label: Option<String>,
    pub position: Position,
}
