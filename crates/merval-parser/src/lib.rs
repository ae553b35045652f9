//! # Merval Parser
//!
//! Structural parsing and validation for Mermaid-style diagram text. This
//! crate turns one diagram block into a typed [`Diagram`] and checks it for
//! problems that a renderer would otherwise hit late or silently ignore.
//!
//! The pipeline has two stages:
//!
//! 1. **Parse** - the header picks a parser; the parser walks the body line
//!    by line and fails on the first malformed line with a [`ParseError`]
//! 2. **Validate** - the rule set for the diagram kind runs in full and
//!    returns every [`Diagnostic`] it finds
//!
//! ## Usage
//!
//! ```
//! # use merval_parser::{parse, validate_diagram, error::ParseError};
//! # use merval_core::ast::DiagramKind;
//!
//! fn main() -> Result<(), ParseError> {
//!     let source = "
//! sequenceDiagram
//!     participant Alice
//!     Alice->>Bob: Hello
//! ";
//!
//!     let diagram = parse(source)?;
//!     assert_eq!(diagram.kind(), DiagramKind::Sequence);
//!
//!     let diagnostics = validate_diagram(&diagram);
//!     assert_eq!(diagnostics[0].message(), "message references undefined participant `Bob`");
//!     Ok(())
//! }
//! ```

mod dispatch;

pub mod error;
pub mod lexer;
pub mod parser;
pub mod validate;

use std::collections::BTreeSet;

pub use dispatch::{detect_kind, parse, parse_as, parse_with_offset};
pub use error::{Diagnostic, ParseError};
pub use validate::validate_diagram;

pub use merval_core::ast::{Diagram, DiagramKind};

/// Header keywords of every kind a registered parser accepts.
///
/// ```
/// let types = merval_parser::supported_types();
///
/// assert!(types.contains("stateDiagram-v2"));
/// assert!(types.contains("C4Deployment"));
/// assert!(!types.contains("unknown"));
/// ```
pub fn supported_types() -> BTreeSet<&'static str> {
    parser::registry()
        .iter()
        .flat_map(|parser| parser.supported_types())
        .map(DiagramKind::as_str)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_types_cover_known_kinds() {
        let types = supported_types();

        assert_eq!(types.len(), DiagramKind::ALL.len() - 1);
        for kind in DiagramKind::ALL {
            assert_eq!(types.contains(kind.as_str()), kind != DiagramKind::Unknown);
        }
    }
}
