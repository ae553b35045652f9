//! Error and diagnostic system for the Merval parser.
//!
//! Two kinds of failure come out of this crate:
//!
//! - [`ParseError`] is a hard failure. Parsing stops at the first header,
//!   syntax or structural problem and no partial AST is returned.
//! - [`Diagnostic`] is an advisory finding produced by validation. Any
//!   number of them can be collected for one diagram.
//!
//! Both carry an [`ErrorCode`] so findings can be searched for, configured
//! and documented by code.
//!
//! # Example
//!
//! ```
//! # use merval_core::position::Position;
//! # use merval_parser::error::{Diagnostic, ErrorCode};
//!
//! let diag = Diagnostic::error("state `Idle` is defined multiple times")
//!     .with_code(ErrorCode::E300)
//!     .with_label(Position::new(7, 5), "duplicate definition")
//!     .with_secondary_label(Position::new(3, 5), "first defined here")
//!     .with_help("remove the duplicate or use a different name");
//!
//! assert_eq!(diag.position(), Position::new(7, 5));
//! ```

mod collector;
mod diagnostic;
mod error_code;
mod label;
mod parse_error;
mod severity;

pub(crate) use collector::DiagnosticCollector;

pub use diagnostic::Diagnostic;
pub use error_code::ErrorCode;
pub use label::{Label, LabelRole};
pub use parse_error::{ParseError, ParseErrorKind, Result};
pub use severity::Severity;
