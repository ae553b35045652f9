//! Merval Core Types and Definitions
//!
//! This crate provides the foundational types shared by the Merval parser
//! and linter. It includes:
//!
//! - **Positions**: 1-indexed source locations ([`position::Position`])
//! - **AST**: Typed abstract syntax trees, one shape per diagram kind
//!   ([`ast`] module)

pub mod ast;
pub mod position;
