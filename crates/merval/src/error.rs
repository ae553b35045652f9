//! Error types for Merval operations.
//!
//! Validation findings are never errors here; they come back inside a
//! [`LintReport`](crate::LintReport). [`MervalError`] covers the failures
//! that stop an operation outright.

use std::io;

use thiserror::Error;

use merval_parser::error::ParseError;

use crate::config::ConfigError;

/// The main error type for Merval operations.
#[derive(Debug, Error)]
pub enum MervalError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A parse failure, kept together with the block it came from.
    #[error("{err}")]
    Parse { err: ParseError, src: String },
}

impl MervalError {
    /// Create a new `Parse` error with the associated source text.
    pub fn new_parse_error(err: ParseError, src: impl Into<String>) -> Self {
        Self::Parse {
            err,
            src: src.into(),
        }
    }

    /// The underlying parse error, if this is one.
    pub fn parse_error(&self) -> Option<&ParseError> {
        match self {
            Self::Parse { err, .. } => Some(err),
            _ => None,
        }
    }
}
