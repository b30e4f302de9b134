//! Error types for filter expression compilation.

use thiserror::Error;

use crate::lexer::LexError;
use crate::parser::SyntaxError;

/// A specialized Result type for strict query compilation.
pub type QueryResult<T> = Result<T, QueryError>;

/// Errors reported by [`parse_strict`](crate::parse_strict).
///
/// The lenient entry points never return these; they record the same
/// problems as diagnostics and keep going.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QueryError {
    /// The filter expression is empty or only whitespace.
    #[error("filter expression is empty")]
    Empty,

    /// A character matched no token class.
    #[error("{0}")]
    Lex(#[from] LexError),

    /// A run of tokens did not form a statement and was skipped.
    #[error("{0}")]
    Syntax(#[from] SyntaxError),
}

impl QueryError {
    /// Creates a lexical error for `character` at byte offset `position`.
    pub fn lex(character: char, position: usize) -> Self {
        QueryError::Lex(LexError {
            character,
            position,
        })
    }

    /// Creates a syntax error for the skipped `text` at byte offset `position`.
    pub fn syntax(text: impl Into<String>, position: usize) -> Self {
        QueryError::Syntax(SyntaxError {
            text: text.into(),
            position,
        })
    }

    /// Returns the byte offset the error refers to, if any.
    pub fn position(&self) -> Option<usize> {
        match self {
            QueryError::Empty => None,
            QueryError::Lex(e) => Some(e.position),
            QueryError::Syntax(e) => Some(e.position),
        }
    }
}
