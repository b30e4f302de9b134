//! Compiler for search-style filter expressions.
//!
//! Turns a single-line query such as
//! `status:open -priority:>3 created:2024-01-01..2024-06-01 "exact phrase"`
//! into an ordered list of typed [`Clause`]s for a downstream query engine.
//!
//! The pipeline runs in three passes: [`lexer`] turns text into tokens,
//! [`parser`] builds a [`SyntaxTree`], and [`resolver`] folds the tree into
//! clauses.
//!
//! # Supported Syntax
//!
//! ## Terms
//! - `word` - A bare search term
//! - `"exact phrase"` - A quoted term; `\"` escapes a quote
//! - `a\:b` - Backslash escapes `:`, `.` and whitespace inside a term
//!
//! ## Fields
//! - `field:value` - Field equals value
//! - `field:>n`, `field:>=n`, `field:<n`, `field:<=n` - Comparisons against a
//!   number or date
//! - `field:a..b` - Closed range
//! - `field:a..*`, `field:*..b` - Open ranges, resolved as `>=` / `<=`
//!
//! ## Negation
//! - `NOT stmt`, `-stmt` - Exclude matches; each prefix toggles
//!
//! Statements are implicitly AND-ed. Input that does not form a statement is
//! skipped and reported through [`parse_with_diagnostics`].
//!
//! # Example
//!
//! ```
//! use searchq::{parse, CompareOp, Filter, Value};
//!
//! let clauses = parse("status:open -priority:>3");
//! assert_eq!(clauses.len(), 2);
//! assert_eq!(clauses[0].filter, Filter::field("status", "open"));
//! assert_eq!(
//!     clauses[1].filter,
//!     Filter::compare(CompareOp::Gt, "priority", Value::Number(3.0))
//! );
//! assert!(clauses[1].exclude);
//! ```

pub mod clause;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod resolver;
pub mod syntax;

pub use clause::{to_query, Clause, CompareOp, Filter, Value};
pub use error::{QueryError, QueryResult};
pub use lexer::{tokenize, tokenize_with_errors, LexError, Lexer, LexerResult, Token, TokenKind};
pub use parser::{Parser, SyntaxError};
pub use syntax::SyntaxTree;

/// Problems found while compiling a query.
///
/// None of these stop compilation; they explain why the clause list may be
/// shorter than the input suggests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    /// Characters no token class matched.
    pub lex_errors: Vec<LexError>,
    /// Token runs that did not form a statement.
    pub syntax_errors: Vec<SyntaxError>,
}

impl Diagnostics {
    /// Returns true if compilation was clean.
    pub fn is_empty(&self) -> bool {
        self.lex_errors.is_empty() && self.syntax_errors.is_empty()
    }

    /// Total number of problems.
    pub fn len(&self) -> usize {
        self.lex_errors.len() + self.syntax_errors.len()
    }

    /// All problems as errors, ordered by position.
    pub fn errors(&self) -> Vec<QueryError> {
        let mut errors: Vec<QueryError> = self
            .lex_errors
            .iter()
            .cloned()
            .map(QueryError::Lex)
            .chain(self.syntax_errors.iter().cloned().map(QueryError::Syntax))
            .collect();
        errors.sort_by_key(|e| e.position());
        errors
    }

    /// The earliest problem in the input, if any.
    pub fn first_error(&self) -> Option<QueryError> {
        self.errors().into_iter().next()
    }
}

/// Clauses plus the diagnostics gathered while compiling them.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseOutput {
    /// The resolved clauses, in source order.
    pub clauses: Vec<Clause>,
    /// Skipped characters and statements.
    pub diagnostics: Diagnostics,
}

/// Compiles a filter expression into clauses.
///
/// Never fails: unrecognized input is skipped, so malformed queries yield
/// fewer clauses.
pub fn parse(text: &str) -> Vec<Clause> {
    parse_with_diagnostics(text).clauses
}

/// Compiles a filter expression, also reporting what was skipped.
pub fn parse_with_diagnostics(text: &str) -> ParseOutput {
    let LexerResult { tokens, errors } = tokenize_with_errors(text);
    let tree = Parser::parse(tokens);
    let clauses = resolver::resolve(&tree);

    let diagnostics = Diagnostics {
        lex_errors: errors,
        syntax_errors: tree.errors,
    };
    if !diagnostics.is_empty() {
        tracing::debug!(
            problems = diagnostics.len(),
            clauses = clauses.len(),
            "filter expression compiled with recovery"
        );
    }

    ParseOutput {
        clauses,
        diagnostics,
    }
}

/// Compiles a filter expression, rejecting anything that needed recovery.
///
/// # Errors
///
/// Returns [`QueryError::Empty`] for blank input, otherwise the earliest
/// [`QueryError::Lex`] or [`QueryError::Syntax`] problem in the input.
pub fn parse_strict(text: &str) -> QueryResult<Vec<Clause>> {
    if text.trim().is_empty() {
        return Err(QueryError::Empty);
    }

    let output = parse_with_diagnostics(text);
    match output.diagnostics.first_error() {
        Some(error) => Err(error),
        None => Ok(output.clauses),
    }
}
