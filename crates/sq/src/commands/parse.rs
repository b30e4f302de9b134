//! Parse command implementation.
//!
//! Compiles a filter expression and prints the resulting clauses.

use searchq::{parse_strict, parse_with_diagnostics, to_query, Clause, Diagnostics};

use super::{read_query, CommandContext, Result};
use crate::output::{format_clauses_json, format_clauses_table};

/// Options for the parse command.
#[derive(Debug, Default)]
pub struct ParseOptions {
    /// Filter expression; stdin when `None`.
    pub query: Option<String>,
    /// Reject queries that needed recovery.
    pub strict: bool,
    /// Print the normalized query instead of the clause list.
    pub normalize: bool,
}

/// Result of compiling a query for output.
#[derive(Debug)]
pub struct ParseResult {
    /// Compiled clauses.
    pub clauses: Vec<Clause>,
    /// What was skipped; always empty in strict mode.
    pub diagnostics: Diagnostics,
}

/// Compiles `text`, strictly when requested.
pub fn compile(text: &str, strict: bool) -> Result<ParseResult> {
    if strict {
        let clauses = parse_strict(text)?;
        return Ok(ParseResult {
            clauses,
            diagnostics: Diagnostics::default(),
        });
    }

    let output = parse_with_diagnostics(text);
    for error in output.diagnostics.errors() {
        tracing::warn!("skipped {error}");
    }
    Ok(ParseResult {
        clauses: output.clauses,
        diagnostics: output.diagnostics,
    })
}

/// Executes the parse command.
pub fn execute(ctx: &CommandContext, opts: &ParseOptions) -> Result<()> {
    let text = read_query(opts.query.as_deref())?;
    let strict = opts.strict || ctx.strict;
    tracing::debug!(strict, len = text.len(), "compiling query");

    let result = compile(&text, strict)?;

    if opts.normalize {
        let normalized = to_query(&result.clauses);
        if ctx.json_output {
            let output = serde_json::json!({ "query": normalized });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("{normalized}");
        }
        return Ok(());
    }

    if ctx.json_output {
        println!(
            "{}",
            format_clauses_json(&result.clauses, &result.diagnostics)?
        );
    } else {
        print!("{}", format_clauses_table(&result.clauses, ctx.use_colors));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::CommandError;
    use searchq::{Filter, QueryError};

    #[test]
    fn test_compile_lenient_keeps_diagnostics() {
        let result = compile("a: b .", false).unwrap();
        assert_eq!(result.clauses, vec![Clause::new(Filter::field("a", "b"))]);
        assert_eq!(result.diagnostics.len(), 1);
    }

    #[test]
    fn test_compile_strict_rejects_recovery() {
        let err = compile("a: b .", true).unwrap_err();
        assert!(matches!(err, CommandError::Query(QueryError::Lex(_))));
    }

    #[test]
    fn test_compile_strict_rejects_blank() {
        let err = compile("  ", true).unwrap_err();
        assert!(matches!(err, CommandError::Query(QueryError::Empty)));
    }

    #[test]
    fn test_compile_lenient_accepts_blank() {
        let result = compile("", false).unwrap();
        assert!(result.clauses.is_empty());
        assert!(result.diagnostics.is_empty());
    }
}
