//! Check command implementation.
//!
//! Reports everything the compiler had to skip in a filter expression.

use searchq::parse_with_diagnostics;

use super::{read_query, CommandContext, CommandError, Result};
use crate::output::{format_check_json, format_diagnostics_table};

/// Executes the check command.
///
/// # Errors
///
/// Returns [`CommandError::Invalid`] when the query has any diagnostics.
pub fn execute(ctx: &CommandContext, query: Option<&str>) -> Result<()> {
    let text = read_query(query)?;
    let output = parse_with_diagnostics(&text);
    let diagnostics = output.diagnostics;

    if ctx.json_output {
        println!("{}", format_check_json(&diagnostics)?);
    } else if !ctx.quiet || !diagnostics.is_empty() {
        print!("{}", format_diagnostics_table(&diagnostics, ctx.use_colors));
    }

    if diagnostics.is_empty() {
        Ok(())
    } else {
        Err(CommandError::Invalid {
            problems: diagnostics.len(),
        })
    }
}
