//! Tokens command implementation.
//!
//! Prints the token stream for a filter expression.

use searchq::tokenize_with_errors;

use super::{read_query, CommandContext, Result};
use crate::output::{format_tokens_json, format_tokens_table};

/// Executes the tokens command.
pub fn execute(ctx: &CommandContext, query: Option<&str>) -> Result<()> {
    let text = read_query(query)?;
    let result = tokenize_with_errors(&text);

    if ctx.json_output {
        println!("{}", format_tokens_json(&result)?);
    } else {
        print!("{}", format_tokens_table(&result, ctx.use_colors));
    }

    Ok(())
}
