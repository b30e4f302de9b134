//! Clause output formatting.

use owo_colors::OwoColorize;
use searchq::{Clause, Diagnostics, Filter};
use serde::Serialize;

use super::diagnostics::{diagnostics_output, DiagnosticOutput};
use super::helpers::{format_exclude, push_header, truncate_str};

/// JSON output structure for the parse command.
#[derive(Serialize)]
pub struct ClausesOutput<'a> {
    pub clauses: &'a [Clause],
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<DiagnosticOutput>,
}

/// Formats clauses as JSON, with any diagnostics alongside.
pub fn format_clauses_json(
    clauses: &[Clause],
    diagnostics: &Diagnostics,
) -> Result<String, serde_json::Error> {
    let output = ClausesOutput {
        clauses,
        diagnostics: diagnostics_output(diagnostics),
    };
    serde_json::to_string_pretty(&output)
}

/// Formats clauses as a table.
pub fn format_clauses_table(clauses: &[Clause], use_colors: bool) -> String {
    if clauses.is_empty() {
        return "No clauses.\n".to_string();
    }

    let mut output = String::new();
    push_header(
        &mut output,
        &format!(
            "{:<3} {:<6} {:<16} {:<32} {}",
            "#", "Kind", "Field", "Value", "Exclude"
        ),
        use_colors,
    );

    for (i, clause) in clauses.iter().enumerate() {
        let kind = if use_colors {
            format!("{:<6}", clause.kind()).cyan().to_string()
        } else {
            format!("{:<6}", clause.kind())
        };
        let field = clause.filter.field_name().unwrap_or("");
        let line = format!(
            "{:<3} {} {:<16} {:<32} {}",
            i + 1,
            kind,
            truncate_str(field, 16),
            truncate_str(&filter_value(&clause.filter), 32),
            format_exclude(clause.exclude, use_colors)
        );
        output.push_str(line.trim_end());
        output.push('\n');
    }

    output
}

/// The value column for a clause row.
fn filter_value(filter: &Filter) -> String {
    match filter {
        Filter::Term { value } | Filter::Field { value, .. } => value.clone(),
        Filter::Compare { op, value, .. } => format!("{} {value}", op.kind()),
        Filter::Range { from, to, .. } => format!("{from}..{to}"),
    }
}
