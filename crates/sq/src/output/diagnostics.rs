//! Diagnostic output formatting.

use owo_colors::OwoColorize;
use searchq::{Diagnostics, QueryError};
use serde::Serialize;

use super::helpers::{push_header, truncate_str};

/// JSON output structure for a single skipped character or statement.
#[derive(Serialize)]
pub struct DiagnosticOutput {
    pub kind: &'static str,
    pub position: usize,
    pub text: String,
    pub message: String,
}

/// JSON output structure for the check command.
#[derive(Serialize)]
pub struct CheckOutput {
    pub valid: bool,
    pub diagnostics: Vec<DiagnosticOutput>,
}

/// Converts diagnostics into output rows, ordered by position.
pub fn diagnostics_output(diagnostics: &Diagnostics) -> Vec<DiagnosticOutput> {
    diagnostics
        .errors()
        .into_iter()
        .filter_map(|error| {
            let message = error.to_string();
            match error {
                QueryError::Lex(e) => Some(DiagnosticOutput {
                    kind: "lex",
                    position: e.position,
                    text: e.character.to_string(),
                    message,
                }),
                QueryError::Syntax(e) => Some(DiagnosticOutput {
                    kind: "syntax",
                    position: e.position,
                    text: e.text,
                    message,
                }),
                QueryError::Empty => None,
            }
        })
        .collect()
}

/// Formats the check command result as JSON.
pub fn format_check_json(diagnostics: &Diagnostics) -> Result<String, serde_json::Error> {
    let output = CheckOutput {
        valid: diagnostics.is_empty(),
        diagnostics: diagnostics_output(diagnostics),
    };
    serde_json::to_string_pretty(&output)
}

/// Formats diagnostics as a table.
pub fn format_diagnostics_table(diagnostics: &Diagnostics, use_colors: bool) -> String {
    if diagnostics.is_empty() {
        return if use_colors {
            format!("{}\n", "No problems found.".green())
        } else {
            "No problems found.\n".to_string()
        };
    }

    let mut output = String::new();
    push_header(
        &mut output,
        &format!("{:<5} {:<8} {:<20} {}", "Pos", "Kind", "Text", "Message"),
        use_colors,
    );

    for row in diagnostics_output(diagnostics) {
        let kind = if use_colors {
            row.kind.yellow().to_string()
        } else {
            row.kind.to_string()
        };
        let line = format!(
            "{:<5} {:<8} {:<20} {}",
            row.position,
            kind,
            truncate_str(&row.text, 20),
            row.message
        );
        output.push_str(&line);
        output.push('\n');
    }

    output
}
