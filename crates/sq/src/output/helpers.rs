//! Common helper functions for output formatting.

use owo_colors::OwoColorize;

/// Truncates a string to at most `max_len` characters.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() > max_len {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    } else {
        s.to_string()
    }
}

/// Appends a table header line, dimmed when colors are enabled.
pub fn push_header(output: &mut String, header: &str, use_colors: bool) {
    if use_colors {
        output.push_str(&format!("{}\n", header.dimmed()));
    } else {
        output.push_str(header);
        output.push('\n');
    }
}

/// Formats the exclusion marker for a clause row.
pub fn format_exclude(exclude: bool, use_colors: bool) -> String {
    match (exclude, use_colors) {
        (true, true) => "yes".red().to_string(),
        (true, false) => "yes".to_string(),
        (false, _) => String::new(),
    }
}
