//! Token stream output formatting.

use searchq::{LexerResult, Token};
use serde::Serialize;

use super::helpers::{push_header, truncate_str};

/// JSON output structure for the tokens command.
#[derive(Serialize)]
pub struct TokensOutput<'a> {
    pub tokens: Vec<TokenOutput<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedOutput>,
}

/// JSON output structure for a single token.
#[derive(Serialize)]
pub struct TokenOutput<'a> {
    pub kind: &'static str,
    pub text: &'a str,
    pub position: usize,
}

/// JSON output structure for a character no token matched.
#[derive(Serialize)]
pub struct SkippedOutput {
    pub character: char,
    pub position: usize,
}

impl<'a> From<&'a Token> for TokenOutput<'a> {
    fn from(token: &'a Token) -> Self {
        Self {
            kind: token.kind.name(),
            text: &token.text,
            position: token.position,
        }
    }
}

/// Formats a token stream as JSON.
pub fn format_tokens_json(result: &LexerResult) -> Result<String, serde_json::Error> {
    let output = TokensOutput {
        tokens: result.tokens.iter().map(TokenOutput::from).collect(),
        skipped: result
            .errors
            .iter()
            .map(|e| SkippedOutput {
                character: e.character,
                position: e.position,
            })
            .collect(),
    };
    serde_json::to_string_pretty(&output)
}

/// Formats a token stream as a table.
pub fn format_tokens_table(result: &LexerResult, use_colors: bool) -> String {
    if result.tokens.is_empty() && result.errors.is_empty() {
        return "No tokens.\n".to_string();
    }

    let mut output = String::new();
    push_header(
        &mut output,
        &format!("{:<5} {:<18} {}", "Pos", "Kind", "Text"),
        use_colors,
    );

    for token in &result.tokens {
        let line = format!(
            "{:<5} {:<18} {}",
            token.position,
            token.kind.name(),
            truncate_str(&token.text, 40)
        );
        output.push_str(&line);
        output.push('\n');
    }

    for error in &result.errors {
        output.push_str(&format!("skipped {error}\n"));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use searchq::tokenize_with_errors;

    #[test]
    fn test_format_tokens_json() {
        let result = tokenize_with_errors("age:>21");
        let json = format_tokens_json(&result).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "tokens": [
                    {"kind": "Identifier", "text": "age", "position": 0},
                    {"kind": "GreaterThan", "text": ":>", "position": 3},
                    {"kind": "NumberLiteral", "text": "21", "position": 5}
                ]
            })
        );
    }

    #[test]
    fn test_format_tokens_json_skipped() {
        let result = tokenize_with_errors("a . b");
        let json = format_tokens_json(&result).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(
            value["skipped"],
            serde_json::json!([{"character": ".", "position": 2}])
        );
    }

    #[test]
    fn test_format_tokens_table() {
        let result = tokenize_with_errors("NOT x");
        let table = format_tokens_table(&result, false);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].contains("NOT"));
        assert!(lines[2].contains("Identifier"));
    }

    #[test]
    fn test_format_tokens_table_empty() {
        let result = tokenize_with_errors("   ");
        assert_eq!(format_tokens_table(&result, false), "No tokens.\n");
    }
}
