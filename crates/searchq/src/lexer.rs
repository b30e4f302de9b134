//! Lexer (tokenizer) for filter expressions.
//!
//! Tokens are recognized by a ranked matcher table. At each position the
//! matchers are tried in order and the first one that matches wins, except
//! that matchers marked `yields_to_term` give way to the catch-all term
//! pattern when it matches a strictly longer run. That is how `NOTE` stays a
//! term while `NOT` is the keyword, and how `2024-01-01abc` stays a term while
//! `2024-01-01` is a date.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::clause::{CompareOp, Value};

/// A character that no token class matched.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unexpected character '{character}' at position {position}")]
pub struct LexError {
    /// The character that could not be tokenized.
    pub character: char,
    /// The byte offset where it occurs.
    pub position: usize,
}

/// Result of tokenizing a filter expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexerResult {
    /// The tokens, in source order.
    pub tokens: Vec<Token>,
    /// Characters that were skipped because nothing matched them.
    pub errors: Vec<LexError>,
}

/// The lexical class of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// The `NOT` keyword.
    Not,
    /// `-`, negation prefix.
    Minus,
    /// A field name shaped word: `[A-Za-z_][A-Za-z0-9_]*`.
    Identifier,
    /// `:>=`
    GreaterThanEqual,
    /// `:>`
    GreaterThan,
    /// `:<=`
    LessThanEqual,
    /// `:<`
    LessThan,
    /// `:`
    Equals,
    /// `..`, range separator.
    DoubleDot,
    /// `*`, open range endpoint.
    Star,
    /// `YYYY-MM-DD[THH:MM:SS[Z|±HH:MM]]`
    DateLiteral,
    /// Integer or decimal number.
    NumberLiteral,
    /// `"..."`, quotes and escapes kept verbatim.
    QuotedTerm,
    /// Any other run of non-reserved characters.
    Term,
}

impl TokenKind {
    /// A short human-readable name for diagnostics and tooling.
    pub fn name(self) -> &'static str {
        match self {
            TokenKind::Not => "NOT",
            TokenKind::Minus => "Minus",
            TokenKind::Identifier => "Identifier",
            TokenKind::GreaterThanEqual => "GreaterThanEqual",
            TokenKind::GreaterThan => "GreaterThan",
            TokenKind::LessThanEqual => "LessThanEqual",
            TokenKind::LessThan => "LessThan",
            TokenKind::Equals => "Equals",
            TokenKind::DoubleDot => "DoubleDot",
            TokenKind::Star => "Star",
            TokenKind::DateLiteral => "DateLiteral",
            TokenKind::NumberLiteral => "NumberLiteral",
            TokenKind::QuotedTerm => "QuotedTerm",
            TokenKind::Term => "Term",
        }
    }

    /// The relational operator this token spells, if any.
    pub fn compare_op(self) -> Option<CompareOp> {
        match self {
            TokenKind::GreaterThanEqual => Some(CompareOp::Gte),
            TokenKind::GreaterThan => Some(CompareOp::Gt),
            TokenKind::LessThanEqual => Some(CompareOp::Lte),
            TokenKind::LessThan => Some(CompareOp::Lt),
            _ => None,
        }
    }

    /// Whether this token negates the statement that follows it.
    pub fn is_negation(self) -> bool {
        matches!(self, TokenKind::Not | TokenKind::Minus)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A token with its source text and position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The lexical class.
    pub kind: TokenKind,
    /// The matched source text.
    pub text: String,
    /// The byte offset where the token starts.
    pub position: usize,
}

impl Token {
    /// Creates a token.
    pub fn new(kind: TokenKind, text: impl Into<String>, position: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            position,
        }
    }

    /// Byte offset one past the end of the token.
    pub fn end(&self) -> usize {
        self.position + self.text.len()
    }
}

/// What a matcher produces.
#[derive(Debug, Clone, Copy)]
enum Class {
    Skip,
    Emit(TokenKind),
}

/// One row of the matcher table.
struct Matcher {
    class: Class,
    pattern: Regex,
    yields_to_term: bool,
    accept: Option<fn(&str) -> bool>,
}

impl Matcher {
    fn new(class: Class, pattern: &str) -> Self {
        Self {
            class,
            pattern: Regex::new(pattern).expect("token patterns are valid regexes"),
            yields_to_term: false,
            accept: None,
        }
    }

    fn yielding_to_term(mut self) -> Self {
        self.yields_to_term = true;
        self
    }

    fn accepting(mut self, accept: fn(&str) -> bool) -> Self {
        self.accept = Some(accept);
        self
    }

    /// Length of the match at the start of `rest`, if any.
    fn match_len(&self, rest: &str) -> Option<usize> {
        let m = self.pattern.find(rest)?;
        if let Some(accept) = self.accept {
            if !accept(m.as_str()) {
                return None;
            }
        }
        Some(m.end())
    }
}

/// The ranked matcher table. Order is significant.
struct MatcherTable {
    rows: Vec<Matcher>,
    /// Index of the catch-all term row, which longer-alternative rows defer to.
    term: usize,
}

impl MatcherTable {
    fn term(&self) -> &Matcher {
        &self.rows[self.term]
    }
}

static MATCHERS: Lazy<MatcherTable> = Lazy::new(|| {
    use TokenKind::*;
    let rows = vec![
        Matcher::new(Class::Skip, r"^\s+"),
        Matcher::new(Class::Emit(Not), r"^NOT").yielding_to_term(),
        Matcher::new(Class::Emit(Minus), r"^-"),
        Matcher::new(Class::Emit(Identifier), r"^[A-Za-z_][A-Za-z0-9_]*").yielding_to_term(),
        Matcher::new(Class::Emit(GreaterThanEqual), r"^:>="),
        Matcher::new(Class::Emit(GreaterThan), r"^:>"),
        Matcher::new(Class::Emit(LessThanEqual), r"^:<="),
        Matcher::new(Class::Emit(LessThan), r"^:<"),
        Matcher::new(Class::Emit(Equals), r"^:"),
        Matcher::new(Class::Emit(DoubleDot), r"^\.\."),
        Matcher::new(Class::Emit(Star), r"^\*"),
        Matcher::new(
            Class::Emit(DateLiteral),
            r"^[0-9]{4}-[0-9]{2}-[0-9]{2}(?:T[0-9]{2}:[0-9]{2}:[0-9]{2}(?:Z|[+-][0-9]{2}:[0-9]{2})?)?",
        )
        .yielding_to_term()
        .accepting(|text| Value::parse_date(text).is_some()),
        Matcher::new(Class::Emit(NumberLiteral), r"^[0-9]+(?:\.[0-9]+)?")
            .yielding_to_term()
            .accepting(|text| Value::parse_number(text).is_some()),
        Matcher::new(Class::Emit(QuotedTerm), r#"^"(?:[^"\\]|\\(?s:.))*""#),
        Matcher::new(Class::Emit(Term), r"^(?:\\(?s:.)|[^\s:.])+"),
    ];
    let term = rows.len() - 1;
    MatcherTable { rows, term }
});

/// Lexer for tokenizing filter expressions.
pub struct Lexer<'a> {
    input: &'a str,
    /// Current byte position in the input string.
    position: usize,
    /// Errors encountered during tokenization.
    errors: Vec<LexError>,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given input string.
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            position: 0,
            errors: Vec::new(),
        }
    }

    /// Returns the next token, or None at end of input.
    ///
    /// Whitespace is skipped. A character no matcher accepts is recorded as a
    /// [`LexError`] and skipped.
    pub fn next_token(&mut self) -> Option<Token> {
        loop {
            let rest = self.input.get(self.position..).filter(|r| !r.is_empty())?;
            let start = self.position;

            let Some((class, len)) = Self::match_at(rest) else {
                let character = rest.chars().next()?;
                tracing::debug!(position = start, %character, "skipping unrecognized character");
                self.errors.push(LexError {
                    character,
                    position: start,
                });
                self.position += character.len_utf8();
                continue;
            };

            self.position += len;
            match class {
                Class::Skip => continue,
                Class::Emit(kind) => return Some(Token::new(kind, &rest[..len], start)),
            }
        }
    }

    /// Finds the winning matcher for the start of `rest`.
    fn match_at(rest: &str) -> Option<(Class, usize)> {
        let table = &*MATCHERS;
        for matcher in &table.rows {
            let Some(len) = matcher.match_len(rest) else {
                continue;
            };
            if len == 0 {
                continue;
            }
            if matcher.yields_to_term {
                if let Some(term_len) = table.term().match_len(rest) {
                    if term_len > len {
                        return Some((Class::Emit(TokenKind::Term), term_len));
                    }
                }
            }
            return Some((matcher.class, len));
        }
        None
    }

    /// Collects all tokens, dropping any lexical errors.
    pub fn tokenize(self) -> Vec<Token> {
        self.tokenize_with_errors().tokens
    }

    /// Collects all tokens and any errors encountered.
    pub fn tokenize_with_errors(mut self) -> LexerResult {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token() {
            tokens.push(token);
        }
        tracing::trace!(tokens = tokens.len(), errors = self.errors.len(), "tokenized input");
        LexerResult {
            tokens,
            errors: self.errors,
        }
    }
}

/// Tokenizes `text`, skipping anything unrecognized.
pub fn tokenize(text: &str) -> Vec<Token> {
    Lexer::new(text).tokenize()
}

/// Tokenizes `text`, reporting unrecognized characters.
pub fn tokenize_with_errors(text: &str) -> LexerResult {
    Lexer::new(text).tokenize_with_errors()
}
