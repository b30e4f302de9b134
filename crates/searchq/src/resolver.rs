//! Folds a syntax tree into filter clauses.
//!
//! Each top-level statement becomes exactly one [`Clause`]. Negation is
//! threaded through as a flag toggled once per prefix, so a clause is built
//! once with its final `exclude` value: `NOT NOT x` cancels out and
//! `NOT NOT NOT x` stays excluded.

use crate::clause::{Clause, CompareOp, Filter, Value};
use crate::lexer::TokenKind;
use crate::syntax::{
    FieldStatement, FieldValue, RangeEnd, RangeNode, Statement, SyntaxTree, TermNode,
};

/// Resolves every top-level statement of `tree`, in source order.
pub fn resolve(tree: &SyntaxTree) -> Vec<Clause> {
    tree.statements
        .iter()
        .map(|statement| resolve_statement(statement, false))
        .collect()
}

/// Resolves one statement, `exclude` being the negation accumulated so far.
pub fn resolve_statement(statement: &Statement, exclude: bool) -> Clause {
    let mut statement = statement;
    let mut exclude = exclude;
    while let Statement::Negative(negative) = statement {
        exclude ^= negative.negates();
        statement = &negative.statement;
    }

    let filter = match statement {
        Statement::Negative(_) => unreachable!("negation unwrapped above"),
        Statement::Field(field) => resolve_field(field),
        Statement::Compare(compare) => {
            Filter::compare(compare.op, compare.identifier.name(), compare.value.value)
        }
        Statement::Term(term) => Filter::term(resolve_term(term)),
    };
    Clause { filter, exclude }
}

/// The bounds of a range; never both absent.
enum Bounds {
    From(Value),
    To(Value),
    Between(Value, Value),
}

fn resolve_field(field: &FieldStatement) -> Filter {
    let name = field.identifier.name();
    match &field.value {
        FieldValue::Term(term) => Filter::field(name, resolve_term(term)),
        FieldValue::Range(range) => match resolve_range(range) {
            Bounds::From(from) => Filter::compare(CompareOp::Gte, name, from),
            Bounds::To(to) => Filter::compare(CompareOp::Lte, name, to),
            Bounds::Between(from, to) => Filter::range(name, from, to),
        },
    }
}

fn resolve_range(range: &RangeNode) -> Bounds {
    match range {
        RangeNode::Left(left) => match &left.to {
            RangeEnd::Open(_) => Bounds::From(left.from.value),
            RangeEnd::Bound(to) => Bounds::Between(left.from.value, to.value),
        },
        RangeNode::Right(right) => Bounds::To(right.to.value),
    }
}

/// Resolves a term to its text.
///
/// Date and number literals keep their source text here; only comparables
/// are coerced to typed values.
pub fn resolve_term(term: &TermNode) -> String {
    let text = &term.token.text;
    match term.token.kind {
        TokenKind::QuotedTerm => unquote(text),
        TokenKind::DateLiteral | TokenKind::NumberLiteral => text.clone(),
        _ => unescape(text),
    }
}

/// Removes the backslash from every escaped character.
///
/// A trailing lone backslash is kept.
pub fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            out.push(chars.next().unwrap_or(c));
        } else {
            out.push(c);
        }
    }
    out
}

/// Decodes a quoted term as a string literal.
///
/// Each escape is decoded on its own: JSON escapes (`\n`, `\t`, `\uXXXX`,
/// ...) take their usual meaning and any other escaped character is kept
/// without its backslash, e.g. `"a\:b"`. Raw characters are copied as they are.
fn unquote(text: &str) -> String {
    let inner = text
        .strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .unwrap_or(text);

    let mut out = String::with_capacity(inner.len());
    let mut rest = inner;
    while let Some(at) = rest.find('\\') {
        out.push_str(&rest[..at]);
        let escape = &rest[at..];
        let (decoded, used) = decode_escape(escape);
        out.push_str(&decoded);
        rest = &escape[used..];
    }
    out.push_str(rest);
    out
}

/// Decodes the escape at the start of `escape`, returning the text and the
/// number of bytes consumed.
fn decode_escape(escape: &str) -> (String, usize) {
    let Some(c) = escape[1..].chars().next() else {
        return ("\\".to_string(), 1);
    };
    if c == 'u' {
        if let Some(decoded) = decode_unicode_escape(escape) {
            return decoded;
        }
    }
    let simple = match c {
        '"' | '\\' | '/' => Some(c),
        'b' => Some('\u{8}'),
        'f' => Some('\u{c}'),
        'n' => Some('\n'),
        'r' => Some('\r'),
        't' => Some('\t'),
        _ => None,
    };
    let decoded = simple.unwrap_or(c);
    (decoded.to_string(), 1 + c.len_utf8())
}

/// Decodes `\uXXXX`, or a `\uXXXX\uXXXX` surrogate pair, with `serde_json`.
fn decode_unicode_escape(escape: &str) -> Option<(String, usize)> {
    let is_escape = |s: &str| {
        s.len() >= 6 && s.starts_with("\\u") && s.as_bytes()[2..6].iter().all(u8::is_ascii_hexdigit)
    };
    if !is_escape(escape) {
        return None;
    }
    let pair = escape.len() >= 12 && is_escape(&escape[6..]);
    let candidates: &[usize] = if pair { &[12, 6] } else { &[6] };
    candidates.iter().find_map(|&len| {
        serde_json::from_str::<String>(&format!("\"{}\"", &escape[..len]))
            .ok()
            .map(|decoded| (decoded, len))
    })
}
