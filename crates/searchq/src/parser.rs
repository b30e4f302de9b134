//! Recursive descent parser for filter expressions.

use thiserror::Error;

use crate::clause::Value;
use crate::lexer::{Token, TokenKind};
use crate::syntax::{
    Comparable, CompareStatement, FieldStatement, FieldValue, Identifier, NegativeStatement,
    RangeEnd, RangeLeft, RangeNode, RangeRight, Statement, SyntaxTree, TermNode,
};

/// A run of tokens that did not form a statement and was discarded.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unexpected input '{text}' at position {position}")]
pub struct SyntaxError {
    /// The discarded tokens' text, separated by single spaces.
    pub text: String,
    /// Byte offset of the first discarded token.
    pub position: usize,
}

/// Parser for filter expression token streams.
///
/// # Grammar
///
/// ```text
/// statements        ::= statement*
/// statement         ::= negativeStatement | fieldStatement | compareStatement | term
/// negativeStatement ::= ("NOT" | "-") statement
/// fieldStatement    ::= identifier ":" (range | term)
/// compareStatement  ::= identifier (":>=" | ":>" | ":<=" | ":<") comparable
/// identifier        ::= ID
/// range             ::= rangeLeft | rangeRight
/// rangeLeft         ::= comparable ".." ("*" | comparable)
/// rangeRight        ::= "*" ".." comparable
/// comparable        ::= NumberLiteral | DateLiteral
/// term              ::= identifier | DateLiteral | NumberLiteral | Term | QuotedTerm
/// ```
///
/// An identifier followed directly by `:` or a relational operator commits
/// to a field or compare statement; any other identifier is a bare term.
///
/// # Recovery
///
/// When no statement can start at the current token, tokens are discarded one
/// at a time until one can. Each discarded run becomes a [`SyntaxError`] in
/// the tree; parsing never aborts.
pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
}

impl Parser {
    /// Creates a parser over `tokens`.
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            position: 0,
        }
    }

    /// Parses a token stream into a syntax tree.
    pub fn parse(tokens: Vec<Token>) -> SyntaxTree {
        Self::new(tokens).parse_statements()
    }

    /// Parses `statement*`, recovering from malformed statements.
    pub fn parse_statements(mut self) -> SyntaxTree {
        let mut statements = Vec::new();
        let mut errors = Vec::new();
        let mut skipped_from: Option<usize> = None;

        while self.position < self.tokens.len() {
            let start = self.position;
            match self.parse_statement() {
                Some(statement) => {
                    if let Some(from) = skipped_from.take() {
                        errors.push(self.skipped(from, start));
                    }
                    tracing::trace!(position = self.tokens[start].position, "parsed statement");
                    statements.push(statement);
                }
                None => {
                    skipped_from.get_or_insert(start);
                    self.position = self.recovery_point(start);
                }
            }
        }
        if let Some(from) = skipped_from {
            errors.push(self.skipped(from, self.tokens.len()));
        }

        SyntaxTree { statements, errors }
    }

    /// Returns the current token without consuming it.
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    /// Returns the kind of the token `offset` places ahead.
    fn peek_kind_at(&self, offset: usize) -> Option<TokenKind> {
        self.tokens.get(self.position + offset).map(|t| t.kind)
    }

    /// Consumes and returns the current token.
    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.position).cloned();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    /// Consumes the current token if it has the expected kind.
    fn expect(&mut self, kind: TokenKind) -> Option<Token> {
        if self.peek_kind_at(0) == Some(kind) {
            self.advance()
        } else {
            None
        }
    }

    /// Runs `rule`, rewinding to the starting token if it does not match.
    fn attempt<T>(&mut self, rule: impl FnOnce(&mut Self) -> Option<T>) -> Option<T> {
        let start = self.position;
        let result = rule(self);
        if result.is_none() {
            self.position = start;
        }
        result
    }

    /// Where to retry after no statement could start at `start`.
    ///
    /// A failed negative statement failed on whatever follows its prefixes,
    /// and every later prefix in the same run would fail on that same token,
    /// so the whole run is skipped at once.
    fn recovery_point(&self, start: usize) -> usize {
        let run = self.tokens[start..]
            .iter()
            .take_while(|t| t.kind.is_negation())
            .count();
        start + run.max(1)
    }

    /// Builds the error for the tokens in `from..to`.
    fn skipped(&self, from: usize, to: usize) -> SyntaxError {
        let skipped = &self.tokens[from..to];
        let text = skipped
            .iter()
            .map(|t| t.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let position = skipped.first().map_or(0, |t| t.position);
        tracing::debug!(position, skipped = %text, "discarded unrecognized statement");
        SyntaxError { text, position }
    }

    /// Parses `statement`.
    fn parse_statement(&mut self) -> Option<Statement> {
        let kind = self.peek_kind_at(0)?;
        if kind.is_negation() {
            return self.parse_negative_statement();
        }

        match (kind, self.peek_kind_at(1)) {
            (TokenKind::Identifier, Some(TokenKind::Equals)) => {
                self.parse_field_statement().map(Statement::Field)
            }
            (TokenKind::Identifier, Some(next)) if next.compare_op().is_some() => {
                self.parse_compare_statement().map(Statement::Compare)
            }
            _ => self.parse_term().map(Statement::Term),
        }
    }

    /// Parses `("NOT" | "-")+ statement`.
    ///
    /// Consecutive prefixes are collected in a loop into a single node.
    /// Tokens are only copied once the inner statement has parsed.
    fn parse_negative_statement(&mut self) -> Option<Statement> {
        let first = self.position;
        while self.peek_kind_at(0).is_some_and(TokenKind::is_negation) {
            self.position += 1;
        }
        let last = self.position;

        let statement = self.parse_statement()?;
        Some(Statement::Negative(NegativeStatement {
            operators: self.tokens[first..last].to_vec(),
            statement: Box::new(statement),
        }))
    }

    /// Parses `identifier ":" (range | term)`.
    fn parse_field_statement(&mut self) -> Option<FieldStatement> {
        let identifier = self.parse_identifier()?;
        let equals = self.expect(TokenKind::Equals)?;
        let value = match self.parse_range() {
            Some(range) => FieldValue::Range(range),
            None => FieldValue::Term(self.parse_term()?),
        };
        Some(FieldStatement {
            identifier,
            equals,
            value,
        })
    }

    /// Parses `identifier (":>=" | ":>" | ":<=" | ":<") comparable`.
    fn parse_compare_statement(&mut self) -> Option<CompareStatement> {
        let identifier = self.parse_identifier()?;
        let op = self.peek_kind_at(0)?.compare_op()?;
        let operator = self.advance()?;
        let value = self.parse_comparable()?;
        Some(CompareStatement {
            identifier,
            operator,
            op,
            value,
        })
    }

    /// Parses `ID`.
    fn parse_identifier(&mut self) -> Option<Identifier> {
        self.expect(TokenKind::Identifier)
            .map(|token| Identifier { token })
    }

    /// Parses `rangeLeft | rangeRight`.
    fn parse_range(&mut self) -> Option<RangeNode> {
        if let Some(left) = self.attempt(Self::parse_range_left) {
            return Some(RangeNode::Left(left));
        }
        self.attempt(Self::parse_range_right).map(RangeNode::Right)
    }

    /// Parses `comparable ".." ("*" | comparable)`.
    fn parse_range_left(&mut self) -> Option<RangeLeft> {
        let from = self.parse_comparable()?;
        let dots = self.expect(TokenKind::DoubleDot)?;
        let to = match self.expect(TokenKind::Star) {
            Some(star) => RangeEnd::Open(star),
            None => RangeEnd::Bound(self.parse_comparable()?),
        };
        Some(RangeLeft { from, dots, to })
    }

    /// Parses `"*" ".." comparable`.
    fn parse_range_right(&mut self) -> Option<RangeRight> {
        let star = self.expect(TokenKind::Star)?;
        let dots = self.expect(TokenKind::DoubleDot)?;
        let to = self.parse_comparable()?;
        Some(RangeRight { star, dots, to })
    }

    /// Parses `NumberLiteral | DateLiteral` into its typed value.
    fn parse_comparable(&mut self) -> Option<Comparable> {
        let token = self.peek()?;
        let value = match token.kind {
            TokenKind::NumberLiteral => Value::Number(Value::parse_number(&token.text)?),
            TokenKind::DateLiteral => Value::Date(Value::parse_date(&token.text)?),
            _ => return None,
        };
        let token = self.advance()?;
        Some(Comparable { token, value })
    }

    /// Parses `identifier | DateLiteral | NumberLiteral | Term | QuotedTerm`.
    fn parse_term(&mut self) -> Option<TermNode> {
        match self.peek_kind_at(0)? {
            TokenKind::Identifier
            | TokenKind::DateLiteral
            | TokenKind::NumberLiteral
            | TokenKind::Term
            | TokenKind::QuotedTerm => self.advance().map(|token| TermNode { token }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    fn parse(input: &str) -> SyntaxTree {
        Parser::parse(tokenize(input))
    }

    #[test]
    fn test_parse_empty() {
        let tree = parse("");
        assert!(tree.statements.is_empty());
        assert!(tree.errors.is_empty());
    }

    #[test]
    fn test_parse_bare_identifier_is_term() {
        let tree = parse("hello");
        assert!(matches!(&tree.statements[..], [Statement::Term(t)] if t.token.text == "hello"));
    }

    #[test]
    fn test_parse_field_statement_with_term() {
        let tree = parse("status:open");
        let [Statement::Field(field)] = &tree.statements[..] else {
            panic!("expected field statement, got {:?}", tree.statements);
        };
        assert_eq!(field.identifier.name(), "status");
        assert!(matches!(&field.value, FieldValue::Term(t) if t.token.text == "open"));
    }

    #[test]
    fn test_parse_field_statement_with_date_term() {
        let tree = parse("created:2020-01-01");
        let [Statement::Field(field)] = &tree.statements[..] else {
            panic!("expected field statement, got {:?}", tree.statements);
        };
        assert!(matches!(
            &field.value,
            FieldValue::Term(t) if t.token.kind == TokenKind::DateLiteral
        ));
    }

    #[test]
    fn test_parse_range_left_closed() {
        let tree = parse("n:1..5");
        let [Statement::Field(field)] = &tree.statements[..] else {
            panic!("expected field statement, got {:?}", tree.statements);
        };
        let FieldValue::Range(RangeNode::Left(range)) = &field.value else {
            panic!("expected left range, got {:?}", field.value);
        };
        assert_eq!(range.from.value, Value::Number(1.0));
        assert!(matches!(&range.to, RangeEnd::Bound(c) if c.value == Value::Number(5.0)));
    }

    #[test]
    fn test_parse_range_left_open() {
        let tree = parse("n:1..*");
        let [Statement::Field(field)] = &tree.statements[..] else {
            panic!("expected field statement, got {:?}", tree.statements);
        };
        assert!(matches!(
            &field.value,
            FieldValue::Range(RangeNode::Left(RangeLeft {
                to: RangeEnd::Open(_),
                ..
            }))
        ));
    }

    #[test]
    fn test_parse_range_right() {
        let tree = parse("n:*..5");
        let [Statement::Field(field)] = &tree.statements[..] else {
            panic!("expected field statement, got {:?}", tree.statements);
        };
        assert!(matches!(&field.value, FieldValue::Range(RangeNode::Right(_))));
    }

    #[test]
    fn test_parse_compare_statement() {
        let tree = parse("age:>=21");
        let [Statement::Compare(cmp)] = &tree.statements[..] else {
            panic!("expected compare statement, got {:?}", tree.statements);
        };
        assert_eq!(cmp.identifier.name(), "age");
        assert_eq!(cmp.op, crate::clause::CompareOp::Gte);
        assert_eq!(cmp.operator.text, ":>=");
        assert_eq!(cmp.value.value, Value::Number(21.0));
    }

    #[test]
    fn test_parse_prefix_run_is_one_node() {
        let tree = parse("NOT - NOT x");
        let [Statement::Negative(neg)] = &tree.statements[..] else {
            panic!("expected negative statement, got {:?}", tree.statements);
        };
        let texts: Vec<&str> = neg.operators.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["NOT", "-", "NOT"]);
        assert!(neg.negates());
        assert!(matches!(*neg.statement, Statement::Term(_)));
    }

    #[test]
    fn test_parse_deep_prefix_run_stays_shallow() {
        let input = format!("{}x", "- ".repeat(100_000));
        let tree = parse(&input);
        let [Statement::Negative(neg)] = &tree.statements[..] else {
            panic!("expected one negative statement");
        };
        assert_eq!(neg.operators.len(), 100_000);
        assert!(!neg.negates());
        assert!(tree.errors.is_empty());
    }

    #[test]
    fn test_parse_dangling_prefix_run_is_one_error() {
        let tree = parse(&"- ".repeat(100_000));
        assert!(tree.statements.is_empty());
        assert_eq!(tree.errors.len(), 1);
        assert_eq!(tree.errors[0].position, 0);
        assert_eq!(tree.errors[0].text.len(), 2 * 100_000 - 1);
    }

    #[test]
    fn test_parse_prefix_run_before_bad_token_then_recovers() {
        let tree = parse("- NOT :> x");
        assert_eq!(tree.statements.len(), 1);
        assert!(matches!(&tree.statements[0], Statement::Term(t) if t.token.text == "x"));
        assert_eq!(
            tree.errors,
            vec![SyntaxError {
                text: "- NOT :>".to_string(),
                position: 0
            }]
        );
    }

    #[test]
    fn test_parse_recovers_after_malformed_statement() {
        let tree = parse("a::b c");
        assert_eq!(tree.statements.len(), 2);
        assert!(matches!(&tree.statements[0], Statement::Term(t) if t.token.text == "b"));
        assert_eq!(
            tree.errors,
            vec![SyntaxError {
                text: "a : :".to_string(),
                position: 0
            }]
        );
    }

    #[test]
    fn test_parse_stray_operator_is_discarded() {
        let tree = parse("status: x:>abc");
        // `status: x` is a field statement, then `:>` cannot start one.
        assert_eq!(tree.statements.len(), 2);
        assert_eq!(tree.errors.len(), 1);
        assert_eq!(tree.errors[0].text, ":>");
    }

    #[test]
    fn test_parse_trailing_negation_is_discarded() {
        let tree = parse("a NOT");
        assert_eq!(tree.statements.len(), 1);
        assert_eq!(tree.errors[0].text, "NOT");
        assert_eq!(tree.errors[0].position, 2);
    }

    #[test]
    fn test_parse_compare_requires_comparable() {
        let tree = parse("age:>old");
        // The compare statement fails; `old` survives as a term.
        assert_eq!(tree.statements.len(), 1);
        assert!(matches!(&tree.statements[0], Statement::Term(t) if t.token.text == "old"));
        assert_eq!(tree.errors[0].text, "age :>");
    }
}
