//! Concrete syntax tree for filter expressions.
//!
//! Node kinds mirror the grammar rules one to one. Every node keeps the tokens
//! it matched so that the resolver, and tooling, can see the source text.

use crate::clause::{CompareOp, Value};
use crate::lexer::Token;
use crate::parser::SyntaxError;

/// The result of parsing a token stream.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntaxTree {
    /// Top-level statements, in source order.
    pub statements: Vec<Statement>,
    /// Token runs skipped during recovery.
    pub errors: Vec<SyntaxError>,
}

/// `statement := negativeStatement | fieldStatement | compareStatement | term`
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Negative(NegativeStatement),
    Field(FieldStatement),
    Compare(CompareStatement),
    Term(TermNode),
}

/// `negativeStatement := ("NOT" | "-") statement`
///
/// A run of consecutive prefixes is kept as one node, so the tree stays
/// shallow however many prefixes the input stacks up. `statement` is never
/// itself a negative statement.
#[derive(Debug, Clone, PartialEq)]
pub struct NegativeStatement {
    /// The prefixes, in source order; never empty.
    pub operators: Vec<Token>,
    pub statement: Box<Statement>,
}

impl NegativeStatement {
    /// Whether the prefixes negate the inner statement, i.e. there is an odd
    /// number of them.
    pub fn negates(&self) -> bool {
        self.operators.len() % 2 == 1
    }
}

/// `fieldStatement := identifier ":" (range | term)`
#[derive(Debug, Clone, PartialEq)]
pub struct FieldStatement {
    pub identifier: Identifier,
    pub equals: Token,
    pub value: FieldValue,
}

/// Right-hand side of a field statement.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Range(RangeNode),
    Term(TermNode),
}

/// `compareStatement := identifier (":>=" | ":>" | ":<=" | ":<") comparable`
#[derive(Debug, Clone, PartialEq)]
pub struct CompareStatement {
    pub identifier: Identifier,
    pub operator: Token,
    /// The operator the token spells.
    pub op: CompareOp,
    pub value: Comparable,
}

/// `identifier := ID`
#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    pub token: Token,
}

impl Identifier {
    /// The field name.
    pub fn name(&self) -> &str {
        &self.token.text
    }
}

/// `range := rangeLeft | rangeRight`
#[derive(Debug, Clone, PartialEq)]
pub enum RangeNode {
    Left(RangeLeft),
    Right(RangeRight),
}

/// `rangeLeft := comparable ".." ("*" | comparable)`
#[derive(Debug, Clone, PartialEq)]
pub struct RangeLeft {
    pub from: Comparable,
    pub dots: Token,
    pub to: RangeEnd,
}

/// Upper end of a [`RangeLeft`].
#[derive(Debug, Clone, PartialEq)]
pub enum RangeEnd {
    /// `*`
    Open(Token),
    Bound(Comparable),
}

/// `rangeRight := "*" ".." comparable`
#[derive(Debug, Clone, PartialEq)]
pub struct RangeRight {
    pub star: Token,
    pub dots: Token,
    pub to: Comparable,
}

/// `comparable := NumberLiteral | DateLiteral`
///
/// The parser only builds this node for literals that have a typed value, so
/// resolving it cannot fail.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparable {
    pub token: Token,
    pub value: Value,
}

/// `term := identifier | DateLiteral | NumberLiteral | Term | QuotedTerm`
#[derive(Debug, Clone, PartialEq)]
pub struct TermNode {
    pub token: Token,
}
