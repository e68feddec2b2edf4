use super::Value;
use std::fmt;

use serde::{Deserialize, Serialize};

/// One atomic unit of an authored formula.
///
/// A formula is an ordered token sequence; there is no other structure. The
/// closed union replaces the shape-sniffing an untyped token bag would need.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Token {
    /// References a field by node id or exposed key.
    Field { key: String },
    /// A literal. Quoted text literals keep their quotes.
    Fixed { value: Value },
    /// An arithmetic, boolean, or structural operator.
    Operator(Op),
}

/// The canonical operator set the evaluator understands.
///
/// Authoring glyphs (`×`, `÷`, `ET`, `OU`, `SI`, `CONCAT`) are normalized to
/// these before evaluation; see [`super::normalize_tokens`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Op {
    Add,
    Subtract,
    Multiply,
    Divide,
    And,
    Or,
    /// Conditional selection, authored as `SI ( cond , then , else )`.
    If,
    OpenParen,
    CloseParen,
    Comma,
}

impl Op {
    /// True for operators that combine a left and right operand in sequence.
    pub fn is_binary(&self) -> bool {
        matches!(
            self,
            Op::Add | Op::Subtract | Op::Multiply | Op::Divide | Op::And | Op::Or
        )
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Op::Add => "+",
            Op::Subtract => "-",
            Op::Multiply => "*",
            Op::Divide => "/",
            Op::And => "AND",
            Op::Or => "OR",
            Op::If => "IF",
            Op::OpenParen => "(",
            Op::CloseParen => ")",
            Op::Comma => ",",
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Field { key } => write!(f, "@{}", key),
            Token::Fixed { value } => write!(f, "{}", value),
            Token::Operator(op) => write!(f, "{}", op),
        }
    }
}
