use super::Resolve;
use crate::error::EvalError;
use crate::formula::{Op, Token, Value};

/// The core engine for evaluating one normalized token sequence.
///
/// Operators apply strictly left-to-right; only parentheses group. `×`/`÷` do
/// NOT bind tighter than `+`/`-` — authored formulas rely on this, so it is a
/// contract, not an oversight.
pub(super) struct TokenEngine<'a> {
    tokens: &'a [Token],
    resolver: &'a dyn Resolve,
    pos: usize,
}

impl<'a> TokenEngine<'a> {
    pub(super) fn new(tokens: &'a [Token], resolver: &'a dyn Resolve) -> Self {
        Self {
            tokens,
            resolver,
            pos: 0,
        }
    }

    pub(super) fn run(mut self) -> Result<Value, EvalError> {
        let value = self.eval_sequence()?;
        match self.peek() {
            None => Ok(value),
            Some(Token::Operator(Op::CloseParen)) => Err(EvalError::UnbalancedParens),
            Some(other) => Err(EvalError::Malformed(format!(
                "unexpected trailing token '{}'",
                other
            ))),
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    /// `operand (binary-op operand)*`, stopping before `)` or `,`.
    fn eval_sequence(&mut self) -> Result<Value, EvalError> {
        let mut acc = self.eval_operand()?;
        loop {
            match self.peek() {
                None | Some(Token::Operator(Op::CloseParen)) | Some(Token::Operator(Op::Comma)) => {
                    break;
                }
                Some(Token::Operator(op)) if op.is_binary() => {
                    let op = *op;
                    self.pos += 1;
                    let rhs = self.eval_operand()?;
                    acc = apply(op, acc, rhs)?;
                }
                Some(other) => {
                    return Err(EvalError::Malformed(format!(
                        "expected an operator, found '{}'",
                        other
                    )));
                }
            }
        }
        Ok(acc)
    }

    fn eval_operand(&mut self) -> Result<Value, EvalError> {
        let token = self
            .peek()
            .cloned()
            .ok_or_else(|| EvalError::Malformed("expression ends with a dangling operator".into()))?;
        self.pos += 1;
        match token {
            Token::Fixed { value } => Ok(value),
            // A reference with no context entry resolves to the numeric zero
            // value rather than failing. Intentional looseness carried over
            // from the source system; do not "fix".
            Token::Field { key } => Ok(self
                .resolver
                .resolve(&key)
                .filter(|v| !v.is_null())
                .unwrap_or(Value::Number(0.0))),
            Token::Operator(Op::OpenParen) => {
                let inner = self.eval_sequence()?;
                self.expect(Op::CloseParen)?;
                Ok(inner)
            }
            Token::Operator(Op::If) => self.eval_conditional(),
            Token::Operator(Op::CloseParen) => Err(EvalError::UnbalancedParens),
            Token::Operator(op) => Err(EvalError::Malformed(format!(
                "operator '{}' is missing a left operand",
                op
            ))),
        }
    }

    /// `SI ( cond , then , else )` — both branches are evaluated, then the
    /// condition's truthiness selects one.
    fn eval_conditional(&mut self) -> Result<Value, EvalError> {
        self.expect(Op::OpenParen)?;
        let cond = self.eval_sequence()?;
        self.expect(Op::Comma)?;
        let then_value = self.eval_sequence()?;
        self.expect(Op::Comma)?;
        let else_value = self.eval_sequence()?;
        self.expect(Op::CloseParen)?;
        Ok(if cond.is_truthy() {
            then_value
        } else {
            else_value
        })
    }

    fn expect(&mut self, op: Op) -> Result<(), EvalError> {
        match self.peek() {
            Some(Token::Operator(found)) if *found == op => {
                self.pos += 1;
                Ok(())
            }
            _ if op == Op::CloseParen => Err(EvalError::UnbalancedParens),
            _ => Err(EvalError::Malformed(format!("expected '{}'", op))),
        }
    }
}

fn apply(op: Op, left: Value, right: Value) -> Result<Value, EvalError> {
    match op {
        // Add doubles as text concatenation; quoted literals keep their
        // quotes through the join.
        Op::Add => {
            if matches!(left, Value::Text(_)) || matches!(right, Value::Text(_)) {
                Ok(Value::Text(format!("{}{}", left, right)))
            } else {
                Ok(Value::Number(numeric(&left, "+")? + numeric(&right, "+")?))
            }
        }
        Op::Subtract => Ok(Value::Number(numeric(&left, "-")? - numeric(&right, "-")?)),
        Op::Multiply => Ok(Value::Number(numeric(&left, "*")? * numeric(&right, "*")?)),
        Op::Divide => {
            let divisor = numeric(&right, "/")?;
            if divisor == 0.0 {
                return Err(EvalError::DivisionByZero);
            }
            Ok(Value::Number(numeric(&left, "/")? / divisor))
        }
        Op::And => Ok(truth(left.is_truthy() && right.is_truthy())),
        Op::Or => Ok(truth(left.is_truthy() || right.is_truthy())),
        // Structural operators never reach apply.
        Op::If | Op::OpenParen | Op::CloseParen | Op::Comma => Err(EvalError::Malformed(format!(
            "'{}' cannot be applied as a binary operator",
            op
        ))),
    }
}

fn truth(b: bool) -> Value {
    Value::Number(if b { 1.0 } else { 0.0 })
}

fn numeric(value: &Value, op: &str) -> Result<f64, EvalError> {
    value.as_number().ok_or_else(|| EvalError::TypeMismatch {
        operation: op.to_string(),
        expected: "Number".to_string(),
        found: value.clone(),
    })
}
