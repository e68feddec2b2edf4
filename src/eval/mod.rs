//! Runtime evaluation of normalized token sequences against a value context.

pub mod context;
pub mod engine;

pub use context::*;

use crate::error::EvalError;
use crate::formula::{Token, Value};
use engine::TokenEngine;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What evaluating a formula produced.
///
/// An empty token sequence is a valid, unconfigured formula and yields
/// [`Outcome::Empty`] — distinct from both an error and a zero result, so
/// callers can tell "not set up yet" apart from "computed zero".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Empty,
    Value(Value),
}

impl Outcome {
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Outcome::Empty => None,
            Outcome::Value(v) => Some(v),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Outcome::Empty)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Empty => write!(f, "<empty>"),
            Outcome::Value(v) => write!(f, "{}", v),
        }
    }
}

/// Evaluates one normalized token sequence.
///
/// Evaluation is pure with respect to the resolver: the same tokens against
/// the same values always produce the same outcome, and nothing is mutated.
pub fn evaluate(tokens: &[Token], resolver: &dyn Resolve) -> Result<Outcome, EvalError> {
    if tokens.is_empty() {
        return Ok(Outcome::Empty);
    }
    TokenEngine::new(tokens, resolver).run().map(Outcome::Value)
}
