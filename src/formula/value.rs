use serde::{Deserialize, Serialize};
use std::fmt;

/// Runtime value types flowing through the engine.
///
/// `Text` carries exactly what was authored or entered: a quoted literal keeps
/// its surrounding quotes so that concatenation and printing stay unambiguous,
/// while user-entered context values are stored bare.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Value {
    Number(f64),
    Text(String),
    Bool(bool),
    Null,
}

impl Value {
    /// Strict numeric view. `Text` is parsed permissively (comma decimal
    /// separators are accepted, quotes stripped); unparsable text yields
    /// `None` so the caller can report a type mismatch.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::Null => Some(0.0),
            Value::Text(s) => {
                let bare = s.trim().trim_matches('"').replace(',', ".");
                bare.parse::<f64>().ok()
            }
        }
    }

    /// Lenient numeric coercion: anything that does not parse as a number
    /// becomes `0`.
    pub fn coerce_number(&self) -> f64 {
        self.as_number().unwrap_or(0.0)
    }

    /// Truthiness used by the boolean operators: non-zero numbers, `true`,
    /// and non-empty text are truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Number(n) => *n != 0.0,
            Value::Bool(b) => *b,
            Value::Text(s) => !s.trim_matches('"').is_empty(),
            Value::Null => false,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => {
                if n.fract() == 0.0 && n.is_finite() {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            Value::Text(s) => write!(f, "{}", s),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Null => write!(f, "null"),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}
