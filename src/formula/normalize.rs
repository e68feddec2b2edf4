use super::{Op, Token, Value};
use crate::error::AuthoringError;

/// Converts the raw token strings an author assembles into the canonical
/// [`Token`] sequence the evaluator understands.
///
/// Authoring surfaces use human-facing glyphs (`×`, `÷`, `ET`, `OU`, `SI`,
/// `CONCAT`) and reference markers (`@value.<id>`, `@select.<id>.<option>`,
/// bare exposed keys). Normalization is this module's contract; the evaluator
/// only ever sees the canonical operator set.
pub fn normalize_tokens(raw: &[String]) -> Result<Vec<Token>, AuthoringError> {
    raw.iter().map(|s| normalize_one(s)).collect()
}

fn normalize_one(raw: &str) -> Result<Token, AuthoringError> {
    let trimmed = raw.trim();

    if let Some(op) = operator_for(trimmed) {
        return Ok(Token::Operator(op));
    }

    // Quoted text literal: kept verbatim, quotes included.
    if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
        return Ok(Token::Fixed {
            value: Value::Text(trimmed.to_string()),
        });
    }

    // Reference markers from the authoring panel.
    if let Some(rest) = trimmed.strip_prefix("@value.") {
        if rest.is_empty() {
            return Err(AuthoringError::UnknownToken(raw.to_string()));
        }
        return Ok(Token::Field {
            key: rest.to_string(),
        });
    }
    if let Some(rest) = trimmed.strip_prefix("@select.") {
        // `@select.<id>.<option>` references the select field itself.
        let id = rest.split('.').next().unwrap_or_default();
        if id.is_empty() {
            return Err(AuthoringError::UnknownToken(raw.to_string()));
        }
        return Ok(Token::Field {
            key: id.to_string(),
        });
    }
    if trimmed.starts_with('@') {
        return Err(AuthoringError::UnknownToken(raw.to_string()));
    }

    if let Ok(n) = trimmed.parse::<f64>() {
        return Ok(Token::Fixed {
            value: Value::Number(n),
        });
    }

    // Anything identifier-shaped is a symbolic reference (an exposed key).
    if is_identifier(trimmed) {
        return Ok(Token::Field {
            key: trimmed.to_string(),
        });
    }

    Err(AuthoringError::UnknownToken(raw.to_string()))
}

fn operator_for(s: &str) -> Option<Op> {
    match s {
        "+" => Some(Op::Add),
        "-" => Some(Op::Subtract),
        "*" | "×" => Some(Op::Multiply),
        "/" | "÷" => Some(Op::Divide),
        "ET" | "AND" => Some(Op::And),
        "OU" | "OR" => Some(Op::Or),
        "SI" | "IF" => Some(Op::If),
        // Text concatenation is the additive operator over text operands.
        "CONCAT" => Some(Op::Add),
        "(" => Some(Op::OpenParen),
        ")" => Some(Op::CloseParen),
        "," | ";" => Some(Op::Comma),
        _ => None,
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '-' || c == '.')
}
