use super::{Op, Token};
use crate::error::AuthoringError;
use ahash::AHashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The declared primitive type of a field, as authored in its field config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Number,
    Date,
    Select,
    Boolean,
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldType::Text => "Text",
            FieldType::Number => "Number",
            FieldType::Date => "Date",
            FieldType::Select => "Select",
            FieldType::Boolean => "Boolean",
        };
        write!(f, "{}", name)
    }
}

/// Authoring-time validation of a token sequence against declared field types.
///
/// Two rules, both checked before a formula may be saved:
///
/// 1. A formula containing arithmetic (`-`, `×`, `÷`) may only reference
///    `Number`-typed fields. Add is exempt because it doubles as text
///    concatenation; a pure-concatenation formula over text fields is valid.
/// 2. Field types across one formula must be homogeneous: the first referenced
///    field fixes the expected type, and every later reference must match it.
///
/// Violations are [`AuthoringError`]s carrying the offending field id, distinct
/// from the runtime [`crate::error::EvalError`] taxonomy.
pub fn validate_formula(
    tokens: &[Token],
    field_types: &AHashMap<String, FieldType>,
) -> Result<(), AuthoringError> {
    let arithmetic = tokens.iter().any(|t| {
        matches!(
            t,
            Token::Operator(Op::Subtract | Op::Multiply | Op::Divide)
        )
    });

    let mut expected: Option<FieldType> = None;
    for token in tokens {
        let Token::Field { key } = token else {
            continue;
        };
        let declared = *field_types
            .get(key)
            .ok_or_else(|| AuthoringError::UnknownFieldReference(key.clone()))?;

        if arithmetic && declared != FieldType::Number {
            return Err(AuthoringError::NonNumericReference {
                field_id: key.clone(),
                found: declared,
            });
        }

        match expected {
            None => expected = Some(declared),
            Some(first) if first != declared => {
                return Err(AuthoringError::MixedFieldTypes {
                    field_id: key.clone(),
                    expected: first,
                    found: declared,
                });
            }
            Some(_) => {}
        }
    }
    Ok(())
}
