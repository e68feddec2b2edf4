use crate::formula::{FieldType, Value};
use thiserror::Error;

/// Errors raised while an author is building or saving configuration.
///
/// These are surfaced at authoring time and block the save; they are never
/// silently repaired.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AuthoringError {
    #[error(
        "Field '{field_id}' is declared as {found}, but is referenced inside an arithmetic formula: replace it with a Number-typed field"
    )]
    NonNumericReference { field_id: String, found: FieldType },

    #[error(
        "Field '{field_id}' is declared as {found}, but this formula already references {expected}-typed fields: a formula must reference fields of a single type"
    )]
    MixedFieldTypes {
        field_id: String,
        expected: FieldType,
        found: FieldType,
    },

    #[error("Formula references unknown field '{0}'")]
    UnknownFieldReference(String),

    #[error("Unrecognized formula token '{0}'")]
    UnknownToken(String),

    #[error("Condition on node '{node_id}' is malformed: {message}")]
    MalformedCondition { node_id: String, message: String },

    #[error("Node '{node_id}' appears twice in the tree")]
    DuplicateNodeId { node_id: String },

    #[error("Node '{node_id}' references unknown parent '{parent_id}'")]
    UnknownParent { node_id: String, parent_id: String },

    #[error("Node '{node_id}' is its own ancestor")]
    CyclicParentChain { node_id: String },

    #[error("Exposed key '{0}' is declared by more than one variable")]
    DuplicateExposedKey(String),
}

/// Errors raised while evaluating a formula at runtime.
///
/// Evaluation failures are local to one node; they are reported per node and
/// never abort evaluation of sibling nodes.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("Division by zero")]
    DivisionByZero,

    #[error("Unbalanced parentheses in formula")]
    UnbalancedParens,

    #[error("Malformed expression: {0}")]
    Malformed(String),

    #[error(
        "Type mismatch during operation '{operation}': expected {expected}, but found value '{found}'"
    )]
    TypeMismatch {
        operation: String,
        expected: String,
        found: Value,
    },
}

/// Errors raised while loading registry configuration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Failed to load variables: {0}")]
    Variables(String),

    #[error("Failed to load calculation modes: {0}")]
    Modes(String),
}

/// Report of a partially failed registry load.
///
/// Variables and calculation modes are fetched independently; when one of the
/// two fails the other is still served, and this report tells the caller which
/// side is degraded.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct ConfigPartialFailure {
    pub variables_error: Option<String>,
    pub modes_error: Option<String>,
}

impl ConfigPartialFailure {
    pub fn is_total(&self) -> bool {
        self.variables_error.is_some() && self.modes_error.is_some()
    }
}

/// Errors raised while saving or loading a serialized tree artifact.
#[derive(Error, Debug, Clone)]
pub enum ArtifactError {
    #[error("{0}")]
    Generic(String),
}
