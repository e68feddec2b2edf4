//! Wire shapes for the request/response boundary: evaluation calls, registry
//! listings, and node patches.

use crate::registry::{CalculationMode, Registry, Variable};
use serde::{Deserialize, Serialize};

/// A request to evaluate one tree element against caller-supplied values.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationRequest {
    pub element_id: String,
    #[serde(default)]
    pub context_data: serde_json::Map<String, serde_json::Value>,
}

/// The evaluation result envelope. Evaluation failures travel inside it as
/// data; the transport itself never errors on a bad formula.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl EvaluationResponse {
    pub fn ok(value: Option<serde_json::Value>) -> Self {
        Self {
            success: true,
            value,
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            value: None,
            error: Some(message.into()),
        }
    }
}

/// The variable listing shape served to authoring surfaces.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableListing {
    pub variables: Vec<Variable>,
}

impl VariableListing {
    pub fn from_registry(registry: &Registry) -> Self {
        Self {
            variables: registry.variables().to_vec(),
        }
    }
}

/// The calculation-mode listing shape served to authoring surfaces.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModeListing {
    pub modes: Vec<CalculationMode>,
}

impl ModeListing {
    pub fn from_registry(registry: &Registry) -> Self {
        Self {
            modes: registry.modes().to_vec(),
        }
    }
}

/// A partial update to one node, as queued by the autosave coalescer. Fields
/// not present are left untouched on the stored node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodePatch {
    pub id: String,
    #[serde(default)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

impl NodePatch {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: serde_json::Map::new(),
        }
    }

    pub fn set(&mut self, field: impl Into<String>, value: serde_json::Value) {
        self.fields.insert(field.into(), value);
    }

    /// Folds a newer patch for the same node into this one, last write wins
    /// per field.
    pub fn merge(&mut self, newer: NodePatch) {
        for (field, value) in newer.fields {
            self.fields.insert(field, value);
        }
    }
}
