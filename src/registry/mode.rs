use crate::formula::FieldType;
use serde::{Deserialize, Serialize};

/// One input field of a calculation mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModeField {
    pub id: String,
    pub code: String,
    pub label: String,
    pub field_type: FieldType,
    #[serde(default)]
    pub unit: Option<String>,
}

impl ModeField {
    pub fn new(
        id: impl Into<String>,
        code: impl Into<String>,
        label: impl Into<String>,
        field_type: FieldType,
    ) -> Self {
        Self {
            id: id.into(),
            code: code.into(),
            label: label.into(),
            field_type,
            unit: None,
        }
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }
}

/// One named calculation mode: a code, a label, and the fields a caller must
/// supply to run it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationMode {
    pub id: String,
    pub code: String,
    pub label: String,
    #[serde(default)]
    pub fields: Vec<ModeField>,
}

impl CalculationMode {
    pub fn new(id: impl Into<String>, code: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            code: code.into(),
            label: label.into(),
            fields: Vec::new(),
        }
    }

    pub fn with_field(mut self, field: ModeField) -> Self {
        self.fields.push(field);
        self
    }

    pub fn field_by_code(&self, code: &str) -> Option<&ModeField> {
        self.fields.iter().find(|f| f.code == code)
    }
}
