use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a variable's value comes from.
///
/// The string form carries a capacity prefix: `formula:<id>` for computed
/// values, `condition:<id>` for condition outcomes, `node:<id>` for direct
/// field values. A bare id is a direct field reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceRef {
    Formula(String),
    Condition(String),
    Node(String),
}

impl SourceRef {
    pub fn parse(raw: &str) -> Self {
        if let Some(id) = raw.strip_prefix("formula:") {
            SourceRef::Formula(id.to_string())
        } else if let Some(id) = raw.strip_prefix("condition:") {
            SourceRef::Condition(id.to_string())
        } else if let Some(id) = raw.strip_prefix("node:") {
            SourceRef::Node(id.to_string())
        } else {
            SourceRef::Node(raw.to_string())
        }
    }

    /// The referenced node id, prefix stripped.
    pub fn target(&self) -> &str {
        match self {
            SourceRef::Formula(id) | SourceRef::Condition(id) | SourceRef::Node(id) => id,
        }
    }
}

impl fmt::Display for SourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceRef::Formula(id) => write!(f, "formula:{}", id),
            SourceRef::Condition(id) => write!(f, "condition:{}", id),
            SourceRef::Node(id) => write!(f, "node:{}", id),
        }
    }
}

impl Serialize for SourceRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for SourceRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(SourceRef::parse(&raw))
    }
}

/// How a variable's value is presented.
///
/// The string form is `number`, `number:<unit>`, or `text`; anything else
/// falls back to `text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayFormat {
    Number,
    NumberUnit(String),
    Text,
}

impl DisplayFormat {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "number" => DisplayFormat::Number,
            "text" => DisplayFormat::Text,
            _ => match raw.strip_prefix("number:") {
                Some(unit) if !unit.is_empty() => DisplayFormat::NumberUnit(unit.to_string()),
                _ => DisplayFormat::Text,
            },
        }
    }
}

impl Default for DisplayFormat {
    fn default() -> Self {
        DisplayFormat::Number
    }
}

impl fmt::Display for DisplayFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayFormat::Number => write!(f, "number"),
            DisplayFormat::NumberUnit(unit) => write!(f, "number:{}", unit),
            DisplayFormat::Text => write!(f, "text"),
        }
    }
}

impl Serialize for DisplayFormat {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for DisplayFormat {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(DisplayFormat::parse(&raw))
    }
}

/// One registered variable: a stable symbolic name over a tree element.
///
/// Formulas reference the exposed key rather than the node id, so authors can
/// rewire what a name points at without touching every formula that uses it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variable {
    pub id: String,
    pub exposed_key: String,
    pub display_name: String,
    /// `None` means the variable has no originating node and is only ever
    /// fed through the value context.
    #[serde(default)]
    pub source_ref: Option<SourceRef>,
    #[serde(default)]
    pub display_format: DisplayFormat,
}

impl Variable {
    pub fn new(
        id: impl Into<String>,
        exposed_key: impl Into<String>,
        display_name: impl Into<String>,
        source_ref: impl Into<Option<SourceRef>>,
    ) -> Self {
        Self {
            id: id.into(),
            exposed_key: exposed_key.into(),
            display_name: display_name.into(),
            source_ref: source_ref.into(),
            display_format: DisplayFormat::default(),
        }
    }

    pub fn with_format(mut self, display_format: DisplayFormat) -> Self {
        self.display_format = display_format;
        self
    }
}
