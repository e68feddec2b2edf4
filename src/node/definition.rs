use crate::formula::{FieldType, Token, Value};
use serde::{Deserialize, Serialize};

/// Structural role of a node in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// Interior grouping node; may carry children of any kind.
    Branch,
    /// Terminal node; its [`LeafKind`] says what it renders as.
    Leaf,
    /// Gates the visibility of its subtree on its condition rules.
    Condition,
    /// Carries one or more formula instances and produces a computed value.
    Formula,
    /// Mirrors a value fetched from an external endpoint.
    Api,
    /// Cross-reference into another subtree.
    Link,
    /// Template anchor for author-bounded repeated sections.
    Repeater,
}

/// Rendering role of a leaf node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeafKind {
    Option,
    Field,
    Data,
    Table,
    Calculation,
}

/// Input configuration attached to a field-bearing node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldConfig {
    pub field_type: FieldType,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub placeholder: Option<String>,
}

/// Comparison operator of one condition rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConditionOp {
    Equals,
    Greater,
    Less,
}

/// One rule of a condition node: `field <op> value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionRule {
    pub field: String,
    pub operator: ConditionOp,
    pub value: Value,
}

/// Condition configuration: all rules must hold for the subtree to show.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionConfig {
    pub rules: Vec<ConditionRule>,
}

/// One named formula variant on a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormulaInstance {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub tokens: Vec<Token>,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl FormulaInstance {
    /// The distinct field keys this instance references, in first-seen order.
    pub fn referenced_keys(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for token in &self.tokens {
            if let Token::Field { key } = token {
                if !seen.contains(&key.as_str()) {
                    seen.push(key.as_str());
                }
            }
        }
        seen
    }
}

/// Formula configuration: a node may hold several named instances, of which
/// the first enabled one is effective at evaluation time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormulaConfig {
    pub instances: Vec<FormulaInstance>,
}

impl FormulaConfig {
    pub fn effective(&self) -> Option<&FormulaInstance> {
        self.instances.iter().find(|i| i.enabled)
    }
}

/// Repeater configuration: the template subtree and the author-set bounds on
/// how many instances a user may hold open at once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepeaterConfig {
    pub template_node_ids: Vec<String>,
    #[serde(default = "default_min_items")]
    pub min_items: usize,
    #[serde(default = "default_max_items")]
    pub max_items: usize,
    #[serde(default)]
    pub add_button_label: Option<String>,
}

fn default_true() -> bool {
    true
}

fn default_min_items() -> usize {
    1
}

fn default_max_items() -> usize {
    10
}

/// One node of the tree, as authored and persisted.
///
/// `is_visible` is derived state: the visibility resolver recomputes it from
/// conditions and activity on every pass, and nothing else writes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDefinition {
    pub id: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    pub kind: NodeKind,
    #[serde(default)]
    pub leaf_kind: Option<LeafKind>,
    pub label: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub order: i64,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default = "default_true")]
    pub is_visible: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub field: Option<FieldConfig>,
    #[serde(default)]
    pub condition: Option<ConditionConfig>,
    #[serde(default)]
    pub formula: Option<FormulaConfig>,
    #[serde(default)]
    pub repeater: Option<RepeaterConfig>,
}

impl NodeDefinition {
    /// Minimal constructor for programmatic tree building; configs start
    /// empty and are filled in with the `with_*` builders.
    pub fn new(id: impl Into<String>, kind: NodeKind, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            parent_id: None,
            kind,
            leaf_kind: None,
            label: label.into(),
            description: None,
            order: 0,
            is_required: false,
            is_visible: true,
            is_active: true,
            field: None,
            condition: None,
            formula: None,
            repeater: None,
        }
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn with_order(mut self, order: i64) -> Self {
        self.order = order;
        self
    }

    pub fn with_leaf_kind(mut self, leaf_kind: LeafKind) -> Self {
        self.leaf_kind = Some(leaf_kind);
        self
    }

    pub fn with_field(mut self, field: FieldConfig) -> Self {
        self.field = Some(field);
        self
    }

    pub fn with_condition(mut self, condition: ConditionConfig) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn with_formula(mut self, formula: FormulaConfig) -> Self {
        self.formula = Some(formula);
        self
    }

    pub fn with_repeater(mut self, repeater: RepeaterConfig) -> Self {
        self.repeater = Some(repeater);
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }
}
