//! Common test utilities for building trees, formulas, and contexts.
use formtree::prelude::*;

/// Normalizes a raw token slice, panicking on authoring errors.
#[allow(dead_code)]
pub fn tokens(raw: &[&str]) -> Vec<Token> {
    let raw: Vec<String> = raw.iter().map(|s| s.to_string()).collect();
    normalize_tokens(&raw).expect("tokens should normalize")
}

/// A field config of the given type with nothing else set.
#[allow(dead_code)]
pub fn field_of(field_type: FieldType) -> FieldConfig {
    FieldConfig {
        field_type,
        min: None,
        max: None,
        options: Vec::new(),
        placeholder: None,
    }
}

/// A formula config holding one enabled instance over the given tokens.
#[allow(dead_code)]
pub fn formula_of(instance_tokens: Vec<Token>) -> FormulaConfig {
    FormulaConfig {
        instances: vec![FormulaInstance {
            id: "f1".to_string(),
            name: "default".to_string(),
            tokens: instance_tokens,
            enabled: true,
        }],
    }
}

/// Builds a context from key/value pairs.
#[allow(dead_code)]
pub fn ctx_with(pairs: &[(&str, f64)]) -> ValueContext {
    let mut ctx = ValueContext::new();
    for (key, value) in pairs {
        ctx.set(*key, *value);
    }
    ctx
}

/// A minimal tree: two number fields `a` and `b` under a root branch, plus a
/// formula node `sum` computing `a + b`.
#[allow(dead_code)]
pub fn create_simple_tree() -> NodeTree {
    let nodes = vec![
        NodeDefinition::new("root", NodeKind::Branch, "Form"),
        NodeDefinition::new("a", NodeKind::Leaf, "A")
            .with_parent("root")
            .with_order(1)
            .with_leaf_kind(LeafKind::Field)
            .with_field(field_of(FieldType::Number)),
        NodeDefinition::new("b", NodeKind::Leaf, "B")
            .with_parent("root")
            .with_order(2)
            .with_leaf_kind(LeafKind::Field)
            .with_field(field_of(FieldType::Number)),
        NodeDefinition::new("sum", NodeKind::Formula, "Sum")
            .with_parent("root")
            .with_order(3)
            .with_formula(formula_of(tokens(&["a", "+", "b"]))),
    ];
    NodeTree::from_nodes(nodes).expect("tree should assemble")
}

/// A tree with a condition gate: the `license` field only shows once `age`
/// exceeds 17.
#[allow(dead_code)]
pub fn create_gated_tree() -> NodeTree {
    let nodes = vec![
        NodeDefinition::new("root", NodeKind::Branch, "Form"),
        NodeDefinition::new("age", NodeKind::Leaf, "Age")
            .with_parent("root")
            .with_order(1)
            .with_leaf_kind(LeafKind::Field)
            .with_field(field_of(FieldType::Number)),
        NodeDefinition::new("adult_gate", NodeKind::Condition, "Adults only")
            .with_parent("root")
            .with_order(2)
            .with_condition(ConditionConfig {
                rules: vec![ConditionRule {
                    field: "age".to_string(),
                    operator: ConditionOp::Greater,
                    value: Value::Number(17.0),
                }],
            }),
        NodeDefinition::new("license", NodeKind::Leaf, "License number")
            .with_parent("adult_gate")
            .with_leaf_kind(LeafKind::Field)
            .with_field(field_of(FieldType::Text)),
    ];
    NodeTree::from_nodes(nodes).expect("tree should assemble")
}

/// A repeater config over two template fields, bounded to 1..=3 instances.
#[allow(dead_code)]
pub fn create_repeater_config() -> RepeaterConfig {
    RepeaterConfig {
        template_node_ids: vec!["item_name".to_string(), "item_qty".to_string()],
        min_items: 1,
        max_items: 3,
        add_button_label: Some("Add item".to_string()),
    }
}

/// A registry with one formula-backed variable over the simple tree's `sum`.
#[allow(dead_code)]
pub fn create_simple_registry() -> Registry {
    Registry::new(
        vec![Variable::new(
            "v1",
            "total",
            "Total",
            SourceRef::Formula("sum".to_string()),
        )],
        Vec::new(),
    )
}
