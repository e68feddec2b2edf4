//! Tests for condition-driven visibility resolution.
mod common;
use common::*;
use formtree::prelude::*;

#[test]
fn test_gate_hides_subtree_without_value() {
    let tree = create_gated_tree();
    let ctx = ValueContext::new();

    let visible = resolve_visibility(&tree, &ctx);
    assert!(visible.is_visible("root"));
    assert!(visible.is_visible("age"));
    // The gate itself shows; its descendants are what the condition hides.
    assert!(visible.is_visible("adult_gate"));
    assert!(!visible.is_visible("license"));
}

#[test]
fn test_gate_opens_when_condition_met() {
    let tree = create_gated_tree();
    let ctx = ctx_with(&[("age", 20.0)]);

    let visible = resolve_visibility(&tree, &ctx);
    assert!(visible.is_visible("adult_gate"));
    assert!(visible.is_visible("license"));
}

#[test]
fn test_hidden_values_are_retained() {
    let tree = create_gated_tree();
    let mut ctx = ctx_with(&[("age", 20.0)]);
    ctx.set("license", "AB-123");

    // Dropping below the threshold hides the subtree but never clears input.
    ctx.set("age", 10.0);
    let visible = resolve_visibility(&tree, &ctx);
    assert!(!visible.is_visible("license"));
    assert_eq!(
        ctx.get("license"),
        Some(&Value::Text("AB-123".to_string()))
    );

    // Re-opening the gate shows the retained value again.
    ctx.set("age", 20.0);
    let visible = resolve_visibility(&tree, &ctx);
    assert!(visible.is_visible("license"));
}

#[test]
fn test_equals_matches_numeric_text() {
    let nodes = vec![
        NodeDefinition::new("root", NodeKind::Branch, "Form"),
        NodeDefinition::new("gate", NodeKind::Condition, "Gate")
            .with_parent("root")
            .with_condition(ConditionConfig {
                rules: vec![ConditionRule {
                    field: "count".to_string(),
                    operator: ConditionOp::Equals,
                    value: Value::Number(5.0),
                }],
            }),
        NodeDefinition::new("detail", NodeKind::Leaf, "Detail")
            .with_parent("gate")
            .with_leaf_kind(LeafKind::Field)
            .with_field(field_of(FieldType::Text)),
    ];
    let tree = NodeTree::from_nodes(nodes).unwrap();

    let visible = resolve_visibility(&tree, &ValueContext::new());
    assert!(!visible.is_visible("detail"));

    // The text "5" typed into a field matches the authored number 5.
    let mut ctx = ValueContext::new();
    ctx.set("count", "5");
    let visible = resolve_visibility(&tree, &ctx);
    assert!(visible.is_visible("detail"));
}

#[test]
fn test_all_rules_must_hold() {
    let nodes = vec![
        NodeDefinition::new("root", NodeKind::Branch, "Form"),
        NodeDefinition::new("gate", NodeKind::Condition, "Gate")
            .with_parent("root")
            .with_condition(ConditionConfig {
                rules: vec![
                    ConditionRule {
                        field: "a".to_string(),
                        operator: ConditionOp::Greater,
                        value: Value::Number(1.0),
                    },
                    ConditionRule {
                        field: "b".to_string(),
                        operator: ConditionOp::Less,
                        value: Value::Number(10.0),
                    },
                ],
            }),
        NodeDefinition::new("detail", NodeKind::Leaf, "Detail")
            .with_parent("gate")
            .with_leaf_kind(LeafKind::Field)
            .with_field(field_of(FieldType::Text)),
    ];
    let tree = NodeTree::from_nodes(nodes).unwrap();

    // One failing rule hides the descendants.
    let visible = resolve_visibility(&tree, &ctx_with(&[("a", 2.0), ("b", 20.0)]));
    assert!(!visible.is_visible("detail"));

    let visible = resolve_visibility(&tree, &ctx_with(&[("a", 2.0), ("b", 5.0)]));
    assert!(visible.is_visible("detail"));
}

#[test]
fn test_inactive_node_hides_subtree() {
    let nodes = vec![
        NodeDefinition::new("root", NodeKind::Branch, "Form"),
        NodeDefinition::new("section", NodeKind::Branch, "Section")
            .with_parent("root")
            .inactive(),
        NodeDefinition::new("field", NodeKind::Leaf, "Field")
            .with_parent("section")
            .with_leaf_kind(LeafKind::Field)
            .with_field(field_of(FieldType::Text)),
    ];
    let tree = NodeTree::from_nodes(nodes).unwrap();

    let visible = resolve_visibility(&tree, &ValueContext::new());
    assert!(visible.is_visible("root"));
    assert!(!visible.is_visible("section"));
    assert!(!visible.is_visible("field"));
}

#[test]
fn test_annotate_writes_derived_flag() {
    let tree = create_gated_tree();
    let visible = resolve_visibility(&tree, &ValueContext::new());

    let mut nodes: Vec<NodeDefinition> = tree.nodes().cloned().collect();
    visible.annotate(&mut nodes);

    let license = nodes.iter().find(|n| n.id == "license").unwrap();
    assert!(!license.is_visible);
    let age = nodes.iter().find(|n| n.id == "age").unwrap();
    assert!(age.is_visible);
}
