//! End-to-end tests: tree assembly, sessions, autosave, and artifacts.
mod common;
use common::*;
use formtree::error::AuthoringError;
use formtree::prelude::*;
use serde_json::json;

#[test]
fn test_tree_assembly_rejects_duplicates() {
    let nodes = vec![
        NodeDefinition::new("a", NodeKind::Branch, "First"),
        NodeDefinition::new("a", NodeKind::Branch, "Second"),
    ];
    let result = NodeTree::from_nodes(nodes);
    assert!(matches!(
        result,
        Err(AuthoringError::DuplicateNodeId { ref node_id }) if node_id == "a"
    ));
}

#[test]
fn test_tree_assembly_rejects_unknown_parent() {
    let nodes = vec![NodeDefinition::new("a", NodeKind::Branch, "A").with_parent("ghost")];
    let result = NodeTree::from_nodes(nodes);
    assert!(matches!(result, Err(AuthoringError::UnknownParent { .. })));
}

#[test]
fn test_tree_assembly_rejects_cycles() {
    let nodes = vec![
        NodeDefinition::new("a", NodeKind::Branch, "A").with_parent("b"),
        NodeDefinition::new("b", NodeKind::Branch, "B").with_parent("a"),
    ];
    let result = NodeTree::from_nodes(nodes);
    assert!(matches!(result, Err(AuthoringError::CyclicParentChain { .. })));
}

#[test]
fn test_children_follow_authored_order() {
    let tree = create_simple_tree();
    let ids: Vec<&str> = tree.children_of("root").map(|n| n.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b", "sum"]);
}

#[test]
fn test_tree_accessors() {
    let tree = create_simple_tree();
    assert_eq!(tree.parent_of("a").unwrap().id, "root");
    assert!(tree.parent_of("root").is_none());

    let formulas: Vec<&str> = tree
        .nodes_of_kind(NodeKind::Formula)
        .map(|n| n.id.as_str())
        .collect();
    assert_eq!(formulas, vec!["sum"]);

    let subtree: Vec<&str> = tree
        .descendants_of("root")
        .iter()
        .map(|n| n.id.as_str())
        .collect();
    assert_eq!(subtree, vec!["root", "a", "b", "sum"]);
}

#[test]
fn test_session_evaluates_tree() {
    let tree = create_simple_tree();
    let registry = Registry::new(Vec::new(), Vec::new());
    let session = Session::new(&tree, &registry);

    let ctx = ctx_with(&[("a", 3.0), ("b", 4.0)]);
    let evaluation = session.evaluate_tree(&ctx);

    assert!(evaluation.visible.is_visible("sum"));
    let result = evaluation
        .results
        .iter()
        .find(|r| r.node_id == "sum")
        .unwrap();
    assert_eq!(
        result.outcome,
        Ok(Outcome::Value(Value::Number(7.0)))
    );
}

#[test]
fn test_formula_failure_stays_local() {
    let mut nodes: Vec<NodeDefinition> = create_simple_tree().nodes().cloned().collect();
    nodes.push(
        NodeDefinition::new("broken", NodeKind::Formula, "Broken")
            .with_parent("root")
            .with_order(4)
            .with_formula(formula_of(tokens(&["10", "/", "0"]))),
    );
    let tree = NodeTree::from_nodes(nodes).unwrap();
    let registry = Registry::new(Vec::new(), Vec::new());
    let session = Session::new(&tree, &registry);

    let evaluation = session.evaluate_tree(&ctx_with(&[("a", 3.0), ("b", 4.0)]));

    let sum = evaluation.results.iter().find(|r| r.node_id == "sum").unwrap();
    assert!(sum.outcome.is_ok());
    let broken = evaluation
        .results
        .iter()
        .find(|r| r.node_id == "broken")
        .unwrap();
    assert!(broken.outcome.is_err());
}

#[test]
fn test_variable_resolves_through_formula() {
    let mut nodes: Vec<NodeDefinition> = create_simple_tree().nodes().cloned().collect();
    nodes.push(
        NodeDefinition::new("double", NodeKind::Formula, "Double")
            .with_parent("root")
            .with_order(4)
            .with_formula(formula_of(tokens(&["total", "*", "2"]))),
    );
    let tree = NodeTree::from_nodes(nodes).unwrap();
    let registry = create_simple_registry();
    let session = Session::new(&tree, &registry);

    let evaluation = session.evaluate_tree(&ctx_with(&[("a", 3.0), ("b", 4.0)]));
    let double = evaluation
        .results
        .iter()
        .find(|r| r.node_id == "double")
        .unwrap();
    assert_eq!(
        double.outcome,
        Ok(Outcome::Value(Value::Number(14.0)))
    );
}

#[test]
fn test_self_referential_variable_resolves_to_zero() {
    let nodes = vec![
        NodeDefinition::new("root", NodeKind::Branch, "Form"),
        NodeDefinition::new("loop", NodeKind::Formula, "Loop")
            .with_parent("root")
            .with_formula(formula_of(tokens(&["myself", "+", "1"]))),
    ];
    let tree = NodeTree::from_nodes(nodes).unwrap();
    let registry = Registry::new(
        vec![Variable::new(
            "v1",
            "myself",
            "Myself",
            SourceRef::Formula("loop".to_string()),
        )],
        Vec::new(),
    );
    let session = Session::new(&tree, &registry);

    let evaluation = session.evaluate_tree(&ValueContext::new());
    let result = evaluation.results.iter().find(|r| r.node_id == "loop").unwrap();
    // The inner occurrence bottoms out at zero, so `myself` resolves to
    // 0 + 1 and the outer pass computes 1 + 1.
    assert_eq!(result.outcome, Ok(Outcome::Value(Value::Number(2.0))));
}

#[test]
fn test_evaluate_element_request() {
    let tree = create_simple_tree();
    let registry = create_simple_registry();
    let session = Session::new(&tree, &registry);

    let mut context_data = serde_json::Map::new();
    context_data.insert("a".to_string(), json!(3.0));
    context_data.insert("b".to_string(), json!(4.0));

    let response = session.evaluate_element(&EvaluationRequest {
        element_id: "sum".to_string(),
        context_data: context_data.clone(),
    });
    assert!(response.success);
    assert_eq!(response.value, Some(json!(7.0)));

    // An exposed key works as an element id too.
    let response = session.evaluate_element(&EvaluationRequest {
        element_id: "total".to_string(),
        context_data,
    });
    assert!(response.success);
    assert_eq!(response.value, Some(json!(7.0)));
}

#[test]
fn test_evaluate_element_resolves_node_and_condition_variables() {
    let tree = create_gated_tree();
    let registry = Registry::new(
        vec![
            Variable::new(
                "v1",
                "age_value",
                "Age",
                SourceRef::Node("age".to_string()),
            ),
            Variable::new(
                "v2",
                "is_adult",
                "Is adult",
                SourceRef::Condition("adult_gate".to_string()),
            ),
        ],
        Vec::new(),
    );
    let session = Session::new(&tree, &registry);

    let mut context_data = serde_json::Map::new();
    context_data.insert("age".to_string(), json!(20.0));

    // A node-sourced variable reads its field straight from the context.
    let response = session.evaluate_element(&EvaluationRequest {
        element_id: "age_value".to_string(),
        context_data: context_data.clone(),
    });
    assert!(response.success);
    assert_eq!(response.value, Some(json!(20.0)));

    // A condition-sourced variable reports whether the gate holds.
    let response = session.evaluate_element(&EvaluationRequest {
        element_id: "is_adult".to_string(),
        context_data: context_data.clone(),
    });
    assert!(response.success);
    assert_eq!(response.value, Some(json!(1.0)));

    context_data.insert("age".to_string(), json!(10.0));
    let response = session.evaluate_element(&EvaluationRequest {
        element_id: "is_adult".to_string(),
        context_data,
    });
    assert!(response.success);
    assert_eq!(response.value, Some(json!(0.0)));
}

#[test]
fn test_evaluate_element_unknown_id() {
    let tree = create_simple_tree();
    let registry = Registry::new(Vec::new(), Vec::new());
    let session = Session::new(&tree, &registry);

    let response = session.evaluate_element(&EvaluationRequest {
        element_id: "ghost".to_string(),
        context_data: serde_json::Map::new(),
    });
    assert!(!response.success);
    assert!(response.error.unwrap().contains("ghost"));
}

#[test]
fn test_evaluate_mode() {
    let tree = create_simple_tree();
    let registry = Registry::new(
        vec![Variable::new(
            "v1",
            "quote",
            "Quote total",
            SourceRef::Formula("sum".to_string()),
        )],
        vec![CalculationMode::new("m1", "quote", "Quote")
            .with_field(ModeField::new("f1", "a", "A", FieldType::Number))
            .with_field(ModeField::new("f2", "b", "B", FieldType::Number))],
    );
    let session = Session::new(&tree, &registry);

    let outcome = session
        .evaluate_mode("quote", &ctx_with(&[("a", 3.0), ("b", 4.0)]))
        .unwrap();
    assert_eq!(outcome, Outcome::Value(Value::Number(7.0)));

    // A missing declared field blocks the run.
    let result = session.evaluate_mode("quote", &ctx_with(&[("a", 3.0)]));
    assert!(result.unwrap_err().to_string().contains("b"));

    let result = session.evaluate_mode("ghost", &ValueContext::new());
    assert!(result.is_err());
}

#[test]
fn test_calculation_leaf_evaluates_in_tree_pass() {
    let mut nodes: Vec<NodeDefinition> = create_simple_tree().nodes().cloned().collect();
    nodes.push(
        NodeDefinition::new("line_total", NodeKind::Leaf, "Line total")
            .with_parent("root")
            .with_order(4)
            .with_leaf_kind(LeafKind::Calculation)
            .with_formula(formula_of(tokens(&["a", "*", "2"]))),
    );
    let tree = NodeTree::from_nodes(nodes).unwrap();
    let registry = Registry::new(Vec::new(), Vec::new());
    let session = Session::new(&tree, &registry);

    let evaluation = session.evaluate_tree(&ctx_with(&[("a", 3.0), ("b", 4.0)]));
    let leaf = evaluation
        .results
        .iter()
        .find(|r| r.node_id == "line_total")
        .unwrap();
    assert_eq!(leaf.outcome, Ok(Outcome::Value(Value::Number(6.0))));
}

#[test]
fn test_session_validate_collects_findings() {
    let nodes = vec![
        NodeDefinition::new("root", NodeKind::Branch, "Form"),
        NodeDefinition::new("name", NodeKind::Leaf, "Name")
            .with_parent("root")
            .with_leaf_kind(LeafKind::Field)
            .with_field(field_of(FieldType::Text)),
        NodeDefinition::new("bad_math", NodeKind::Formula, "Bad math")
            .with_parent("root")
            .with_formula(formula_of(tokens(&["name", "-", "2"]))),
        NodeDefinition::new("bad_gate", NodeKind::Condition, "Bad gate")
            .with_parent("root")
            .with_condition(ConditionConfig {
                rules: vec![ConditionRule {
                    field: "  ".to_string(),
                    operator: ConditionOp::Equals,
                    value: Value::Number(1.0),
                }],
            }),
    ];
    let tree = NodeTree::from_nodes(nodes).unwrap();
    let registry = Registry::new(Vec::new(), Vec::new());
    let session = Session::new(&tree, &registry);

    let findings = session.validate();
    assert_eq!(findings.len(), 2);
    assert!(findings
        .iter()
        .any(|f| matches!(f, AuthoringError::NonNumericReference { .. })));
    assert!(findings
        .iter()
        .any(|f| matches!(f, AuthoringError::MalformedCondition { .. })));
}

#[test]
fn test_disabled_formula_instances_yield_empty() {
    let mut config = formula_of(tokens(&["1", "+", "1"]));
    config.instances[0].enabled = false;
    let nodes = vec![
        NodeDefinition::new("root", NodeKind::Branch, "Form"),
        NodeDefinition::new("off", NodeKind::Formula, "Off")
            .with_parent("root")
            .with_formula(config),
    ];
    let tree = NodeTree::from_nodes(nodes).unwrap();
    let registry = Registry::new(Vec::new(), Vec::new());
    let session = Session::new(&tree, &registry);

    let evaluation = session.evaluate_tree(&ValueContext::new());
    let result = evaluation.results.iter().find(|r| r.node_id == "off").unwrap();
    assert_eq!(result.outcome, Ok(Outcome::Empty));
}

#[test]
fn test_save_coalescer_merges_and_dedups() {
    let mut coalescer = SaveCoalescer::new();

    let mut first = NodePatch::new("n1");
    first.set("label", json!("A"));
    assert!(coalescer.queue(first));

    let mut second = NodePatch::new("n1");
    second.set("label", json!("B"));
    assert!(coalescer.queue(second));
    assert_eq!(coalescer.pending_count(), 1);

    // Last write wins per field.
    let ready = coalescer.next_ready().unwrap();
    assert_eq!(ready.fields["label"], json!("B"));
    assert!(coalescer.next_ready().is_none());

    // Edits during a flight accumulate for the next one.
    let mut third = NodePatch::new("n1");
    third.set("label", json!("C"));
    assert!(coalescer.queue(third));
    assert!(coalescer.next_ready().is_none());
    coalescer.complete(ready);

    let next = coalescer.next_ready().unwrap();
    assert_eq!(next.fields["label"], json!("C"));
    coalescer.complete(next.clone());

    // Re-queuing what was just saved is a no-op.
    assert!(!coalescer.queue(next));
    assert!(coalescer.is_idle());
}

#[test]
fn test_failed_save_is_retried() {
    let mut coalescer = SaveCoalescer::new();
    let mut patch = NodePatch::new("n1");
    patch.set("label", json!("A"));
    coalescer.queue(patch);

    let flight = coalescer.next_ready().unwrap();
    coalescer.fail(flight);

    let retry = coalescer.next_ready().unwrap();
    assert_eq!(retry.fields["label"], json!("A"));
}

#[test]
fn test_session_guard_blocks_late_results() {
    let guard = SessionGuard::new();
    assert!(guard.admit());
    guard.end();
    assert!(!guard.admit());
}

#[test]
fn test_product_filter() {
    let mut filter = ProductFilter::new().with_source_field("product_choice");
    assert_eq!(filter.source_field(), Some("product_choice"));
    filter.assign("opt_premium", ProductVisibility::visible_for(["p1"]));
    filter.assign("opt_dead", ProductVisibility::visible_for(Vec::<String>::new()));

    assert!(filter.allows("opt_premium", "p1"));
    assert!(!filter.allows("opt_premium", "p2"));
    // Unassigned nodes stay visible everywhere.
    assert!(filter.allows("opt_other", "p2"));

    // An emptied product set is a warning, never silently widened.
    assert_eq!(filter.never_visible(), vec!["opt_dead"]);
    assert!(!filter.allows("opt_dead", "p1"));

    let tree = create_simple_tree();
    let nodes: Vec<&NodeDefinition> = tree.nodes().collect();
    let filtered = filter.filter(nodes, "p2");
    assert_eq!(filtered.len(), tree.len());
}

#[test]
fn test_artifact_roundtrip() {
    let nodes: Vec<NodeDefinition> = create_simple_tree().nodes().cloned().collect();
    let variables = vec![Variable::new(
        "v1",
        "total",
        "Total",
        SourceRef::Formula("sum".to_string()),
    )];
    let artifact = TreeArtifact::new(nodes.clone(), variables, Vec::new());

    let path = std::env::temp_dir().join("formtree_artifact_roundtrip.bin");
    let path = path.to_str().unwrap();
    artifact.save(path).unwrap();

    let loaded = TreeArtifact::from_file(path).unwrap();
    assert_eq!(loaded.nodes, nodes);
    assert_eq!(loaded.variables.len(), 1);
    assert_eq!(loaded.variables[0].exposed_key, "total");

    let tree = NodeTree::from_nodes(loaded.nodes).unwrap();
    let registry = Registry::new(loaded.variables, loaded.modes);
    let session = Session::new(&tree, &registry);
    let evaluation = session.evaluate_tree(&ctx_with(&[("a", 1.0), ("b", 2.0)]));
    let sum = evaluation.results.iter().find(|r| r.node_id == "sum").unwrap();
    assert_eq!(sum.outcome, Ok(Outcome::Value(Value::Number(3.0))));

    let _ = std::fs::remove_file(path);
}
