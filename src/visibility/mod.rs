//! The visibility resolver: recomputes which nodes are shown from condition
//! rules and activity flags.
//!
//! Resolution is a pure pass over the tree. It never touches the value
//! context, so hiding a subtree retains whatever the user had typed there and
//! re-showing it restores the input without re-entry.

use crate::eval::Resolve;
use crate::formula::Value;
use crate::node::{ConditionConfig, ConditionOp, ConditionRule, NodeDefinition, NodeTree};
use ahash::AHashSet;

/// The set of node ids visible under the current value context.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VisibleSet {
    visible: AHashSet<String>,
}

impl VisibleSet {
    pub fn is_visible(&self, node_id: &str) -> bool {
        self.visible.contains(node_id)
    }

    pub fn len(&self) -> usize {
        self.visible.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visible.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.visible.iter()
    }

    /// Writes the derived flag back onto a node slice, for callers that
    /// persist or ship `isVisible` alongside the authored fields.
    pub fn annotate(&self, nodes: &mut [NodeDefinition]) {
        for node in nodes {
            node.is_visible = self.visible.contains(&node.id);
        }
    }
}

/// Resolves visibility for the whole tree against the current values.
///
/// An inactive node hides its entire subtree. A condition node whose rules do
/// not all hold stays visible itself but hides every descendant; an unmet
/// ancestor condition dominates a descendant's own `is_active` flag.
pub fn resolve_visibility(tree: &NodeTree, values: &dyn Resolve) -> VisibleSet {
    let mut set = VisibleSet::default();
    for root in tree.roots() {
        visit(tree, root, values, &mut set);
    }
    set
}

fn visit(tree: &NodeTree, node: &NodeDefinition, values: &dyn Resolve, set: &mut VisibleSet) {
    if !node.is_active {
        return;
    }
    set.visible.insert(node.id.clone());
    if let Some(condition) = &node.condition {
        if !condition_met(condition, values) {
            return;
        }
    }
    for child in tree.children_of(&node.id) {
        visit(tree, child, values, set);
    }
}

/// All rules of one condition must hold. A condition with no rules always
/// holds.
pub fn condition_met(config: &ConditionConfig, values: &dyn Resolve) -> bool {
    config.rules.iter().all(|rule| rule_met(rule, values))
}

fn rule_met(rule: &ConditionRule, values: &dyn Resolve) -> bool {
    // A field with no entered value never satisfies a rule.
    let Some(current) = values.resolve(&rule.field) else {
        return false;
    };
    if current.is_null() {
        return false;
    }
    match rule.operator {
        ConditionOp::Equals => equals(&current, &rule.value),
        ConditionOp::Greater => match (current.as_number(), rule.value.as_number()) {
            (Some(a), Some(b)) => a > b,
            _ => false,
        },
        ConditionOp::Less => match (current.as_number(), rule.value.as_number()) {
            (Some(a), Some(b)) => a < b,
            _ => false,
        },
    }
}

/// Equality compares numerically when both sides parse as numbers, so the
/// text "5" entered in a field matches the authored number 5; otherwise the
/// display forms are compared.
fn equals(current: &Value, expected: &Value) -> bool {
    if let (Some(a), Some(b)) = (current.as_number(), expected.as_number()) {
        return a == b;
    }
    current.to_string() == expected.to_string()
}
