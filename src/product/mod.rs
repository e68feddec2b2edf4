//! Per-product option filtering: which nodes an end user sees depends on the
//! product the form is being filled for.

use crate::node::NodeDefinition;
use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};

/// Product scoping of one node.
///
/// The default is [`ProductVisibility::Always`]; scoping is opt-in per node.
/// An explicit empty product set means "never visible" and is preserved
/// as-is: narrowing to nothing is an authoring statement, not a gap to be
/// widened back to `Always`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductVisibility {
    Always,
    VisibleFor(AHashSet<String>),
}

impl Default for ProductVisibility {
    fn default() -> Self {
        ProductVisibility::Always
    }
}

impl ProductVisibility {
    pub fn visible_for<I, S>(products: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ProductVisibility::VisibleFor(products.into_iter().map(Into::into).collect())
    }

    pub fn allows(&self, product_id: &str) -> bool {
        match self {
            ProductVisibility::Always => true,
            ProductVisibility::VisibleFor(products) => products.contains(product_id),
        }
    }

    /// True when no product can ever see the node.
    pub fn is_never(&self) -> bool {
        matches!(self, ProductVisibility::VisibleFor(products) if products.is_empty())
    }
}

/// Product visibility assignments for a tree, keyed by node id.
///
/// The filter is driven by one designated multi-select source field; its node
/// id is recorded so callers know which field's selection to feed in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductFilter {
    #[serde(default)]
    source_field: Option<String>,
    assignments: AHashMap<String, ProductVisibility>,
}

impl ProductFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source_field(mut self, node_id: impl Into<String>) -> Self {
        self.source_field = Some(node_id.into());
        self
    }

    pub fn source_field(&self) -> Option<&str> {
        self.source_field.as_deref()
    }

    pub fn assign(&mut self, node_id: impl Into<String>, visibility: ProductVisibility) {
        self.assignments.insert(node_id.into(), visibility);
    }

    /// The visibility of one node; unassigned nodes are visible to every
    /// product.
    pub fn visibility_of(&self, node_id: &str) -> &ProductVisibility {
        self.assignments
            .get(node_id)
            .unwrap_or(&ProductVisibility::Always)
    }

    pub fn allows(&self, node_id: &str, product_id: &str) -> bool {
        self.visibility_of(node_id).allows(product_id)
    }

    /// Node ids whose product set has been narrowed to nothing. Surfaced as
    /// an authoring warning; the assignment itself is left untouched.
    pub fn never_visible(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self
            .assignments
            .iter()
            .filter(|(_, v)| v.is_never())
            .map(|(id, _)| id.as_str())
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Filters a node list down to those the given product may see.
    pub fn filter<'a>(
        &self,
        nodes: impl IntoIterator<Item = &'a NodeDefinition>,
        product_id: &str,
    ) -> Vec<&'a NodeDefinition> {
        nodes
            .into_iter()
            .filter(|node| self.allows(&node.id, product_id))
            .collect()
    }
}
