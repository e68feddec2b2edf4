//! Repeater instance management: author-bounded repetition of a template
//! subtree, with per-instance value scoping.

use crate::eval::ValueContext;
use crate::node::{NodeDefinition, RepeaterConfig};

/// The scoped context key for one field of one repeater instance.
///
/// Instances share the template's node ids, so their values are disambiguated
/// by index: `{repeater_id}_{index}_{template_node_id}`.
pub fn scoped_key(repeater_id: &str, index: usize, template_node_id: &str) -> String {
    format!("{}_{}_{}", repeater_id, index, template_node_id)
}

/// Live instance state of one repeater node.
///
/// The count always stays within the authored bounds; add and remove requests
/// outside them are ignored rather than clamped after the fact.
#[derive(Debug, Clone, PartialEq)]
pub struct RepeaterInstances {
    repeater_id: String,
    template_node_ids: Vec<String>,
    min_items: usize,
    max_items: usize,
    count: usize,
}

impl RepeaterInstances {
    pub fn new(repeater_id: impl Into<String>, config: &RepeaterConfig) -> Self {
        let min_items = config.min_items;
        let max_items = config.max_items.max(min_items);
        Self {
            repeater_id: repeater_id.into(),
            template_node_ids: config.template_node_ids.clone(),
            min_items,
            max_items,
            count: min_items,
        }
    }

    /// Builds instance state from a repeater node; `None` for any other node.
    pub fn from_node(node: &NodeDefinition) -> Option<Self> {
        node.repeater
            .as_ref()
            .map(|config| Self::new(node.id.clone(), config))
    }

    pub fn repeater_id(&self) -> &str {
        &self.repeater_id
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn min_items(&self) -> usize {
        self.min_items
    }

    pub fn max_items(&self) -> usize {
        self.max_items
    }

    pub fn can_add(&self) -> bool {
        self.count < self.max_items
    }

    pub fn can_remove(&self) -> bool {
        self.count > self.min_items
    }

    /// Adds one instance. Returns `false` when already at the maximum.
    pub fn add_instance(&mut self) -> bool {
        if !self.can_add() {
            return false;
        }
        self.count += 1;
        true
    }

    /// Removes the instance at `index`, clearing its scoped values and
    /// shifting later instances down so indices stay contiguous.
    ///
    /// Returns `false` when already at the minimum or the index is out of
    /// range; the context is untouched in that case.
    pub fn remove_instance(&mut self, index: usize, ctx: &mut ValueContext) -> bool {
        if !self.can_remove() || index >= self.count {
            return false;
        }
        for template_id in &self.template_node_ids {
            ctx.remove(&scoped_key(&self.repeater_id, index, template_id));
        }
        for later in (index + 1)..self.count {
            for template_id in &self.template_node_ids {
                let from = scoped_key(&self.repeater_id, later, template_id);
                if let Some(value) = ctx.remove(&from) {
                    ctx.set(scoped_key(&self.repeater_id, later - 1, template_id), value);
                }
            }
        }
        self.count -= 1;
        true
    }

    /// The scoped context keys of one instance, in template order.
    pub fn keys_for(&self, index: usize) -> impl Iterator<Item = String> + '_ {
        self.template_node_ids
            .iter()
            .map(move |template_id| scoped_key(&self.repeater_id, index, template_id))
    }
}
