use super::definition::{NodeDefinition, NodeKind};
use crate::error::AuthoringError;
use ahash::AHashMap;

/// The assembled tree: an arena of nodes plus the parent/child index built
/// once at load time.
///
/// Construction validates structural integrity (unique ids, known parents,
/// acyclic parent chains); everything downstream may then index without
/// re-checking.
#[derive(Debug, Clone)]
pub struct NodeTree {
    nodes: Vec<NodeDefinition>,
    by_id: AHashMap<String, usize>,
    children: Vec<Vec<usize>>,
    roots: Vec<usize>,
}

impl NodeTree {
    pub fn from_nodes(nodes: Vec<NodeDefinition>) -> Result<Self, AuthoringError> {
        let mut by_id = AHashMap::with_capacity(nodes.len());
        for (idx, node) in nodes.iter().enumerate() {
            if by_id.insert(node.id.clone(), idx).is_some() {
                return Err(AuthoringError::DuplicateNodeId {
                    node_id: node.id.clone(),
                });
            }
        }

        let mut children: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
        let mut roots = Vec::new();
        for (idx, node) in nodes.iter().enumerate() {
            match &node.parent_id {
                None => roots.push(idx),
                Some(parent_id) => {
                    let parent_idx =
                        *by_id
                            .get(parent_id)
                            .ok_or_else(|| AuthoringError::UnknownParent {
                                node_id: node.id.clone(),
                                parent_id: parent_id.clone(),
                            })?;
                    children[parent_idx].push(idx);
                }
            }
        }

        // Siblings render in authored order.
        for child_list in &mut children {
            child_list.sort_by_key(|&idx| (nodes[idx].order, nodes[idx].id.clone()));
        }
        roots.sort_by_key(|&idx| (nodes[idx].order, nodes[idx].id.clone()));

        let tree = Self {
            nodes,
            by_id,
            children,
            roots,
        };
        tree.check_acyclic()?;
        Ok(tree)
    }

    /// Walks each parent chain; a chain longer than the node count has to
    /// revisit a node.
    fn check_acyclic(&self) -> Result<(), AuthoringError> {
        for start in 0..self.nodes.len() {
            let mut hops = 0usize;
            let mut current = start;
            while let Some(parent_id) = &self.nodes[current].parent_id {
                // Parents were resolved during construction.
                let Some(&parent_idx) = self.by_id.get(parent_id) else {
                    break;
                };
                current = parent_idx;
                hops += 1;
                if hops > self.nodes.len() {
                    return Err(AuthoringError::CyclicParentChain {
                        node_id: self.nodes[start].id.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&NodeDefinition> {
        self.by_id.get(id).map(|&idx| &self.nodes[idx])
    }

    pub fn nodes(&self) -> impl Iterator<Item = &NodeDefinition> {
        self.nodes.iter()
    }

    pub fn roots(&self) -> impl Iterator<Item = &NodeDefinition> {
        self.roots.iter().map(|&idx| &self.nodes[idx])
    }

    pub fn children_of(&self, id: &str) -> impl Iterator<Item = &NodeDefinition> {
        let indices = self
            .by_id
            .get(id)
            .map(|&idx| self.children[idx].as_slice())
            .unwrap_or(&[]);
        indices.iter().map(|&idx| &self.nodes[idx])
    }

    pub fn parent_of(&self, id: &str) -> Option<&NodeDefinition> {
        let node = self.get(id)?;
        let parent_id = node.parent_id.as_deref()?;
        self.get(parent_id)
    }

    /// Depth-first walk of one subtree, the node itself included, siblings in
    /// authored order.
    pub fn descendants_of<'a>(&'a self, id: &str) -> Vec<&'a NodeDefinition> {
        let Some(&start) = self.by_id.get(id) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        let mut stack = vec![start];
        while let Some(idx) = stack.pop() {
            out.push(&self.nodes[idx]);
            for &child in self.children[idx].iter().rev() {
                stack.push(child);
            }
        }
        out
    }

    pub fn nodes_of_kind(&self, kind: NodeKind) -> impl Iterator<Item = &NodeDefinition> {
        self.nodes.iter().filter(move |n| n.kind == kind)
    }
}
