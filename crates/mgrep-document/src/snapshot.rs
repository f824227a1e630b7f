//! Structural snapshots for comparing subtrees.

use std::collections::BTreeMap;

use crate::document::{Document, NodeId, NodeKind};

/// An owned, id-free copy of a subtree.
///
/// Two snapshots are equal when their trees have the same element names,
/// attribute sets, text and child order. Attribute order is not significant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Snapshot {
    Element {
        name: String,
        attributes: BTreeMap<String, String>,
        children: Vec<Snapshot>,
    },
    Text(String),
}

impl Snapshot {
    /// Number of nodes in the snapshot, itself included.
    pub fn node_count(&self) -> usize {
        match self {
            Self::Element { children, .. } => {
                1 + children.iter().map(Snapshot::node_count).sum::<usize>()
            }
            Self::Text(_) => 1,
        }
    }
}

impl Document {
    /// Takes a snapshot of the subtree rooted at `id`.
    pub fn snapshot(&self, id: NodeId) -> Snapshot {
        match self.kind(id) {
            NodeKind::Text(text) => Snapshot::Text(text.clone()),
            NodeKind::Element { name, attributes } => Snapshot::Element {
                name: name.clone(),
                attributes: attributes.iter().cloned().collect(),
                children: self
                    .children(id)
                    .iter()
                    .map(|child| self.snapshot(*child))
                    .collect(),
            },
        }
    }
}
