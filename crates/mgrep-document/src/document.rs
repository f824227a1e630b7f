//! Arena-backed document tree.
//!
//! Every node lives in a single `Vec` owned by the [`Document`] and is
//! addressed by a [`NodeId`]. Parent and child links are stored as ids, so a
//! node can be detached and re-attached without moving its data. Detached
//! nodes stay in the arena until [`Document::remove`] frees their slots for
//! the next nodes created.

use std::fmt;

use crate::error::DocumentError;

/// Handle to a node of a [`Document`].
///
/// Ids are only meaningful for the document that created them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum NodeKind {
    Element {
        name: String,
        attributes: Vec<(String, String)>,
    },
    Text(String),
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    removed: bool,
}

/// A mutable XML document.
///
/// Element names and attribute names are stored qualified, the way they are
/// written in the source (`g`, `inkscape:label`, `xml:space`). Namespace
/// declarations are regular `xmlns` attributes.
///
/// # Examples
///
/// ```
/// # use mgrep_document::Document;
/// let mut doc = Document::new("svg");
/// let group = doc.create_element("g");
/// doc.set_attribute(group, "id", "layer1");
/// doc.append_child(doc.root(), group).unwrap();
///
/// assert_eq!(doc.children(doc.root()), &[group]);
/// assert_eq!(doc.attribute(group, "id"), Some("layer1"));
/// ```
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<NodeData>,
    free: Vec<NodeId>,
    root: NodeId,
}

impl Document {
    /// Creates a document holding a single root element.
    pub fn new(root_name: impl Into<String>) -> Self {
        let mut document = Self {
            nodes: Vec::new(),
            free: Vec::new(),
            root: NodeId(0),
        };
        document.root = document.create_element(root_name);
        document
    }

    /// Returns the root element.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of live nodes in the arena, detached ones included.
    pub fn node_count(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    /// Number of slots allocated by the arena, free ones included.
    pub fn capacity(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let data = NodeData {
            kind,
            parent: None,
            children: Vec::new(),
            removed: false,
        };
        if let Some(id) = self.free.pop() {
            self.nodes[id.0] = data;
            return id;
        }
        let id = NodeId(self.nodes.len());
        self.nodes.push(data);
        id
    }

    /// Creates a detached element.
    pub fn create_element(&mut self, name: impl Into<String>) -> NodeId {
        self.push(NodeKind::Element {
            name: name.into(),
            attributes: Vec::new(),
        })
    }

    /// Creates a detached text node.
    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.push(NodeKind::Text(text.into()))
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.kind(id), NodeKind::Element { .. })
    }

    pub fn is_text(&self, id: NodeId) -> bool {
        matches!(self.kind(id), NodeKind::Text(_))
    }

    /// Qualified name of an element, `None` for a text node.
    pub fn name(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            NodeKind::Element { name, .. } => Some(name),
            NodeKind::Text(_) => None,
        }
    }

    /// Element name without its namespace prefix.
    pub fn local_name(&self, id: NodeId) -> Option<&str> {
        self.name(id)
            .map(|name| name.rsplit_once(':').map_or(name, |(_, local)| local))
    }

    /// Returns `true` if `id` is an element whose local name is `local_name`.
    pub fn is_named(&self, id: NodeId, local_name: &str) -> bool {
        self.local_name(id) == Some(local_name)
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        match self.kind(id) {
            NodeKind::Element { attributes, .. } => attributes
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.as_str()),
            NodeKind::Text(_) => None,
        }
    }

    pub fn has_attribute(&self, id: NodeId, name: &str) -> bool {
        self.attribute(id, name).is_some()
    }

    /// Attributes of an element in source order. Empty for a text node.
    pub fn attributes(&self, id: NodeId) -> impl Iterator<Item = (&str, &str)> {
        let attributes: &[(String, String)] = match self.kind(id) {
            NodeKind::Element { attributes, .. } => attributes.as_slice(),
            NodeKind::Text(_) => &[],
        };
        attributes
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Sets an attribute, keeping the position of an existing one.
    ///
    /// Text nodes have no attributes; the call is ignored for them.
    pub fn set_attribute(&mut self, id: NodeId, name: impl Into<String>, value: impl Into<String>) {
        let NodeKind::Element { attributes, .. } = &mut self.nodes[id.0].kind else {
            return;
        };
        let name = name.into();
        let value = value.into();
        match attributes.iter_mut().find(|(key, _)| *key == name) {
            Some((_, existing)) => *existing = value,
            None => attributes.push((name, value)),
        }
    }

    /// Removes an attribute, returning its value if it was set.
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> Option<String> {
        let NodeKind::Element { attributes, .. } = &mut self.nodes[id.0].kind else {
            return None;
        };
        let index = attributes.iter().position(|(key, _)| key == name)?;
        Some(attributes.remove(index).1)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Element children, skipping text nodes.
    pub fn element_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(|child| self.is_element(*child))
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// Ancestors of `id`, closest first.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), |node| self.parent(*node))
    }

    /// Descendants of `id` in document order, `id` itself excluded.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            document: self,
            stack: self.children(id).iter().rev().copied().collect(),
        }
    }

    /// Descendants of `id` accepted by `predicate`, in document order.
    pub fn find_descendants(
        &self,
        id: NodeId,
        mut predicate: impl FnMut(&Self, NodeId) -> bool,
    ) -> Vec<NodeId> {
        self.descendants(id)
            .filter(|node| predicate(self, *node))
            .collect()
    }

    /// First descendant of `id` carrying `name="value"`.
    pub fn find_descendant_by_attribute(
        &self,
        id: NodeId,
        name: &str,
        value: &str,
    ) -> Option<NodeId> {
        self.descendants(id)
            .find(|node| self.attribute(*node, name) == Some(value))
    }

    /// Content of a text node, `None` for an element.
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            NodeKind::Text(text) => Some(text),
            NodeKind::Element { .. } => None,
        }
    }

    /// Replaces the content of a text node, or replaces all children of an
    /// element with a single text node. Replaced children are removed.
    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) {
        let text = text.into();
        if let NodeKind::Text(content) = &mut self.nodes[id.0].kind {
            *content = text;
            return;
        }

        for child in self.children(id).to_vec() {
            self.remove(child);
        }
        let text_node = self.create_text(text);
        self.nodes[text_node.0].parent = Some(id);
        self.nodes[id.0].children.push(text_node);
    }

    /// Concatenated text of `id` and all its descendants.
    pub fn text_content(&self, id: NodeId) -> String {
        std::iter::once(id)
            .chain(self.descendants(id))
            .filter_map(|node| self.text(node))
            .collect()
    }

    /// Position of `id` among its parent's children.
    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|child| *child == id)
    }

    /// Returns `true` if `id` is the root or hangs below it.
    pub fn is_attached(&self, id: NodeId) -> bool {
        id == self.root || self.ancestors(id).any(|ancestor| ancestor == self.root)
    }

    /// Appends a detached `child` as the last child of `parent`.
    ///
    /// # Errors
    ///
    /// Fails if `parent` is a text node, if `child` already has a parent, or if
    /// `child` is `parent` or one of its ancestors.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DocumentError> {
        let index = self.children(parent).len();
        self.insert_at(parent, index, child)
    }

    /// Inserts a detached `node` as the sibling immediately before `reference`.
    pub fn insert_before(&mut self, reference: NodeId, node: NodeId) -> Result<(), DocumentError> {
        let parent = self
            .parent(reference)
            .ok_or(DocumentError::Detached(reference))?;
        let index = self
            .index_in_parent(reference)
            .ok_or(DocumentError::Detached(reference))?;
        self.insert_at(parent, index, node)
    }

    /// Inserts a detached `node` as the sibling immediately after `reference`.
    pub fn insert_after(&mut self, reference: NodeId, node: NodeId) -> Result<(), DocumentError> {
        let parent = self
            .parent(reference)
            .ok_or(DocumentError::Detached(reference))?;
        let index = self
            .index_in_parent(reference)
            .ok_or(DocumentError::Detached(reference))?;
        self.insert_at(parent, index + 1, node)
    }

    fn insert_at(&mut self, parent: NodeId, index: usize, node: NodeId) -> Result<(), DocumentError> {
        if !self.is_element(parent) {
            return Err(DocumentError::NotAnElement(parent));
        }
        if self.parent(node).is_some() || node == self.root {
            return Err(DocumentError::AlreadyAttached(node));
        }
        if node == parent || self.ancestors(parent).any(|ancestor| ancestor == node) {
            return Err(DocumentError::Cycle { node, parent });
        }

        self.nodes[parent.0].children.insert(index, node);
        self.nodes[node.0].parent = Some(parent);
        Ok(())
    }

    /// Detaches `id` from its parent. Returns `false` if it had none.
    ///
    /// The node keeps its own subtree and can be attached again.
    pub fn detach(&mut self, id: NodeId) -> bool {
        let Some(parent) = self.nodes[id.0].parent.take() else {
            return false;
        };
        self.nodes[parent.0].children.retain(|child| *child != id);
        true
    }

    /// Detaches `id` and frees the slots of its whole subtree.
    ///
    /// The ids of the removed nodes are handed out again by the next
    /// `create_*`, `deep_clone` or `import_subtree` calls and must not be used
    /// afterwards. Returns `false`, and does nothing, if `id` is the root or
    /// was already removed.
    pub fn remove(&mut self, id: NodeId) -> bool {
        if id == self.root || self.nodes[id.0].removed {
            return false;
        }
        self.detach(id);

        let mut stack = vec![id];
        while let Some(node) = stack.pop() {
            let data = &mut self.nodes[node.0];
            stack.append(&mut data.children);
            data.kind = NodeKind::Text(String::new());
            data.parent = None;
            data.removed = true;
            self.free.push(node);
        }
        true
    }

    /// Copies the subtree rooted at `id` into a new detached subtree.
    pub fn deep_clone(&mut self, id: NodeId) -> NodeId {
        let source = self.clone_subtree_data(id);
        self.insert_subtree_data(source)
    }

    /// Copies the subtree rooted at `id` of `other` into this document as a
    /// detached subtree.
    pub fn import_subtree(&mut self, other: &Document, id: NodeId) -> NodeId {
        let source = other.clone_subtree_data(id);
        self.insert_subtree_data(source)
    }

    fn clone_subtree_data(&self, id: NodeId) -> SubtreeData {
        SubtreeData {
            kind: self.kind(id).clone(),
            children: self
                .children(id)
                .iter()
                .map(|child| self.clone_subtree_data(*child))
                .collect(),
        }
    }

    fn insert_subtree_data(&mut self, data: SubtreeData) -> NodeId {
        let id = self.push(data.kind);
        for child in data.children {
            let child_id = self.insert_subtree_data(child);
            self.nodes[child_id.0].parent = Some(id);
            self.nodes[id.0].children.push(child_id);
        }
        id
    }
}

/// Owned copy of a subtree, used to move nodes between arenas.
struct SubtreeData {
    kind: NodeKind,
    children: Vec<SubtreeData>,
}

/// Pre-order iterator over the descendants of a node.
pub struct Descendants<'a> {
    document: &'a Document,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let node = self.stack.pop()?;
        self.stack
            .extend(self.document.children(node).iter().rev().copied());
        Some(node)
    }
}
