//! Layer discovery.
//!
//! Inkscape layers are `g` elements with `inkscape:groupmode="layer"`. The
//! layers that matter here also carry a [`MICROGESTURE_LAYER`] classification
//! telling which microgesture and characteristic they illustrate.
//!
//! Building a [`LayerGraph`] takes three steps:
//!
//! 1. [`discover_layers`] collects every labelled layer and validates its
//!    classification.
//! 2. [`link_hierarchy`] records the parent/child relations between layers.
//! 3. [`index_by_classification`] groups classified layers by
//!    `(microgesture, characteristic)`.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use log::{debug, info};

use mgrep_core::microgesture::Classification;
use mgrep_document::{Document, NodeId};

use crate::{
    attributes::{INKSCAPE_GROUPMODE, INKSCAPE_LABEL, MICROGESTURE_LAYER},
    error::ConfigurationError,
};

/// One labelled layer of the drawing.
///
/// Parent and children are handles to other layer nodes of the same
/// document; the layer does not own them.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerNode {
    node: NodeId,
    id: String,
    label: String,
    described_mg: Option<String>,
    classification: Option<Classification>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl LayerNode {
    /// Document node of the layer group.
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Value of the `id` attribute, empty if the group has none.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Value of the `inkscape:label` attribute.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Raw classification attribute, as written in the drawing.
    pub fn described_mg(&self) -> Option<&str> {
        self.described_mg.as_deref()
    }

    pub fn classification(&self) -> Option<Classification> {
        self.classification
    }

    /// Closest enclosing layer.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Layers directly nested in this one.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Collects every layer group of `document` that has a label.
///
/// # Errors
///
/// Returns [`ConfigurationError::InvalidClassification`] for the first layer
/// whose classification attribute is malformed or names an unknown pair.
pub fn discover_layers(document: &Document) -> Result<Vec<LayerNode>, ConfigurationError> {
    let mut layers = Vec::new();
    for node in document.descendants(document.root()) {
        if !document.is_named(node, "g")
            || document.attribute(node, INKSCAPE_GROUPMODE) != Some("layer")
        {
            continue;
        }
        let Some(label) = document.attribute(node, INKSCAPE_LABEL) else {
            continue;
        };

        let id = document.attribute(node, "id").unwrap_or_default();
        let described_mg = document.attribute(node, MICROGESTURE_LAYER);
        let classification = described_mg
            .map(|value| {
                Classification::parse_attribute(value).map_err(|source| {
                    ConfigurationError::InvalidClassification {
                        label: label.to_string(),
                        id: id.to_string(),
                        value: value.to_string(),
                        source,
                    }
                })
            })
            .transpose()?;

        layers.push(LayerNode {
            node,
            id: id.to_string(),
            label: label.to_string(),
            described_mg: described_mg.map(str::to_string),
            classification,
            parent: None,
            children: Vec::new(),
        });
    }
    Ok(layers)
}

/// Fills the parent and children of each layer from the document tree.
///
/// Only direct relations are recorded: a layer nested in a plain group that
/// sits inside another layer has no parent layer.
pub fn link_hierarchy(document: &Document, layers: &mut [LayerNode]) {
    let layer_nodes: HashSet<NodeId> = layers.iter().map(LayerNode::node).collect();
    for layer in layers.iter_mut() {
        layer.parent = document
            .parent(layer.node)
            .filter(|parent| layer_nodes.contains(parent));
        layer.children = document
            .children(layer.node)
            .iter()
            .copied()
            .filter(|child| layer_nodes.contains(child))
            .collect();
    }
}

/// Classified layers grouped by `(microgesture, characteristic)`.
///
/// Keys and layers keep the order in which they appear in the document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MicrogestureIndex {
    layers: IndexMap<Classification, Vec<NodeId>>,
}

impl MicrogestureIndex {
    /// Layers classified as `classification`, in document order.
    pub fn get(&self, classification: Classification) -> &[NodeId] {
        self.layers
            .get(&classification)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Classification, &[NodeId])> {
        self.layers
            .iter()
            .map(|(classification, layers)| (*classification, layers.as_slice()))
    }

    /// Number of classified layers.
    pub fn layer_count(&self) -> usize {
        self.layers.values().map(Vec::len).sum()
    }

    /// Number of distinct microgestures among the classified layers.
    pub fn microgesture_count(&self) -> usize {
        self.layers
            .keys()
            .map(|classification| classification.microgesture())
            .collect::<HashSet<_>>()
            .len()
    }
}

/// Groups classified layers by classification. Unclassified layers are left
/// out of the index.
pub fn index_by_classification(layers: &[LayerNode]) -> MicrogestureIndex {
    let mut index = MicrogestureIndex::default();
    for layer in layers {
        if let Some(classification) = layer.classification {
            index
                .layers
                .entry(classification)
                .or_default()
                .push(layer.node);
        }
    }
    index
}

/// All layers of a drawing with their classification index.
#[derive(Debug, Clone, Default)]
pub struct LayerGraph {
    layers: Vec<LayerNode>,
    by_node: HashMap<NodeId, usize>,
    index: MicrogestureIndex,
}

impl LayerGraph {
    /// Discovers, links and indexes the layers of `document`.
    pub fn build(document: &Document) -> Result<Self, ConfigurationError> {
        let mut layers = discover_layers(document)?;
        link_hierarchy(document, &mut layers);
        let index = index_by_classification(&layers);

        info!(
            layers = index.layer_count(),
            microgestures = index.microgesture_count();
            "Found {} valid layers for {} microgestures",
            index.layer_count(),
            index.microgesture_count()
        );
        debug!(total_layers = layers.len(); "Layer hierarchy linked");

        let by_node = layers
            .iter()
            .enumerate()
            .map(|(position, layer)| (layer.node, position))
            .collect();
        Ok(Self {
            layers,
            by_node,
            index,
        })
    }

    /// Every labelled layer, in document order.
    pub fn layers(&self) -> &[LayerNode] {
        &self.layers
    }

    /// The layer whose group is `node`.
    pub fn layer(&self, node: NodeId) -> Option<&LayerNode> {
        self.by_node.get(&node).map(|position| &self.layers[*position])
    }

    pub fn index(&self) -> &MicrogestureIndex {
        &self.index
    }
}
