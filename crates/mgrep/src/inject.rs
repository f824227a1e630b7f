//! Injecting command fragments into layers, and removing them again.
//!
//! A layer marks where a command goes with markers tagged
//! `mgrep-path-element="start-command"`, `"end-command"` or `"command"`. For
//! each marker present, [`inject_into_layer`] inserts a fresh fragment right
//! before it, moves the fragment onto the marker and places its labels.
//!
//! Every inserted fragment is recorded in the returned [`Injection`]; that
//! record is all [`reset_layer`] needs to restore the layer.

use log::{debug, warn};
use thiserror::Error;

use mgrep_core::{
    command::Command,
    path::PathError,
    style::{Style, TextSide, UnknownTextSide},
    transform::{Transform, TransformError},
};
use mgrep_document::{Document, DocumentError, NodeId};

use crate::{
    attributes::{COMMAND_ROLE, CommandAnchor, PATH_ELEMENT, TEXT_MARKER, role},
    markers,
};

/// Errors raised while building or injecting command fragments.
#[derive(Debug, Error)]
pub enum InjectionError {
    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Path(#[from] PathError),

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error(transparent)]
    TextSide(#[from] UnknownTextSide),

    #[error("command template has no element tagged `mgrep-command=\"{0}\"`")]
    MissingTemplatePart(&'static str),

    #[error("no icon loaded for command `{0}`")]
    MissingIcon(Command),

    #[error("icon has no element tagged `mgrep-command=\"{0}\"`")]
    MissingIconPart(&'static str),

    #[error("invalid number `{value}` in attribute `{attribute}`")]
    InvalidNumber {
        attribute: &'static str,
        value: String,
    },
}

/// Fragments inserted into one layer.
#[derive(Debug, Clone, PartialEq)]
pub struct Injection {
    layer: NodeId,
    fragments: Vec<NodeId>,
}

impl Injection {
    pub fn layer(&self) -> NodeId {
        self.layer
    }

    /// Roots of the inserted fragments, in insertion order.
    pub fn fragments(&self) -> &[NodeId] {
        &self.fragments
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}

/// Inserts one fragment per command marker of `layer`.
///
/// Markers are looked up in [`CommandAnchor::ORDER`]; the first marker of
/// each kind in the layer subtree gets a fragment. `build_fragment` is called
/// once per marker and must return a detached fragment. A layer without any
/// marker is skipped with a warning.
pub fn inject_into_layer(
    document: &mut Document,
    layer: NodeId,
    mut build_fragment: impl FnMut(&mut Document) -> Result<NodeId, InjectionError>,
) -> Result<Injection, InjectionError> {
    let mut injection = Injection {
        layer,
        fragments: Vec::new(),
    };

    for anchor in CommandAnchor::ORDER {
        let Some(site) = document.find_descendant_by_attribute(layer, PATH_ELEMENT, anchor.as_str())
        else {
            continue;
        };

        let inserted = build_fragment(document).and_then(|fragment| {
            let placed = place_fragment(document, fragment, site)
                .and_then(|()| Ok(document.insert_before(site, fragment)?));
            if placed.is_err() {
                document.remove(fragment);
            }
            placed.map(|()| fragment)
        });
        let fragment = match inserted {
            Ok(fragment) => fragment,
            Err(err) => {
                reset_layer(document, &injection);
                return Err(err);
            }
        };
        injection.fragments.push(fragment);
        debug!(anchor:% = anchor, fragment:% = fragment; "Fragment injected");
    }

    if injection.fragments.is_empty() {
        warn!(
            layer:% = layer,
            label = document.attribute(layer, "inkscape:label").unwrap_or_default();
            "No command anchor found in layer, skipping"
        );
        return Ok(injection);
    }

    for fragment in injection.fragments.clone() {
        if let Err(err) = rehome_labels(document, fragment) {
            reset_layer(document, &injection);
            return Err(err);
        }
    }
    Ok(injection)
}

/// Moves `fragment` so that its centroid marker lands on the center of
/// `site`.
///
/// Sites that are not circular markers leave the fragment where it is.
fn place_fragment(document: &mut Document, fragment: NodeId, site: NodeId) -> Result<(), InjectionError> {
    if !markers::is_circular(document, site) {
        return Ok(());
    }
    let Some(anchor) = markers::find_tagged(document, fragment, COMMAND_ROLE, role::CENTROID) else {
        return Ok(());
    };

    let offset = markers::center(document, anchor)?.vector_to(markers::center(document, site)?);
    let existing = match document.attribute(fragment, "transform") {
        Some(value) => Transform::parse_svg(value)?,
        None => Transform::IDENTITY,
    };
    let placed = existing.then(Transform::translation_by(offset));
    document.set_attribute(fragment, "transform", placed.to_svg_matrix());
    Ok(())
}

/// Places every paired label of `fragment` on its marker.
///
/// A text tagged `mgrep-text-marker="<side>"` is paired with the first
/// circular element of the fragment carrying the same tag. The translation
/// of the text transform is replaced by the marker center (its scale and
/// rotation are kept) and the text is aligned for that side. Texts without a
/// marker are left alone.
pub fn rehome_labels(document: &mut Document, fragment: NodeId) -> Result<(), InjectionError> {
    let texts = document.find_descendants(fragment, |doc, node| {
        doc.is_named(node, "text") && doc.has_attribute(node, TEXT_MARKER)
    });

    for text in texts {
        let tag = document
            .attribute(text, TEXT_MARKER)
            .unwrap_or_default()
            .to_string();
        let side: TextSide = tag.parse()?;

        let marker = document
            .descendants(fragment)
            .find(|node| {
                markers::is_circular(document, *node)
                    && document.attribute(*node, TEXT_MARKER) == Some(tag.as_str())
            });
        let Some(marker) = marker else {
            debug!(side:% = side; "Label has no marker");
            continue;
        };

        let center = markers::center(document, marker)?;
        let transform = match document.attribute(text, "transform") {
            Some(value) => Transform::parse_svg(value)?,
            None => Transform::IDENTITY,
        };
        document.set_attribute(
            text,
            "transform",
            transform.with_translation(center).to_svg_matrix(),
        );

        let styled: Vec<NodeId> = std::iter::once(text)
            .chain(document.descendants(text))
            .filter(|node| document.is_element(*node))
            .collect();
        for node in styled {
            let mut style = Style::parse(document.attribute(node, "style").unwrap_or_default());
            side.apply(&mut style);
            document.set_attribute(node, "style", style.to_string());
        }
    }
    Ok(())
}

/// Removes every fragment recorded in `injection` and frees their nodes.
/// Returns how many were removed.
pub fn reset_layer(document: &mut Document, injection: &Injection) -> usize {
    injection
        .fragments
        .iter()
        .filter(|fragment| document.remove(**fragment))
        .count()
}
