//! Reading and writing marker geometry on document nodes.

use mgrep_core::{
    geometry::{Circle, Point},
    path::Path,
};
use mgrep_document::{Document, NodeId};

use crate::inject::InjectionError;

/// Returns `true` for elements whose geometry is a center and a radius.
pub(crate) fn is_circular(document: &Document, node: NodeId) -> bool {
    document.is_named(node, "circle") || document.is_named(node, "ellipse")
}

fn number(document: &Document, node: NodeId, names: &[&'static str]) -> Result<f32, InjectionError> {
    for name in names {
        if let Some(value) = document.attribute(node, name) {
            return value
                .trim()
                .parse()
                .map_err(|_| InjectionError::InvalidNumber {
                    attribute: *name,
                    value: value.to_string(),
                });
        }
    }
    Ok(0.0)
}

/// Center of a circular marker. Missing coordinates default to zero.
pub(crate) fn center(document: &Document, node: NodeId) -> Result<Point, InjectionError> {
    Ok(Point::new(
        number(document, node, &["cx", "sodipodi:cx"])?,
        number(document, node, &["cy", "sodipodi:cy"])?,
    ))
}

/// Circle of a circular marker. An ellipse uses its horizontal radius.
pub(crate) fn circle(document: &Document, node: NodeId) -> Result<Circle, InjectionError> {
    Ok(Circle::new(
        center(document, node)?,
        number(document, node, &["r", "rx", "sodipodi:rx"])?,
    ))
}

pub(crate) fn set_center(document: &mut Document, node: NodeId, center: Point) {
    document.set_attribute(node, "cx", center.x().to_string());
    document.set_attribute(node, "cy", center.y().to_string());
}

/// Parsed `d` attribute of a path element.
pub(crate) fn path(document: &Document, node: NodeId) -> Option<Result<Path, InjectionError>> {
    if !document.is_named(node, "path") {
        return None;
    }
    let d = document.attribute(node, "d")?;
    Some(Path::parse(d).map_err(InjectionError::from))
}

pub(crate) fn set_path(document: &mut Document, node: NodeId, path: &Path) {
    document.set_attribute(node, "d", path.to_data_string());
}

/// First element of the subtree at `scope`, `scope` included, with
/// `attribute="value"`.
pub(crate) fn find_tagged(
    document: &Document,
    scope: NodeId,
    attribute: &str,
    value: &str,
) -> Option<NodeId> {
    if document.attribute(scope, attribute) == Some(value) {
        return Some(scope);
    }
    document.find_descendant_by_attribute(scope, attribute, value)
}
