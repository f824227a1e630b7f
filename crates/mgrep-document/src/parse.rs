//! Reading documents with `roxmltree`.
//!
//! `roxmltree` resolves namespaces into URIs. The arena stores qualified
//! names instead, so each name is mapped back to the prefix declared in scope
//! and each new namespace declaration is kept as an `xmlns` attribute.

use std::{fs, path::Path};

use log::{debug, info};
use roxmltree::{Node, ParsingOptions};

use crate::{
    document::{Document, NodeId},
    error::DocumentError,
};

const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

impl Document {
    /// Parses an XML document.
    ///
    /// Comments and processing instructions are dropped. Text nodes holding
    /// only whitespace are dropped too, unless they sit in a text element or
    /// under `xml:space="preserve"`.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Xml`] if `text` is not well-formed XML.
    pub fn parse(text: &str) -> Result<Self, DocumentError> {
        let mut options = ParsingOptions::default();
        options.allow_dtd = true;
        let xml = roxmltree::Document::parse_with_options(text, options)?;

        let source_root = xml.root_element();
        let mut document = Document::new(element_name(source_root));
        let root = document.root();
        document.copy_attributes(source_root, root);
        document.copy_children(source_root, root)?;

        debug!(nodes = document.node_count(); "Parsed document");
        Ok(document)
    }

    /// Reads and parses the document stored at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DocumentError> {
        let path = path.as_ref();
        info!(path:? = path; "Reading document");
        let text = fs::read_to_string(path)?;
        Self::parse(&text)
    }

    fn copy_attributes(&mut self, source: Node<'_, '_>, target: NodeId) {
        let inherited = source.parent_element();
        for namespace in source.namespaces() {
            if namespace.uri() == XML_NAMESPACE {
                continue;
            }
            let declared_above = inherited.is_some_and(|parent| {
                parent
                    .namespaces()
                    .any(|ns| ns.name() == namespace.name() && ns.uri() == namespace.uri())
            });
            if declared_above {
                continue;
            }
            let name = match namespace.name() {
                Some(prefix) => format!("xmlns:{prefix}"),
                None => "xmlns".to_string(),
            };
            self.set_attribute(target, name, namespace.uri());
        }

        for attribute in source.attributes() {
            let name = match attribute.namespace() {
                Some(uri) => match prefix_for(source, uri) {
                    Some(prefix) => format!("{prefix}:{}", attribute.name()),
                    None => attribute.name().to_string(),
                },
                None => attribute.name().to_string(),
            };
            self.set_attribute(target, name, attribute.value());
        }
    }

    fn copy_children(&mut self, source: Node<'_, '_>, target: NodeId) -> Result<(), DocumentError> {
        for child in source.children() {
            if child.is_element() {
                let element = self.create_element(element_name(child));
                self.copy_attributes(child, element);
                self.copy_children(child, element)?;
                self.append_child(target, element)?;
            } else if let Some(text) = child.text().filter(|_| child.is_text()) {
                if text.trim().is_empty() && !keeps_whitespace(source) {
                    continue;
                }
                let text_node = self.create_text(text);
                self.append_child(target, text_node)?;
            }
        }
        Ok(())
    }
}

/// Elements whose whitespace-only text is content.
const TEXT_ELEMENTS: [&str; 3] = ["text", "tspan", "textPath"];

/// Returns `true` if whitespace-only text under `element` is significant.
fn keeps_whitespace(element: Node<'_, '_>) -> bool {
    if TEXT_ELEMENTS.contains(&element.tag_name().name()) {
        return true;
    }
    element
        .ancestors()
        .find_map(|node| node.attribute((XML_NAMESPACE, "space")))
        == Some("preserve")
}

/// Qualified name of an element as written in the source.
fn element_name(node: Node<'_, '_>) -> String {
    let tag = node.tag_name();
    let Some(uri) = tag.namespace() else {
        return tag.name().to_string();
    };

    let is_default = node
        .namespaces()
        .any(|ns| ns.name().is_none() && ns.uri() == uri);
    match prefix_for(node, uri) {
        Some(prefix) if !is_default => format!("{prefix}:{}", tag.name()),
        _ => tag.name().to_string(),
    }
}

/// A prefix bound to `uri` in the scope of `node`.
fn prefix_for(node: Node<'_, '_>, uri: &str) -> Option<String> {
    if uri == XML_NAMESPACE {
        return Some("xml".to_string());
    }
    node.namespaces()
        .filter(|ns| ns.uri() == uri)
        .find_map(|ns| ns.name())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    const INKSCAPE_SVG: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!-- Created with Inkscape -->
<svg xmlns="http://www.w3.org/2000/svg"
     xmlns:svg="http://www.w3.org/2000/svg"
     xmlns:inkscape="http://www.inkscape.org/namespaces/inkscape"
     width="100" height="100">
  <g inkscape:groupmode="layer" inkscape:label="Tap tip" id="layer1"
     mgrep-microgesture-layer="tap,tip">
    <text xml:space="preserve"><tspan>label</tspan></text>
  </g>
</svg>"#;

    #[test]
    fn test_parse_keeps_prefixes() {
        let doc = Document::parse(INKSCAPE_SVG).unwrap();
        let root = doc.root();
        assert_eq!(doc.name(root), Some("svg"));
        assert_eq!(
            doc.attribute(root, "xmlns:inkscape"),
            Some("http://www.inkscape.org/namespaces/inkscape")
        );
        assert_eq!(doc.attribute(root, "xmlns"), Some("http://www.w3.org/2000/svg"));

        let layer = doc.element_children(root).next().unwrap();
        assert_eq!(doc.name(layer), Some("g"));
        assert_eq!(doc.attribute(layer, "inkscape:label"), Some("Tap tip"));
        assert_eq!(doc.attribute(layer, "inkscape:groupmode"), Some("layer"));
        assert_eq!(doc.attribute(layer, "mgrep-microgesture-layer"), Some("tap,tip"));
        // Declared on the root only
        assert_eq!(doc.attribute(layer, "xmlns:inkscape"), None);
    }

    #[test]
    fn test_parse_xml_namespace_attribute() {
        let doc = Document::parse(INKSCAPE_SVG).unwrap();
        let text = doc
            .find_descendants(doc.root(), |doc, node| doc.is_named(node, "text"))
            .pop()
            .unwrap();
        assert_eq!(doc.attribute(text, "xml:space"), Some("preserve"));
        assert_eq!(doc.text_content(text), "label");
    }

    #[test]
    fn test_parse_drops_whitespace_and_comments() {
        let doc = Document::parse(INKSCAPE_SVG).unwrap();
        assert_eq!(doc.children(doc.root()).len(), 1);
    }

    #[test]
    fn test_parse_keeps_whitespace_in_text() {
        let doc = Document::parse(
            r#"<svg xmlns="http://www.w3.org/2000/svg">
              <text xml:space="preserve"><tspan>Tap</tspan> <tspan>hold</tspan></text>
              <g xml:space="preserve"><desc>  </desc> </g>
              <g xml:space="default"> <g/> </g>
            </svg>"#,
        )
        .unwrap();
        let root = doc.root();
        let [text, preserved, collapsed] = doc.element_children(root).collect::<Vec<_>>()[..]
        else {
            panic!("expected three children");
        };

        assert_eq!(doc.text_content(text), "Tap hold");
        assert_eq!(doc.children(text).len(), 3);
        assert_eq!(doc.text_content(preserved), "   ");
        assert_eq!(doc.children(collapsed).len(), 1);
    }

    #[test]
    fn test_parse_prefixed_default_elements() {
        let doc = Document::parse(
            r#"<svg:svg xmlns:svg="http://www.w3.org/2000/svg"><svg:g id="a"/></svg:svg>"#,
        )
        .unwrap();
        assert_eq!(doc.name(doc.root()), Some("svg:svg"));
        assert!(doc.is_named(doc.root(), "svg"));
    }

    #[test]
    fn test_parse_error_position() {
        let err = Document::parse("<svg>\n  <g>\n</svg>").unwrap_err();
        assert!(matches!(err, DocumentError::Xml(_)));
        assert_eq!(err.position().map(|(row, _)| row), Some(3));
    }

    #[test]
    fn test_open_missing_file() {
        let err = Document::open("/nonexistent/drawing.svg").unwrap_err();
        assert!(matches!(err, DocumentError::Io(_)));
    }
}
