//! Writing documents as XML text.
//!
//! Element-only content is laid out one child per line. Mixed content, and
//! everything under `xml:space="preserve"`, is written exactly as stored so
//! that exported labels keep their spacing.

use std::{fmt::Write as _, fs, path::Path};

use log::{error, info};

use crate::{
    document::{Document, NodeId, NodeKind},
    error::DocumentError,
};

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="no"?>"#;

impl Document {
    /// Serializes the document, with an XML declaration, as a string.
    pub fn to_svg_string(&self) -> String {
        let mut output = format!("{XML_DECLARATION}\n");
        self.write_node(&mut output, self.root(), false);
        output.push('\n');
        output
    }

    /// Serializes the subtree rooted at `id`, without an XML declaration.
    pub fn to_xml_string(&self, id: NodeId) -> String {
        let preserve = self
            .ancestors(id)
            .find_map(|node| self.attribute(node, "xml:space"))
            == Some("preserve");
        let mut output = String::new();
        self.write_node(&mut output, id, preserve);
        output
    }

    fn write_node(&self, output: &mut String, id: NodeId, preserve: bool) {
        let (name, attributes) = match self.kind(id) {
            NodeKind::Text(text) => {
                escape_into(output, text, false);
                return;
            }
            NodeKind::Element { name, attributes } => (name, attributes),
        };

        let _ = write!(output, "<{name}");
        for (key, value) in attributes {
            let _ = write!(output, " {key}=\"");
            escape_into(output, value, true);
            output.push('"');
        }

        let children = self.children(id);
        if children.is_empty() {
            output.push_str("/>");
            return;
        }
        output.push('>');

        let preserve = match self.attribute(id, "xml:space") {
            Some(space) => space == "preserve",
            None => preserve,
        };
        let inline = preserve || children.iter().any(|child| self.is_text(*child));
        for child in children {
            if !inline {
                output.push('\n');
            }
            self.write_node(output, *child, preserve);
        }
        if !inline {
            output.push('\n');
        }
        let _ = write!(output, "</{name}>");
    }

    /// Writes the serialized document to `path`.
    pub fn write(&self, path: impl AsRef<Path>) -> Result<(), DocumentError> {
        let path = path.as_ref();
        info!(path:? = path; "Writing document");
        if let Err(err) = fs::write(path, self.to_svg_string()) {
            error!(path:? = path, err:err; "Failed to write document");
            return Err(DocumentError::Io(err));
        }
        Ok(())
    }
}

fn escape_into(output: &mut String, value: &str, attribute: bool) {
    for c in value.chars() {
        match c {
            '&' => output.push_str("&amp;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            '"' if attribute => output.push_str("&quot;"),
            c => output.push(c),
        }
    }
}
