//! Editable SVG document tree.
//!
//! This crate holds the in-memory document that the mgrep exporter mutates
//! between exports. It provides:
//!
//! - **Tree**: an arena of element and text nodes addressed by [`NodeId`]
//! - **Reading**: parsing with `roxmltree`, keeping namespace prefixes
//! - **Writing**: XML output that keeps significant whitespace
//! - **Snapshots**: structural copies used to check that a tree was restored
//!
//! # Example
//!
//! ```
//! # use mgrep_document::Document;
//! let mut doc = Document::parse(r#"<svg><g id="layer"/></svg>"#).unwrap();
//! let before = doc.snapshot(doc.root());
//!
//! let layer = doc.find_descendant_by_attribute(doc.root(), "id", "layer").unwrap();
//! let marker = doc.create_element("circle");
//! doc.append_child(layer, marker).unwrap();
//! assert_ne!(doc.snapshot(doc.root()), before);
//!
//! doc.remove(marker);
//! assert_eq!(doc.snapshot(doc.root()), before);
//! ```

mod document;
pub mod error;
mod parse;
mod serialize;
mod snapshot;

pub use document::{Descendants, Document, NodeId};
pub use error::DocumentError;
pub use snapshot::Snapshot;
