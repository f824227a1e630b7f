//! Error types for document operations.

use std::io;

use thiserror::Error;

use crate::NodeId;

/// Errors raised while reading, editing or writing a [`Document`](crate::Document).
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("XML error: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("node {0} is a text node, not an element")]
    NotAnElement(NodeId),

    #[error("node {0} is already attached to a parent")]
    AlreadyAttached(NodeId),

    #[error("node {0} has no parent")]
    Detached(NodeId),

    #[error("node {node} cannot be inserted under its own descendant {parent}")]
    Cycle { node: NodeId, parent: NodeId },
}

impl DocumentError {
    /// Line and column of an XML syntax error, both 1-based.
    pub fn position(&self) -> Option<(u32, u32)> {
        match self {
            Self::Xml(err) => {
                let pos = err.pos();
                Some((pos.row, pos.col))
            }
            _ => None,
        }
    }
}
