//! Error types for mgrep operations.
//!
//! This module provides the main error type [`MgrepError`] which wraps the
//! error conditions of each stage: reading the drawing, discovering layers,
//! injecting icons, loading mappings and exporting.

use std::{io, path::PathBuf};

use thiserror::Error;

use mgrep_core::microgesture::ClassificationError;
use mgrep_document::DocumentError;

use crate::{export, inject::InjectionError, mapping_file::MappingFileError};

/// Invalid tagging of the drawing, or an invalid configuration file. Aborts
/// the run.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error(
        "layer '{label}' (#{id}) has an invalid value '{value}': {source}. \
         Expected a value of the form '<microgesture>,<characteristic>'"
    )]
    InvalidClassification {
        label: String,
        id: String,
        value: String,
        #[source]
        source: ClassificationError,
    },

    #[error("configuration file {} not found", .0.display())]
    MissingFile(PathBuf),

    #[error("invalid configuration file {}: {message}", .path.display())]
    InvalidFile { path: PathBuf, message: String },
}

/// The main error type for mgrep operations.
///
/// # Diagnostic Variants
///
/// The `Parse` variant keeps the source text of the drawing so that a
/// syntax error can be reported with its location.
#[derive(Debug, Error)]
pub enum MgrepError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{err}")]
    Parse { err: DocumentError, src: String },

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Injection error: {0}")]
    Injection(#[from] InjectionError),

    #[error("Mapping file error: {0}")]
    MappingFile(#[from] MappingFileError),

    #[error("Export error: {0}")]
    Export(#[from] export::Error),
}

impl MgrepError {
    /// Create a new `Parse` error with the associated source text.
    pub fn new_parse_error(err: DocumentError, src: impl Into<String>) -> Self {
        Self::Parse {
            err,
            src: src.into(),
        }
    }
}
