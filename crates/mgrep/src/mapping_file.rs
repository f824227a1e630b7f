//! Mapping files.
//!
//! A mapping file is a comma separated file with one mapping per line, each
//! field a `<microgesture>_<characteristic>-<command>` token:
//!
//! ```text
//! tap_tip-banana,tap_middle-watermelon,swipe_up-kiwi
//! tap_tip-kiwi,tap_middle-banana,swipe_up-watermelon
//! ```
//!
//! Blank lines are ignored.

use std::{
    fs,
    path::{Path, PathBuf},
};

use log::{error, info, warn};
use thiserror::Error;

use crate::mapping::{EntryError, Mapping, MappingEntry, default_mappings};

/// Errors raised while reading or writing a mapping file.
#[derive(Debug, Error)]
pub enum MappingFileError {
    #[error("cannot access mapping file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line}: invalid mapping token `{token}`: {source}")]
    Token {
        line: usize,
        token: String,
        #[source]
        source: EntryError,
    },
}

/// Parses a single `tap_tip-banana` token.
pub fn parse_mapping_token(token: &str) -> Result<MappingEntry, EntryError> {
    token.parse()
}

/// Parses the content of a mapping file.
pub fn parse_mappings(content: &str) -> Result<Vec<Mapping>, MappingFileError> {
    let mut mappings = Vec::new();
    for (number, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let mapping = line
            .split(',')
            .map(|token| {
                parse_mapping_token(token).map_err(|source| MappingFileError::Token {
                    line: number + 1,
                    token: token.trim().to_string(),
                    source,
                })
            })
            .collect::<Result<Mapping, _>>()?;
        mappings.push(mapping);
    }
    Ok(mappings)
}

/// Reads the mapping file at `path`.
pub fn read_mappings(path: &Path) -> Result<Vec<Mapping>, MappingFileError> {
    let content = fs::read_to_string(path).map_err(|source| MappingFileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mappings = parse_mappings(&content)?;
    info!(path:? = path, mappings = mappings.len(); "Mapping file loaded");
    Ok(mappings)
}

/// Writes `mappings` to `path`, one line each. Missing parent directories
/// are created.
pub fn write_mappings(path: &Path, mappings: &[Mapping]) -> Result<(), MappingFileError> {
    let io_error = |source: std::io::Error| MappingFileError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_error)?;
    }

    let mut content = String::new();
    for mapping in mappings {
        let row: Vec<String> = mapping.entries().iter().map(ToString::to_string).collect();
        content.push_str(&row.join(","));
        content.push('\n');
    }
    fs::write(path, content).map_err(io_error)?;

    info!(path:? = path, mappings = mappings.len(); "Mapping file written");
    Ok(())
}

/// Mappings to export.
///
/// Without a path, or when the path does not name an existing `.csv` file,
/// the built-in mappings are used. A `.csv` file that exists but cannot be
/// read or parsed is an error.
pub fn load_mappings(path: Option<&Path>) -> Result<Vec<Mapping>, MappingFileError> {
    let Some(path) = path else {
        info!("No mapping file given, using the default mappings");
        return Ok(default_mappings());
    };

    if path.extension().is_none_or(|extension| extension != "csv") {
        error!(path:? = path; "The mapping file must be a csv file, using the default mappings");
        return Ok(default_mappings());
    }
    if !path.is_file() {
        warn!(path:? = path; "Mapping file not found, using the default mappings");
        return Ok(default_mappings());
    }

    info!(path:? = path; "Loading mapping file");
    read_mappings(path)
}
