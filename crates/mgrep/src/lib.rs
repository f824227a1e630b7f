//! mgrep - Batch export of microgesture command charts.
//!
//! A chart is an Inkscape drawing whose layers illustrate hand microgestures.
//! For every command mapping, mgrep injects the command icons into the layers
//! of the mapped microgestures, exports the drawing and restores it before
//! the next mapping.
//!
//! The stages are available on their own:
//!
//! - [`layer`] discovers the classified layers of a drawing;
//! - [`icon`] and [`inject`] build command fragments and place them on the
//!   layer markers;
//! - [`mapping`] and [`mapping_file`] describe which command goes where;
//! - [`export`] renders the drawing through an external program.
//!
//! [`MappingRunner`] chains them for a whole batch of mappings.

pub mod attributes;
pub mod config;
pub mod export;
pub mod icon;
pub mod inject;
pub mod layer;
pub mod mapping;
pub mod mapping_file;

mod error;
mod markers;

pub use mgrep_core::{command, geometry, microgesture, path, style, transform};
pub use mgrep_document::{Document, DocumentError};

pub use error::{ConfigurationError, MgrepError};

use std::{
    fs,
    path::{Path, PathBuf},
};

use log::{debug, error, info};

use config::AppConfig;
use export::Exporter;
use icon::IconLibrary;
use layer::LayerGraph;
use mapping::{Mapping, apply_mapping, reset_mapping};

/// Outcome of a [`MappingRunner::run`] batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunReport {
    exported: Vec<PathBuf>,
    failed: Vec<String>,
}

impl RunReport {
    /// Files written, in mapping order.
    pub fn exported(&self) -> &[PathBuf] {
        &self.exported
    }

    /// Labels of the mappings whose export failed.
    pub fn failed(&self) -> &[String] {
        &self.failed
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Applies, exports and resets each mapping of a batch.
///
/// # Examples
///
/// ```rust,no_run
/// use std::path::Path;
/// use mgrep::{MappingRunner, config::AppConfig, mapping::default_mappings};
///
/// let runner = MappingRunner::from_config(&AppConfig::default())
///     .expect("Failed to load icons");
/// let report = runner
///     .run_file(Path::new("chart.svg"), &default_mappings())
///     .expect("Failed to export");
/// println!("{} files exported", report.exported().len());
/// ```
pub struct MappingRunner {
    library: IconLibrary,
    exporter: Exporter,
}

impl MappingRunner {
    pub fn new(library: IconLibrary, exporter: Exporter) -> Self {
        Self { library, exporter }
    }

    /// Loads the icon library and sets up the exporter from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`MgrepError::Injection`] if the command template cannot be
    /// read or lacks its template group or centroid.
    pub fn from_config(config: &AppConfig) -> Result<Self, MgrepError> {
        let library = IconLibrary::load(&config.icons().directory(), &config.icons().template())?;
        Ok(Self::new(library, Exporter::new(config.export())))
    }

    pub fn exporter(&self) -> &Exporter {
        &self.exporter
    }

    /// Reads the drawing at `input` and runs every mapping on it.
    ///
    /// Exports are named after the mapping and the file stem of `input`.
    pub fn run_file(&self, input: &Path, mappings: &[Mapping]) -> Result<RunReport, MgrepError> {
        info!(path:? = input; "Reading drawing");
        let source = fs::read_to_string(input)?;
        let mut document =
            Document::parse(&source).map_err(|err| MgrepError::new_parse_error(err, source))?;

        let basename = input
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.run(&mut document, &basename, mappings)
    }

    /// Runs every mapping on `document`.
    ///
    /// For each mapping the icons are injected, the drawing is exported as
    /// `<mapping name>_<basename>` and the injections are removed again. A
    /// failed export is logged and recorded in the report, and the batch goes
    /// on with the next mapping.
    ///
    /// # Errors
    ///
    /// Invalid layer classifications and injection failures abort the batch.
    /// The document is left as it was before the failing mapping.
    pub fn run(
        &self,
        document: &mut Document,
        basename: &str,
        mappings: &[Mapping],
    ) -> Result<RunReport, MgrepError> {
        let graph = LayerGraph::build(document)?;
        let mut report = RunReport::default();

        for mapping in mappings {
            let label = format!("{}_{basename}", mapping.name());
            let log = apply_mapping(document, mapping, graph.index(), &self.library)?;

            let exported = self.exporter.export(document, &label);
            let removed = reset_mapping(document, &log);
            debug!(label = label.as_str(), removed; "Drawing restored");

            match exported {
                Ok(path) => report.exported.push(path),
                Err(err) => {
                    error!(label = label.as_str(), err:% = err; "Export failed");
                    report.failed.push(label);
                }
            }
        }

        info!(
            exported = report.exported.len(),
            failed = report.failed.len();
            "Exported {} of {} mappings",
            report.exported.len(),
            mappings.len()
        );
        Ok(report)
    }
}
