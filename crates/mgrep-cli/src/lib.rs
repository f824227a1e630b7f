//! CLI logic for the mgrep chart exporter.
//!
//! This module contains the core CLI logic: loading the configuration,
//! applying command-line overrides, and running the export batch.

pub mod error_adapter;

mod args;
mod config;

pub use args::Args;

use std::path::Path;

use log::{info, warn};

use mgrep::{
    MappingRunner, MgrepError,
    config::AppConfig,
    mapping::default_mappings,
    mapping_file::{load_mappings, write_mappings},
};

/// Run the mgrep CLI application
///
/// Exports the input drawing once per mapping. With
/// `--write-default-mappings`, the built-in mappings are written first; the
/// export is skipped when no input is given.
///
/// # Errors
///
/// Returns `MgrepError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Drawing parse errors and invalid layer tags
/// - Mapping file errors
/// - Icon injection errors
///
/// Failed exports are logged and do not stop the batch.
pub fn run(args: &Args) -> Result<(), MgrepError> {
    if let Some(path) = &args.write_default_mappings {
        write_mappings(Path::new(path), &default_mappings())?;
        info!(path; "Default mappings written");
    }

    let Some(input) = &args.input else {
        return Ok(());
    };
    info!(input_path = input; "Processing drawing");

    // Load configuration
    let mut app_config = config::load_config(args.config.as_deref().map(Path::new))?;
    apply_overrides(&mut app_config, args);

    let mappings = load_mappings(args.mappings.as_deref().map(Path::new))?;
    let runner = MappingRunner::from_config(&app_config)?;
    let report = runner.run_file(Path::new(input), &mappings)?;

    if !report.is_success() {
        warn!(
            failed = report.failed().len();
            "{} of {} exports failed",
            report.failed().len(),
            mappings.len()
        );
    }
    info!(
        output_dir = app_config.export().output_dir().display().to_string(),
        exported = report.exported().len();
        "Export finished"
    );

    Ok(())
}

/// Command-line values take precedence over the configuration file.
fn apply_overrides(config: &mut AppConfig, args: &Args) {
    let export = config.export_mut();
    if let Some(output_dir) = &args.output_dir {
        export.set_output_dir(output_dir);
    }
    if let Some(format) = args.format {
        export.set_format(format);
    }
    if let Some(dpi) = args.dpi {
        export.set_dpi(dpi);
    }
    if args.keep_svg {
        export.set_keep_svg(true);
    }
    if let Some(icons) = &args.icons {
        config.icons_mut().set_directory(icons);
    }
}
