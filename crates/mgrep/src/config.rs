//! Configuration types for chart export.
//!
//! All types implement [`serde::Deserialize`] so they can be loaded from a
//! configuration file. Every field is optional and falls back to a default.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining export and icon settings.
//! - [`ExportConfig`] - Where and how each mapping is rendered.
//! - [`IconsConfig`] - Where the command icons and the command template live.
//!
//! # Example
//!
//! ```
//! # use mgrep::{config::AppConfig, export::ExportFormat};
//! let config = AppConfig::default();
//! assert_eq!(config.export().format(), ExportFormat::Png);
//! assert_eq!(config.export().dpi(), 90.0);
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::export::ExportFormat;

/// Default icon directory, relative to the working directory.
pub const DEFAULT_ICON_DIRECTORY: &str = "assets/icons";
/// Default file name of the command template inside the icon directory.
pub const DEFAULT_TEMPLATE_NAME: &str = "command-template.svg";

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Export configuration section.
    #[serde(default)]
    export: ExportConfig,

    /// Icon configuration section.
    #[serde(default)]
    icons: IconsConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    pub fn new(export: ExportConfig, icons: IconsConfig) -> Self {
        Self { export, icons }
    }

    /// Returns the export configuration.
    pub fn export(&self) -> &ExportConfig {
        &self.export
    }

    /// Returns the icon configuration.
    pub fn icons(&self) -> &IconsConfig {
        &self.icons
    }

    /// Returns a mutable reference to the export configuration.
    pub fn export_mut(&mut self) -> &mut ExportConfig {
        &mut self.export
    }

    /// Returns a mutable reference to the icon configuration.
    pub fn icons_mut(&mut self) -> &mut IconsConfig {
        &mut self.icons
    }
}

/// Export settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Directory receiving the exported files.
    output_dir: PathBuf,

    /// Output file format.
    format: ExportFormat,

    /// Resolution passed to the renderer.
    dpi: f32,

    /// Keep the intermediate SVG of each mapping next to its export.
    keep_svg: bool,

    /// Renderer program.
    inkscape: String,

    /// Raster conversion program used for JPEG output.
    convert: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            format: ExportFormat::default(),
            dpi: 90.0,
            keep_svg: false,
            inkscape: "inkscape".to_string(),
            convert: "convert".to_string(),
        }
    }
}

impl ExportConfig {
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn format(&self) -> ExportFormat {
        self.format
    }

    pub fn dpi(&self) -> f32 {
        self.dpi
    }

    pub fn keep_svg(&self) -> bool {
        self.keep_svg
    }

    pub fn inkscape(&self) -> &str {
        &self.inkscape
    }

    pub fn convert(&self) -> &str {
        &self.convert
    }

    pub fn set_output_dir(&mut self, output_dir: impl Into<PathBuf>) {
        self.output_dir = output_dir.into();
    }

    pub fn set_format(&mut self, format: ExportFormat) {
        self.format = format;
    }

    pub fn set_dpi(&mut self, dpi: f32) {
        self.dpi = dpi;
    }

    pub fn set_keep_svg(&mut self, keep_svg: bool) {
        self.keep_svg = keep_svg;
    }

    pub fn set_inkscape(&mut self, program: impl Into<String>) {
        self.inkscape = program.into();
    }

    pub fn set_convert(&mut self, program: impl Into<String>) {
        self.convert = program.into();
    }
}

/// Icon library settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IconsConfig {
    /// Directory holding one `<command>.svg` per command.
    #[serde(default)]
    directory: Option<PathBuf>,

    /// Command template file. Defaults to `command-template.svg` inside
    /// [`IconsConfig::directory`].
    #[serde(default)]
    template: Option<PathBuf>,
}

impl IconsConfig {
    /// Returns the icon directory, or [`DEFAULT_ICON_DIRECTORY`].
    pub fn directory(&self) -> PathBuf {
        self.directory
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ICON_DIRECTORY))
    }

    /// Returns the template path, or [`DEFAULT_TEMPLATE_NAME`] inside the
    /// icon directory.
    pub fn template(&self) -> PathBuf {
        self.template
            .clone()
            .unwrap_or_else(|| self.directory().join(DEFAULT_TEMPLATE_NAME))
    }

    pub fn set_directory(&mut self, directory: impl Into<PathBuf>) {
        self.directory = Some(directory.into());
    }

    pub fn set_template(&mut self, template: impl Into<PathBuf>) {
        self.template = Some(template.into());
    }

    /// Anchors the relative paths set in this section at `base`.
    ///
    /// Unset paths keep their defaults, which stay relative to the working
    /// directory.
    pub fn resolve_relative_to(&mut self, base: &Path) {
        for path in [&mut self.directory, &mut self.template].into_iter().flatten() {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }
}
