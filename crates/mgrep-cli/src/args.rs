//! Command-line argument definitions for the mgrep CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments select the drawing and the mappings to export,
//! override configuration values, and control logging verbosity.

use clap::Parser;

use mgrep::export::ExportFormat;

/// Command-line arguments for the mgrep chart exporter
#[derive(Parser, Debug, Default)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input SVG drawing
    #[arg(
        help = "Path to the input SVG drawing",
        required_unless_present = "write_default_mappings"
    )]
    pub input: Option<String>,

    /// Directory receiving the exported files
    #[arg(short, long)]
    pub output_dir: Option<String>,

    /// Output format (png, jpeg, pdf)
    #[arg(short, long)]
    pub format: Option<ExportFormat>,

    /// Export resolution
    #[arg(long)]
    pub dpi: Option<f32>,

    /// Mapping file (CSV). The built-in mappings are used without it
    #[arg(short, long)]
    pub mappings: Option<String>,

    /// Directory holding the command icons and the command template
    #[arg(long)]
    pub icons: Option<String>,

    /// Keep the SVG of each mapping next to its export
    #[arg(long)]
    pub keep_svg: bool,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Write the built-in mappings to a CSV file
    #[arg(long, value_name = "PATH")]
    pub write_default_mappings: Option<String>,
}
