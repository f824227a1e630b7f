//! Export of a drawing to an image file.
//!
//! Rasterization is delegated to an external program through the [`Render`]
//! trait. [`InkscapeRenderer`] is the built-in implementation; [`Exporter`]
//! writes the drawing to an SVG file and hands it to a renderer.
//!
//! # Error Handling
//!
//! Export operations return [`Error`]. It converts into
//! [`MgrepError::Export`] at the crate boundary.
//!
//! [`MgrepError::Export`]: crate::MgrepError::Export

use std::{
    ffi::OsString,
    fmt, fs, io,
    path::{Path, PathBuf},
    process::{self, ExitStatus},
    str::FromStr,
};

use log::{debug, info};
use serde::Deserialize;

use mgrep_document::{Document, DocumentError};

use crate::config::ExportConfig;

/// Output file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Png,
    #[serde(alias = "jpg")]
    Jpeg,
    Pdf,
}

impl ExportFormat {
    pub const ALL: [Self; 3] = [Self::Png, Self::Jpeg, Self::Pdf];

    /// Name of the format, as accepted on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::Pdf => "pdf",
        }
    }

    /// File extension of exported files.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Pdf => "pdf",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown [`ExportFormat`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownFormat(pub String);

impl fmt::Display for UnknownFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown export format `{}`, expected png, jpeg or pdf", self.0)
    }
}

impl std::error::Error for UnknownFormat {}

impl FromStr for ExportFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpeg" | "jpg" => Ok(Self::Jpeg),
            "pdf" => Ok(Self::Pdf),
            _ => Err(UnknownFormat(s.to_string())),
        }
    }
}

/// Errors that can occur during export.
///
/// This type is converted into [`MgrepError::Export`] at the crate boundary.
///
/// [`MgrepError::Export`]: crate::MgrepError::Export
#[derive(Debug)]
pub enum Error {
    /// An I/O error encountered while writing output.
    Io(io::Error),
    /// The drawing could not be written.
    Document(DocumentError),
    /// The renderer program could not be started.
    Spawn { program: String, source: io::Error },
    /// The renderer program exited with a failure status.
    RendererFailed {
        program: String,
        status: ExitStatus,
        stderr: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "I/O error: {err}"),
            Self::Document(err) => write!(f, "cannot write drawing: {err}"),
            Self::Spawn { program, source } => write!(f, "cannot run `{program}`: {source}"),
            Self::RendererFailed {
                program,
                status,
                stderr,
            } => {
                write!(f, "`{program}` failed with {status}")?;
                if !stderr.is_empty() {
                    write!(f, ": {stderr}")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Document(err) => Some(err),
            Self::Spawn { source, .. } => Some(source),
            Self::RendererFailed { .. } => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<DocumentError> for Error {
    fn from(err: DocumentError) -> Self {
        Self::Document(err)
    }
}

/// Abstraction over the program turning an SVG file into the output format.
pub trait Render {
    /// Renders the SVG file at `svg_path` to `output_path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Spawn`] if the program cannot be started and
    /// [`Error::RendererFailed`] if it reports a failure.
    fn render(
        &self,
        svg_path: &Path,
        output_path: &Path,
        format: ExportFormat,
        dpi: f32,
    ) -> Result<(), Error>;
}

/// Renders with the Inkscape command line.
///
/// PNG and PDF are exported directly. JPEG is exported to a temporary PNG
/// first and then converted with ImageMagick's `convert`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InkscapeRenderer {
    inkscape: String,
    convert: String,
}

impl Default for InkscapeRenderer {
    fn default() -> Self {
        Self::new("inkscape", "convert")
    }
}

impl InkscapeRenderer {
    pub fn new(inkscape: impl Into<String>, convert: impl Into<String>) -> Self {
        Self {
            inkscape: inkscape.into(),
            convert: convert.into(),
        }
    }

    fn export(
        &self,
        svg_path: &Path,
        output_path: &Path,
        export_type: &str,
        dpi: f32,
    ) -> Result<(), Error> {
        let mut filename = OsString::from("--export-filename=");
        filename.push(output_path);
        run_program(
            &self.inkscape,
            [
                OsString::from(format!("--export-type={export_type}")),
                OsString::from("-d"),
                OsString::from(dpi.to_string()),
                filename,
                svg_path.as_os_str().to_owned(),
            ],
        )
    }
}

impl Render for InkscapeRenderer {
    fn render(
        &self,
        svg_path: &Path,
        output_path: &Path,
        format: ExportFormat,
        dpi: f32,
    ) -> Result<(), Error> {
        match format {
            ExportFormat::Png | ExportFormat::Pdf => {
                self.export(svg_path, output_path, format.as_str(), dpi)
            }
            ExportFormat::Jpeg => {
                let png = tempfile::Builder::new()
                    .prefix("mgrep-")
                    .suffix(".png")
                    .tempfile()?;
                self.export(svg_path, png.path(), ExportFormat::Png.as_str(), dpi)?;
                run_program(
                    &self.convert,
                    [
                        png.path().as_os_str().to_owned(),
                        output_path.as_os_str().to_owned(),
                    ],
                )
            }
        }
    }
}

fn run_program(program: &str, args: impl IntoIterator<Item = OsString>) -> Result<(), Error> {
    let args: Vec<OsString> = args.into_iter().collect();
    debug!(program, args:? = args; "Running renderer");

    let output = process::Command::new(program)
        .args(&args)
        .output()
        .map_err(|source| Error::Spawn {
            program: program.to_string(),
            source,
        })?;

    if !output.status.success() {
        return Err(Error::RendererFailed {
            program: program.to_string(),
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(())
}

/// Writes drawings to files of the configured format.
pub struct Exporter {
    output_dir: PathBuf,
    format: ExportFormat,
    dpi: f32,
    keep_svg: bool,
    renderer: Box<dyn Render>,
}

impl Exporter {
    /// Creates an exporter rendering with [`InkscapeRenderer`].
    pub fn new(config: &ExportConfig) -> Self {
        Self {
            output_dir: config.output_dir().to_path_buf(),
            format: config.format(),
            dpi: config.dpi(),
            keep_svg: config.keep_svg(),
            renderer: Box::new(InkscapeRenderer::new(config.inkscape(), config.convert())),
        }
    }

    /// Replaces the renderer.
    pub fn with_renderer(mut self, renderer: impl Render + 'static) -> Self {
        self.renderer = Box::new(renderer);
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn format(&self) -> ExportFormat {
        self.format
    }

    /// Path of the file exported under `label`.
    pub fn output_path(&self, label: &str) -> PathBuf {
        self.output_dir
            .join(format!("{label}.{}", self.format.extension()))
    }

    /// Renders `document` to `<output_dir>/<label>.<ext>` and returns that
    /// path.
    ///
    /// The drawing is written to a temporary SVG file, or to
    /// `<output_dir>/<label>.svg` when SVG files are kept.
    pub fn export(&self, document: &Document, label: &str) -> Result<PathBuf, Error> {
        fs::create_dir_all(&self.output_dir)?;
        let output_path = self.output_path(label);

        if self.keep_svg {
            let svg_path = self.output_dir.join(format!("{label}.svg"));
            document.write(&svg_path)?;
            self.renderer
                .render(&svg_path, &output_path, self.format, self.dpi)?;
        } else {
            let svg_file = tempfile::Builder::new()
                .prefix("mgrep-")
                .suffix(".svg")
                .tempfile()?;
            fs::write(svg_file.path(), document.to_svg_string())?;
            self.renderer
                .render(svg_file.path(), &output_path, self.format, self.dpi)?;
        }

        info!(path:? = output_path, format:% = self.format; "Exported");
        Ok(output_path)
    }
}
