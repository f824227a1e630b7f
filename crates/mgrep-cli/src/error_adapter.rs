//! Error adapter for converting MgrepError to miette diagnostics.
//!
//! This module provides the bridge between the library's standard error types
//! and miette's rich diagnostic formatting used in the CLI.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan, SourceSpan};

use mgrep::{ConfigurationError, DocumentError, MgrepError, inject::InjectionError};

/// Adapter for a drawing that failed to parse.
///
/// Points at the location reported by the XML parser inside the source text.
pub struct ParseAdapter<'a> {
    err: &'a DocumentError,
    src: &'a str,
}

impl<'a> ParseAdapter<'a> {
    pub fn new(err: &'a DocumentError, src: &'a str) -> Self {
        Self { err, src }
    }

    fn span(&self) -> Option<SourceSpan> {
        let (row, col) = self.err.position()?;
        let offset = offset_of(self.src, row, col);
        let len = self.src[offset..]
            .chars()
            .next()
            .map_or(0, char::len_utf8);
        Some(SourceSpan::new(offset.into(), len))
    }
}

impl fmt::Debug for ParseAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParseAdapter")
            .field("err", &self.err)
            .finish()
    }
}

impl fmt::Display for ParseAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid SVG drawing: {}", self.err)
    }
}

impl std::error::Error for ParseAdapter<'_> {}

impl MietteDiagnostic for ParseAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new("mgrep::parse"))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&self.src as &dyn miette::SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let span = self.span()?;
        Some(Box::new(std::iter::once(
            LabeledSpan::new_primary_with_span(Some("here".to_string()), span),
        )))
    }
}

/// Byte offset of a 1-based `(row, col)` position, `col` counted in
/// characters. Positions past the end are clamped.
fn offset_of(src: &str, row: u32, col: u32) -> usize {
    let mut offset = 0;
    for (index, line) in src.split_inclusive('\n').enumerate() {
        if index + 1 == row as usize {
            let in_line = line
                .char_indices()
                .nth(col.saturating_sub(1) as usize)
                .map_or(line.len(), |(byte, _)| byte);
            return offset + in_line;
        }
        offset += line.len();
    }
    src.len()
}

/// Adapter for [`MgrepError`] variants without a source location.
pub struct ErrorAdapter<'a>(pub &'a MgrepError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match &self.0 {
            MgrepError::Io(_) => "mgrep::io",
            MgrepError::Parse { .. } => "mgrep::parse",
            MgrepError::Configuration(_) => "mgrep::config",
            MgrepError::Injection(_) => "mgrep::injection",
            MgrepError::MappingFile(_) => "mgrep::mappings",
            MgrepError::Export(_) => "mgrep::export",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let help = match &self.0 {
            MgrepError::Configuration(ConfigurationError::InvalidClassification { .. }) => {
                "tag each microgesture layer with \
                 mgrep-microgesture-layer=\"<microgesture>,<characteristic>\""
            }
            MgrepError::Configuration(ConfigurationError::InvalidFile { .. }) => {
                "the configuration file accepts an [export] table (output_dir, format, \
                 dpi, keep_svg, inkscape, convert) and an [icons] table (directory, template)"
            }
            MgrepError::MappingFile(_) => {
                "each field must read <microgesture>_<characteristic>-<command>, \
                 for example tap_tip-banana"
            }
            MgrepError::Injection(InjectionError::MissingIcon(_)) => {
                "add the icon file to the icon directory or pass another one with --icons"
            }
            _ => return None,
        };
        Some(Box::new(help))
    }
}

/// A reportable error that can be rendered by miette.
#[derive(Debug)]
pub enum Reportable<'a> {
    /// A drawing parse error with its location.
    Parse(ParseAdapter<'a>),
    /// A simple error without source location.
    Error(ErrorAdapter<'a>),
}

impl fmt::Display for Reportable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reportable::Parse(p) => fmt::Display::fmt(p, f),
            Reportable::Error(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl std::error::Error for Reportable<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Reportable::Parse(_) => None,
            Reportable::Error(e) => e.source(),
        }
    }
}

impl MietteDiagnostic for Reportable<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Parse(p) => p.code(),
            Reportable::Error(e) => e.code(),
        }
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Parse(p) => p.help(),
            Reportable::Error(e) => e.help(),
        }
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        match self {
            Reportable::Parse(p) => p.source_code(),
            Reportable::Error(e) => e.source_code(),
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        match self {
            Reportable::Parse(p) => p.labels(),
            Reportable::Error(e) => e.labels(),
        }
    }
}

/// Convert a [`MgrepError`] into a reportable error.
pub fn to_reportable(err: &MgrepError) -> Reportable<'_> {
    match err {
        MgrepError::Parse { err, src } => Reportable::Parse(ParseAdapter::new(err, src)),
        _ => Reportable::Error(ErrorAdapter(err)),
    }
}

#[cfg(test)]
mod tests {
    use mgrep::{Document, command::Command};

    use super::*;

    fn parse_error(src: &str) -> MgrepError {
        let err = Document::parse(src).unwrap_err();
        MgrepError::new_parse_error(err, src)
    }

    #[test]
    fn test_offset_of() {
        let src = "ab\ncdé\nf";
        assert_eq!(offset_of(src, 1, 1), 0);
        assert_eq!(offset_of(src, 2, 2), 4);
        assert_eq!(offset_of(src, 3, 1), 8);
        assert_eq!(offset_of(src, 9, 1), src.len());
    }

    #[test]
    fn test_parse_error_has_label() {
        let err = parse_error("<svg>\n  <g>\n</svg>");
        let reportable = to_reportable(&err);

        assert!(matches!(reportable, Reportable::Parse(_)));
        assert_eq!(reportable.code().unwrap().to_string(), "mgrep::parse");
        let labels: Vec<_> = reportable.labels().unwrap().collect();
        assert_eq!(labels.len(), 1);
        assert!(labels[0].primary());
    }

    #[test]
    fn test_non_parse_error() {
        let err = MgrepError::from(InjectionError::MissingIcon(Command::KIWI));
        let reportable = to_reportable(&err);

        match &reportable {
            Reportable::Error(e) => {
                assert_eq!(
                    e.to_string(),
                    "Injection error: no icon loaded for command `kiwi`"
                );
            }
            Reportable::Parse(_) => panic!("Expected Error"),
        }
        assert_eq!(reportable.code().unwrap().to_string(), "mgrep::injection");
        assert!(reportable.help().is_some());
    }

    #[test]
    fn test_config_file_error_help() {
        let err = MgrepError::from(ConfigurationError::InvalidFile {
            path: "config.toml".into(),
            message: "unknown variant `gif`".to_string(),
        });
        let reportable = to_reportable(&err);

        assert_eq!(reportable.code().unwrap().to_string(), "mgrep::config");
        let help = reportable.help().unwrap().to_string();
        assert!(help.contains("[export]") && help.contains("[icons]"), "{help}");
    }
}
