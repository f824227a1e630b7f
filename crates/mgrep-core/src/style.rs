//! Inline CSS `style` attribute handling.
//!
//! Styles are kept as an ordered list of `key:value` declarations so that a
//! parse/format cycle preserves the author's order.

use std::{fmt, str::FromStr};

use thiserror::Error;

/// A parsed `style` attribute value.
///
/// # Examples
///
/// ```
/// # use mgrep_core::style::Style;
/// let mut style = Style::parse("fill:#ff0000;stroke:none");
/// style.set("stroke-width", "2");
///
/// assert_eq!(style.get("fill"), Some("#ff0000"));
/// assert_eq!(style.to_string(), "fill:#ff0000;stroke:none;stroke-width:2");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Style {
    declarations: Vec<(String, String)>,
}

impl Style {
    /// Parses `key:value;` declarations. Empty and malformed declarations are
    /// ignored; a repeated key keeps its last value at its first position.
    pub fn parse(value: &str) -> Self {
        let mut style = Self::default();
        for declaration in value.split(';') {
            if let Some((key, value)) = declaration.split_once(':') {
                let key = key.trim();
                if !key.is_empty() {
                    style.set(key, value.trim());
                }
            }
        }
        style
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.declarations
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    /// Sets `key` to `value`, keeping the position of an existing key.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.declarations.iter_mut().find(|(name, _)| *name == key) {
            Some((_, existing)) => *existing = value,
            None => self.declarations.push((key, value)),
        }
    }

    /// Removes `key`, returning its value if it was set.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        let index = self.declarations.iter().position(|(name, _)| name == key)?;
        Some(self.declarations.remove(index).1)
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.declarations
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, (key, value)) in self.declarations.iter().enumerate() {
            if index > 0 {
                f.write_str(";")?;
            }
            write!(f, "{key}:{value}")?;
        }
        Ok(())
    }
}

/// Merges `overrides` into `base`.
///
/// Keys of `base` that are not overridden are kept. Overridden keys take the
/// new value in place. Overrides whose value is `none` are skipped, so they
/// never erase a base value. New keys are appended in override order.
///
/// # Examples
///
/// ```
/// # use mgrep_core::style::merge_styles;
/// let merged = merge_styles("fill:red;stroke:blue", "stroke:green;fill:none;opacity:0.5");
/// assert_eq!(merged, "fill:red;stroke:green;opacity:0.5");
/// ```
pub fn merge_styles(base: &str, overrides: &str) -> String {
    let mut merged = Style::parse(base);
    for (key, value) in Style::parse(overrides).iter() {
        if value != "none" {
            merged.set(key, value);
        }
    }
    merged.to_string()
}

/// Error for an unknown text marker side.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown text side `{0}`, expected one of right, left, below")]
pub struct UnknownTextSide(pub String);

/// Side of a marker on which a label is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextSide {
    Right,
    Left,
    Below,
}

impl TextSide {
    pub const ALL: [Self; 3] = [Self::Right, Self::Left, Self::Below];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Right => "right",
            Self::Left => "left",
            Self::Below => "below",
        }
    }

    /// Value of the `text-align` property for a label on this side.
    pub fn text_align(self) -> &'static str {
        match self {
            Self::Right => "start",
            Self::Left => "end",
            Self::Below => "center",
        }
    }

    /// Value of the `text-anchor` property for a label on this side.
    pub fn text_anchor(self) -> &'static str {
        match self {
            Self::Right => "start",
            Self::Left => "end",
            Self::Below => "middle",
        }
    }

    /// Sets `text-align` and `text-anchor` on `style` for this side.
    pub fn apply(self, style: &mut Style) {
        style.set("text-align", self.text_align());
        style.set("text-anchor", self.text_anchor());
    }
}

impl FromStr for TextSide {
    type Err = UnknownTextSide;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|side| side.as_str() == s.trim())
            .ok_or_else(|| UnknownTextSide(s.to_string()))
    }
}

impl fmt::Display for TextSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
