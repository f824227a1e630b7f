//! Attribute vocabulary used to tag drawings.
//!
//! Drawings and icon files carry plain (unprefixed) attributes that tell the
//! exporter what each element is for:
//!
//! | attribute                  | on                      | values                                  |
//! |----------------------------|-------------------------|-----------------------------------------|
//! | `mgrep-microgesture-layer` | layer group             | `<microgesture>,<characteristic>`       |
//! | `mgrep-path-element`       | marker inside a layer   | `command`, `start-command`, `end-command`, ... |
//! | `mgrep-command`            | template and icon parts | `template`, `centroid`, `icon`, `icon-centroid` |
//! | `mgrep-text-marker`        | template text & circles | `right`, `left`, `below`                |
//! | `mgrep-injected`           | injected fragment root  | `true`                                  |

use std::fmt;

/// Classification of a layer group.
pub const MICROGESTURE_LAYER: &str = "mgrep-microgesture-layer";
/// Role of a marker element inside a layer.
pub const PATH_ELEMENT: &str = "mgrep-path-element";
/// Role of an element of the command template or of an icon file.
pub const COMMAND_ROLE: &str = "mgrep-command";
/// Pairs a template text with the circle it is written next to.
pub const TEXT_MARKER: &str = "mgrep-text-marker";
/// Tags the root of every injected fragment.
pub const INJECTED: &str = "mgrep-injected";

pub const INKSCAPE_LABEL: &str = "inkscape:label";
pub const INKSCAPE_GROUPMODE: &str = "inkscape:groupmode";

/// Values of [`COMMAND_ROLE`].
pub mod role {
    /// Group holding the whole command fragment.
    pub const TEMPLATE: &str = "template";
    /// Circle of the template on which the icon is centered.
    pub const CENTROID: &str = "centroid";
    /// Drawable group of an icon file.
    pub const ICON: &str = "icon";
    /// Circle marking the visual center of an icon.
    pub const ICON_CENTROID: &str = "icon-centroid";
}

/// Marker of a layer in front of which a command fragment is injected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandAnchor {
    Start,
    End,
    Plain,
}

impl CommandAnchor {
    /// Anchors in the order they are looked up in a layer.
    pub const ORDER: [Self; 3] = [Self::Start, Self::End, Self::Plain];

    /// Value of [`PATH_ELEMENT`] for this anchor.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start-command",
            Self::End => "end-command",
            Self::Plain => "command",
        }
    }
}

impl fmt::Display for CommandAnchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
