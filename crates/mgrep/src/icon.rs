//! Command icons.
//!
//! An [`IconLibrary`] holds the command template and one icon drawing per
//! command. [`build_command_icon`] combines them into a detached fragment of
//! the target document, ready to be injected into a layer.
//!
//! # Template
//!
//! The template is a drawing with a group tagged `mgrep-command="template"`.
//! That group holds:
//!
//! - a circle tagged `mgrep-command="centroid"`, the point the icon is
//!   centered on;
//! - text elements, whose content becomes the command name;
//! - optionally, text elements and circles sharing a `mgrep-text-marker` side,
//!   used to place the labels (see [`crate::inject`]).
//!
//! # Icons
//!
//! Each `<command>.svg` holds a group tagged `mgrep-command="icon"` and,
//! optionally, a circle tagged `mgrep-command="icon-centroid"` giving the
//! visual center of the icon. Without it, the centroid of the first path of
//! the icon is used.

use std::{collections::HashMap, path::Path};

use log::{debug, info, warn};

use mgrep_core::{
    command::Command,
    geometry::Point,
    transform::{Transform, apply_to_circle, apply_to_path},
};
use mgrep_document::{Document, NodeId};

use crate::{
    attributes::{COMMAND_ROLE, INJECTED, role},
    inject::InjectionError,
    markers,
};

/// The command template and the icon of each command.
#[derive(Debug, Clone)]
pub struct IconLibrary {
    template: Document,
    icons: HashMap<Command, Document>,
}

impl IconLibrary {
    /// Builds a library from already parsed drawings.
    ///
    /// # Errors
    ///
    /// Returns [`InjectionError::MissingTemplatePart`] if the template lacks
    /// its template group or its centroid marker.
    pub fn from_documents(
        template: Document,
        icons: impl IntoIterator<Item = (Command, Document)>,
    ) -> Result<Self, InjectionError> {
        let group = markers::find_tagged(&template, template.root(), COMMAND_ROLE, role::TEMPLATE)
            .ok_or(InjectionError::MissingTemplatePart(role::TEMPLATE))?;
        markers::find_tagged(&template, group, COMMAND_ROLE, role::CENTROID)
            .ok_or(InjectionError::MissingTemplatePart(role::CENTROID))?;

        Ok(Self {
            template,
            icons: icons.into_iter().collect(),
        })
    }

    /// Reads the template at `template_path` and every `<command>.svg` found
    /// in `directory`.
    ///
    /// A missing icon file is not an error: it only fails when a mapping uses
    /// that command.
    pub fn load(directory: &Path, template_path: &Path) -> Result<Self, InjectionError> {
        info!(directory:? = directory, template:? = template_path; "Loading icon library");
        let template = Document::open(template_path)?;

        let mut icons = Vec::new();
        for command in Command::all() {
            let path = directory.join(format!("{command}.svg"));
            if !path.is_file() {
                warn!(command:% = command, path:? = path; "No icon for command");
                continue;
            }
            icons.push((command, Document::open(&path)?));
        }
        debug!(icons = icons.len(); "Icons loaded");

        Self::from_documents(template, icons)
    }

    pub fn template(&self) -> &Document {
        &self.template
    }

    /// Icon drawing of `command`.
    pub fn icon(&self, command: Command) -> Result<&Document, InjectionError> {
        self.icons
            .get(&command)
            .ok_or(InjectionError::MissingIcon(command))
    }

    fn template_group(&self) -> Result<NodeId, InjectionError> {
        markers::find_tagged(&self.template, self.template.root(), COMMAND_ROLE, role::TEMPLATE)
            .ok_or(InjectionError::MissingTemplatePart(role::TEMPLATE))
    }
}

/// Visual center of an icon drawing.
fn icon_centroid(icon: &Document, group: NodeId) -> Result<Point, InjectionError> {
    if let Some(marker) = markers::find_tagged(icon, icon.root(), COMMAND_ROLE, role::ICON_CENTROID)
    {
        return markers::center(icon, marker);
    }

    let first_path = std::iter::once(group)
        .chain(icon.descendants(group))
        .find_map(|node| markers::path(icon, node));
    match first_path {
        Some(path) => path?
            .centroid()
            .ok_or(InjectionError::MissingIconPart(role::ICON_CENTROID)),
        None => Err(InjectionError::MissingIconPart(role::ICON_CENTROID)),
    }
}

/// Builds the command fragment for `command` in `document`.
///
/// The template group is cloned into `document`, its texts are set to the
/// command name, and the icon group is moved so that its centroid lands on the
/// template centroid marker. The icon is inserted right after that marker so
/// it renders above it. The returned fragment is detached and tagged with
/// `mgrep-injected="true"`. On error, the nodes created so far are removed.
pub fn build_command_icon(
    document: &mut Document,
    command: Command,
    library: &IconLibrary,
) -> Result<NodeId, InjectionError> {
    let fragment = document.import_subtree(library.template(), library.template_group()?);
    if let Err(err) = fill_fragment(document, fragment, command, library) {
        document.remove(fragment);
        return Err(err);
    }
    document.set_attribute(fragment, INJECTED, "true");
    debug!(command:% = command, fragment:% = fragment; "Command icon built");

    Ok(fragment)
}

fn fill_fragment(
    document: &mut Document,
    fragment: NodeId,
    command: Command,
    library: &IconLibrary,
) -> Result<(), InjectionError> {
    let texts = document.find_descendants(fragment, |doc, node| doc.is_named(node, "text"));
    for text in texts {
        // Whitespace between tspans stays as it is
        let leaves = document.find_descendants(text, |doc, node| {
            doc.text(node).is_some_and(|content| !content.trim().is_empty())
        });
        if leaves.is_empty() {
            document.set_text(text, command.as_str());
        }
        for leaf in leaves {
            document.set_text(leaf, command.as_str());
        }
    }

    let anchor = markers::find_tagged(document, fragment, COMMAND_ROLE, role::CENTROID)
        .ok_or(InjectionError::MissingTemplatePart(role::CENTROID))?;
    let anchor_center = markers::center(document, anchor)?;

    let icon = library.icon(command)?;
    let icon_group = markers::find_tagged(icon, icon.root(), COMMAND_ROLE, role::ICON)
        .ok_or(InjectionError::MissingIconPart(role::ICON))?;
    let translation = Transform::translation(icon_centroid(icon, icon_group)?, anchor_center);

    let icon_copy = document.import_subtree(icon, icon_group);
    if let Err(err) = document.insert_after(anchor, icon_copy) {
        document.remove(icon_copy);
        return Err(err.into());
    }

    let drawables: Vec<NodeId> = std::iter::once(icon_copy)
        .chain(document.descendants(icon_copy))
        .collect();
    for node in drawables {
        if let Some(path) = markers::path(document, node) {
            let moved = apply_to_path(&path?, &[], &translation);
            markers::set_path(document, node, &moved);
        } else if markers::is_circular(document, node) {
            let circle = markers::circle(document, node)?;
            let moved = apply_to_circle(circle, &[], &translation);
            markers::set_center(document, node, moved.center());
        }
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use float_cmp::approx_eq;

    use super::*;

    pub(crate) const TEMPLATE: &str = r#"<svg xmlns="http://www.w3.org/2000/svg">
      <g mgrep-command="template" id="command-template">
        <circle mgrep-command="centroid" cx="50" cy="50" r="10"/>
        <circle mgrep-text-marker="right" cx="70" cy="50" r="1"/>
        <text mgrep-text-marker="right" transform="matrix(2,0,0,2,0,0)" style="font-size:4px"><tspan>name</tspan></text>
      </g>
    </svg>"#;

    pub(crate) const KIWI_ICON: &str = r#"<svg xmlns="http://www.w3.org/2000/svg">
      <g mgrep-command="icon">
        <circle mgrep-command="icon-centroid" cx="5" cy="5" r="5"/>
        <path d="M 0,0 L 10,0 L 10,10 L 0,10 Z"/>
      </g>
    </svg>"#;

    pub(crate) fn library() -> IconLibrary {
        IconLibrary::from_documents(
            Document::parse(TEMPLATE).unwrap(),
            [(Command::KIWI, Document::parse(KIWI_ICON).unwrap())],
        )
        .unwrap()
    }

    #[test]
    fn test_library_requires_template_group() {
        let template = Document::parse("<svg><circle/></svg>").unwrap();
        assert!(matches!(
            IconLibrary::from_documents(template, []),
            Err(InjectionError::MissingTemplatePart("template"))
        ));
    }

    #[test]
    fn test_library_requires_centroid() {
        let template = Document::parse(r#"<svg><g mgrep-command="template"/></svg>"#).unwrap();
        assert!(matches!(
            IconLibrary::from_documents(template, []),
            Err(InjectionError::MissingTemplatePart("centroid"))
        ));
    }

    #[test]
    fn test_build_command_icon_sets_texts() {
        let mut doc = Document::new("svg");
        let fragment = build_command_icon(&mut doc, Command::KIWI, &library()).unwrap();

        assert_eq!(doc.parent(fragment), None);
        assert_eq!(doc.attribute(fragment, INJECTED), Some("true"));
        assert_eq!(doc.text_content(fragment), "kiwi");
    }

    #[test]
    fn test_build_command_icon_centers_icon_on_anchor() {
        let mut doc = Document::new("svg");
        let fragment = build_command_icon(&mut doc, Command::KIWI, &library()).unwrap();

        let anchor = markers::find_tagged(&doc, fragment, COMMAND_ROLE, role::CENTROID).unwrap();
        let icon = markers::find_tagged(&doc, fragment, COMMAND_ROLE, role::ICON).unwrap();
        // Spliced right after the anchor
        assert_eq!(doc.index_in_parent(icon), Some(doc.index_in_parent(anchor).unwrap() + 1));

        let icon_center = markers::find_tagged(&doc, icon, COMMAND_ROLE, role::ICON_CENTROID)
            .map(|node| markers::center(&doc, node).unwrap())
            .unwrap();
        assert_eq!(icon_center, Point::new(50.0, 50.0));

        let square = doc
            .descendants(icon)
            .find_map(|node| markers::path(&doc, node))
            .unwrap()
            .unwrap();
        let centroid = square.centroid().unwrap();
        assert!(approx_eq!(f32, centroid.x(), 50.0, epsilon = 0.001));
        assert!(approx_eq!(f32, centroid.y(), 50.0, epsilon = 0.001));
    }

    #[test]
    fn test_build_command_icon_missing_icon() {
        let mut doc = Document::new("svg");
        assert!(matches!(
            build_command_icon(&mut doc, Command::PLUM, &library()),
            Err(InjectionError::MissingIcon(Command::PLUM))
        ));
        // Nothing of the template copy is left behind
        assert_eq!(doc.node_count(), 1);
    }

    #[test]
    fn test_build_command_icon_keeps_spaces_between_tspans() {
        let template = Document::parse(
            r#"<svg xmlns="http://www.w3.org/2000/svg">
              <g mgrep-command="template">
                <circle mgrep-command="centroid" cx="0" cy="0" r="1"/>
                <text xml:space="preserve"><tspan>a</tspan> <tspan>b</tspan></text>
              </g>
            </svg>"#,
        )
        .unwrap();
        let library = IconLibrary::from_documents(
            template,
            [(Command::KIWI, Document::parse(KIWI_ICON).unwrap())],
        )
        .unwrap();

        let mut doc = Document::new("svg");
        let fragment = build_command_icon(&mut doc, Command::KIWI, &library).unwrap();
        assert_eq!(doc.text_content(fragment), "kiwi kiwi");
    }

    #[test]
    fn test_icon_centroid_falls_back_to_first_path() {
        let icon = Document::parse(
            r#"<svg><g mgrep-command="icon"><path d="M 0,0 L 4,0 L 4,4 L 0,4 Z"/></g></svg>"#,
        )
        .unwrap();
        let group = markers::find_tagged(&icon, icon.root(), COMMAND_ROLE, role::ICON).unwrap();
        assert_eq!(icon_centroid(&icon, group).unwrap(), Point::new(2.0, 2.0));
    }
}
