//! Command mappings.
//!
//! A [`Mapping`] assigns a command to some `(microgesture, characteristic)`
//! pairs. Applying it injects the command fragment into every layer
//! classified with that pair; resetting it removes exactly what was injected.

use std::{fmt, str::FromStr};

use log::{debug, info, warn};
use thiserror::Error;

use mgrep_core::{
    command::{Command, UnknownCommand},
    microgesture::{Classification, ClassificationError},
};
use mgrep_document::Document;

use crate::{
    icon::{IconLibrary, build_command_icon},
    inject::{Injection, InjectionError, inject_into_layer, reset_layer},
    layer::MicrogestureIndex,
};

/// Error raised when reading a `tap_tip-banana` token.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EntryError {
    #[error("expected `<microgesture>_<characteristic>-<command>`, got `{0}`")]
    Format(String),

    #[error(transparent)]
    Classification(#[from] ClassificationError),

    #[error(transparent)]
    Command(#[from] UnknownCommand),
}

/// One `(classification, command)` pair of a mapping.
///
/// Written `tap_tip-banana` in names and mapping files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MappingEntry {
    classification: Classification,
    command: Command,
}

impl MappingEntry {
    pub fn new(classification: Classification, command: Command) -> Self {
        Self {
            classification,
            command,
        }
    }

    pub fn classification(self) -> Classification {
        self.classification
    }

    pub fn command(self) -> Command {
        self.command
    }
}

impl FromStr for MappingEntry {
    type Err = EntryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        let Some((key, command)) = token.split_once('-') else {
            return Err(EntryError::Format(token.to_string()));
        };
        if command.contains('-') {
            return Err(EntryError::Format(token.to_string()));
        }
        Ok(Self::new(
            Classification::from_token(key)?,
            command.parse()?,
        ))
    }
}

impl fmt::Display for MappingEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.classification, self.command)
    }
}

/// An ordered list of mapping entries.
///
/// Entries are not checked for uniqueness: a hand-written mapping may assign
/// the same command twice, or the same pair to two commands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mapping {
    entries: Vec<MappingEntry>,
}

impl Mapping {
    pub fn new(entries: Vec<MappingEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[MappingEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// See [`mapping_name`].
    pub fn name(&self) -> String {
        mapping_name(&self.entries)
    }
}

impl FromIterator<MappingEntry> for Mapping {
    fn from_iter<I: IntoIterator<Item = MappingEntry>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl fmt::Display for Mapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// Name of a mapping: its entries joined with `_`, in order.
///
/// ```
/// # use mgrep::mapping::{MappingEntry, mapping_name};
/// let entries: Vec<MappingEntry> = ["tap_tip-banana", "swipe_up-kiwi"]
///     .iter()
///     .map(|token| token.parse().unwrap())
///     .collect();
/// assert_eq!(mapping_name(&entries), "tap_tip-banana_swipe_up-kiwi");
/// ```
pub fn mapping_name(entries: &[MappingEntry]) -> String {
    entries
        .iter()
        .map(MappingEntry::to_string)
        .collect::<Vec<_>>()
        .join("_")
}

/// Commands of each built-in mapping, in [`Classification::all`] order.
const DEFAULT_ROWS: [[Command; 7]; 7] = [
    [
        Command::BANANA,
        Command::WATERMELON,
        Command::BLACKBERRY,
        Command::KIWI,
        Command::PLUM,
        Command::CHERRY,
        Command::PINEAPPLE,
    ],
    [
        Command::PINEAPPLE,
        Command::BLACKBERRY,
        Command::CHERRY,
        Command::PLUM,
        Command::BANANA,
        Command::KIWI,
        Command::WATERMELON,
    ],
    [
        Command::CHERRY,
        Command::PINEAPPLE,
        Command::BLACKBERRY,
        Command::WATERMELON,
        Command::KIWI,
        Command::PLUM,
        Command::BANANA,
    ],
    [
        Command::KIWI,
        Command::CHERRY,
        Command::WATERMELON,
        Command::BANANA,
        Command::PLUM,
        Command::PINEAPPLE,
        Command::BLACKBERRY,
    ],
    [
        Command::BLACKBERRY,
        Command::WATERMELON,
        Command::PLUM,
        Command::PINEAPPLE,
        Command::KIWI,
        Command::BANANA,
        Command::CHERRY,
    ],
    [
        Command::PLUM,
        Command::BLACKBERRY,
        Command::BANANA,
        Command::WATERMELON,
        Command::CHERRY,
        Command::KIWI,
        Command::PINEAPPLE,
    ],
    [
        Command::WATERMELON,
        Command::PLUM,
        Command::BLACKBERRY,
        Command::KIWI,
        Command::CHERRY,
        Command::PINEAPPLE,
        Command::BANANA,
    ],
];

/// The seven built-in mappings.
pub fn default_mappings() -> Vec<Mapping> {
    DEFAULT_ROWS
        .iter()
        .map(|row| {
            Classification::all()
                .zip(row.iter().copied())
                .map(|(classification, command)| MappingEntry::new(classification, command))
                .collect()
        })
        .collect()
}

/// Every classification paired with every command.
pub fn wanted_mappings() -> Vec<MappingEntry> {
    Classification::all()
        .flat_map(|classification| {
            Command::all().map(move |command| MappingEntry::new(classification, command))
        })
        .collect()
}

/// Every assignment of the commands of `entries` to their classifications.
///
/// The distinct classifications and the distinct commands are collected in
/// order of first appearance. Each permutation of the commands, in
/// lexicographic order of their positions, is zipped with the
/// classifications. When there are more commands than classifications the
/// extra commands are dropped from each mapping, so some mappings repeat.
pub fn all_mappings(entries: &[MappingEntry]) -> Vec<Mapping> {
    let mut classifications = Vec::new();
    let mut commands = Vec::new();
    for entry in entries {
        if !classifications.contains(&entry.classification) {
            classifications.push(entry.classification);
        }
        if !commands.contains(&entry.command) {
            commands.push(entry.command);
        }
    }

    let mut order: Vec<usize> = (0..commands.len()).collect();
    let mut mappings = Vec::new();
    loop {
        mappings.push(
            classifications
                .iter()
                .zip(&order)
                .map(|(classification, position)| {
                    MappingEntry::new(*classification, commands[*position])
                })
                .collect(),
        );
        if !next_permutation(&mut order) {
            break;
        }
    }
    mappings
}

/// Rearranges `items` into the next permutation in lexicographic order.
/// Returns `false` once `items` is the last one.
fn next_permutation(items: &mut [usize]) -> bool {
    let Some(pivot) = items.windows(2).rposition(|pair| pair[0] < pair[1]) else {
        return false;
    };
    let Some(successor) = items.iter().rposition(|item| *item > items[pivot]) else {
        return false;
    };
    items.swap(pivot, successor);
    items[pivot + 1..].reverse();
    true
}

/// Every injection made by one [`apply_mapping`] call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InjectionLog {
    injections: Vec<Injection>,
}

impl InjectionLog {
    pub fn injections(&self) -> &[Injection] {
        &self.injections
    }

    /// Number of injected fragments across all layers.
    pub fn fragment_count(&self) -> usize {
        self.injections
            .iter()
            .map(|injection| injection.fragments().len())
            .sum()
    }
}

/// Injects the command of each entry into every layer classified with its
/// pair.
///
/// A fresh fragment is built for every injection site. Pairs without layers
/// are skipped with a warning. On error, everything injected so far is
/// removed before the error is returned.
pub fn apply_mapping(
    document: &mut Document,
    mapping: &Mapping,
    index: &MicrogestureIndex,
    library: &IconLibrary,
) -> Result<InjectionLog, InjectionError> {
    info!(mapping:% = mapping; "Applying mapping");
    let mut log = InjectionLog::default();

    for entry in mapping.entries() {
        let layers = index.get(entry.classification);
        if layers.is_empty() {
            warn!(classification:% = entry.classification; "No layer for microgesture");
            continue;
        }

        for layer in layers {
            let injected = inject_into_layer(document, *layer, |document| {
                build_command_icon(document, entry.command, library)
            });
            match injected {
                Ok(injection) => log.injections.push(injection),
                Err(err) => {
                    reset_mapping(document, &log);
                    return Err(err);
                }
            }
        }
    }

    debug!(fragments = log.fragment_count(); "Mapping applied");
    Ok(log)
}

/// Removes everything recorded in `log` and frees the nodes of the removed
/// fragments. Returns the number of fragments removed.
pub fn reset_mapping(document: &mut Document, log: &InjectionLog) -> usize {
    let removed = log
        .injections
        .iter()
        .map(|injection| reset_layer(document, injection))
        .sum();
    debug!(fragments = removed; "Mapping reset");
    removed
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::{attributes::INJECTED, icon::tests::library, layer::LayerGraph};

    const DRAWING: &str = r#"<svg xmlns="http://www.w3.org/2000/svg"
        xmlns:inkscape="http://www.inkscape.org/namespaces/inkscape">
      <g inkscape:groupmode="layer" inkscape:label="Swipe up" id="swipe-up"
         mgrep-microgesture-layer="swipe,up">
        <path mgrep-path-element="trace" d="M 0,0 L 100,0"/>
        <circle mgrep-path-element="command" cx="120" cy="0" r="3"/>
      </g>
      <g inkscape:groupmode="layer" inkscape:label="Swipe up again" id="swipe-up-2"
         mgrep-microgesture-layer="swipe, up">
        <circle mgrep-path-element="end-command" cx="0" cy="80" r="3"/>
      </g>
      <g inkscape:groupmode="layer" inkscape:label="Tap tip" id="tap-tip"
         mgrep-microgesture-layer="tap,tip">
        <circle mgrep-path-element="command" cx="10" cy="10" r="3"/>
      </g>
    </svg>"#;

    fn entry(token: &str) -> MappingEntry {
        token.parse().unwrap()
    }

    fn mapping(tokens: &[&str]) -> Mapping {
        tokens.iter().map(|token| entry(token)).collect()
    }

    fn injected_count(doc: &Document) -> usize {
        doc.find_descendants(doc.root(), |doc, node| doc.has_attribute(node, INJECTED))
            .len()
    }

    #[test]
    fn test_entry_parse() {
        let parsed = entry(" swipe_up-kiwi ");
        assert_eq!(parsed.command(), Command::KIWI);
        assert_eq!(parsed.classification().to_string(), "swipe_up");
        assert_eq!(parsed.to_string(), "swipe_up-kiwi");
    }

    #[test]
    fn test_entry_parse_errors() {
        assert!(matches!(
            "tap_tip".parse::<MappingEntry>(),
            Err(EntryError::Format(_))
        ));
        assert!(matches!(
            "tap_tip-banana-kiwi".parse::<MappingEntry>(),
            Err(EntryError::Format(_))
        ));
        assert!(matches!(
            "tap_up-banana".parse::<MappingEntry>(),
            Err(EntryError::Classification(_))
        ));
        assert!(matches!(
            "tap_tip-mango".parse::<MappingEntry>(),
            Err(EntryError::Command(_))
        ));
    }

    #[test]
    fn test_mapping_name_keeps_order() {
        let forward = mapping(&["tap_tip-banana", "swipe_up-kiwi"]);
        let backward = mapping(&["swipe_up-kiwi", "tap_tip-banana"]);
        assert_eq!(forward.name(), "tap_tip-banana_swipe_up-kiwi");
        assert_eq!(backward.name(), "swipe_up-kiwi_tap_tip-banana");
        assert_eq!(Mapping::default().name(), "");
    }

    #[test]
    fn test_default_mappings_are_latin_rows() {
        let mappings = default_mappings();
        assert_eq!(mappings.len(), 7);
        assert_eq!(
            mappings[0].name(),
            "tap_tip-banana_tap_middle-watermelon_tap_base-blackberry_swipe_up-kiwi_\
             swipe_down-plum_flex_up-cherry_flex_down-pineapple"
        );
        for mapping in &mappings {
            let classifications: HashSet<_> =
                mapping.entries().iter().map(|e| e.classification()).collect();
            let commands: HashSet<_> = mapping.entries().iter().map(|e| e.command()).collect();
            assert_eq!(classifications.len(), 7);
            assert_eq!(commands.len(), 7);
        }
    }

    #[test]
    fn test_wanted_mappings_cover_every_pair() {
        let wanted = wanted_mappings();
        assert_eq!(wanted.len(), 49);
        assert_eq!(wanted[0].to_string(), "tap_tip-banana");
        assert_eq!(wanted[48].to_string(), "flex_down-watermelon");
    }

    #[test]
    fn test_all_mappings_permutes_commands() {
        let mappings = all_mappings(&[
            entry("tap_tip-banana"),
            entry("tap_middle-kiwi"),
            entry("tap_tip-kiwi"),
        ]);
        let names: Vec<String> = mappings.iter().map(Mapping::name).collect();
        assert_eq!(
            names,
            [
                "tap_tip-banana_tap_middle-kiwi",
                "tap_tip-kiwi_tap_middle-banana"
            ]
        );
    }

    #[test]
    fn test_all_mappings_of_wanted() {
        let mappings = all_mappings(&wanted_mappings());
        assert_eq!(mappings.len(), 5040);
        assert_eq!(mappings[0].entries()[0].command(), Command::BANANA);
        assert_eq!(mappings[5039].entries()[0].command(), Command::WATERMELON);
        let distinct: HashSet<String> = mappings.iter().map(Mapping::name).collect();
        assert_eq!(distinct.len(), 5040);
    }

    #[test]
    fn test_all_mappings_more_commands_than_keys() {
        let mappings = all_mappings(&[
            entry("tap_tip-banana"),
            entry("tap_tip-kiwi"),
            entry("tap_tip-plum"),
        ]);
        assert_eq!(mappings.len(), 6);
        assert!(mappings.iter().all(|mapping| mapping.len() == 1));
    }

    #[test]
    fn test_apply_mapping_injects_every_layer() {
        let mut doc = Document::parse(DRAWING).unwrap();
        let graph = LayerGraph::build(&doc).unwrap();

        let log = apply_mapping(
            &mut doc,
            &mapping(&["swipe_up-kiwi"]),
            graph.index(),
            &library(),
        )
        .unwrap();

        assert_eq!(log.injections().len(), 2);
        assert_eq!(log.fragment_count(), 2);
        assert_eq!(injected_count(&doc), 2);
        assert!(doc.text_content(doc.root()).contains("kiwi"));
    }

    #[test]
    fn test_apply_then_reset_is_idempotent() {
        let mut doc = Document::parse(DRAWING).unwrap();
        let before = doc.snapshot(doc.root());
        let graph = LayerGraph::build(&doc).unwrap();
        let library = library();
        let kiwi = mapping(&["swipe_up-kiwi", "tap_tip-kiwi"]);
        let nodes = doc.node_count();

        for _ in 0..3 {
            let log = apply_mapping(&mut doc, &kiwi, graph.index(), &library).unwrap();
            assert_eq!(log.fragment_count(), 3);
            assert_eq!(reset_mapping(&mut doc, &log), 3);
            assert_eq!(injected_count(&doc), 0);
            assert_eq!(doc.snapshot(doc.root()), before);
            assert_eq!(doc.node_count(), nodes);
        }
    }

    #[test]
    fn test_arena_stays_bounded_across_mappings() {
        let mut doc = Document::parse(DRAWING).unwrap();
        let graph = LayerGraph::build(&doc).unwrap();
        let library = library();
        let kiwi = mapping(&["swipe_up-kiwi", "tap_tip-kiwi"]);

        let log = apply_mapping(&mut doc, &kiwi, graph.index(), &library).unwrap();
        reset_mapping(&mut doc, &log);
        let capacity = doc.capacity();

        for _ in 0..50 {
            let log = apply_mapping(&mut doc, &kiwi, graph.index(), &library).unwrap();
            reset_mapping(&mut doc, &log);
        }
        assert_eq!(doc.capacity(), capacity);
    }

    #[test]
    fn test_apply_mapping_rolls_back_on_error() {
        let mut doc = Document::parse(DRAWING).unwrap();
        let before = doc.snapshot(doc.root());
        let nodes = doc.node_count();
        let graph = LayerGraph::build(&doc).unwrap();

        // No plum icon in the test library
        let result = apply_mapping(
            &mut doc,
            &mapping(&["swipe_up-kiwi", "tap_tip-plum"]),
            graph.index(),
            &library(),
        );

        assert!(matches!(
            result,
            Err(InjectionError::MissingIcon(Command::PLUM))
        ));
        assert_eq!(doc.snapshot(doc.root()), before);
        assert_eq!(doc.node_count(), nodes);
    }

    #[test]
    fn test_apply_mapping_skips_missing_pairs() {
        let mut doc = Document::parse(DRAWING).unwrap();
        let graph = LayerGraph::build(&doc).unwrap();

        let log = apply_mapping(
            &mut doc,
            &mapping(&["flex_down-kiwi"]),
            graph.index(),
            &library(),
        )
        .unwrap();
        assert_eq!(log.fragment_count(), 0);
    }

    mod proptest_tests {
        use proptest::prelude::*;

        use super::*;

        fn entry_strategy() -> impl Strategy<Value = MappingEntry> {
            let classifications: Vec<Classification> = Classification::all().collect();
            let commands: Vec<Command> = Command::all().collect();
            (
                proptest::sample::select(classifications),
                proptest::sample::select(commands),
            )
                .prop_map(|(classification, command)| MappingEntry::new(classification, command))
        }

        fn check_name_is_deterministic(entries: Vec<MappingEntry>) -> Result<(), TestCaseError> {
            let mapping = Mapping::new(entries.clone());
            prop_assert_eq!(mapping.name(), Mapping::new(entries).name());
            Ok(())
        }

        fn check_name_is_order_sensitive(
            first: MappingEntry,
            second: MappingEntry,
        ) -> Result<(), TestCaseError> {
            prop_assume!(first != second);
            let forward = Mapping::new(vec![first, second]);
            let backward = Mapping::new(vec![second, first]);
            prop_assert_ne!(forward.name(), backward.name());
            Ok(())
        }

        fn check_entry_token_round_trip(entry: MappingEntry) -> Result<(), TestCaseError> {
            let parsed: MappingEntry = entry.to_string().parse().unwrap();
            prop_assert_eq!(parsed, entry);
            Ok(())
        }

        proptest! {
            #[test]
            fn name_is_deterministic(entries in proptest::collection::vec(entry_strategy(), 0..8)) {
                check_name_is_deterministic(entries)?;
            }

            #[test]
            fn name_is_order_sensitive(first in entry_strategy(), second in entry_strategy()) {
                check_name_is_order_sensitive(first, second)?;
            }

            #[test]
            fn entry_token_round_trip(entry in entry_strategy()) {
                check_entry_token_round_trip(entry)?;
            }
        }
    }
}
