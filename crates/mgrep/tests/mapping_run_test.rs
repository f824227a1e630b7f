//! Integration tests for the MappingRunner batch API
//!
//! A copying renderer stands in for Inkscape, so the exported "images" are
//! the SVG drawings handed to the renderer.

use std::{
    fs,
    path::{Path, PathBuf},
};

use mgrep::{
    Document, MappingRunner,
    command::Command,
    config::ExportConfig,
    export::{Error, ExportFormat, Exporter, Render},
    icon::IconLibrary,
    layer::LayerGraph,
    mapping::{Mapping, apply_mapping, default_mappings, reset_mapping},
    mapping_file::{load_mappings, write_mappings},
};

const DRAWING: &str = r#"<svg xmlns="http://www.w3.org/2000/svg"
    xmlns:inkscape="http://www.inkscape.org/namespaces/inkscape">
  <g inkscape:groupmode="layer" inkscape:label="Swipe up" id="swipe-up"
     mgrep-microgesture-layer="swipe,up">
    <path mgrep-path-element="trace" d="M 0,0 L 100,0"/>
    <circle mgrep-path-element="command" cx="120" cy="0" r="3"/>
  </g>
  <g inkscape:groupmode="layer" inkscape:label="Tap tip" id="tap-tip"
     mgrep-microgesture-layer="tap,tip">
    <circle mgrep-path-element="start-command" cx="10" cy="10" r="3"/>
  </g>
</svg>"#;

const TEMPLATE: &str = r#"<svg xmlns="http://www.w3.org/2000/svg">
  <g mgrep-command="template">
    <circle mgrep-command="centroid" cx="0" cy="0" r="8"/>
    <circle mgrep-text-marker="below" cx="0" cy="12" r="1"/>
    <text mgrep-text-marker="below"><tspan>command</tspan></text>
  </g>
</svg>"#;

/// An Inkscape drawing whose labels rely on preserved whitespace.
const LABELLED_DRAWING: &str = r#"<svg xmlns="http://www.w3.org/2000/svg"
    xmlns:inkscape="http://www.inkscape.org/namespaces/inkscape">
  <g inkscape:groupmode="layer" inkscape:label="Swipe up" id="swipe-up"
     mgrep-microgesture-layer="swipe,up">
    <path mgrep-path-element="trace" d="M 0,0 L 100,0"/>
    <circle mgrep-path-element="end-command" cx="100" cy="0" r="3"/>
    <text xml:space="preserve" x="0" y="20"><tspan>Swipe</tspan> <tspan>up</tspan></text>
  </g>
</svg>"#;

const LABELLED_TEMPLATE: &str = r#"<svg xmlns="http://www.w3.org/2000/svg">
  <g mgrep-command="template">
    <circle mgrep-command="centroid" cx="0" cy="0" r="8"/>
    <circle mgrep-text-marker="right" cx="12" cy="0" r="1"/>
    <text xml:space="preserve" mgrep-text-marker="right"><tspan>command</tspan> <tspan>name</tspan></text>
  </g>
</svg>"#;

fn icon(shape: &str) -> Document {
    Document::parse(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg"><g mgrep-command="icon">{shape}</g></svg>"#
    ))
    .expect("Failed to parse icon")
}

fn library() -> IconLibrary {
    IconLibrary::from_documents(
        Document::parse(TEMPLATE).expect("Failed to parse template"),
        [
            (
                Command::KIWI,
                icon(r#"<circle mgrep-command="icon-centroid" cx="4" cy="4" r="4"/>"#),
            ),
            (
                Command::BANANA,
                icon(r#"<path d="M 0,0 L 6,0 L 6,2 L 0,2 Z"/>"#),
            ),
        ],
    )
    .expect("Failed to build icon library")
}

/// Copies the SVG to the output path, failing for outputs whose name
/// contains `fail_on`.
struct CopyRenderer {
    fail_on: Option<&'static str>,
}

impl Render for CopyRenderer {
    fn render(
        &self,
        svg_path: &Path,
        output_path: &Path,
        _format: ExportFormat,
        _dpi: f32,
    ) -> Result<(), Error> {
        let name = output_path.to_string_lossy();
        if self.fail_on.is_some_and(|pattern| name.contains(pattern)) {
            return Err(Error::Io(std::io::Error::other("renderer crashed")));
        }
        fs::copy(svg_path, output_path)?;
        Ok(())
    }
}

fn runner(output_dir: &Path, fail_on: Option<&'static str>) -> MappingRunner {
    let mut config = ExportConfig::default();
    config.set_output_dir(output_dir);
    config.set_format(ExportFormat::Png);
    let exporter = Exporter::new(&config).with_renderer(CopyRenderer { fail_on });
    MappingRunner::new(library(), exporter)
}

fn mapping(tokens: &[&str]) -> Mapping {
    tokens
        .iter()
        .map(|token| token.parse().expect("Failed to parse token"))
        .collect()
}

fn injected_count(doc: &Document) -> usize {
    doc.find_descendants(doc.root(), |doc, node| doc.has_attribute(node, "mgrep-injected"))
        .len()
}

#[test]
fn test_kiwi_on_swipe_up_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let runner = runner(dir.path(), None);
    let mut doc = Document::parse(DRAWING).unwrap();
    let before = doc.snapshot(doc.root());

    let report = runner
        .run(&mut doc, "chart", &[mapping(&["swipe_up-kiwi"])])
        .expect("Run should succeed");

    assert!(report.is_success());
    assert_eq!(
        report.exported(),
        &[dir.path().join("swipe_up-kiwi_chart.png")]
    );

    let exported = fs::read_to_string(&report.exported()[0]).unwrap();
    assert!(exported.contains("kiwi"), "Export should show the command name");
    assert!(exported.contains("mgrep-injected"));

    let exported_doc = Document::parse(&exported).unwrap();
    assert_eq!(injected_count(&exported_doc), 1);

    // Nothing left behind once the mapping is exported
    assert_eq!(injected_count(&doc), 0);
    assert_eq!(doc.snapshot(doc.root()), before);
}

#[test]
fn test_export_failure_continues_batch() {
    let dir = tempfile::tempdir().unwrap();
    let runner = runner(dir.path(), Some("banana"));
    let mut doc = Document::parse(DRAWING).unwrap();
    let before = doc.snapshot(doc.root());

    let mappings = [
        mapping(&["swipe_up-kiwi"]),
        mapping(&["swipe_up-banana", "tap_tip-kiwi"]),
        mapping(&["tap_tip-kiwi"]),
    ];
    let report = runner.run(&mut doc, "chart", &mappings).unwrap();

    let exported: Vec<PathBuf> = ["swipe_up-kiwi_chart.png", "tap_tip-kiwi_chart.png"]
        .iter()
        .map(|name| dir.path().join(name))
        .collect();
    assert_eq!(report.exported(), exported.as_slice());
    assert_eq!(report.failed(), &["swipe_up-banana_tap_tip-kiwi_chart".to_string()]);
    assert!(!report.is_success());

    assert_eq!(doc.snapshot(doc.root()), before);
}

#[test]
fn test_each_export_sees_only_its_mapping() {
    let dir = tempfile::tempdir().unwrap();
    let runner = runner(dir.path(), None);
    let mut doc = Document::parse(DRAWING).unwrap();

    let mappings = [mapping(&["swipe_up-banana"]), mapping(&["tap_tip-kiwi"])];
    let report = runner.run(&mut doc, "chart", &mappings).unwrap();

    let first = fs::read_to_string(&report.exported()[0]).unwrap();
    let second = fs::read_to_string(&report.exported()[1]).unwrap();
    assert!(first.contains("banana") && !first.contains("kiwi"));
    assert!(second.contains("kiwi") && !second.contains("banana"));
}

#[test]
fn test_missing_icon_aborts_and_restores() {
    let dir = tempfile::tempdir().unwrap();
    let runner = runner(dir.path(), None);
    let mut doc = Document::parse(DRAWING).unwrap();
    let before = doc.snapshot(doc.root());

    let result = runner.run(&mut doc, "chart", &[mapping(&["swipe_up-plum"])]);

    assert!(result.is_err());
    assert_eq!(doc.snapshot(doc.root()), before);
}

#[test]
fn test_run_file_uses_file_stem() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("hand-chart.svg");
    fs::write(&input, DRAWING).unwrap();
    let output_dir = dir.path().join("exports");
    let runner = runner(&output_dir, None);

    let report = runner
        .run_file(&input, &[mapping(&["tap_tip-kiwi"])])
        .unwrap();

    assert_eq!(
        report.exported(),
        &[output_dir.join("tap_tip-kiwi_hand-chart.png")]
    );
}

#[test]
fn test_run_file_reports_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("broken.svg");
    fs::write(&input, "<svg><g></svg>").unwrap();

    let result = runner(dir.path(), None).run_file(&input, &default_mappings());
    assert!(matches!(result, Err(mgrep::MgrepError::Parse { .. })));
}

#[test]
fn test_mapping_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("configuration/mappings.csv");

    let mappings = vec![
        mapping(&["tap_tip-banana", "swipe_up-kiwi"]),
        mapping(&["flex_down-watermelon"]),
    ];
    write_mappings(&path, &mappings).unwrap();

    let content = fs::read_to_string(&path).unwrap();
    assert_eq!(
        content,
        "tap_tip-banana,swipe_up-kiwi\nflex_down-watermelon\n"
    );
    assert_eq!(load_mappings(Some(&path)).unwrap(), mappings);
}

#[test]
fn test_export_matches_applied_drawing() {
    let dir = tempfile::tempdir().unwrap();
    let library = || {
        IconLibrary::from_documents(
            Document::parse(LABELLED_TEMPLATE).unwrap(),
            [(
                Command::KIWI,
                icon(r#"<circle mgrep-command="icon-centroid" cx="4" cy="4" r="4"/>"#),
            )],
        )
        .unwrap()
    };
    let swipe_up = mapping(&["swipe_up-kiwi"]);

    // The drawing as it should look while the mapping is applied
    let mut expected = Document::parse(LABELLED_DRAWING).unwrap();
    let graph = LayerGraph::build(&expected).unwrap();
    let log = apply_mapping(&mut expected, &swipe_up, graph.index(), &library()).unwrap();
    let applied = expected.snapshot(expected.root());
    reset_mapping(&mut expected, &log);

    let mut config = ExportConfig::default();
    config.set_output_dir(dir.path());
    let exporter = Exporter::new(&config).with_renderer(CopyRenderer { fail_on: None });
    let runner = MappingRunner::new(library(), exporter);

    let mut doc = Document::parse(LABELLED_DRAWING).unwrap();
    let report = runner.run(&mut doc, "chart", &[swipe_up]).unwrap();

    let exported = Document::parse(&fs::read_to_string(&report.exported()[0]).unwrap()).unwrap();
    assert_eq!(exported.snapshot(exported.root()), applied);
    assert_eq!(exported.text_content(exported.root()), "kiwi kiwiSwipe up");
}
