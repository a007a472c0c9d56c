//! Note-log export through the full pipeline: tracked host operations in,
//! valid JSON out, ignore list applied.

use std::cell::RefCell;
use std::fs::File;
use std::io::BufWriter;
use std::rc::Rc;

use scenehud::export::LogExporter;
use scenehud::host::SceneHost;
use scenehud::tracking::normalizer::ignore_set;
use scenehud::tracking::{install_lifecycle_taps, Tracker};
use scenehud_common::NoteKind;

#[test]
fn test_export_creates_valid_json() {
    let mut host = SceneHost::new();
    let tracker = Rc::new(RefCell::new(Tracker::new(16)));
    tracker.borrow_mut().set_exporter(LogExporter::new(ignore_set(&[])));
    install_lifecycle_taps(&host.table(), &tracker).expect("install taps");

    let nav = host.spawn("Nav");
    host.present(&nav);
    let child = host.spawn("Child");
    host.push(&nav, &child);
    drop(host.pop(&nav));
    // Ignored by default: must not reach the export
    tracker.borrow_mut().platform_signal(NoteKind::OrientationChanged);
    tracker.borrow_mut().platform_signal(NoteKind::MuteSwitchChanged);

    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("log.json");
    let stats = tracker.borrow().stats();
    let exporter = tracker.borrow_mut().take_exporter().expect("exporter was attached");
    let file = File::create(&path).expect("create export file");
    exporter.export(BufWriter::new(file), &stats).expect("Failed to export note log");

    // Verify the output is valid JSON with the expected structure
    let content = std::fs::read_to_string(&path).expect("read export");
    let parsed: serde_json::Value = serde_json::from_str(&content).expect("Invalid JSON");

    assert!(parsed.get("version").is_some());
    assert!(parsed.get("summary").is_some());
    let notes = parsed["notes"].as_array().expect("notes array");
    assert_eq!(parsed["note_count"].as_u64().unwrap() as usize, notes.len());

    let kinds: Vec<&str> = notes.iter().map(|n| n["kind"].as_str().unwrap()).collect();
    assert!(kinds.contains(&"DidPresent"));
    assert!(kinds.contains(&"DidDismiss"));
    assert!(kinds.contains(&"MuteSwitchChanged"));
    assert!(!kinds.contains(&"OrientationChanged"), "ignored kinds stay out of the export");
}
