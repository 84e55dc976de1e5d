use blogflow_pipeline::{Artifact, ArtifactStore, Envelope};
use serde_json::json;

fn store() -> (tempfile::TempDir, ArtifactStore) {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = ArtifactStore::new(dir.path().join("collections")).expect("store");
    (dir, store)
}

#[test]
fn persisting_twice_creates_two_files_differing_in_timestamp() {
    let (_dir, store) = store();
    let value = json!({"tasks": [{"search_query": "q"}]});

    let first = Envelope::with_timestamp("20250805_120000_000", "inv-1", "query_planner", "research_plan");
    let second = Envelope::with_timestamp("20250805_120000_500", "inv-1", "query_planner", "research_plan");

    let path_a = store.persist_structured(&first, &value).expect("persist");
    let path_b = store.persist_structured(&second, &value).expect("persist");
    assert_ne!(path_a, path_b);

    for path in [&path_a, &path_b] {
        let name = path.file_name().unwrap().to_str().unwrap();
        let loaded = store.load_structured(name).expect("reload");
        assert_eq!(loaded, value, "payload must round-trip ignoring envelope");
    }
}

#[test]
fn load_latest_structured_picks_newest_timestamp() {
    let (_dir, store) = store();
    let older = Envelope::with_timestamp("20250805_120000_000", "inv", "planner", "article_plan");
    let newer = Envelope::with_timestamp("20250805_120105_250", "inv", "planner", "article_plan");
    store
        .persist_structured(&older, &json!({"version": 1}))
        .unwrap();
    store
        .persist_structured(&newer, &json!({"version": 2}))
        .unwrap();

    let latest = store.load_latest_structured("article_plan").expect("latest");
    assert_eq!(latest, json!({"version": 2}));
}

#[test]
fn markdown_round_trip_strips_frontmatter() {
    let (_dir, store) = store();
    let envelope = Envelope::new("inv-2", "introduction_writer", "introduction_section");
    let body = "# Introduction\n\nWelcome to the article.";

    let path = store.persist_markdown(&envelope, body).expect("persist");
    assert!(path.ends_with("introduction_section.md"));

    let raw = std::fs::read_to_string(&path).unwrap();
    assert!(raw.starts_with("---\n"));
    assert!(raw.contains("agent_name: introduction_writer"));

    let loaded = store.load_markdown("introduction_section.md").expect("load");
    assert_eq!(loaded, body);
}

#[test]
fn markdown_keeps_fixed_name_and_is_overwritten() {
    let (_dir, store) = store();
    let first = Envelope::with_timestamp("20250805_120000_000", "inv", "w", "conclusion_section");
    let second = Envelope::with_timestamp("20250805_130000_000", "inv", "w", "conclusion_section");
    let path_a = store.persist_markdown(&first, "first draft").unwrap();
    let path_b = store.persist_markdown(&second, "second draft").unwrap();
    assert_eq!(path_a, path_b);
    assert_eq!(
        store.load_markdown("conclusion_section.md").unwrap(),
        "second draft"
    );
}

#[test]
fn missing_files_return_none_not_errors() {
    let (_dir, store) = store();
    assert!(store.load_structured("never_written.json").is_none());
    assert!(store.load_latest_structured("never_written").is_none());
    assert!(store.load_markdown("never_written.md").is_none());
}

#[test]
fn missing_markdown_degrades_to_recognizable_note() {
    let (_dir, store) = store();
    let note = store.markdown_or_note("data_analysis.md", "data hunter");
    assert!(note.contains("not found"), "note was: {note}");
    assert!(note.contains("data_analysis.md"));
    assert!(note.contains("data hunter"));
}

#[test]
fn corrupt_json_is_treated_as_missing() {
    let (_dir, store) = store();
    std::fs::write(store.root().join("broken_20250805.json"), "{not json").unwrap();
    assert!(store.load_structured("broken_20250805.json").is_none());
}

#[test]
fn persist_dispatches_on_artifact_kind() {
    let (_dir, store) = store();
    let envelope = Envelope::with_timestamp("20250805_120000_000", "inv", "s", "mixed_key");
    let json_path = store
        .persist(&envelope, &Artifact::Structured(json!({"ok": true})))
        .unwrap();
    assert_eq!(json_path.extension().unwrap(), "json");

    let md_path = store
        .persist(&envelope, &Artifact::Markdown("text".to_string()))
        .unwrap();
    assert_eq!(md_path.extension().unwrap(), "md");
}

#[test]
fn structured_or_note_renders_payload_or_placeholder() {
    let (_dir, store) = store();
    let note = store.structured_or_note("research_plan", "query planner");
    assert!(note.contains("not found"));

    let envelope = Envelope::with_timestamp("20250805_120000_000", "inv", "query_planner", "research_plan");
    store
        .persist_structured(&envelope, &json!({"tasks": []}))
        .unwrap();
    let rendered = store.structured_or_note("research_plan", "query planner");
    assert!(rendered.contains("\"tasks\""));
}
