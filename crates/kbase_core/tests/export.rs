use chrono::{TimeZone, Utc};
use kbase_core::{ExportError, ExportFormat, KbConfig, KbError, KnowledgeBase};
use tempfile::TempDir;

fn open_kb(dir: &TempDir) -> KnowledgeBase {
    let config = KbConfig::new(dir.path().join("kb.json")).with_export_dir(dir.path().join("out"));
    KnowledgeBase::open(config).unwrap()
}

#[test]
fn markdown_export_contains_header_and_entries() {
    let dir = tempfile::tempdir().unwrap();
    let mut kb = open_kb(&dir);
    kb.create("測試條目", "測試內容", ["測試"]).unwrap();

    let path = kb.export("markdown").unwrap();

    assert!(path.starts_with(dir.path().join("out")));
    assert_eq!(path.extension().unwrap(), "md");
    let name = path.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("knowledge_base_"), "unexpected name {name}");
    let body = std::fs::read_to_string(&path).unwrap();
    assert!(body.contains("Knowledge Base Export"));
    assert!(body.contains("**Total entries:** 1"));
    assert!(body.contains("## 測試條目"));
    assert!(body.contains("測試內容"));
}

#[test]
fn json_export_counts_match_entries() {
    let dir = tempfile::tempdir().unwrap();
    let mut kb = open_kb(&dir);
    kb.create("one", "first", ["a"]).unwrap();
    kb.create("two", "second", ["b"]).unwrap();

    let path = kb.export("json").unwrap();

    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert!(value.get("export_date").is_some());
    assert_eq!(value["total_entries"], 2);
    let entries = value["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["title"], "one");
    assert_eq!(entries[1]["metadata"]["word_count"], 6);
}

#[test]
fn empty_store_exports_zero_entries() {
    let dir = tempfile::tempdir().unwrap();
    let kb = open_kb(&dir);

    let path = kb.export("json").unwrap();
    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(value["total_entries"], 0);
    assert_eq!(value["entries"], serde_json::json!([]));
}

#[test]
fn unsupported_formats_name_the_offending_value() {
    let dir = tempfile::tempdir().unwrap();
    let kb = open_kb(&dir);

    for format in ["pdf", "html"] {
        let err = kb.export(format).unwrap_err();
        assert!(
            matches!(&err, KbError::Export(ExportError::UnsupportedFormat(f)) if f == format),
            "unexpected error {err:?}"
        );
        assert!(err.to_string().contains(format));
    }
    assert!(!dir.path().join("out").exists());
}

#[test]
fn exports_in_the_same_second_never_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    let mut kb = open_kb(&dir);
    kb.create("t", "c", ["x"]).unwrap();
    let now = Utc.with_ymd_and_hms(2026, 10, 19, 9, 0, 0).unwrap();

    let first = kb.export_as(ExportFormat::Json, now).unwrap();
    let second = kb.export_as(ExportFormat::Json, now).unwrap();
    let third = kb.export_as(ExportFormat::Markdown, now).unwrap();

    let out = dir.path().join("out");
    assert_eq!(first, out.join("knowledge_base_20261019_090000.json"));
    assert_eq!(second, out.join("knowledge_base_20261019_090000_2.json"));
    assert_eq!(third, out.join("knowledge_base_20261019_090000.md"));
}
