use kbase_core::{Entry, EntryListQuery, EntryPatch, KbConfig, KnowledgeBase, SortField, SortOrder};
use std::thread::sleep;
use std::time::Duration;
use tempfile::TempDir;

fn open_kb(dir: &TempDir) -> KnowledgeBase {
    KnowledgeBase::open(KbConfig::new(dir.path().join("query_kb.json"))).unwrap()
}

fn titles<'a>(entries: &[&'a Entry]) -> Vec<&'a str> {
    entries.iter().map(|entry| entry.title.as_str()).collect()
}

#[test]
fn list_all_sorts_by_created_at_both_directions() {
    let dir = tempfile::tempdir().unwrap();
    let mut kb = open_kb(&dir);
    for title in ["第一個", "第二個", "第三個"] {
        kb.create(title, "內容", ["tag"]).unwrap();
        sleep(Duration::from_millis(5));
    }

    let desc = kb.list_all(&EntryListQuery::default());
    assert_eq!(titles(&desc), ["第三個", "第二個", "第一個"]);

    let asc = kb.list_all(&EntryListQuery {
        sort_by: Some(SortField::CreatedAt),
        order: SortOrder::Asc,
    });
    assert_eq!(titles(&asc), ["第一個", "第二個", "第三個"]);
}

#[test]
fn list_all_by_updated_at_reflects_latest_edit() {
    let dir = tempfile::tempdir().unwrap();
    let mut kb = open_kb(&dir);
    let first = kb.create("a", "x", ["t"]).unwrap();
    kb.create("b", "x", ["t"]).unwrap();
    sleep(Duration::from_millis(5));
    kb.update(&first, EntryPatch::default().with_content("edited"))
        .unwrap();

    let listed = kb.list_all(&EntryListQuery {
        sort_by: Some(SortField::UpdatedAt),
        order: SortOrder::Desc,
    });
    assert_eq!(titles(&listed), ["a", "b"]);
}

#[test]
fn list_all_by_title_and_unknown_field() {
    let dir = tempfile::tempdir().unwrap();
    let mut kb = open_kb(&dir);
    for title in ["beta", "alpha", "gamma"] {
        kb.create(title, "x", ["t"]).unwrap();
    }

    let by_title = kb.list_all(&EntryListQuery {
        sort_by: Some(SortField::Title),
        order: SortOrder::Asc,
    });
    assert_eq!(titles(&by_title), ["alpha", "beta", "gamma"]);

    let natural = kb.list_all(&EntryListQuery::from_names("nope", SortOrder::Asc));
    assert_eq!(titles(&natural), ["beta", "alpha", "gamma"]);
}

#[test]
fn search_matches_title_or_content_in_insertion_order() {
    let dir = tempfile::tempdir().unwrap();
    let mut kb = open_kb(&dir);
    kb.create("Python 教學", "這是關於 Python 的教學", ["Python"])
        .unwrap();
    kb.create("JavaScript 教學", "這是關於 JavaScript 的教學", ["JS"])
        .unwrap();
    kb.create("進階技巧", "Python 進階技巧", ["Python"]).unwrap();

    let hits = kb.search("Python");
    assert_eq!(titles(&hits), ["Python 教學", "進階技巧"]);
}

#[test]
fn search_is_case_insensitive() {
    let dir = tempfile::tempdir().unwrap();
    let mut kb = open_kb(&dir);
    kb.create("Python 教學", "內容", ["x"]).unwrap();

    for keyword in ["python", "PYTHON", "Python"] {
        assert_eq!(kb.search(keyword).len(), 1, "keyword {keyword}");
    }
    assert!(kb.search("rust").is_empty());
}

#[test]
fn empty_keyword_matches_every_entry() {
    let dir = tempfile::tempdir().unwrap();
    let mut kb = open_kb(&dir);
    kb.create("anything", "at all", ["x"]).unwrap();
    kb.create("spaced   out", "body", ["x"]).unwrap();

    assert_eq!(titles(&kb.search("")), ["anything", "spaced   out"]);
    assert_eq!(titles(&kb.search("   ")), ["spaced   out"]);
}

#[test]
fn equal_titles_keep_insertion_order_when_sorted_desc() {
    let dir = tempfile::tempdir().unwrap();
    let mut kb = open_kb(&dir);
    let first = kb.create("same", "first body", ["t"]).unwrap();
    let second = kb.create("same", "second body", ["t"]).unwrap();

    let listed = kb.list_all(&EntryListQuery {
        sort_by: Some(SortField::Title),
        order: SortOrder::Desc,
    });
    let ids: Vec<&str> = listed.iter().map(|entry| entry.id.as_str()).collect();
    assert_eq!(ids, [first.as_str(), second.as_str()]);
}

#[test]
fn filter_by_tags_uses_or_semantics() {
    let dir = tempfile::tempdir().unwrap();
    let mut kb = open_kb(&dir);
    kb.create("條目1", "內容", ["Python", "教學"]).unwrap();
    kb.create("條目2", "內容", ["JavaScript", "教學"]).unwrap();
    kb.create("條目3", "內容", ["Python", "進階"]).unwrap();

    let python = kb.filter_by_tags(["Python"]);
    assert_eq!(titles(&python), ["條目1", "條目3"]);
    assert!(python.iter().all(|e| e.tags.contains(&"python".to_string())));

    let either = kb.filter_by_tags(["Python", "JAVASCRIPT"]);
    assert_eq!(either.len(), 3);

    assert!(kb.filter_by_tags(["rust"]).is_empty());
    assert!(kb.filter_by_tags(Vec::<String>::new()).is_empty());
}

#[test]
fn list_tags_collects_distinct_sorted_tags() {
    let dir = tempfile::tempdir().unwrap();
    let mut kb = open_kb(&dir);
    kb.create("a", "x", ["Work", "rust"]).unwrap();
    kb.create("b", "x", ["work", "Home"]).unwrap();

    assert_eq!(kb.list_tags(), ["home", "rust", "work"]);
}

#[test]
fn complete_workflow() {
    let dir = tempfile::tempdir().unwrap();
    let mut kb = open_kb(&dir);

    let sdd = kb.create("SDD", "規格驅動開發", ["SDD", "方法論"]).unwrap();
    kb.create("TDD", "測試驅動開發", ["TDD", "方法論"]).unwrap();
    let tools = kb.create("AI 工具", "Cursor, Windsurf", ["AI", "工具"]).unwrap();

    assert_eq!(kb.search("開發").len(), 2);
    assert_eq!(kb.filter_by_tags(["方法論"]).len(), 2);

    assert!(kb
        .update(&sdd, EntryPatch::default().with_content("規格驅動開發是一種方法論"))
        .unwrap());
    assert!(kb.delete(&tools).unwrap());
    assert_eq!(kb.list_all(&EntryListQuery::default()).len(), 2);

    let export_path = kb.export("json").unwrap();
    assert!(export_path.exists());
}
