//! Export renderers.

use crate::model::entry::Entry;
use crate::model::entry_map::EntryMap;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::fmt::Write;

/// Top-level shape of a JSON export.
#[derive(Debug, Serialize)]
pub struct JsonExport<'a> {
    pub export_date: DateTime<Utc>,
    pub total_entries: usize,
    pub entries: Vec<&'a Entry>,
}

/// Renders the Markdown export document.
pub fn render_markdown(entries: &EntryMap, exported_at: DateTime<Utc>) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = writeln!(out, "# Knowledge Base Export\n");
    let _ = writeln!(
        out,
        "**Exported at:** {}",
        exported_at.format("%Y-%m-%d %H:%M:%S")
    );
    let _ = writeln!(out, "**Total entries:** {}\n", entries.len());
    out.push_str("---\n\n");

    for entry in entries {
        let _ = writeln!(out, "## {}\n", entry.title);
        let _ = writeln!(out, "**Tags:** {}", entry.tags.join(", "));
        let _ = writeln!(
            out,
            "**Created at:** {}",
            entry.created_at.to_rfc3339_opts(SecondsFormat::Secs, true)
        );
        let _ = writeln!(out, "**Word count:** {}\n", entry.metadata.word_count);
        let _ = writeln!(out, "{}\n", entry.content);
        out.push_str("---\n\n");
    }
    out
}

/// Renders the pretty-printed JSON export document.
pub fn render_json(
    entries: &EntryMap,
    exported_at: DateTime<Utc>,
) -> serde_json::Result<String> {
    let document = JsonExport {
        export_date: exported_at,
        total_entries: entries.len(),
        entries: entries.iter().collect(),
    };
    serde_json::to_string_pretty(&document)
}
