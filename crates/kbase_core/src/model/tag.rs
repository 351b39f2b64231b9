//! Tag normalization rules.
//!
//! # Invariants
//! - Normalized tags are trimmed and lowercase.
//! - Normalized tag sets contain no blanks and no duplicates, sorted ascending.

use std::collections::BTreeSet;

/// Normalizes one tag value.
///
/// Returns `None` for blank input.
pub fn normalize_tag(tag: &str) -> Option<String> {
    let trimmed = tag.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

/// Normalizes and deduplicates tag values.
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    tags.into_iter()
        .filter_map(|tag| normalize_tag(tag.as_ref()))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{normalize_tag, normalize_tags};

    #[test]
    fn case_variants_collapse_to_one_lowercase_tag() {
        assert_eq!(normalize_tags(["Python", "python", "PYTHON"]), vec!["python"]);
    }

    #[test]
    fn blank_tags_are_dropped_and_values_trimmed() {
        assert_eq!(normalize_tag("   "), None);
        assert_eq!(
            normalize_tags([" Rust ", "", "教學"]),
            vec!["rust".to_string(), "教學".to_string()]
        );
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(normalize_tags(Vec::<String>::new()).is_empty());
    }
}
