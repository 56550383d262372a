//! Merge of authoritative anthology abstracts into the paper store
//!
//! The anthology feed is ground truth: a feed abstract always replaces the
//! stored one, rule-derived or not, and is tagged `Anthology`. Feed ids the
//! store does not know are counted and left out; the merge never creates
//! records.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::db::{AbstractSource, PaperStore};

/// One (id, abstract) pair from the structured feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnthologyEntry {
    pub id: String,
    #[serde(rename = "abstract", default)]
    pub abstract_text: Option<String>,
}

impl AnthologyEntry {
    pub fn new(id: impl Into<String>, abstract_text: impl Into<String>) -> Self {
        Self { id: id.into(), abstract_text: Some(abstract_text.into()) }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("failed to read feed {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid feed JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Merge outcome counters
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeResult {
    /// Abstracts added or overwritten
    pub applied: usize,
    /// Feed ids with no record in the store
    pub unknown_ids: usize,
    /// Feed entries with a null, absent or empty abstract
    pub empty_skipped: usize,
}

impl MergeResult {
    pub fn print_summary(&self) {
        println!("\nAnthology merge:");
        println!("  {:20} {}", "Added/overwritten:", self.applied);
        println!("  {:20} {}", "Unknown ids:", self.unknown_ids);
        println!("  {:20} {}", "Without abstract:", self.empty_skipped);
    }
}

/// Apply feed abstracts with last-write-wins semantics
pub fn merge_anthology_abstracts<I>(store: &mut PaperStore, feed: I) -> MergeResult
where
    I: IntoIterator<Item = AnthologyEntry>,
{
    let mut result = MergeResult::default();

    for entry in feed {
        let Some(text) = entry.abstract_text.filter(|t| !t.is_empty()) else {
            result.empty_skipped += 1;
            continue;
        };
        if store.set_abstract(&entry.id, text, AbstractSource::Anthology) {
            result.applied += 1;
        } else {
            result.unknown_ids += 1;
            tracing::warn!("[Anthology] {} not in dataset, abstract not stored", entry.id);
        }
    }

    tracing::info!("[Anthology] {} abstracts added/overwritten, {} unknown ids", result.applied, result.unknown_ids);
    result
}

/// Parse a feed: either a JSON array of entries or JSON Lines.
///
/// In JSON Lines mode a malformed line is logged and skipped.
pub fn parse_feed(content: &str) -> Result<Vec<AnthologyEntry>, FeedError> {
    if content.trim_start().starts_with('[') {
        return Ok(serde_json::from_str(content)?);
    }

    let mut entries = Vec::new();
    for (line_no, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<AnthologyEntry>(line) {
            Ok(entry) => entries.push(entry),
            Err(e) => tracing::warn!("[Anthology] Skipping feed line {}: {}", line_no + 1, e),
        }
    }
    Ok(entries)
}

pub fn load_feed(path: &Path) -> Result<Vec<AnthologyEntry>, FeedError> {
    let content = fs::read_to_string(path).map_err(|source| FeedError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_feed(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::PaperRecord;

    fn store() -> PaperStore {
        PaperStore::from_records(vec![
            PaperRecord::new("P19-1001", 2019, "ACL", "u1"),
            PaperRecord::new("P19-1002", 2019, "ACL", "u2"),
        ])
    }

    #[test]
    fn test_feed_overwrites_rule_abstract() {
        let mut store = store();
        store.set_abstract("P19-1001", "A".to_string(), AbstractSource::Rule);

        let result = merge_anthology_abstracts(&mut store, vec![AnthologyEntry::new("P19-1001", "B")]);
        assert_eq!(result.applied, 1);

        let paper = store.get("P19-1001").unwrap();
        assert_eq!(paper.abstract_str(), Some("B"));
        assert_eq!(paper.abstract_source(), AbstractSource::Anthology);
    }

    #[test]
    fn test_unknown_ids_are_not_created() {
        let mut store = store();
        let result = merge_anthology_abstracts(&mut store, vec![AnthologyEntry::new("L20-9999", "text")]);
        assert_eq!(result, MergeResult { applied: 0, unknown_ids: 1, empty_skipped: 0 });
        assert_eq!(store.len(), 2);
        assert!(!store.contains("L20-9999"));
    }

    #[test]
    fn test_last_write_wins_and_empty_skipped() {
        let mut store = store();
        let feed = vec![
            AnthologyEntry::new("P19-1002", "first"),
            AnthologyEntry { id: "P19-1001".to_string(), abstract_text: None },
            AnthologyEntry::new("P19-1002", "second"),
        ];
        let result = merge_anthology_abstracts(&mut store, feed);
        assert_eq!(result.applied, 2);
        assert_eq!(result.empty_skipped, 1);
        assert_eq!(store.get("P19-1002").unwrap().abstract_str(), Some("second"));
        assert!(!store.get("P19-1001").unwrap().has_abstract());
    }

    #[test]
    fn test_empty_abstract_is_skipped() {
        let mut store = store();
        store.set_abstract("P19-1001", "rule text".to_string(), AbstractSource::Rule);

        let result = merge_anthology_abstracts(&mut store, vec![AnthologyEntry::new("P19-1001", "")]);
        assert_eq!(result, MergeResult { applied: 0, unknown_ids: 0, empty_skipped: 1 });
        let paper = store.get("P19-1001").unwrap();
        assert_eq!(paper.abstract_str(), Some("rule text"));
        assert_eq!(paper.abstract_source(), AbstractSource::Rule);
    }

    #[test]
    fn test_parse_json_array() {
        let entries = parse_feed(r#"[{"id": "a", "abstract": "x"}, {"id": "b", "abstract": null}]"#).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0], AnthologyEntry::new("a", "x"));
        assert_eq!(entries[1].abstract_text, None);
    }

    #[test]
    fn test_parse_json_lines_skips_bad_lines() {
        let content = "{\"id\": \"a\", \"abstract\": \"x\"}\n\nnot json\n{\"id\": \"b\"}\n";
        let entries = parse_feed(content).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].id, "b");
        assert_eq!(entries[1].abstract_text, None);
    }

    #[test]
    fn test_bad_array_is_error() {
        assert!(matches!(parse_feed("[{\"id\": 1}]"), Err(FeedError::Json(_))));
    }

    #[test]
    fn test_load_missing_feed() {
        let err = load_feed(Path::new("/nonexistent/feed.json")).unwrap_err();
        assert!(matches!(err, FeedError::Read { .. }));
    }
}
