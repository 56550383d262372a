//! In-memory paper table
//!
//! Owns one addressable record per identifier. Extraction and merge passes
//! write the abstract fields through this store; the set of records touched
//! since the last save is tracked so checkpoints only persist what changed.

use rustc_hash::FxHashMap;
use std::collections::BTreeSet;

use super::models::{AbstractSource, PaperAbstract, PaperRecord};

#[derive(Debug, Default, Clone)]
pub struct PaperStore {
    papers: Vec<PaperRecord>,
    index: FxHashMap<String, usize>,
    dirty: BTreeSet<usize>,
}

impl PaperStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from loaded rows. A repeated id replaces the earlier row.
    pub fn from_records(records: impl IntoIterator<Item = PaperRecord>) -> Self {
        let mut store = Self::new();
        for record in records {
            store.insert(record);
        }
        store.dirty.clear();
        store
    }

    /// Insert or replace a record, returning the previous one for that id
    pub fn insert(&mut self, record: PaperRecord) -> Option<PaperRecord> {
        match self.index.get(&record.id) {
            Some(&idx) => {
                self.dirty.insert(idx);
                Some(std::mem::replace(&mut self.papers[idx], record))
            }
            None => {
                let idx = self.papers.len();
                self.index.insert(record.id.clone(), idx);
                self.papers.push(record);
                self.dirty.insert(idx);
                None
            }
        }
    }

    pub fn len(&self) -> usize {
        self.papers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.papers.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&PaperRecord> {
        self.index.get(id).map(|&idx| &self.papers[idx])
    }

    /// Record at a position, in insertion order
    pub fn record(&self, idx: usize) -> Option<&PaperRecord> {
        self.papers.get(idx)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PaperRecord> {
        self.papers.iter()
    }

    /// Positions of the records accepted by `filter`, in insertion order
    pub fn positions_where(&self, filter: impl Fn(&PaperRecord) -> bool) -> Vec<usize> {
        self.papers
            .iter()
            .enumerate()
            .filter(|(_, p)| filter(p))
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Write abstract + provenance for the record at `idx`.
    ///
    /// Passing `AbstractSource::None` clears the abstract so the provenance
    /// invariant holds.
    pub fn set_abstract_at(&mut self, idx: usize, text: String, source: AbstractSource) -> bool {
        let Some(paper) = self.papers.get_mut(idx) else {
            return false;
        };
        paper.abstract_text = match source {
            AbstractSource::None => None,
            _ => Some(PaperAbstract { text, source }),
        };
        self.dirty.insert(idx);
        true
    }

    /// Write abstract + provenance by identifier. Unknown ids are left alone.
    pub fn set_abstract(&mut self, id: &str, text: String, source: AbstractSource) -> bool {
        match self.index.get(id) {
            Some(&idx) => self.set_abstract_at(idx, text, source),
            None => false,
        }
    }

    pub fn dirty_count(&self) -> usize {
        self.dirty.len()
    }

    /// Records changed since the last save, leaving the change set intact
    pub fn dirty_records(&self) -> Vec<PaperRecord> {
        self.dirty.iter().map(|&idx| self.papers[idx].clone()).collect()
    }

    /// Forget pending changes once they are persisted
    pub fn clear_dirty(&mut self) {
        self.dirty.clear();
    }
}
