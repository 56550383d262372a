//! Rule-based abstract extraction over the paper store
//!
//! Scans the selected records in store order, pulls each paper's raw text
//! from a `TextSource`, and writes the located abstract back with `Rule`
//! provenance. A paper without text or without markers is counted and
//! skipped; only a failing checkpoint stops the batch.

use std::time::Instant;

use super::pdf_extractor::{PaperText, TextSource};
use super::span_locator::locate_abstract;
use super::ExtractionStats;
use crate::db::{AbstractSource, Checkpoint, PaperRecord, PaperStore, StoreError};

/// Which papers to scan and how often to persist
#[derive(Debug, Clone)]
pub struct RuleBasedOptions {
    pub min_year: i32,
    pub max_year: i32,
    /// Exact venue names to include (None = all venues)
    pub venues: Option<Vec<String>>,
    /// Replace abstracts that already exist
    pub overwrite: bool,
    /// Persist every N iterated papers (0 = only at the end)
    pub checkpoint_interval: usize,
}

impl Default for RuleBasedOptions {
    fn default() -> Self {
        Self {
            min_year: 1965,
            max_year: 2020,
            venues: None,
            overwrite: false,
            checkpoint_interval: 1000,
        }
    }
}

impl RuleBasedOptions {
    pub fn selects(&self, paper: &PaperRecord) -> bool {
        if paper.year < self.min_year || paper.year > self.max_year {
            return false;
        }
        match &self.venues {
            Some(venues) => venues.iter().any(|v| v == &paper.venue),
            None => true,
        }
    }
}

/// Extract abstracts for every selected paper
pub fn extract_abstracts_rulebased(
    store: &mut PaperStore,
    source: &impl TextSource,
    options: &RuleBasedOptions,
    checkpoint: &mut impl Checkpoint,
) -> Result<ExtractionStats, StoreError> {
    let started = Instant::now();
    let mut stats = ExtractionStats::default();

    let selected = store.positions_where(|p| options.selects(p));
    tracing::info!(
        "[RuleBased] {} papers between {} and {} selected",
        selected.len(), options.min_year, options.max_year
    );

    for idx in selected {
        stats.iterated += 1;
        let Some(paper) = store.record(idx) else {
            continue;
        };

        if !options.overwrite && paper.has_abstract() {
            stats.skipped += 1;
        } else {
            match source.fetch_text(paper) {
                PaperText::NoFile => stats.no_file += 1,
                PaperText::Unavailable => {
                    stats.searched += 1;
                    stats.unavailable += 1;
                }
                PaperText::Text(text) => {
                    stats.searched += 1;
                    match locate_abstract(&text) {
                        Ok(span) => {
                            store.set_abstract_at(idx, span.text.to_string(), AbstractSource::Rule);
                            stats.extracted += 1;
                        }
                        Err(e) => {
                            stats.unresolved += 1;
                            if let Some(paper) = store.record(idx) {
                                tracing::debug!("[RuleBased] {}: {}", paper.id, e);
                            }
                        }
                    }
                }
            }
        }

        if options.checkpoint_interval > 0 && stats.iterated % options.checkpoint_interval == 0 {
            let written = checkpoint.checkpoint(store)?;
            tracing::info!("[RuleBased] Checkpoint at {} papers ({} rows written)", stats.iterated, written);
        }
    }

    let written = checkpoint.checkpoint(store)?;
    stats.elapsed_secs = started.elapsed().as_secs_f64();
    tracing::info!(
        "[RuleBased] Done: {} extracted, {} unresolved, {} rows written in final save",
        stats.extracted, stats.unresolved, written
    );

    Ok(stats)
}
