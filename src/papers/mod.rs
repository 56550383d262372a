//! Abstract recovery for scientific papers
//!
//! This module fills in the abstract of each paper record from two sources:
//! 1. Rule-based extraction from raw PDF text (marker heuristics)
//! 2. Authoritative anthology feed (always wins, overwrites rule results)

pub mod span_locator;
pub mod pdf_extractor;
pub mod rule_based;
pub mod anthology;

use serde::Serialize;

/// Counters for a rule-based extraction run
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionStats {
    /// Papers matching the year/venue selection
    pub iterated: usize,
    /// Papers whose source document was present and eligible
    pub searched: usize,
    /// Papers that already had an abstract (no overwrite)
    pub skipped: usize,
    /// Source present but text empty or unreadable
    pub unavailable: usize,
    /// Text present but start or end marker missing
    pub unresolved: usize,
    /// No source document for the paper
    pub no_file: usize,
    /// Abstracts written
    pub extracted: usize,
    pub elapsed_secs: f64,
}

impl ExtractionStats {
    pub fn print_summary(&self) {
        println!("\nRule-based abstract extraction:");
        println!("  {:12} {} papers matching year+venue", "Iterated:", self.iterated);
        println!("  {:12} {} abstracts searched", "Searched:", self.searched);
        println!("  {:12} {} already existed", "Skipped:", self.skipped);
        println!("  {:12} {} texts unavailable", "Empty:", self.unavailable);
        println!("  {:12} {} abstracts not found", "Unresolved:", self.unresolved);
        println!("  {:12} {} papers not downloaded", "No file:", self.no_file);

        if self.searched > 0 {
            println!("\nExtracted: {}/{} ({:.0}% success rate)",
                     self.extracted, self.searched,
                     (self.extracted as f64 / self.searched as f64) * 100.0);
        }

        let secs = self.elapsed_secs as u64;
        println!("This took {}m {:02}s.", secs / 60, secs % 60);
    }
}
