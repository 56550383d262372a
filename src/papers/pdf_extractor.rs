//! Raw text sources for papers
//!
//! The batch extractor only needs "give me the text of this paper". Text
//! either comes from the record itself (filled in by ingestion) or from a
//! downloaded PDF laid out as `{papers_dir}/{year}/{venue}/{paper_id}.pdf`.

use std::path::{Path, PathBuf};

use crate::db::PaperRecord;
use crate::utils::{clean_paper_id, clean_venue_name};

/// Outcome of asking a source for a paper's text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaperText {
    /// No source document exists for this paper
    NoFile,
    /// The document exists but produced no usable text
    Unavailable,
    Text(String),
}

impl PaperText {
    fn from_extracted(text: Option<String>) -> Self {
        match text {
            Some(t) if !t.trim().is_empty() => PaperText::Text(t),
            _ => PaperText::Unavailable,
        }
    }
}

pub trait TextSource {
    fn fetch_text(&self, paper: &PaperRecord) -> PaperText;
}

/// Uses the `raw_text` already stored on the record
#[derive(Debug, Clone, Copy, Default)]
pub struct StoredText;

impl TextSource for StoredText {
    fn fetch_text(&self, paper: &PaperRecord) -> PaperText {
        PaperText::from_extracted(paper.raw_text.clone())
    }
}

/// Reads downloaded PDFs from a directory tree
#[derive(Debug, Clone)]
pub struct PdfDirectory {
    root: PathBuf,
}

impl PdfDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where the PDF for `paper` is expected to live
    pub fn paper_path(&self, paper: &PaperRecord) -> PathBuf {
        self.root
            .join(paper.year.to_string())
            .join(clean_venue_name(&paper.venue))
            .join(format!("{}.pdf", clean_paper_id(&paper.id)))
    }
}

impl TextSource for PdfDirectory {
    fn fetch_text(&self, paper: &PaperRecord) -> PaperText {
        let path = self.paper_path(paper);
        if !path.is_file() {
            return PaperText::NoFile;
        }
        match extract_text_from_pdf(&path) {
            Ok(text) => PaperText::from_extracted(Some(text)),
            Err(e) => {
                tracing::warn!("[PDF] {}: {}", path.display(), e);
                PaperText::Unavailable
            }
        }
    }
}

/// Extract full text from a PDF file
///
/// Returns error for encrypted, scanned or corrupted PDFs. pdf-extract can
/// panic on malformed input, so the panic is turned into an error as well.
pub fn extract_text_from_pdf(path: &Path) -> Result<String, String> {
    let owned = path.to_path_buf();
    match std::panic::catch_unwind(move || pdf_extract::extract_text(&owned)) {
        Ok(result) => result.map_err(|e| format!("PDF text extraction failed: {}", e)),
        Err(_) => Err("PDF text extraction panicked".to_string()),
    }
}
