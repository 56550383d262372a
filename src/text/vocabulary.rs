//! Read-only word sets used as oracles by the text pipeline
//!
//! Both sets are built once per run by the caller and shared by reference
//! (or `Arc`) with every component that needs them.

use rustc_hash::FxHashSet;
use std::fs;
use std::path::Path;
use stop_words::{get, LANGUAGE};

/// Word-membership capability
pub trait WordLookup {
    fn lookup(&self, word: &str) -> bool;
}

/// Known-valid lowercase words
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    words: FxHashSet<String>,
}

impl Vocabulary {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        Self { words }
    }

    /// Load a word list with one entry per line
    pub fn from_file(path: &Path) -> Result<Self, String> {
        let content = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read vocabulary {}: {}", path.display(), e))?;
        let vocabulary = Self::from_words(content.lines());
        tracing::info!("[Vocabulary] Loaded {} words from {}", vocabulary.len(), path.display());
        Ok(vocabulary)
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl WordLookup for Vocabulary {
    fn lookup(&self, word: &str) -> bool {
        self.contains(word)
    }
}

impl<T: WordLookup + ?Sized> WordLookup for &T {
    fn lookup(&self, word: &str) -> bool {
        (**self).lookup(word)
    }
}

impl<T: WordLookup + ?Sized> WordLookup for std::sync::Arc<T> {
    fn lookup(&self, word: &str) -> bool {
        (**self).lookup(word)
    }
}

/// Stopwords plus single punctuation characters, used only to exclude tokens
#[derive(Debug, Clone, Default)]
pub struct StopwordSet {
    stopwords: FxHashSet<String>,
}

impl StopwordSet {
    /// English stopwords plus every ASCII punctuation character
    pub fn english() -> Self {
        let mut stopwords: FxHashSet<String> = get(LANGUAGE::English)
            .iter()
            .map(|s| s.to_string())
            .collect();
        stopwords.extend(
            (0u8..=127)
                .map(char::from)
                .filter(|c| c.is_ascii_punctuation())
                .map(String::from),
        );
        Self { stopwords }
    }

    /// Build from an explicit list, stored as given
    pub fn from_list<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { stopwords: words.into_iter().map(Into::into).collect() }
    }

    /// Extend while still under construction
    pub fn with_extra<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.stopwords.extend(words.into_iter().map(|w| w.as_ref().to_lowercase()));
        self
    }

    pub fn is_stopword(&self, token: &str) -> bool {
        self.stopwords.contains(token)
    }

    pub fn len(&self) -> usize {
        self.stopwords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stopwords.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_vocabulary_lowercases_and_skips_blanks() {
        let vocab = Vocabulary::from_words(["International", "  ", "word "]);
        assert_eq!(vocab.len(), 2);
        assert!(vocab.lookup("international"));
        assert!(vocab.lookup("word"));
        assert!(!vocab.lookup("International"));
    }

    #[test]
    fn test_vocabulary_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "alpha\nBeta\n\ngamma").unwrap();
        let vocab = Vocabulary::from_file(file.path()).unwrap();
        assert_eq!(vocab.len(), 3);
        assert!(vocab.contains("beta"));
    }

    #[test]
    fn test_vocabulary_missing_file() {
        let err = Vocabulary::from_file(Path::new("/nonexistent/words.txt")).unwrap_err();
        assert!(err.contains("Failed to read vocabulary"));
    }

    #[test]
    fn test_english_stopwords_include_punctuation() {
        let stops = StopwordSet::english();
        assert!(stops.is_stopword("the"));
        assert!(stops.is_stopword("."));
        assert!(stops.is_stopword("~"));
        assert!(!stops.is_stopword("dehyphenation"));
    }

    #[test]
    fn test_with_extra() {
        let stops = StopwordSet::from_list(["the"]).with_extra(["Et", "Al"]);
        assert!(stops.is_stopword("et"));
        assert!(stops.is_stopword("al"));
        assert_eq!(stops.len(), 3);
    }
}
