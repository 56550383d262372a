//! Lexical pipeline: dehyphenate, tokenize, lemmatize, filter
//!
//! Output is a materialized token list in original order.

use regex::Regex;
use std::sync::{Arc, LazyLock};

use super::dehyphenate::dehyphenate;
use super::lemmatize::Lemmatizer;
use super::vocabulary::{StopwordSet, Vocabulary, WordLookup};

/// Numbers (ranges like `3-5` stay whole), hyphenated/apostrophe words,
/// ellipses, dashes, single symbols
static TOKEN_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[+-]?\d+(?:[.,]\d+)*(?:[eE][+-]?\d+)?(?:-\w+(?:[.,]\d+)*)*\b|\w+(?:[-'’]\w+)*|\.\.\.|--|[^\w\s]").unwrap()
});

/// Clitics split off the preceding word
const CLITICS: &[&str] = &["s", "re", "ve", "ll", "d", "m"];

fn split_contraction(word: &str) -> Vec<String> {
    for negation in ["n't", "n’t"] {
        if word.len() > negation.len() {
            let cut = word.len() - negation.len();
            if word.get(cut..).is_some_and(|s| s.eq_ignore_ascii_case(negation)) {
                return vec![word[..cut].to_string(), word[cut..].to_string()];
            }
        }
    }
    if let Some(pos) = word.rfind(['\'', '’']) {
        let tail = word[pos..].trim_start_matches(['\'', '’']).to_lowercase();
        if pos > 0 && CLITICS.contains(&tail.as_str()) {
            return vec![word[..pos].to_string(), word[pos..].to_string()];
        }
    }
    vec![word.to_string()]
}

/// Split text into word and punctuation tokens
pub fn tokenize(text: &str) -> Vec<String> {
    TOKEN_REGEX
        .find_iter(text)
        .flat_map(|m| split_contraction(m.as_str()))
        .collect()
}

/// True iff the whole token parses as a float (signed, decimal, or integer)
pub fn is_number(token: &str) -> bool {
    token.parse::<f64>().is_ok()
}

/// Drop stopwords, punctuation and numeric tokens, keeping order
pub fn remove_stopwords(tokens: Vec<String>, stopwords: &StopwordSet) -> Vec<String> {
    tokens
        .into_iter()
        .filter(|t| !stopwords.is_stopword(t) && !is_number(t))
        .collect()
}

/// Full normalization of one text
pub fn preprocess_text(
    text: &str,
    vocabulary: &impl WordLookup,
    lemmatizer: &impl Lemmatizer,
    stopwords: &StopwordSet,
) -> Vec<String> {
    let text = dehyphenate(text, vocabulary);
    let tokens = tokenize(&text)
        .iter()
        .map(|t| lemmatizer.lemmatize(t))
        .collect();
    remove_stopwords(tokens, stopwords)
}

/// Shared, read-only resources bundled for repeated use across a batch
pub struct LexicalPipeline {
    vocabulary: Arc<Vocabulary>,
    stopwords: Arc<StopwordSet>,
    lemmatizer: Box<dyn Lemmatizer + Send + Sync>,
}

impl LexicalPipeline {
    pub fn new(
        vocabulary: Arc<Vocabulary>,
        stopwords: Arc<StopwordSet>,
        lemmatizer: Box<dyn Lemmatizer + Send + Sync>,
    ) -> Self {
        Self { vocabulary, stopwords, lemmatizer }
    }

    pub fn preprocess(&self, text: &str) -> Vec<String> {
        preprocess_text(text, &self.vocabulary, &self.lemmatizer, &self.stopwords)
    }
}
