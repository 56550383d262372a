//! Token lemmatization
//!
//! `MorphyLemmatizer` follows WordNet's morphy for nouns: exception forms and
//! suffix-detachment candidates are kept only if the lexicon knows them, and
//! the shortest surviving form wins. Tokens with no known form pass through.

use rustc_hash::FxHashMap;
use std::sync::Arc;

use super::vocabulary::WordLookup;

/// Base-form capability
pub trait Lemmatizer {
    fn lemmatize(&self, token: &str) -> String;
}

/// Leaves every token untouched
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityLemmatizer;

impl Lemmatizer for IdentityLemmatizer {
    fn lemmatize(&self, token: &str) -> String {
        token.to_string()
    }
}

/// Noun suffix detachment rules, in WordNet order
const NOUN_RULES: &[(&str, &str)] = &[
    ("s", ""),
    ("ses", "s"),
    ("ves", "f"),
    ("xes", "x"),
    ("zes", "z"),
    ("ches", "ch"),
    ("shes", "sh"),
    ("men", "man"),
    ("ies", "y"),
];

/// Irregular plurals common in paper text
const NOUN_EXCEPTIONS: &[(&str, &str)] = &[
    ("analyses", "analysis"),
    ("appendices", "appendix"),
    ("bases", "basis"),
    ("children", "child"),
    ("corpora", "corpus"),
    ("criteria", "criterion"),
    ("data", "datum"),
    ("feet", "foot"),
    ("hypotheses", "hypothesis"),
    ("indices", "index"),
    ("matrices", "matrix"),
    ("mice", "mouse"),
    ("people", "person"),
    ("phenomena", "phenomenon"),
    ("theses", "thesis"),
    ("vertices", "vertex"),
    ("women", "woman"),
];

pub struct MorphyLemmatizer<L: WordLookup> {
    lexicon: L,
    exceptions: FxHashMap<&'static str, &'static str>,
}

impl<L: WordLookup> MorphyLemmatizer<L> {
    pub fn new(lexicon: L) -> Self {
        Self {
            lexicon,
            exceptions: NOUN_EXCEPTIONS.iter().copied().collect(),
        }
    }

    /// Known base forms of `token`, without duplicates
    fn candidates(&self, token: &str) -> Vec<String> {
        let mut forms: Vec<String> = vec![token.to_string()];

        if let Some(base) = self.exceptions.get(token) {
            forms.push(base.to_string());
        } else {
            for (suffix, ending) in NOUN_RULES {
                if let Some(stem) = token.strip_suffix(suffix) {
                    forms.push(format!("{}{}", stem, ending));
                }
            }
        }

        let mut known: Vec<String> = Vec::new();
        for form in forms {
            if !form.is_empty() && self.lexicon.lookup(&form) && !known.contains(&form) {
                known.push(form);
            }
        }
        known
    }
}

impl<L: WordLookup> Lemmatizer for MorphyLemmatizer<L> {
    fn lemmatize(&self, token: &str) -> String {
        self.candidates(token)
            .into_iter()
            .min_by_key(|form| form.chars().count())
            .unwrap_or_else(|| token.to_string())
    }
}

impl<T: Lemmatizer + ?Sized> Lemmatizer for Arc<T> {
    fn lemmatize(&self, token: &str) -> String {
        (**self).lemmatize(token)
    }
}

impl<T: Lemmatizer + ?Sized> Lemmatizer for Box<T> {
    fn lemmatize(&self, token: &str) -> String {
        (**self).lemmatize(token)
    }
}
