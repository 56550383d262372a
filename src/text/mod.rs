//! Text normalization for extracted paper text
//!
//! Vocabulary-guided dehyphenation plus the lexical pipeline built on it
//! (tokenize, lemmatize, drop stopwords and numbers). All lexical resources
//! are constructed by the caller and passed in; nothing here reads global
//! state.

pub mod vocabulary;
pub mod dehyphenate;
pub mod lemmatize;
pub mod lexical;

pub use vocabulary::{Vocabulary, StopwordSet, WordLookup};
pub use dehyphenate::{dehyphenate, find_overlapping};
pub use lemmatize::{Lemmatizer, MorphyLemmatizer, IdentityLemmatizer};
pub use lexical::{LexicalPipeline, preprocess_text, tokenize, remove_stopwords, is_number};
