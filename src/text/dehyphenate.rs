//! Line-wrap dehyphenation
//!
//! PDF extraction leaves words broken across lines as `inter-\nnational`.
//! Each whitespace-bounded run containing a hyphen directly followed by a
//! line break is joined and checked against the vocabulary: known words lose
//! the hyphen, everything else keeps it and only loses the line break.

use regex::Regex;
use std::sync::LazyLock;

use super::vocabulary::WordLookup;

/// Whitespace, a non-space run holding `-\n`, whitespace
static LINE_WRAP_HYPHEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s+(\S*-\n\S*)\s+").unwrap()
});

/// All matches of `group` in `text`, including overlapping ones.
///
/// After each match the scan resumes one character past the match start
/// rather than past its end, so a span that begins inside the previous match
/// is still found.
pub fn find_overlapping<'t>(re: &Regex, text: &'t str, group: usize) -> Vec<&'t str> {
    let mut found: Vec<&'t str> = Vec::new();
    let mut pos = 0;

    while pos <= text.len() {
        let Some(caps) = re.captures_at(text, pos) else {
            break;
        };
        let Some(whole) = caps.get(0) else {
            break;
        };

        if let Some(m) = caps.get(group) {
            // Retrying inside a leading whitespace run re-finds the same span
            if found.last() != Some(&m.as_str()) {
                found.push(m.as_str());
            }
        }

        let step = text[whole.start()..].chars().next().map_or(1, char::len_utf8);
        pos = whole.start() + step;
    }

    found
}

/// Lowercase `input` and repair words split by a line-wrap hyphen.
///
/// Replacement works on the matched text itself, so every repeated
/// occurrence of a span resolves the same way.
pub fn dehyphenate(input: &str, vocabulary: &impl WordLookup) -> String {
    let lowered = input.to_lowercase();
    let mut output = lowered.clone();

    for span in find_overlapping(&LINE_WRAP_HYPHEN, &lowered, 1) {
        let joined = span.replace("-\n", "");
        let candidate = joined.trim_matches(|c: char| c.is_ascii_punctuation());

        // An empty candidate is never a word
        let replacement = if !candidate.is_empty() && vocabulary.lookup(candidate) {
            candidate.to_string()
        } else {
            span.replace("-\n", "-")
        };
        output = output.replace(span, &replacement);
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::vocabulary::Vocabulary;

    #[test]
    fn test_known_word_is_joined() {
        let vocab = Vocabulary::from_words(["international"]);
        let out = dehyphenate("Shaped by the inter-\nnational community today", &vocab);
        assert!(out.contains("international community"));
        assert!(!out.contains("-\n"));
    }

    #[test]
    fn test_unknown_word_keeps_hyphen() {
        let vocab = Vocabulary::empty();
        let out = dehyphenate("we must co-\nordinate the plan", &vocab);
        assert!(out.contains("co-ordinate"));
        assert!(!out.contains("coordinate"));
    }

    #[test]
    fn test_no_match_only_lowercases() {
        let vocab = Vocabulary::from_words(["state"]);
        assert_eq!(dehyphenate("State-of-the-art Models", &vocab), "state-of-the-art models");
    }

    #[test]
    fn test_punctuation_is_stripped_from_known_word() {
        let vocab = Vocabulary::from_words(["translation"]);
        let out = dehyphenate("machine trans-\nlation, and more", &vocab);
        assert_eq!(out, "machine translation and more");
    }

    #[test]
    fn test_punctuation_only_candidate_keeps_hyphen() {
        let vocab = Vocabulary::from_words([""]);
        let out = dehyphenate("a (-\n) b", &vocab);
        assert_eq!(out, "a (-) b");
    }

    #[test]
    fn test_repeated_span_resolves_identically() {
        let vocab = Vocabulary::from_words(["network"]);
        let out = dehyphenate("a net-\nwork and a net-\nwork again", &vocab);
        assert_eq!(out, "a network and a network again");
    }

    #[test]
    fn test_overlapping_spans_are_found() {
        let re = Regex::new(r"\s+(\S*-\n\S*)\s+").unwrap();
        let spans = find_overlapping(&re, "x a-\nb-\nc y", 1);
        assert_eq!(spans, vec!["a-\nb-", "b-\nc"]);
    }

    #[test]
    fn test_idempotent() {
        let vocab = Vocabulary::from_words(["international", "language"]);
        let text = "The inter-\nnational lan-\nguage co-\nordinate task\n";
        let once = dehyphenate(text, &vocab);
        assert_eq!(dehyphenate(&once, &vocab), once);
    }
}
