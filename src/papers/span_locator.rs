//! Abstract boundary recovery for raw extracted paper text
//!
//! The abstract starts right after the leftmost start marker. The end is
//! found by an ordered list of strategies, the first one that finds a marker
//! wins:
//! 1. Keyword / bilingual-title markers (leftmost occurrence wins)
//! 2. Introduction-style section headings (first listed marker that occurs wins)
//!
//! No marker, no abstract: a partial or guessed span is never returned.

use std::fmt;

/// Start markers, earlier entries win position ties
pub const START_MARKERS: &[&str] = &["Abstract", "ABSTRACT", "A b s t r a c t"];

/// First end tier, leftmost occurrence wins
pub const KEYWORD_END_MARKERS: &[&str] = &[
    "\n\nTITLE AND ABSTRACT IN ",
    "\n\nTitle and Abstract in ",
    "KEYWORDS:",
    "Keywords:",
];

/// Second end tier, list order wins over text position
pub const SECTION_END_MARKERS: &[&str] = &[
    "\n\n1 Introduction",
    "\n\n1. Introduction",
    "\n\n1 Task Description",
    "\n\n1. Task Description",
    "\n\nIntroduction\n\n",
    "\n\n1 ",
];

/// Where a marker was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerSpan {
    pub position: usize,
    pub marker: &'static str,
}

impl MarkerSpan {
    /// Byte offset just past the marker text
    pub fn end(&self) -> usize {
        self.position + self.marker.len()
    }
}

/// Which boundary of the abstract could not be located
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    Start,
    End,
}

impl fmt::Display for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Boundary::Start => write!(f, "start"),
            Boundary::End => write!(f, "end"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocateError {
    #[error("no abstract {0} marker found")]
    MarkerNotFound(Boundary),
}

/// A located abstract, borrowed from the searched text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbstractSpan<'t> {
    pub start: usize,
    pub end: usize,
    pub text: &'t str,
    pub start_marker: MarkerSpan,
    pub end_marker: MarkerSpan,
}

fn find_from(text: &str, marker: &str, from: usize) -> Option<usize> {
    text.get(from..)?.find(marker).map(|pos| pos + from)
}

/// Leftmost occurrence at or after `from` of any marker; ties go to the earlier marker
pub fn earliest_marker(text: &str, markers: &[&'static str], from: usize) -> Option<MarkerSpan> {
    let mut earliest: Option<MarkerSpan> = None;
    for &marker in markers {
        if let Some(position) = find_from(text, marker, from) {
            if earliest.map_or(true, |e| position < e.position) {
                earliest = Some(MarkerSpan { position, marker });
            }
        }
    }
    earliest
}

/// Occurrence of the first marker, in list order, found anywhere at or after `from`
pub fn first_listed_marker(text: &str, markers: &[&'static str], from: usize) -> Option<MarkerSpan> {
    markers.iter().find_map(|&marker| {
        find_from(text, marker, from).map(|position| MarkerSpan { position, marker })
    })
}

/// End-boundary strategy, searching from the abstract start
pub type EndStrategy = fn(&str, usize) -> Option<MarkerSpan>;

fn keyword_end(text: &str, from: usize) -> Option<MarkerSpan> {
    earliest_marker(text, KEYWORD_END_MARKERS, from)
}

fn section_end(text: &str, from: usize) -> Option<MarkerSpan> {
    first_listed_marker(text, SECTION_END_MARKERS, from)
}

/// End strategies in priority order
pub const END_STRATEGIES: &[(&str, EndStrategy)] = &[
    ("keywords", keyword_end),
    ("section", section_end),
];

pub fn find_abstract_start(text: &str) -> Option<MarkerSpan> {
    earliest_marker(text, START_MARKERS, 0)
}

pub fn find_abstract_end(text: &str, from: usize) -> Option<MarkerSpan> {
    END_STRATEGIES.iter().find_map(|(_, strategy)| strategy(text, from))
}

/// Locate the abstract between the start and end markers.
///
/// The returned text is the exact slice between the end of the start marker
/// and the beginning of the end marker, untrimmed.
pub fn locate_abstract(text: &str) -> Result<AbstractSpan<'_>, LocateError> {
    let start_marker = find_abstract_start(text).ok_or(LocateError::MarkerNotFound(Boundary::Start))?;
    let start = start_marker.end();
    let end_marker = find_abstract_end(text, start).ok_or(LocateError::MarkerNotFound(Boundary::End))?;
    let end = end_marker.position;

    Ok(AbstractSpan {
        start,
        end,
        text: &text[start..end],
        start_marker,
        end_marker,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords_end_marker() {
        let span = locate_abstract("Header ABSTRACT This paper studies X. KEYWORDS: nlp").unwrap();
        assert_eq!(span.text, " This paper studies X. ");
        assert_eq!(span.start_marker.marker, "ABSTRACT");
        assert_eq!(span.end_marker.marker, "KEYWORDS:");
    }

    #[test]
    fn test_leftmost_start_marker_wins() {
        let span = locate_abstract("ABSTRACT first. Abstract second. Keywords: x").unwrap();
        assert_eq!(span.start_marker.position, 0);
        assert_eq!(span.text, " first. Abstract second. ");
    }

    #[test]
    fn test_start_tie_goes_to_earlier_listed_marker() {
        let markers: &[&'static str] = &["Abs", "Abstract"];
        let span = earliest_marker("Abstract text", markers, 0).unwrap();
        assert_eq!(span.marker, "Abs");
        assert_eq!(span.position, 0);
    }

    #[test]
    fn test_spaced_start_marker() {
        let span = locate_abstract("Title\nA b s t r a c t\nWe parse.\n\n1 Introduction\nText").unwrap();
        assert_eq!(span.text, "\nWe parse.");
    }

    #[test]
    fn test_keyword_tier_is_leftmost() {
        let text = "Abstract body Keywords: a\n\nTITLE AND ABSTRACT IN FRENCH x KEYWORDS: b";
        let span = locate_abstract(text).unwrap();
        assert_eq!(span.end_marker.marker, "Keywords:");
        assert_eq!(span.text, " body ");
    }

    #[test]
    fn test_introduction_fallback() {
        let text = "Abstract\nWe present a parser.\n\n1 Introduction\nParsing is hard.";
        let span = locate_abstract(text).unwrap();
        assert_eq!(span.end, text.find("\n\n1 Introduction").unwrap());
        assert_eq!(span.text, "\nWe present a parser.");
    }

    #[test]
    fn test_section_tier_is_first_listed_not_leftmost() {
        // "\n\n1 " occurs earlier but is listed after "\n\n1. Introduction"
        let text = "Abstract\nBody.\n\n1 Background\n\n1. Introduction\nMore";
        let span = locate_abstract(text).unwrap();
        assert_eq!(span.end_marker.marker, "\n\n1. Introduction");
        assert_eq!(span.text, "\nBody.\n\n1 Background");
    }

    #[test]
    fn test_keyword_tier_beats_section_tier() {
        let text = "Abstract\nBody.\n\n1 Introduction\nKeywords: late";
        let span = locate_abstract(text).unwrap();
        assert_eq!(span.end_marker.marker, "Keywords:");
    }

    #[test]
    fn test_end_search_starts_after_start_marker() {
        let text = "Keywords: early\nAbstract\nBody.\n\nIntroduction\n\nText";
        let span = locate_abstract(text).unwrap();
        assert_eq!(span.end_marker.marker, "\n\nIntroduction\n\n");
        assert_eq!(span.text, "\nBody.");
    }

    #[test]
    fn test_missing_end_is_unresolved() {
        let err = locate_abstract("Abstract\nThis paper never ends properly.").unwrap_err();
        assert_eq!(err, LocateError::MarkerNotFound(Boundary::End));
    }

    #[test]
    fn test_missing_start_is_unresolved() {
        let err = locate_abstract("Summary text\n\n1 Introduction\n").unwrap_err();
        assert_eq!(err, LocateError::MarkerNotFound(Boundary::Start));
        assert_eq!(err.to_string(), "no abstract start marker found");
    }

    #[test]
    fn test_empty_text() {
        assert!(locate_abstract("").is_err());
    }
}
