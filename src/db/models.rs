use serde::{Deserialize, Serialize};

/// Which strategy produced a stored abstract
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AbstractSource {
    None,
    Rule,
    Anthology,
}

impl AbstractSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            AbstractSource::None => "none",
            AbstractSource::Rule => "rule",
            AbstractSource::Anthology => "anthology",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "none" => Some(AbstractSource::None),
            "rule" => Some(AbstractSource::Rule),
            "anthology" => Some(AbstractSource::Anthology),
            _ => None,
        }
    }
}

/// Stored abstract text together with its provenance.
///
/// `source` is never `AbstractSource::None`: a record without an abstract
/// holds no `PaperAbstract` at all.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaperAbstract {
    pub text: String,
    pub source: AbstractSource,
}

/// One row of the paper dataset
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaperRecord {
    pub id: String,
    pub year: i32,
    pub venue: String,
    pub url: String,
    #[serde(rename = "rawText", default, skip_serializing_if = "Option::is_none")]
    pub raw_text: Option<String>,  // Extracted PDF text, filled in by the ingestion side
    #[serde(rename = "abstract", default)]
    pub abstract_text: Option<PaperAbstract>,
}

impl PaperRecord {
    pub fn new(id: impl Into<String>, year: i32, venue: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            year,
            venue: venue.into(),
            url: url.into(),
            raw_text: None,
            abstract_text: None,
        }
    }

    pub fn with_raw_text(mut self, text: impl Into<String>) -> Self {
        self.raw_text = Some(text.into());
        self
    }

    pub fn has_abstract(&self) -> bool {
        self.abstract_text.is_some()
    }

    /// Provenance tag, `None` exactly when no abstract is stored
    pub fn abstract_source(&self) -> AbstractSource {
        self.abstract_text
            .as_ref()
            .map(|a| a.source)
            .unwrap_or(AbstractSource::None)
    }

    pub fn abstract_str(&self) -> Option<&str> {
        self.abstract_text.as_ref().map(|a| a.text.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_round_trips_through_str() {
        for source in [AbstractSource::None, AbstractSource::Rule, AbstractSource::Anthology] {
            assert_eq!(AbstractSource::from_str(source.as_str()), Some(source));
        }
        assert_eq!(AbstractSource::from_str("RULE"), None);
    }

    #[test]
    fn test_provenance_none_without_abstract() {
        let paper = PaperRecord::new("P19-1001", 2019, "ACL", "https://www.aclweb.org/anthology/P19-1001");
        assert!(!paper.has_abstract());
        assert_eq!(paper.abstract_source(), AbstractSource::None);
        assert_eq!(paper.abstract_str(), None);
    }

    #[test]
    fn test_json_field_names() {
        let mut paper = PaperRecord::new("W18-0001", 2018, "WS", "u");
        paper.abstract_text = Some(PaperAbstract { text: "We study X.".to_string(), source: AbstractSource::Rule });
        let json = serde_json::to_value(&paper).unwrap();
        assert_eq!(json["abstract"]["source"], "rule");
        assert!(json.get("rawText").is_none());
    }
}
