//! Core data types for the evaluator.
//!
//! These types carry annotations between the extractor, the scorer and
//! the structural analyzer. All of them are plain in-memory values;
//! none of them performs I/O.

use std::collections::BTreeMap;

use serde::Serialize;

/// One extracted annotation: a tag name with its content string.
///
/// Extraction order is significant for standoff serialization but not
/// for scoring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagEntry {
    /// Tag name (case-sensitive, e.g. "BIBL", "AUTHOR").
    pub name: String,

    /// Content string with leading/trailing whitespace trimmed.
    pub content: String,
}

impl TagEntry {
    /// Create a new entry.
    #[must_use]
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

/// Mapping from tag name to the list of observed content values.
///
/// Duplicate values are permitted; insertion order within a name is
/// preserved for display but ignored by the scorer. Keys are exactly
/// the distinct names observed: a value list is never empty, absence
/// of a key means zero occurrences.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagBag {
    values: BTreeMap<String, Vec<String>>,
}

impl TagBag {
    /// Create an empty bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a bag by grouping entries by tag name.
    #[must_use]
    pub fn from_entries(entries: impl IntoIterator<Item = TagEntry>) -> Self {
        let mut bag = Self::new();
        for entry in entries {
            bag.insert(entry.name, entry.content);
        }
        bag
    }

    /// Append a value under a tag name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.entry(name.into()).or_default().push(value.into());
    }

    /// Get the values recorded for a tag name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.values.get(name).map(Vec::as_slice)
    }

    /// Iterate over `(name, values)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Number of distinct tag names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if no tags were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Total number of recorded values across all tag names.
    #[must_use]
    pub fn total_values(&self) -> usize {
        self.values.values().map(Vec::len).sum()
    }
}

impl FromIterator<TagEntry> for TagBag {
    fn from_iter<I: IntoIterator<Item = TagEntry>>(iter: I) -> Self {
        Self::from_entries(iter)
    }
}

/// One annotated document: an opaque identifier plus the raw
/// inline-tagged text. Immutable once read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Opaque identifier (file stem, TSV row id, ...).
    pub id: String,

    /// Raw annotation string with inline markup.
    pub annotation: String,
}

impl Document {
    /// Create a new document.
    #[must_use]
    pub fn new(id: impl Into<String>, annotation: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            annotation: annotation.into(),
        }
    }
}

/// Structural analysis of one raw markup string.
///
/// Well-formedness and tag overlap are independent signals: a string
/// can parse cleanly once wrapped in a synthetic root and still carry
/// crossing annotation spans.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisResult {
    /// Whether the wrapped string parsed as XML.
    pub well_formed: bool,

    /// Parser error message when not well-formed.
    pub error_message: Option<String>,

    /// Whether crossing open/close spans were detected. Defaults to
    /// `true` on unparseable input, where overlap cannot be determined.
    pub has_overlap: bool,

    /// Sorted set of distinct element names (synthetic root excluded).
    pub tags_used: Vec<String>,

    /// Element name frequency over the parsed document.
    pub tag_counts: BTreeMap<String, usize>,
}

impl AnalysisResult {
    /// Result for input that failed the structural parse.
    #[must_use]
    pub fn malformed(error_message: impl Into<String>) -> Self {
        Self {
            well_formed: false,
            error_message: Some(error_message.into()),
            has_overlap: true,
            tags_used: Vec::new(),
            tag_counts: BTreeMap::new(),
        }
    }

    /// One-line classification for reporting.
    ///
    /// `"XML_ERROR: <message>"` if not well-formed, else
    /// `"Overlapping tags detected"` if overlap was found, else `"OK"`.
    #[must_use]
    pub fn summary(&self) -> String {
        if !self.well_formed {
            let message = self.error_message.as_deref().unwrap_or("unknown error");
            format!("XML_ERROR: {message}")
        } else if self.has_overlap {
            "Overlapping tags detected".to_string()
        } else {
            "OK".to_string()
        }
    }
}

/// Precision, recall and F1 for one candidate annotation against a
/// ground truth. Stateless and recomputable from two [`TagBag`]s.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreResult {
    /// Fraction of predicted values that were correct.
    pub precision: f64,

    /// Fraction of expected values that were found.
    pub recall: f64,

    /// Harmonic mean of precision and recall.
    pub f1: f64,
}

impl ScoreResult {
    /// The all-zero score, used for degenerate inputs.
    #[must_use]
    pub fn zero() -> Self {
        Self {
            precision: 0.0,
            recall: 0.0,
            f1: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_bag_groups_by_name() {
        let bag = TagBag::from_entries([
            TagEntry::new("AUTHOR", "Smith"),
            TagEntry::new("DATE", "1990"),
            TagEntry::new("AUTHOR", "Jones"),
        ]);

        assert_eq!(bag.len(), 2);
        assert_eq!(
            bag.get("AUTHOR"),
            Some(["Smith".to_string(), "Jones".to_string()].as_slice())
        );
        assert_eq!(bag.get("DATE"), Some(["1990".to_string()].as_slice()));
        assert_eq!(bag.get("TITLE"), None);
        assert_eq!(bag.total_values(), 3);
    }

    #[test]
    fn test_tag_bag_preserves_duplicates() {
        let mut bag = TagBag::new();
        bag.insert("AUTHOR", "Smith");
        bag.insert("AUTHOR", "Smith");

        assert_eq!(bag.total_values(), 2);
        assert_eq!(bag.get("AUTHOR").map(<[String]>::len), Some(2));
    }

    #[test]
    fn test_tag_bag_empty() {
        let bag = TagBag::new();
        assert!(bag.is_empty());
        assert_eq!(bag.total_values(), 0);
    }

    #[test]
    fn test_summary_well_formed() {
        let result = AnalysisResult {
            well_formed: true,
            error_message: None,
            has_overlap: false,
            tags_used: vec!["AUTHOR".to_string()],
            tag_counts: BTreeMap::from([("AUTHOR".to_string(), 1)]),
        };
        assert_eq!(result.summary(), "OK");
    }

    #[test]
    fn test_summary_overlap() {
        let result = AnalysisResult {
            well_formed: true,
            error_message: None,
            has_overlap: true,
            tags_used: Vec::new(),
            tag_counts: BTreeMap::new(),
        };
        assert_eq!(result.summary(), "Overlapping tags detected");
    }

    #[test]
    fn test_summary_malformed() {
        let result = AnalysisResult::malformed("unexpected end of stream");
        assert!(!result.well_formed);
        assert!(result.has_overlap, "overlap is assumed on unparseable input");
        assert_eq!(result.summary(), "XML_ERROR: unexpected end of stream");
    }
}
