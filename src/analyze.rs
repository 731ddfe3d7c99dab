//! Structural analysis of raw inline XML annotations.
//!
//! Two independent signals are produced for every document:
//!
//! - **well-formedness**: the raw string, ampersand-escaped and
//!   wrapped in a synthetic root element, must parse as XML;
//! - **tag overlap**: a character-level scan over the *original* raw
//!   string detects crossing open/close spans, which wrapping can mask
//!   from the well-formedness check.
//!
//! A parse failure is captured in the result, not propagated: one
//! malformed document must not halt a batch.

use std::collections::BTreeMap;

use crate::config::SYNTHETIC_ROOT;
use crate::types::AnalysisResult;

/// Escape literal `&` characters before structural parsing.
///
/// The replacement is blanket: already-escaped entities are escaped
/// again. Inline annotations never contain entities, while bare
/// ampersands in bibliographic text ("Smith & Jones") are common.
fn escape_ampersands(raw: &str) -> String {
    raw.replace('&', "&amp;")
}

/// Analyze one raw markup string.
///
/// # Arguments
/// * `raw` - The annotation string, markup embedded in running text
///
/// # Examples
/// ```
/// use bibtag_eval::analyze::analyze;
///
/// let result = analyze("<AUTHOR>Smith & Jones</AUTHOR>");
/// assert!(result.well_formed);
/// assert!(!result.has_overlap);
/// assert_eq!(result.tags_used, vec!["AUTHOR".to_string()]);
/// ```
#[must_use]
pub fn analyze(raw: &str) -> AnalysisResult {
    let wrapped = format!(
        "<{SYNTHETIC_ROOT}>{}</{SYNTHETIC_ROOT}>",
        escape_ampersands(raw)
    );

    let doc = match roxmltree::Document::parse(&wrapped) {
        Ok(doc) => doc,
        Err(e) => return AnalysisResult::malformed(e.to_string()),
    };

    let mut tag_counts: BTreeMap<String, usize> = BTreeMap::new();
    for node in doc.descendants().filter(roxmltree::Node::is_element) {
        let name = node.tag_name().name();
        if name == SYNTHETIC_ROOT {
            continue;
        }
        *tag_counts.entry(name.to_string()).or_insert(0) += 1;
    }

    AnalysisResult {
        well_formed: true,
        error_message: None,
        // Overlap runs over the original string: the synthetic-root
        // wrap can mask spans that cross the document boundary.
        has_overlap: has_overlapping_tags(raw),
        tags_used: tag_counts.keys().cloned().collect(),
        tag_counts,
    }
}

/// Detect crossing (non-nesting) open/close tag spans.
///
/// Scans character by character keeping a stack of open tag names: an
/// opening tag pushes, a closing tag must match the innermost open tag
/// exactly or overlap is reported immediately. Tags still open at the
/// end of input also count as overlap.
#[must_use]
pub fn has_overlapping_tags(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    let mut stack: Vec<&str> = Vec::new();

    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'<' && i + 1 < bytes.len() {
            if bytes[i + 1] == b'/' {
                if let Some(rel) = raw[i..].find('>') {
                    let closing = &raw[i + 2..i + rel];
                    if stack.last() != Some(&closing) {
                        return true;
                    }
                    stack.pop();
                }
            } else if let Some(rel) = raw[i..].find('>') {
                // First whitespace-delimited token is the tag name;
                // empty tag bodies are skipped.
                if let Some(name) = raw[i + 1..i + rel].split_whitespace().next() {
                    stack.push(name);
                }
            }
        }
        i += 1;
    }

    !stack.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_well_formed_simple() {
        let result = analyze("<AUTHOR>Smith</AUTHOR> <DATE>1990</DATE>");

        assert!(result.well_formed);
        assert_eq!(result.error_message, None);
        assert!(!result.has_overlap);
        assert_eq!(
            result.tags_used,
            vec!["AUTHOR".to_string(), "DATE".to_string()]
        );
        assert_eq!(result.tag_counts.get("AUTHOR"), Some(&1));
        assert_eq!(result.summary(), "OK");
    }

    #[test]
    fn test_bare_ampersand_still_parses() {
        let result = analyze("<AUTHOR>Smith & Jones</AUTHOR>");
        assert!(result.well_formed);
    }

    #[test]
    fn test_malformed_input() {
        let result = analyze("<AUTHOR>Smith");

        assert!(!result.well_formed);
        assert!(result.error_message.is_some());
        assert!(result.has_overlap, "overlap is assumed on parse failure");
        assert!(result.tags_used.is_empty());
        assert!(result.tag_counts.is_empty());
        assert!(result.summary().starts_with("XML_ERROR: "));
    }

    #[test]
    fn test_stray_angle_bracket_is_malformed() {
        let result = analyze("value a < b");
        assert!(!result.well_formed);
    }

    #[test]
    fn test_cross_closing_is_overlap() {
        assert!(has_overlapping_tags("<a><b></a></b>"));
    }

    #[test]
    fn test_proper_nesting_is_not_overlap() {
        assert!(!has_overlapping_tags("<a><b></b></a>"));
    }

    #[test]
    fn test_unclosed_tag_is_overlap() {
        assert!(has_overlapping_tags("<a>text"));
    }

    #[test]
    fn test_close_without_open_is_overlap() {
        assert!(has_overlapping_tags("text</a>"));
    }

    #[test]
    fn test_no_tags_no_overlap() {
        assert!(!has_overlapping_tags("plain text, no markup"));
        let result = analyze("plain text, no markup");
        assert!(result.well_formed);
        assert!(result.tags_used.is_empty());
    }

    #[test]
    fn test_cross_closing_fails_parse_and_assumes_overlap() {
        let crossed = analyze("<a>x<b>y</a></b>");
        assert!(!crossed.well_formed);
        assert!(crossed.has_overlap);
    }

    #[test]
    fn test_overlap_independent_of_well_formedness() {
        // XML tolerates whitespace inside a closing tag, the
        // character scan does not: well-formed yet flagged.
        let result = analyze("<a>text</a >");
        assert!(result.well_formed);
        assert!(result.has_overlap);
        assert_eq!(result.summary(), "Overlapping tags detected");
    }

    #[test]
    fn test_tag_counts_at_all_depths() {
        let result = analyze("<BIBL><AUTHOR>A</AUTHOR><AUTHOR>B</AUTHOR></BIBL>");

        assert_eq!(result.tag_counts.get("BIBL"), Some(&1));
        assert_eq!(result.tag_counts.get("AUTHOR"), Some(&2));
        assert_eq!(
            result.tags_used,
            vec!["AUTHOR".to_string(), "BIBL".to_string()]
        );
    }

    #[test]
    fn test_literal_root_tag_excluded_from_counts() {
        // An element named like the synthetic root is not counted;
        // the frequency table tracks annotation tags only.
        let result = analyze("<root><a>x</a></root>");
        assert_eq!(result.tags_used, vec!["a".to_string()]);
    }
}
