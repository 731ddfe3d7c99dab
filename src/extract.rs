//! Inline-to-standoff tag extraction.
//!
//! The extractor locates container blocks (by default `<BIBL>...</BIBL>`)
//! in running text and flattens them into an ordered sequence of
//! [`TagEntry`] values: first the container's own standalone content,
//! then one entry per embedded sub-tag in order of appearance.
//!
//! Extraction is deliberately lenient: unmatched or malformed tag
//! syntax simply fails to match and is skipped, so malformed input
//! degrades extraction completeness, never the correctness of what is
//! extracted.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use crate::config::validate_tag_name;
use crate::error::{BibtagError, Result};
use crate::types::TagEntry;

/// Regex matching anything shaped like markup (`<...>`), used for the
/// blunt removal pass over container content.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static MARKUP_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));

/// Regex matching an opening tag with a word-character name.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static OPEN_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<(\w+)>").expect("valid regex"));

/// One sub-tag match inside a container block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subtag {
    /// Tag name between the angle brackets.
    pub name: String,

    /// Content between open and close tag, trimmed. May still contain
    /// inner markup verbatim: sub-tag extraction does not recurse.
    pub content: String,

    /// Byte range of the whole `<name>...</name>` span in the block.
    pub span: Range<usize>,
}

/// Seam for sub-tag scanning inside a container block.
///
/// The default [`SingleLevelScanner`] flattens exactly one nesting
/// level. A deeper, stack-based scanner can be swapped in without
/// changing the extraction contract.
pub trait SubtagScanner {
    /// Scan a container block for sub-tags, left to right.
    ///
    /// Returned spans must be non-overlapping and in ascending order.
    fn scan(&self, block: &str) -> Vec<Subtag>;
}

/// Scanner matching same-name `<name>...</name>` pairs at one level.
///
/// For each opening tag at or after the scan cursor, the first literal
/// closing tag of the same name ends the match; the cursor then
/// advances past it. Opening tags that never close are skipped.
pub struct SingleLevelScanner;

impl SubtagScanner for SingleLevelScanner {
    fn scan(&self, block: &str) -> Vec<Subtag> {
        let mut subtags = Vec::new();
        let mut pos = 0;

        for caps in OPEN_TAG.captures_iter(block) {
            let Some(open) = caps.get(0) else { continue };
            if open.start() < pos {
                // Inside the previous match; sub-tags do not overlap.
                continue;
            }
            let Some(name) = caps.get(1) else { continue };

            let close = format!("</{}>", name.as_str());
            let content_start = open.end();
            let Some(rel) = block[content_start..].find(&close) else {
                // No matching close tag; skip silently.
                continue;
            };

            let content_end = content_start + rel;
            let span = open.start()..content_end + close.len();
            subtags.push(Subtag {
                name: name.as_str().to_string(),
                content: block[content_start..content_end].trim().to_string(),
                span: span.clone(),
            });
            pos = span.end;
        }

        subtags
    }
}

/// Extracts container blocks and their sub-tags from inline markup.
pub struct Extractor<S: SubtagScanner = SingleLevelScanner> {
    container: String,
    block_re: Regex,
    scanner: S,
}

impl Extractor<SingleLevelScanner> {
    /// Create an extractor for the given container tag with the
    /// default single-level sub-tag scanner.
    ///
    /// # Arguments
    /// * `container` - Outer tag name delimiting record blocks
    ///
    /// # Examples
    /// ```
    /// use bibtag_eval::extract::Extractor;
    ///
    /// let extractor = Extractor::new("BIBL").unwrap();
    /// let entries = extractor.extract("<BIBL><AUTHOR>Smith</AUTHOR></BIBL>");
    /// assert_eq!(entries.len(), 2);
    /// ```
    pub fn new(container: &str) -> Result<Self> {
        Self::with_scanner(container, SingleLevelScanner)
    }
}

impl<S: SubtagScanner> Extractor<S> {
    /// Create an extractor with a custom sub-tag scanner.
    pub fn with_scanner(container: &str, scanner: S) -> Result<Self> {
        validate_tag_name(container)?;

        // Non-greedy, multiline-aware: content may span lines. Nested
        // containers of the same name are not supported; the first
        // closing delimiter after an opening delimiter ends the block.
        let pattern = format!("(?s)<{container}>(.*?)</{container}>");
        let block_re = Regex::new(&pattern)
            .map_err(|_| BibtagError::InvalidTagName(container.to_string()))?;

        Ok(Self {
            container: container.to_string(),
            block_re,
            scanner,
        })
    }

    /// The container tag name this extractor matches.
    #[must_use]
    pub fn container(&self) -> &str {
        &self.container
    }

    /// Extract all container blocks from `text` as flat entries.
    ///
    /// For each block, in order of appearance: one entry with the
    /// container's standalone content (sub-tag spans removed, leftover
    /// markup stripped, trimmed), followed by one entry per sub-tag in
    /// left-to-right order. Text outside any container block is
    /// ignored.
    #[must_use]
    pub fn extract(&self, text: &str) -> Vec<TagEntry> {
        let mut entries = Vec::new();

        for caps in self.block_re.captures_iter(text) {
            let Some(block) = caps.get(1) else { continue };
            let block = block.as_str();

            let subtags = self.scanner.scan(block);
            entries.push(TagEntry::new(
                &self.container,
                standalone_content(block, &subtags),
            ));
            entries.extend(
                subtags
                    .into_iter()
                    .map(|tag| TagEntry::new(tag.name, tag.content)),
            );
        }

        entries
    }
}

/// The container's own content: everything not covered by a sub-tag
/// span, with remaining markup shapes removed and the result trimmed.
fn standalone_content(block: &str, subtags: &[Subtag]) -> String {
    let mut kept = String::with_capacity(block.len());
    let mut pos = 0;

    for tag in subtags {
        kept.push_str(&block[pos..tag.span.start]);
        pos = tag.span.end;
    }
    kept.push_str(&block[pos..]);

    MARKUP_SHAPE.replace_all(&kept, "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn extract(text: &str) -> Vec<TagEntry> {
        Extractor::new("BIBL").unwrap().extract(text)
    }

    #[test]
    fn test_container_with_subtag() {
        let entries = extract("<BIBL><AUTHOR>Smith</AUTHOR> 1990</BIBL>");

        assert_eq!(
            entries,
            vec![
                TagEntry::new("BIBL", "1990"),
                TagEntry::new("AUTHOR", "Smith"),
            ]
        );
    }

    #[test]
    fn test_container_without_subtags() {
        let entries = extract("<BIBL>Smith, J. (1990). A title.</BIBL>");
        assert_eq!(
            entries,
            vec![TagEntry::new("BIBL", "Smith, J. (1990). A title.")]
        );
    }

    #[test]
    fn test_whitespace_only_block() {
        let entries = extract("<BIBL>   \n  </BIBL>");
        assert_eq!(entries, vec![TagEntry::new("BIBL", "")]);
    }

    #[test]
    fn test_text_outside_blocks_ignored() {
        let entries = extract("preamble <BIBL><DATE>1990</DATE></BIBL> trailing");
        assert_eq!(
            entries,
            vec![TagEntry::new("BIBL", ""), TagEntry::new("DATE", "1990")]
        );
    }

    #[test]
    fn test_multiple_blocks_in_order() {
        let entries = extract(
            "<BIBL><AUTHOR>Smith</AUTHOR></BIBL>\n<BIBL><AUTHOR>Jones</AUTHOR></BIBL>",
        );
        assert_eq!(
            entries,
            vec![
                TagEntry::new("BIBL", ""),
                TagEntry::new("AUTHOR", "Smith"),
                TagEntry::new("BIBL", ""),
                TagEntry::new("AUTHOR", "Jones"),
            ]
        );
    }

    #[test]
    fn test_block_spans_lines() {
        let entries = extract("<BIBL>\n<AUTHOR>Smith</AUTHOR>\n<DATE>1990</DATE>\n</BIBL>");
        assert_eq!(
            entries,
            vec![
                TagEntry::new("BIBL", ""),
                TagEntry::new("AUTHOR", "Smith"),
                TagEntry::new("DATE", "1990"),
            ]
        );
    }

    #[test]
    fn test_subtag_does_not_recurse() {
        // A sub-tag containing a differently-named pair is one match;
        // the inner markup stays verbatim in its content.
        let entries = extract("<BIBL><TITLE>A <EM>fine</EM> title</TITLE></BIBL>");
        assert_eq!(
            entries,
            vec![
                TagEntry::new("BIBL", ""),
                TagEntry::new("TITLE", "A <EM>fine</EM> title"),
            ]
        );
    }

    #[test]
    fn test_unclosed_subtag_skipped() {
        let entries = extract("<BIBL><AUTHOR>Smith <DATE>1990</DATE></BIBL>");
        // AUTHOR never closes; DATE still matches.
        assert_eq!(
            entries,
            vec![TagEntry::new("BIBL", "Smith"), TagEntry::new("DATE", "1990")]
        );
    }

    #[test]
    fn test_unclosed_container_yields_nothing() {
        assert!(extract("<BIBL><AUTHOR>Smith</AUTHOR>").is_empty());
        assert!(extract("no markup at all").is_empty());
    }

    #[test]
    fn test_standalone_content_interleaved() {
        let entries = extract("<BIBL>Smith, J. <DATE>1990</DATE>. A title.</BIBL>");
        assert_eq!(entries[0], TagEntry::new("BIBL", "Smith, J. . A title."));
        assert_eq!(entries[1], TagEntry::new("DATE", "1990"));
    }

    #[test]
    fn test_custom_container_tag() {
        let extractor = Extractor::new("REF").unwrap();
        let entries = extractor.extract("<REF><PAGE>12</PAGE></REF>");
        assert_eq!(
            entries,
            vec![TagEntry::new("REF", ""), TagEntry::new("PAGE", "12")]
        );
    }

    #[test]
    fn test_invalid_container_tag_rejected() {
        assert!(Extractor::new("not a tag").is_err());
        assert!(Extractor::new("").is_err());
    }

    #[test]
    fn test_scanner_cursor_skips_nested_same_name() {
        let scanner = SingleLevelScanner;
        let subtags = scanner.scan("<A><A>x</A></A>");

        // The first <A> pairs with the first </A>; the inner open tag
        // falls inside that span and is not matched again.
        assert_eq!(subtags.len(), 1);
        assert_eq!(subtags[0].name, "A");
        assert_eq!(subtags[0].content, "<A>x");
    }

    #[test]
    fn test_scanner_trims_content() {
        let scanner = SingleLevelScanner;
        let subtags = scanner.scan("<AUTHOR>  Smith, J.  </AUTHOR>");
        assert_eq!(subtags[0].content, "Smith, J.");
    }
}
