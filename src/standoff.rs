//! Standoff text format: one `"name: content"` line per entry.
//!
//! These are stable boundary formats; ground-truth and prediction
//! files round-trip through them, so rendering and parsing must agree
//! bit-for-bit.

use crate::config::STANDOFF_SEPARATOR;
use crate::types::{TagBag, TagEntry};

/// Render extracted entries as standoff text.
///
/// One newline-terminated line per entry. Colons within content are
/// not escaped; parsing resolves the ambiguity by splitting on the
/// first separator occurrence.
///
/// # Examples
/// ```
/// use bibtag_eval::standoff::format_standoff;
/// use bibtag_eval::types::TagEntry;
///
/// let text = format_standoff(&[TagEntry::new("AUTHOR", "Smith")]);
/// assert_eq!(text, "AUTHOR: Smith\n");
/// ```
#[must_use]
pub fn format_standoff(entries: &[TagEntry]) -> String {
    let mut out = String::new();
    for entry in entries {
        out.push_str(&entry.name);
        out.push_str(STANDOFF_SEPARATOR);
        out.push_str(&entry.content);
        out.push('\n');
    }
    out
}

/// Parse standoff text into a [`TagBag`].
///
/// The first `": "` on a line splits key from value; the value is
/// trimmed, the key is taken verbatim. Lines without the separator are
/// ignored.
///
/// # Examples
/// ```
/// use bibtag_eval::standoff::parse_tag_bag;
///
/// let bag = parse_tag_bag("AUTHOR: Smith\nAUTHOR: Jones\nnot a tag line\n");
/// assert_eq!(bag.get("AUTHOR").map(<[String]>::len), Some(2));
/// ```
#[must_use]
pub fn parse_tag_bag(text: &str) -> TagBag {
    let mut bag = TagBag::new();
    for line in text.lines() {
        if let Some((key, value)) = line.split_once(STANDOFF_SEPARATOR) {
            bag.insert(key, value.trim());
        }
    }
    bag
}
