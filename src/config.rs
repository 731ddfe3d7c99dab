//! Configuration constants and validation functions for the evaluator.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::{BibtagError, Result};

/// Outer container tag for bibliographic records in inline markup.
pub const DEFAULT_CONTAINER_TAG: &str = "BIBL";

/// Separator between tag name and content in standoff text files.
///
/// The first occurrence on a line splits key from value; lines without
/// it are ignored when parsing.
pub const STANDOFF_SEPARATOR: &str = ": ";

/// File extension processed by the batch driver (lowercase, no dot).
pub const ANNOTATION_EXTENSION: &str = "txt";

/// Default zero-based column index holding the annotation string in a TSV row.
pub const DEFAULT_ANNOTATION_COLUMN: usize = 1;

/// Name of the synthetic root element wrapped around raw markup before parsing.
pub const SYNTHETIC_ROOT: &str = "root";

/// Column headers appended to a TSV row by the quality analyzer.
pub const QUALITY_COLUMNS: [&str; 6] = [
    "quality_xml_well_formed",
    "quality_error_message",
    "quality_has_overlapping_tags",
    "quality_tags_used",
    "quality_tag_counts",
    "quality_summary",
];

/// Tag name pattern: one or more word characters, as matched in inline markup.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static TAG_NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\w+$").expect("valid regex"));

/// Validate a tag name used as the container for extraction.
///
/// # Arguments
/// * `name` - The tag name to validate
///
/// # Returns
/// * `Ok(())` if the name consists of word characters only
/// * `Err(BibtagError::InvalidTagName)` otherwise
///
/// # Examples
/// ```
/// use bibtag_eval::config::validate_tag_name;
///
/// assert!(validate_tag_name("BIBL").is_ok());
/// assert!(validate_tag_name("author_1").is_ok());
/// assert!(validate_tag_name("a b").is_err());
/// assert!(validate_tag_name("").is_err());
/// ```
pub fn validate_tag_name(name: &str) -> Result<()> {
    if TAG_NAME_PATTERN.is_match(name) {
        Ok(())
    } else {
        Err(BibtagError::InvalidTagName(name.to_string()))
    }
}
