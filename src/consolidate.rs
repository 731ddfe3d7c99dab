//! Consolidation of quality-evaluated annotations with corrections.
//!
//! Takes the TSV produced by [`crate::batch::evaluate_table`] plus a
//! directory of `line_{N}.json` correction files (one per malformed
//! record, numbered by the record's 1-based position among the
//! non-well-formed rows) and merges them into one JSON dataset. Each
//! record also carries a nested JSON rendering of its XML with
//! lowercased element names.
//!
//! Producing the corrections (the generative-model request workflow)
//! is out of scope; this module only consumes their persisted output.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::error::{BibtagError, Result};

/// Header of the well-formedness column written by the analyzer.
const WELL_FORMED_COLUMN: &str = "quality_xml_well_formed";

/// Header of the record identifier column.
const ID_COLUMN: &str = "id";

/// Header of the annotation column.
const XML_COLUMN: &str = "annotation";

/// Column order of the flattened CSV export.
const CSV_COLUMNS: [&str; 7] = [
    "id",
    "original_xml",
    "is_faulty",
    "has_correction",
    "corrected_xml",
    "number_of_fixes",
    "fix_explanation",
];

/// One persisted correction, as written by the correction workflow.
#[derive(Debug, Clone, Deserialize)]
pub struct Correction {
    /// The repaired XML string.
    pub fixed_xml: Option<String>,

    /// How many repairs were applied.
    #[serde(default)]
    pub number_of_fixes: u32,

    /// Free-text explanation of the repairs.
    pub explanation: Option<String>,
}

/// One consolidated record: original annotation, quality verdict,
/// optional correction and the JSON rendering of the XML.
#[derive(Debug, Clone, Serialize)]
pub struct ConsolidatedRecord {
    /// Record identifier (`id` column of the table).
    pub id: String,

    /// The annotation string as found in the table.
    pub original_xml: String,

    /// Whether the analyzer flagged the record as not well-formed.
    pub is_faulty: bool,

    /// Whether a usable correction file was found.
    pub has_correction: bool,

    /// The corrected XML, when available.
    pub corrected_xml: Option<String>,

    /// Repair count from the correction file.
    pub number_of_fixes: u32,

    /// Repair explanation from the correction file.
    pub fix_explanation: Option<String>,

    /// Nested JSON rendering of the corrected XML when available,
    /// otherwise of the original (which may be an error object).
    pub json_representation: Value,

    /// Remaining TSV columns, keyed by header.
    pub metadata: BTreeMap<String, String>,
}

/// Parse an XML string into nested JSON with lowercased element names.
///
/// Leaf elements map to their trimmed text; repeated sibling names
/// become arrays. Unparseable input maps to an `{"error": ...}`
/// object instead of failing.
///
/// # Examples
/// ```
/// use bibtag_eval::consolidate::xml_to_json;
/// use serde_json::json;
///
/// let value = xml_to_json("<BIBL><AUTHOR>Smith</AUTHOR></BIBL>");
/// assert_eq!(value, json!({"bibl": {"author": "Smith"}}));
/// ```
#[must_use]
pub fn xml_to_json(xml: &str) -> Value {
    match roxmltree::Document::parse(xml) {
        Ok(doc) => {
            let root = doc.root_element();
            let mut wrapper = serde_json::Map::new();
            wrapper.insert(root.tag_name().name().to_lowercase(), element_value(root));
            Value::Object(wrapper)
        }
        Err(e) => json!({ "error": format!("Failed to parse XML: {e}") }),
    }
}

/// JSON value for one element: an object of children, or trimmed text.
fn element_value(node: roxmltree::Node<'_, '_>) -> Value {
    let children: Vec<_> = node.children().filter(roxmltree::Node::is_element).collect();
    if children.is_empty() {
        return Value::String(node.text().map(str::trim).unwrap_or_default().to_string());
    }

    let mut map = serde_json::Map::new();
    for child in children {
        let tag = child.tag_name().name().to_lowercase();
        let value = element_value(child);
        match map.get_mut(&tag) {
            Some(Value::Array(items)) => items.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                map.insert(tag, value);
            }
        }
    }
    Value::Object(map)
}

/// Load one correction file, degrading to `None` on absence or
/// invalid JSON.
fn load_correction(path: &Path) -> Option<Correction> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(_) => return None,
    };
    if content.trim().is_empty() {
        return None;
    }
    match serde_json::from_str(&content) {
        Ok(correction) => Some(correction),
        Err(e) => {
            warn!(file = %path.display(), error = %e, "invalid correction JSON");
            None
        }
    }
}

/// Merge an evaluated TSV with correction files into consolidated records.
///
/// # Arguments
/// * `table` - TSV produced by the quality evaluation (must contain
///   the `quality_xml_well_formed` column)
/// * `corrections_dir` - Directory of `line_{N}.json` files
///
/// # Returns
/// One record per table row, in row order.
pub fn consolidate(table: &Path, corrections_dir: &Path) -> Result<Vec<ConsolidatedRecord>> {
    if !table.is_file() {
        return Err(BibtagError::MissingInputFile(table.to_path_buf()));
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .flexible(true)
        .from_path(table)?;

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if headers.len() < 2 {
        return Err(BibtagError::EmptyTable(table.to_path_buf()));
    }
    // Columns are resolved by header so a reordered table still
    // consolidates; the fallbacks match the evaluation step's default
    // layout.
    let id_column = headers.iter().position(|h| h == ID_COLUMN).unwrap_or(0);
    let xml_column = headers.iter().position(|h| h == XML_COLUMN).unwrap_or(1);
    let flag_column = headers.iter().position(|h| h == WELL_FORMED_COLUMN);

    let mut records = Vec::new();
    let mut faulty_seen = 0usize;

    for row in reader.records() {
        let row = row?;
        let id = row.get(id_column).unwrap_or_default().to_string();
        let original_xml = row.get(xml_column).unwrap_or_default().to_string();

        let is_faulty = flag_column
            .and_then(|i| row.get(i))
            .is_some_and(|flag| flag.eq_ignore_ascii_case("false"));

        let mut record = ConsolidatedRecord {
            id,
            original_xml: original_xml.clone(),
            is_faulty,
            has_correction: false,
            corrected_xml: None,
            number_of_fixes: 0,
            fix_explanation: None,
            json_representation: Value::Null,
            metadata: headers
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != id_column && *i != xml_column)
                .map(|(i, h)| (h.clone(), row.get(i).unwrap_or_default().to_string()))
                .collect(),
        };

        if is_faulty {
            // Corrections are numbered by position among faulty rows.
            faulty_seen += 1;
            let path = corrections_dir.join(format!("line_{faulty_seen}.json"));
            if let Some(correction) = load_correction(&path) {
                record.has_correction = correction.fixed_xml.is_some();
                record.number_of_fixes = correction.number_of_fixes;
                record.fix_explanation = correction.explanation;
                if let Some(fixed) = correction.fixed_xml {
                    record.json_representation = xml_to_json(&fixed);
                    record.corrected_xml = Some(fixed);
                }
            }
        }

        if record.json_representation.is_null() {
            record.json_representation = xml_to_json(&original_xml);
        }

        records.push(record);
    }

    let corrected = records.iter().filter(|r| r.has_correction).count();
    info!(
        total = records.len(),
        faulty = faulty_seen,
        corrected,
        "consolidated records"
    );

    Ok(records)
}

/// Write consolidated records as pretty-printed JSON.
pub fn write_consolidated_json(records: &[ConsolidatedRecord], output: &Path) -> Result<()> {
    let file = fs::File::create(output)?;
    serde_json::to_writer_pretty(file, records)?;
    Ok(())
}

/// Write consolidated records as a flattened CSV.
///
/// One row per record, correction fields inlined; the nested JSON
/// rendering and the metadata columns are omitted.
pub fn write_consolidated_csv(records: &[ConsolidatedRecord], output: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(output)?;
    writer.write_record(CSV_COLUMNS)?;

    for record in records {
        writer.write_record([
            record.id.clone(),
            record.original_xml.clone(),
            record.is_faulty.to_string(),
            record.has_correction.to_string(),
            record.corrected_xml.clone().unwrap_or_default(),
            record.number_of_fixes.to_string(),
            record.fix_explanation.clone().unwrap_or_default(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}
