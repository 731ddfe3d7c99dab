//! Batch driver: enumerates documents, invokes the core components
//! and persists results.
//!
//! All file and table I/O lives here; the extractor, scorer and
//! analyzer only ever see in-memory strings and mappings. Documents
//! are independent, so a failed parse is recorded in its row and the
//! batch continues.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::analyze::analyze;
use crate::config::{ANNOTATION_EXTENSION, QUALITY_COLUMNS};
use crate::error::{BibtagError, Result};
use crate::extract::{Extractor, SubtagScanner};
use crate::score::score;
use crate::standoff::{format_standoff, parse_tag_bag};
use crate::types::{Document, ScoreResult};

/// Score for one compared prediction file.
#[derive(Debug, Clone, PartialEq)]
pub struct FileScore {
    /// Prediction file name (without directory).
    pub file_name: String,

    /// Scores against the ground truth.
    pub score: ScoreResult,
}

/// Row counts from one TSV evaluation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableReport {
    /// Data rows written (header excluded).
    pub rows: usize,

    /// Rows whose annotation failed the structural parse.
    pub malformed: usize,

    /// Well-formed rows with overlapping tags.
    pub overlapping: usize,

    /// Rows too short to hold the annotation column.
    pub row_errors: usize,
}

/// List annotation files (`*.txt`) in a directory, sorted by name.
///
/// Sorting keeps batch output deterministic regardless of directory
/// enumeration order.
fn annotation_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(BibtagError::MissingInputDir(dir.to_path_buf()));
    }

    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(std::result::Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case(ANNOTATION_EXTENSION))
        })
        .collect();
    files.sort();
    Ok(files)
}

/// Convert every annotation file in `input_dir` to standoff format.
///
/// Output files keep their input file name and land in `output_dir`,
/// which is created if absent.
///
/// # Arguments
/// * `extractor` - Configured tag extractor
/// * `input_dir` - Directory of inline-annotated `.txt` files
/// * `output_dir` - Destination directory for standoff files
///
/// # Returns
/// Number of files converted.
pub fn convert_directory<S: SubtagScanner>(
    extractor: &Extractor<S>,
    input_dir: &Path,
    output_dir: &Path,
) -> Result<usize> {
    let files = annotation_files(input_dir)?;
    fs::create_dir_all(output_dir)?;

    let mut converted = 0;
    for path in &files {
        let text = fs::read_to_string(path)?;
        let entries = extractor.extract(&text);

        let file_name = path
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("unnamed.txt"));
        let output_path = output_dir.join(&file_name);
        fs::write(&output_path, format_standoff(&entries))?;

        info!(
            file = %file_name.display(),
            entries = entries.len(),
            "converted to standoff"
        );
        converted += 1;
    }

    Ok(converted)
}

/// Score every prediction file in a directory against one ground-truth
/// standoff file.
///
/// # Arguments
/// * `ground_truth_file` - Standoff file holding the reference tags
/// * `predictions_dir` - Directory of standoff prediction files
///
/// # Returns
/// One [`FileScore`] per prediction file, in file-name order.
pub fn compare_predictions(
    ground_truth_file: &Path,
    predictions_dir: &Path,
) -> Result<Vec<FileScore>> {
    if !ground_truth_file.is_file() {
        return Err(BibtagError::MissingInputFile(
            ground_truth_file.to_path_buf(),
        ));
    }

    let ground_truth = parse_tag_bag(&fs::read_to_string(ground_truth_file)?);
    if ground_truth.is_empty() {
        warn!(
            file = %ground_truth_file.display(),
            "ground truth contains no standoff lines"
        );
    }

    let mut results = Vec::new();
    for path in annotation_files(predictions_dir)? {
        let prediction = parse_tag_bag(&fs::read_to_string(&path)?);
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let result = score(&ground_truth, &prediction);
        debug!(file = %file_name, f1 = result.f1, "scored prediction");
        results.push(FileScore {
            file_name,
            score: result,
        });
    }

    Ok(results)
}

/// Render comparison results as the report text format.
///
/// One block per file, floats to four decimal places:
///
/// ```text
/// results for predictions.txt:
/// precision: 0.5000
/// recall: 0.3333
/// f1 score: 0.4000
/// ```
#[must_use]
pub fn format_comparison_report(results: &[FileScore]) -> String {
    let mut report = String::new();
    for entry in results {
        report.push_str(&format!(
            "results for {}:\nprecision: {:.4}\nrecall: {:.4}\nf1 score: {:.4}\n\n",
            entry.file_name, entry.score.precision, entry.score.recall, entry.score.f1
        ));
    }
    report
}

/// Analyze the annotation column of a TSV file and write a copy with
/// six quality columns appended to every row.
///
/// A row too short to hold the annotation column still produces an
/// output row: its quality fields stay empty except for an explicit
/// `ROW_ERROR` summary, so failures are visible rather than dropped.
///
/// # Arguments
/// * `input` - TSV file with one annotation string per row
/// * `output` - Destination TSV path
/// * `column` - Zero-based index of the annotation column
pub fn evaluate_table(input: &Path, output: &Path, column: usize) -> Result<TableReport> {
    if !input.is_file() {
        return Err(BibtagError::MissingInputFile(input.to_path_buf()));
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .flexible(true)
        .has_headers(false)
        .from_path(input)?;
    let mut rows = reader.records();

    let header = match rows.next() {
        Some(record) => record?,
        None => return Err(BibtagError::EmptyTable(input.to_path_buf())),
    };

    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .flexible(true)
        .from_path(output)?;

    let mut out_header: Vec<String> = header.iter().map(str::to_string).collect();
    out_header.extend(QUALITY_COLUMNS.iter().map(|c| (*c).to_string()));
    writer.write_record(&out_header)?;

    let mut report = TableReport::default();
    for (index, record) in rows.enumerate() {
        let record = record?;
        let mut row: Vec<String> = record.iter().map(str::to_string).collect();
        let doc_id = record.get(0).unwrap_or("").to_string();

        if let Some(annotation) = record.get(column) {
            let document = Document::new(doc_id, annotation);
            let analysis = analyze(&document.annotation);
            debug!(
                row = index + 1,
                id = %document.id,
                summary = %analysis.summary(),
                "analyzed row"
            );

            if !analysis.well_formed {
                report.malformed += 1;
            } else if analysis.has_overlap {
                report.overlapping += 1;
            }

            row.push(analysis.well_formed.to_string());
            row.push(analysis.error_message.clone().unwrap_or_default());
            row.push(analysis.has_overlap.to_string());
            row.push(analysis.tags_used.join(", "));
            row.push(serde_json::to_string(&analysis.tag_counts)?);
            row.push(analysis.summary());
        } else {
            warn!(
                row = index + 1,
                id = %doc_id,
                "row has no annotation column {column}"
            );
            report.row_errors += 1;
            row.extend(vec![String::new(); QUALITY_COLUMNS.len() - 1]);
            row.push(format!("ROW_ERROR: missing annotation column {column}"));
        }

        writer.write_record(&row)?;
        report.rows += 1;
    }

    writer.flush()?;
    Ok(report)
}
