//! Error types for the evaluator.
//!
//! Structural XML parse failures are deliberately *not* represented
//! here: the analyzer captures them as a message inside
//! [`crate::types::AnalysisResult`] so that a malformed document is a
//! reported result, not a failed batch.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the evaluator library.
#[derive(Debug, Error)]
pub enum BibtagError {
    /// Invalid tag name supplied for extraction.
    #[error("Invalid tag name: '{0}'. Expected word characters only (e.g., BIBL)")]
    InvalidTagName(String),

    /// Input directory does not exist or is not a directory.
    #[error("Input directory does not exist: {}", .0.display())]
    MissingInputDir(PathBuf),

    /// Input file does not exist.
    #[error("Input file does not exist: {}", .0.display())]
    MissingInputFile(PathBuf),

    /// Tabular input contained no rows at all.
    #[error("Input table is empty: {}", .0.display())]
    EmptyTable(PathBuf),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TSV read/write error.
    #[error("TSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for evaluator operations.
pub type Result<T> = std::result::Result<T, BibtagError>;
