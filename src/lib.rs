//! bibtag-eval - Evaluate inline bibliographic tag annotations.
//!
//! This crate measures how well automated taggers (e.g. language
//! models) reproduce bibliographic structure annotations embedded as
//! inline markup. It converts inline-tagged text to a flat standoff
//! representation, scores candidate annotations against a ground
//! truth, and audits raw markup for structural validity.
//!
//! # Example
//!
//! ```
//! use bibtag_eval::extract::Extractor;
//! use bibtag_eval::score::score;
//! use bibtag_eval::types::TagBag;
//!
//! let extractor = Extractor::new("BIBL").unwrap();
//! let truth: TagBag = extractor
//!     .extract("<BIBL><AUTHOR>Smith</AUTHOR> 1990</BIBL>")
//!     .into_iter()
//!     .collect();
//!
//! let result = score(&truth, &truth.clone());
//! assert_eq!(result.f1, 1.0);
//! ```
//!
//! # Architecture
//!
//! The evaluator is organized into several modules:
//!
//! - [`config`]: Configuration constants and validation
//! - [`types`]: Core data types (TagEntry, TagBag, AnalysisResult, ...)
//! - [`error`]: Error types and Result alias
//! - [`extract`]: Inline-to-standoff tag extraction
//! - [`score`]: Precision/recall/F1 scoring of tag bags
//! - [`analyze`]: Structural XML analysis (well-formedness, overlap)
//! - [`standoff`]: Standoff text serialization and parsing
//! - [`batch`]: Batch driver for directories and TSV tables
//! - [`consolidate`]: Merging quality results with corrections
//! - [`cli`]: Command-line interface

pub mod analyze;
pub mod batch;
pub mod cli;
pub mod config;
pub mod consolidate;
pub mod error;
pub mod extract;
pub mod score;
pub mod standoff;
pub mod types;

// Re-export main functions
pub use analyze::analyze;
pub use extract::Extractor;
pub use score::score;

// Re-export commonly used items
pub use error::{BibtagError, Result};
pub use types::{AnalysisResult, Document, ScoreResult, TagBag, TagEntry};
