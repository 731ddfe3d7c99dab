//! Tag-set scoring: precision, recall and F1 over two [`TagBag`]s.
//!
//! Values are matched per tag name as unordered sets: a predicted
//! value counts as correct if the same string occurs under the same
//! tag name in the ground truth, regardless of sequence position.
//! Content equality is exact post-trim string match; no fuzzy or
//! partial credit.

use std::collections::HashSet;

use crate::types::{ScoreResult, TagBag};

/// Score a candidate annotation against a ground truth.
///
/// Totals:
/// - `correct`: per ground-truth tag name, the size of the set
///   intersection with the prediction's values for that name.
/// - `total` (recall denominator): per ground-truth name, its
///   deduplicated value count when the name is predicted, raw count
///   when it is not; plus the raw value count of every predicted name
///   absent from the ground truth. Extra predicted names are
///   guaranteed wrong and must not inflate recall by being ignored.
/// - `precision` = correct / total predicted values (0 when the
///   prediction is empty).
/// - `recall` = correct / total (0 when total is 0).
/// - `f1` = harmonic mean (0 when both are 0).
///
/// Degenerate inputs never produce NaN: every division by a zero
/// denominator is defined as 0.
///
/// # Examples
/// ```
/// use bibtag_eval::score::score;
/// use bibtag_eval::types::{TagBag, TagEntry};
///
/// let truth = TagBag::from_entries([TagEntry::new("AUTHOR", "Smith")]);
/// let result = score(&truth, &truth.clone());
/// assert_eq!(result.f1, 1.0);
/// ```
#[must_use]
pub fn score(ground_truth: &TagBag, prediction: &TagBag) -> ScoreResult {
    let mut correct = 0usize;
    let mut total = 0usize;

    for (name, truth_values) in ground_truth.iter() {
        if let Some(predicted_values) = prediction.get(name) {
            let truth_set: HashSet<&str> = truth_values.iter().map(String::as_str).collect();
            let predicted_set: HashSet<&str> =
                predicted_values.iter().map(String::as_str).collect();

            correct += truth_set.intersection(&predicted_set).count();
            total += truth_set.len();
        } else {
            total += truth_values.len();
        }
    }

    // Predicted tag names absent from the ground truth are all wrong.
    for (name, predicted_values) in prediction.iter() {
        if ground_truth.get(name).is_none() {
            total += predicted_values.len();
        }
    }

    let predicted_total = prediction.total_values();
    let precision = if predicted_total > 0 {
        correct as f64 / predicted_total as f64
    } else {
        0.0
    };
    let recall = if total > 0 {
        correct as f64 / total as f64
    } else {
        0.0
    };
    let f1 = if precision + recall > 0.0 {
        2.0 * precision * recall / (precision + recall)
    } else {
        0.0
    };

    ScoreResult {
        precision,
        recall,
        f1,
    }
}
