//! Combiners turning two predictions into one label.

use serde::Serialize;
use tracing::debug;

use crate::error::{AppError, Result};
use crate::external::models::ExternalPrediction;
use crate::ml::models::ClassLabel;

/// Absorbs rounding when normalised weights sum to slightly under one
const SCORE_EPSILON: f64 = 1e-9;

/// Integer mean of two class codes, truncated.
///
/// This averages category codes, so Setosa and Virginica agree on
/// Versicolor. Callers rely on that behaviour; do not "fix" it here.
pub fn local_consensus(a: ClassLabel, b: ClassLabel) -> Result<ClassLabel> {
    let index = (a.index() + b.index()) / 2;
    ClassLabel::from_index(index)
        .ok_or_else(|| AppError::Internal(format!("local consensus produced index {}", index)))
}

/// Result of combining two external predictions
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeightedConsensus {
    pub label: ClassLabel,
    pub score: f64,
    pub weights: (f64, f64),
}

/// Accuracy-weighted sum of two external class codes, truncated to a label.
pub fn weighted_consensus(
    a: &ExternalPrediction,
    b: &ExternalPrediction,
) -> Result<WeightedConsensus> {
    let total = a.accuracy + b.accuracy;
    if !(total.is_finite() && total > 0.0) {
        return Err(AppError::DegenerateWeight { total });
    }

    let weights = (a.accuracy / total, b.accuracy / total);
    let score = a.label as f64 * weights.0 + b.label as f64 * weights.1;
    let truncated = (score + SCORE_EPSILON).trunc();

    let label = usize::try_from(truncated as i64)
        .ok()
        .and_then(ClassLabel::from_index)
        .ok_or_else(|| {
            AppError::Internal(format!("weighted consensus score {} has no label", score))
        })?;

    debug!(score, w_a = weights.0, w_b = weights.1, label = %label, "Weighted consensus");

    Ok(WeightedConsensus {
        label,
        score,
        weights,
    })
}
