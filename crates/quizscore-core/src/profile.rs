//! Profile derivations over a score card: ranking, the weighted overall
//! aggregate, and letter-pair type codes.

use crate::engine::ScoreCard;
use crate::instrument::Axis;
use crate::model::{Dimension, DimensionKey};

/// Dimensions ordered by percentage, highest first. The sort is stable, so
/// ties keep declaration order.
pub fn rank(card: &ScoreCard) -> Vec<DimensionKey> {
    let mut scores: Vec<_> = card.iter().collect();
    scores.sort_by(|a, b| b.percentage.cmp(&a.percentage));
    scores.into_iter().map(|s| s.dimension.clone()).collect()
}

/// Mean of dimension percentages weighted by [`Dimension::weight`],
/// rounded to the nearest integer. Zero when every weight is zero.
pub fn weighted_mean(dimensions: &[Dimension], card: &ScoreCard) -> u8 {
    let (sum, total_weight) = dimensions
        .iter()
        .filter_map(|d| card.percentage(d.key.as_str()).map(|p| (f64::from(p), d.weight)))
        .fold((0.0, 0.0), |(sum, total), (p, w)| (sum + p * w, total + w));

    if total_weight <= 0.0 {
        return 0;
    }
    (sum / total_weight).round().clamp(0.0, 100.0) as u8
}

/// Resolve each axis to the key of its higher-scoring side and concatenate
/// them. Ties resolve to the left dimension.
pub fn type_code(axes: &[Axis], card: &ScoreCard) -> String {
    axes.iter()
        .map(|axis| {
            let left = card.percentage(axis.left.as_str()).unwrap_or(0);
            let right = card.percentage(axis.right.as_str()).unwrap_or(0);
            if left >= right {
                axis.left.as_str()
            } else {
                axis.right.as_str()
            }
        })
        .collect()
}
