use std::cmp::Ordering;

const DISTRIBUTION_TOLERANCE: f32 = 1e-3;

/// Returns true when `scores` already form a probability distribution.
pub(crate) fn is_distribution(scores: &[f32]) -> bool {
    if scores.is_empty() {
        return false;
    }
    let in_range = scores.iter().all(|&s| (0.0..=1.0).contains(&s));
    let sum: f32 = scores.iter().sum();
    in_range && (sum - 1.0).abs() <= DISTRIBUTION_TOLERANCE
}

/// Numerically stable softmax.
pub(crate) fn softmax(scores: &[f32]) -> Vec<f32> {
    if scores.is_empty() {
        return Vec::new();
    }
    let max = scores.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = scores.iter().map(|&s| (s - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// Turns raw model output into confidences in `[0, 1]`.
///
/// Softmax outputs pass through untouched; anything else (logits) is
/// normalized with softmax.
pub(crate) fn to_probabilities(scores: Vec<f32>) -> Vec<f32> {
    if is_distribution(&scores) {
        scores
    } else {
        softmax(&scores)
    }
}

/// Indices of the `k` highest scores, highest first. Ties go to the lower index.
pub(crate) fn top_k_indices(scores: &[f32], k: usize) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..scores.len()).collect();
    indices.sort_by(|&a, &b| {
        scores[b]
            .partial_cmp(&scores[a])
            .unwrap_or(Ordering::Equal)
            .then(a.cmp(&b))
    });
    indices.truncate(k);
    indices
}
