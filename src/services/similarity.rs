use crate::models::{FeatureKind, FeatureTable, FeatureVector};

/// Cosine similarity. A zero vector on either side scores 0.
pub fn cosine(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len(), "vectors must share one feature index");

    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let denominator = l2_norm(a) * l2_norm(b);
    if denominator == 0.0 {
        0.0
    } else {
        dot / denominator
    }
}

pub fn l2_norm(values: &[f64]) -> f64 {
    values.iter().map(|v| v * v).sum::<f64>().sqrt()
}

/// Jaccard similarity of two presence vectors (nonzero = present).
/// Two empty sets score 0.
pub fn jaccard(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len(), "vectors must share one feature index");

    let (intersection, union) = a.iter().zip(b).fold((0usize, 0usize), |(i, u), (x, y)| {
        let (x, y) = (*x != 0.0, *y != 0.0);
        (i + usize::from(x && y), u + usize::from(x || y))
    });

    if union == 0 {
        0.0
    } else {
        intersection as f64 / union as f64
    }
}

/// Language similarity of each candidate column against the user.
///
/// Both sides are binarized over the shared language index, then the user
/// vector is centered on its own mean. Without centering, "candidate uses a
/// language the user doesn't" and "neither uses it" both contribute 0; with
/// it, the former pulls the score below the latter. Scores are not
/// normalized and may be negative.
pub fn language_similarity(user: &FeatureVector, candidates: &FeatureTable) -> Vec<f64> {
    let aligned = candidates
        .align(user)
        .restrict(FeatureKind::Language)
        .binarized();

    let mut centered = aligned.user.clone();
    if !centered.is_empty() {
        let mean = centered.iter().sum::<f64>() / centered.len() as f64;
        for value in &mut centered {
            *value -= mean;
        }
    }

    aligned
        .columns
        .iter()
        .map(|column| cosine(column, &centered))
        .collect()
}

/// Jaccard similarity of each candidate's topic set against the user's
pub fn topic_similarity(user: &FeatureVector, candidates: &FeatureTable) -> Vec<f64> {
    let aligned = candidates
        .align(user)
        .restrict(FeatureKind::Topic)
        .binarized();

    aligned
        .columns
        .iter()
        .map(|column| jaccard(column, &aligned.user))
        .collect()
}
