//! Similarity scoring and ranking of stored embeddings

use tracing::warn;

use crate::data::{ScoredResult, StoredEmbedding};
use crate::services::messages::SearchOptions;

/// Cosine similarity of two vectors, computed in f64.
///
/// Returns `None` when the lengths differ, either vector is empty or either
/// has zero magnitude.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f64> {
    if a.len() != b.len() || a.is_empty() {
        return None;
    }

    let (mut dot, mut norm_a, mut norm_b) = (0.0f64, 0.0f64, 0.0f64);
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return None;
    }

    Some(dot / (norm_a.sqrt() * norm_b.sqrt()))
}

/// Scores every candidate against `query`, keeps the `top_n` best and then
/// drops those not strictly above `min_score`.
///
/// The sort is stable, so equal scores keep the order the store returned
/// them in. Candidates that cannot be scored are skipped. The threshold is
/// checked against the full-precision score; results carry it as f32.
pub fn rank_candidates(query: &[f32], candidates: Vec<StoredEmbedding>, options: &SearchOptions) -> Vec<ScoredResult> {
    let mut scored: Vec<(ScoredResult, f64)> = candidates
        .into_iter()
        .filter_map(|candidate| match cosine_similarity(query, &candidate.embedding) {
            Some(exact) if exact.is_finite() => Some((
                ScoredResult {
                    record_id: candidate.record_id,
                    score: exact as f32,
                },
                exact,
            )),
            _ => {
                warn!(
                    record_id = %candidate.record_id,
                    dimensions = candidate.embedding.len(),
                    expected = query.len(),
                    "Skipping candidate that cannot be scored"
                );
                None
            }
        })
        .collect();

    // Order by the reported score so ties in the output stay in store order
    scored.sort_by(|(a, _), (b, _)| b.score.total_cmp(&a.score));
    scored.truncate(options.top_n);

    let min_score = f64::from(options.min_score);
    scored
        .into_iter()
        .filter(|(_, exact)| *exact > min_score)
        .map(|(result, _)| result)
        .collect()
}
