//! Similarity ranking over filtered candidates.
//!
//! Two branches share one entry point: with a query vector, candidates
//! are scored by cosine similarity against their stored vectors; without
//! one, ordering falls back to recency. Both branches are pure and
//! deterministic for a given input.

use std::cmp::Ordering;

use pgvector::Vector;
use tracing::debug;

use noteworks_core::{CandidateNote, RankedNote};

/// Cosine similarity between two vectors.
///
/// Returns a value in `[-1, 1]`. A zero-magnitude vector on either side
/// yields 0 rather than dividing by zero.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let magnitude_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let magnitude_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if magnitude_a == 0.0 || magnitude_b == 0.0 {
        return 0.0;
    }

    // Rounding can push the ratio a hair past 1.0; keep scores in range.
    (dot / (magnitude_a * magnitude_b)).clamp(-1.0, 1.0)
}

/// Rank candidates and truncate to the result cap.
///
/// With a query vector, only candidates holding a fresh stored vector are
/// scored; stale and absent vectors drop out of the semantic branch. A
/// degenerate all-zero stored vector scores 0 but stays in the list.
/// Without a query vector every candidate survives, ordered by recency,
/// with no score attached.
///
/// Ties are broken by creation time descending, then id descending, so
/// repeated runs over an unchanged corpus return the same order.
pub fn rank_candidates(
    query_vector: Option<&Vector>,
    candidates: Vec<CandidateNote>,
    limit: usize,
) -> Vec<RankedNote> {
    let candidate_count = candidates.len();

    let mut ranked: Vec<RankedNote> = match query_vector {
        Some(query) => candidates
            .into_iter()
            .filter_map(|candidate| {
                let score = candidate
                    .fresh_vector()
                    .map(|vector| cosine_similarity(query.as_slice(), vector.as_slice()))?;
                Some(RankedNote {
                    note: candidate.note,
                    score: Some(score),
                })
            })
            .collect(),
        None => candidates
            .into_iter()
            .map(|candidate| RankedNote {
                note: candidate.note,
                score: None,
            })
            .collect(),
    };

    ranked.sort_by(compare_ranked);
    ranked.truncate(limit);

    debug!(
        candidate_count,
        result_count = ranked.len(),
        semantic = query_vector.is_some(),
        "Ranking complete"
    );

    ranked
}

fn compare_ranked(a: &RankedNote, b: &RankedNote) -> Ordering {
    b.score
        .partial_cmp(&a.score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| b.note.created_at.cmp(&a.note.created_at))
        .then_with(|| b.note.id.cmp(&a.note.id))
}
