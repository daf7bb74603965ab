//! Scoring and ranking of embedded candidates against a query vector.

use crate::driver::StoredNode;
use crate::search::results::ScoredResult;
use crate::utils::cosine_similarity;

/// Minimum-score rule applied to candidates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cutoff {
    /// Keep scores strictly greater than the bound.
    Above(f32),
    /// Keep scores greater than or equal to the bound.
    AtLeast(f32),
}

impl Cutoff {
    pub fn admits(self, score: f32) -> bool {
        match self {
            Cutoff::Above(bound) => score > bound,
            Cutoff::AtLeast(bound) => score >= bound,
        }
    }
}

/// Score every candidate against `query`, drop those the cutoff rejects,
/// order best first and keep at most `limit`.
///
/// The sort is stable, so equal scores stay in store order. Candidates
/// without an embedding score `0.0` like any other mismatch.
pub fn rank(
    query: &[f32],
    candidates: Vec<StoredNode>,
    cutoff: Cutoff,
    limit: usize,
) -> Vec<ScoredResult> {
    let mut scored: Vec<ScoredResult> = candidates
        .into_iter()
        .filter_map(|candidate| {
            let score = candidate
                .node
                .embedding()
                .map_or(0.0, |embedding| cosine_similarity(query, embedding));
            cutoff
                .admits(score)
                .then(|| ScoredResult::semantic(candidate, score))
        })
        .collect();

    scored.sort_by(|a, b| b.similarity_score.total_cmp(&a.similarity_score));
    scored.truncate(limit);
    scored
}
