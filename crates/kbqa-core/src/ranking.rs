//! The "top-K by score" contract shared by every retrieval strategy.

use crate::types::{KnowledgeSection, ScoredCandidate};

/// Scores sections against one question, captured when the scorer is built.
/// `None` excludes the section from the ranking altogether (e.g. it has no
/// embedding yet).
pub trait SectionScorer {
    fn score(&self, section: &KnowledgeSection) -> Option<f32>;
}

/// Sort descending by score. Equal scores keep their encounter order.
pub fn sort_by_score(candidates: &mut [ScoredCandidate]) {
    // `sort_by` is stable, which is what keeps ties in declaration order.
    candidates.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
}

/// Score every section, rank and keep the best `k`.
pub fn rank_top_k<'a, S, I>(scorer: &S, sections: I, k: usize) -> Vec<ScoredCandidate>
where
    S: SectionScorer + ?Sized,
    I: IntoIterator<Item = &'a KnowledgeSection>,
{
    let mut scored: Vec<ScoredCandidate> = sections
        .into_iter()
        .filter_map(|s| scorer.score(s).map(|score| ScoredCandidate { section: s.id, score }))
        .collect();
    sort_by_score(&mut scored);
    scored.truncate(k);
    scored
}
