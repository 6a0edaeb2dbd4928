use kbqa_core::ranking::{rank_top_k, SectionScorer};
use kbqa_core::text::{count_contained, extraction_tokens};
use kbqa_core::types::{KnowledgeSection, ScoredCandidate};

use crate::index::SemanticIndex;

/// Cosine of the angle between `a` and `b`; 0 when either is all zeros.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0f32;
    let mut na = 0f32;
    let mut nb = 0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        na += x * x;
        nb += y * y;
    }
    let denom = na.sqrt() * nb.sqrt();
    if denom == 0.0 { 0.0 } else { dot / denom }
}

/// Ranks sections by similarity to the question vector. Sections without an
/// embedding are excluded.
pub struct CosineScorer<'a> {
    index: &'a SemanticIndex,
    query: &'a [f32],
}

impl<'a> CosineScorer<'a> {
    pub fn new(index: &'a SemanticIndex, query: &'a [f32]) -> Self {
        Self { index, query }
    }
}

impl SectionScorer for CosineScorer<'_> {
    fn score(&self, section: &KnowledgeSection) -> Option<f32> {
        self.index.embedding(section.id).map(|e| cosine_similarity(self.query, e))
    }
}

/// Warm-up scorer used while no candidate has an embedding: number of
/// question words (length > 3) found in the body. Every section is scored,
/// zero included.
pub struct TokenOverlapScorer {
    tokens: Vec<String>,
}

impl TokenOverlapScorer {
    pub fn new(question: &str) -> Self {
        Self { tokens: extraction_tokens(question) }
    }
}

impl SectionScorer for TokenOverlapScorer {
    fn score(&self, section: &KnowledgeSection) -> Option<f32> {
        Some(count_contained(&section.content.to_lowercase(), &self.tokens) as f32)
    }
}

/// Top `k` of `candidates`, by cosine when `query` is given and at least one
/// candidate is embedded, by token overlap otherwise.
pub fn semantic_top_k(
    index: &SemanticIndex,
    question: &str,
    query: Option<&[f32]>,
    candidates: &[&KnowledgeSection],
    k: usize,
) -> Vec<ScoredCandidate> {
    let embedded = index.embedded(candidates);
    match query {
        Some(q) if !embedded.is_empty() => rank_top_k(&CosineScorer::new(index, q), embedded, k),
        _ => rank_top_k(&TokenOverlapScorer::new(question), candidates.iter().copied(), k),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kbqa_core::types::{PageId, SectionId};

    fn section(id: usize, content: &str) -> KnowledgeSection {
        KnowledgeSection {
            id: SectionId(id),
            page: PageId::from("/"),
            title: format!("s{id}"),
            content: content.into(),
            keywords: vec![],
        }
    }

    #[test]
    fn cosine_handles_zero_vectors() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert!((cosine_similarity(&[1.0, 1.0], &[2.0, 2.0]) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cold_index_uses_token_overlap() {
        let index = SemanticIndex::new(2);
        let a = section(0, "nothing relevant");
        let b = section(1, "rooftop farms grow food");
        let ranked = semantic_top_k(&index, "Do you run rooftop farms?", Some(&[1.0, 0.0]), &[&a, &b], 2);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].section, SectionId(1));
        assert_eq!(ranked[0].score, 2.0);
    }

    #[test]
    fn warm_index_ranks_only_embedded_sections() {
        let index = SemanticIndex::new(3);
        index.fill(SectionId(0), vec![0.0, 1.0]);
        index.fill(SectionId(2), vec![1.0, 0.0]);
        let s: Vec<_> = (0..3).map(|i| section(i, "x")).collect();
        let refs: Vec<_> = s.iter().collect();
        let ranked = semantic_top_k(&index, "q", Some(&[1.0, 0.1]), &refs, 3);
        let ids: Vec<usize> = ranked.iter().map(|c| c.section.0).collect();
        assert_eq!(ids, vec![2, 0]);
    }
}
