use std::collections::HashSet;

use kbqa_core::config::RetrievalSettings;
use kbqa_core::knowledge::KnowledgeStore;
use kbqa_core::ranking::{sort_by_score, SectionScorer};
use kbqa_core::types::{PageId, RetrievalResult, ScoredCandidate, SearchStep, SectionId};

use crate::scoring::{BroadScorer, KeywordScorer};

/// Runs a search plan against the store with keyword scoring, broadening to
/// every section when the plan finds nothing.
pub struct LexicalRetriever<'a> {
    store: &'a KnowledgeStore,
    settings: &'a RetrievalSettings,
}

impl<'a> LexicalRetriever<'a> {
    pub fn new(store: &'a KnowledgeStore, settings: &'a RetrievalSettings) -> Self {
        Self { store, settings }
    }

    pub fn retrieve(&self, question: &str, steps: &[SearchStep]) -> RetrievalResult {
        let mut trail = Vec::new();
        let mut kept: Vec<ScoredCandidate> = Vec::new();
        let mut seen: HashSet<SectionId> = HashSet::new();
        let mut confidence: f32 = 0.0;

        let scorer = KeywordScorer::new(question);
        for step in steps {
            trail.push(step.reason.clone());
            let sections = self.store.sections_for_pages(&step.pages);
            if sections.is_empty() {
                trail.push(format!("  → No content found for {}", join_pages(&step.pages)));
                continue;
            }
            let mut found = Vec::new();
            for section in sections {
                if seen.contains(&section.id) {
                    continue;
                }
                if let Some(score) = scorer.score(section) {
                    seen.insert(section.id);
                    found.push((ScoredCandidate { section: section.id, score }, section.title.as_str()));
                }
            }
            if found.is_empty() {
                trail.push(format!("  → No matching sections on {}", join_pages(&step.pages)));
                continue;
            }
            let titles: Vec<&str> = found.iter().map(|(_, t)| *t).collect();
            trail.push(format!("  → Found {} candidate sections: {}", found.len(), titles.join(", ")));
            kept.extend(found.into_iter().map(|(c, _)| c));
            confidence = (confidence + self.settings.step_confidence).min(self.settings.max_confidence);
        }

        if kept.is_empty() {
            trail.push("Planned search found nothing, broadening to every section".to_string());
            kept = self.broad_search(question);
            if kept.is_empty() {
                trail.push("  → Broad search found nothing".to_string());
            } else {
                trail.push(format!("  → Broad search found {} candidate sections", kept.len()));
                confidence = self.settings.step_confidence.min(self.settings.max_confidence);
            }
        }

        sort_by_score(&mut kept);
        kept.truncate(self.settings.lexical_top_k);
        if kept.is_empty() {
            confidence = self.settings.empty_confidence;
        }
        tracing::debug!(sections = kept.len(), confidence, "lexical retrieval done");

        RetrievalResult { sections: kept.into_iter().map(|c| c.section).collect(), confidence, trail }
    }

    /// Store-wide pass, ignoring the plan.
    pub fn broad_search(&self, question: &str) -> Vec<ScoredCandidate> {
        let scorer = BroadScorer::new(question, self.settings.broad_min_score);
        self.store
            .sections()
            .iter()
            .filter_map(|s| scorer.score(s).map(|score| ScoredCandidate { section: s.id, score }))
            .collect()
    }
}

pub(crate) fn join_pages(pages: &[PageId]) -> String {
    if pages.is_empty() {
        return "(no pages)".to_string();
    }
    pages.iter().map(PageId::as_str).collect::<Vec<_>>().join(", ")
}
