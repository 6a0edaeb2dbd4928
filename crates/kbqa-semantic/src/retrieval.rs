use anyhow::Result;
use std::collections::HashSet;
use std::sync::Arc;

use kbqa_core::config::RetrievalSettings;
use kbqa_core::knowledge::KnowledgeStore;
use kbqa_core::traits::Embedder;
use kbqa_core::types::{PageId, RetrievalResult, SearchStep, SectionId};

use crate::index::SemanticIndex;
use crate::search::semantic_top_k;

/// Multi-step semantic search. Each step contributes its best few sections;
/// the loop stops once enough confident material has been gathered.
pub struct SemanticRetriever<'a> {
    store: &'a KnowledgeStore,
    index: &'a SemanticIndex,
    embedder: Arc<dyn Embedder>,
    settings: &'a RetrievalSettings,
}

impl<'a> SemanticRetriever<'a> {
    pub fn new(
        store: &'a KnowledgeStore,
        index: &'a SemanticIndex,
        embedder: Arc<dyn Embedder>,
        settings: &'a RetrievalSettings,
    ) -> Self {
        Self { store, index, embedder, settings }
    }

    /// Errors only when the embedder fails on the question.
    pub async fn retrieve(&self, question: &str, steps: &[SearchStep]) -> Result<RetrievalResult> {
        let s = self.settings;
        let mut trail = Vec::new();
        let mut gathered: Vec<SectionId> = Vec::new();
        let mut confidence: f32 = 0.0;
        let mut query: Option<Vec<f32>> = None;

        for step in steps {
            trail.push(step.reason.clone());
            let candidates = self.store.sections_for_pages(&step.pages);
            if candidates.is_empty() {
                trail.push(format!("  → No content found for {}", join_pages(&step.pages)));
                continue;
            }
            if query.is_none() && !self.index.embedded(&candidates).is_empty() {
                query = Some(self.embed_question(question).await?);
            }
            let results =
                semantic_top_k(self.index, question, query.as_deref(), &candidates, s.semantic_top_k_per_step);
            if results.is_empty() {
                continue;
            }

            let titles: Vec<&str> =
                results.iter().filter_map(|c| self.store.get(c.section)).map(|x| x.title.as_str()).collect();
            trail.push(format!("  → Found {} relevant sections: {}", results.len(), titles.join(", ")));
            gathered.extend(results.iter().map(|c| c.section));
            confidence = (confidence + s.step_confidence).min(s.max_confidence);

            if gathered.len() >= s.early_stop_sections && confidence >= s.early_stop_confidence {
                tracing::debug!(sections = gathered.len(), confidence, "early stop");
                break;
            }
        }

        let sections = self.dedupe_by_title(&gathered);
        if sections.is_empty() {
            confidence = s.empty_confidence;
        }
        Ok(RetrievalResult { sections, confidence, trail })
    }

    async fn embed_question(&self, question: &str) -> Result<Vec<f32>> {
        let embedder = self.embedder.clone();
        let text = question.to_string();
        tokio::task::spawn_blocking(move || embedder.embed(&text)).await?
    }

    /// First occurrence of each title wins, capped at the configured maximum.
    fn dedupe_by_title(&self, ids: &[SectionId]) -> Vec<SectionId> {
        let mut titles: HashSet<&str> = HashSet::new();
        self.store
            .resolve(ids)
            .filter(|sec| titles.insert(sec.title.as_str()))
            .map(|sec| sec.id)
            .take(self.settings.semantic_max_sections)
            .collect()
    }
}

fn join_pages(pages: &[PageId]) -> String {
    if pages.is_empty() {
        return "(no pages)".to_string();
    }
    pages.iter().map(PageId::as_str).collect::<Vec<_>>().join(", ")
}
