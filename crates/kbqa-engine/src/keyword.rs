use kbqa_core::config::Settings;
use kbqa_core::intent::classify_intent;
use kbqa_core::knowledge::KnowledgeStore;
use kbqa_core::planner::plan_search;
use kbqa_core::taxonomy::Taxonomy;
use kbqa_core::types::{ChatResponse, KnowledgeSection};
use kbqa_lexical::LexicalRetriever;

use crate::assembler::ResponseAssembler;
use crate::prefilter::PreFilter;
use crate::synthesis::Synthesizer;
use crate::{topic_names, warn_unknown_pages};

/// Synchronous keyword-only engine: lexical retrieval and heuristic synthesis.
pub struct KeywordEngine {
    store: KnowledgeStore,
    taxonomy: Taxonomy,
    settings: Settings,
    prefilter: Option<Box<dyn PreFilter>>,
}

impl KeywordEngine {
    pub fn new(store: KnowledgeStore, taxonomy: Taxonomy, settings: Settings) -> Self {
        warn_unknown_pages(&taxonomy, &store);
        Self { store, taxonomy, settings, prefilter: None }
    }

    pub fn with_prefilter(mut self, prefilter: Box<dyn PreFilter>) -> Self {
        self.prefilter = Some(prefilter);
        self
    }

    pub fn store(&self) -> &KnowledgeStore {
        &self.store
    }

    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    /// Pre-filter first, then the full pipeline.
    pub fn respond(&self, question: &str) -> ChatResponse {
        if let Some(hit) = self.prefilter.as_ref().and_then(|p| p.check(question)) {
            tracing::debug!(source = ?hit.source, "pre-filter answered");
            return hit.into();
        }
        self.answer(question)
    }

    pub fn answer(&self, question: &str) -> ChatResponse {
        let s = &self.settings;
        let mut reasoning = vec![format!("Analyzing question: \"{question}\"")];
        let topics = classify_intent(&self.taxonomy, question);
        reasoning.push(format!("Identified topics: {}", topic_names(&self.taxonomy, &topics)));

        let steps = plan_search(&self.taxonomy, &topics);
        let retrieval = LexicalRetriever::new(&self.store, &s.retrieval).retrieve(question, &steps);
        reasoning.extend(retrieval.trail);

        let assembler = ResponseAssembler::new(&s.contact, &s.synthesis, s.retrieval.empty_confidence);
        let sections: Vec<&KnowledgeSection> = self.store.resolve(&retrieval.sections).collect();
        if sections.is_empty() {
            return assembler.not_found(reasoning);
        }
        reasoning.push(format!("Built context from {} sections", sections.len()));

        let synthesis = Synthesizer::new(&s.synthesis).heuristic(question, &sections);
        reasoning.push(format!("Extracted answer with confidence: {:.1}%", synthesis.confidence * 100.0));
        if synthesis.replaced {
            reasoning.push("Using full section content due to low answer confidence".to_string());
        }
        assembler.assemble(synthesis, retrieval.confidence, &sections, reasoning)
    }
}
