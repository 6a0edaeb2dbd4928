//! Answer pipeline on top of the retrieval strategies: synthesis, response
//! assembly and the two engines.
pub mod assembler;
pub mod keyword;
pub mod prefilter;
pub mod smart;
pub mod synthesis;

pub use assembler::ResponseAssembler;
pub use keyword::KeywordEngine;
pub use prefilter::{PreFilter, PreFiltered};
pub use smart::{BackfillMode, CandleModelLoader, ModelLoader, SmartEngine};
pub use synthesis::{Synthesis, Synthesizer};

use kbqa_core::knowledge::KnowledgeStore;
use kbqa_core::taxonomy::Taxonomy;
use kbqa_core::types::TopicId;

pub(crate) fn topic_names(taxonomy: &Taxonomy, topics: &[TopicId]) -> String {
    topics
        .iter()
        .filter_map(|id| taxonomy.get(id))
        .map(|t| t.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

pub(crate) fn warn_unknown_pages(taxonomy: &Taxonomy, store: &KnowledgeStore) {
    for page in taxonomy.unknown_pages(store) {
        tracing::warn!(%page, "topic page has no knowledge sections");
    }
}
