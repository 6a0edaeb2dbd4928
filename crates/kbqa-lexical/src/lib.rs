//! Keyword-overlap retrieval over the Knowledge Store.
pub mod scoring;
pub mod search;

pub use scoring::{BroadScorer, KeywordScorer, SPECIAL_KEYWORDS};
pub use search::LexicalRetriever;
