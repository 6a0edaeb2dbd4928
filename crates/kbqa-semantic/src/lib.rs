//! Semantic retrieval: an owned per-section embedding index filled once by a
//! background task, cosine ranking over it, and the multi-step search loop.
pub mod backfill;
pub mod index;
pub mod retrieval;
pub mod search;

pub use backfill::{backfill_index, spawn_backfill, BackfillReport};
pub use index::{IndexState, SemanticIndex};
pub use retrieval::SemanticRetriever;
pub use search::{cosine_similarity, semantic_top_k, CosineScorer, TokenOverlapScorer};
