use kbqa_core::types::{ChatResponse, ResponseSource};

/// Answer produced before retrieval runs, e.g. a greeting or a curated FAQ hit.
#[derive(Debug, Clone, PartialEq)]
pub struct PreFiltered {
    pub answer: String,
    pub source: ResponseSource,
}

/// Short-circuits trivial questions ahead of the pipeline.
pub trait PreFilter: Send + Sync {
    fn check(&self, question: &str) -> Option<PreFiltered>;
}

impl From<PreFiltered> for ChatResponse {
    fn from(p: PreFiltered) -> Self {
        ChatResponse { answer: p.answer, confidence: 1.0, reasoning: Vec::new(), sources: Vec::new(), source: p.source }
    }
}
