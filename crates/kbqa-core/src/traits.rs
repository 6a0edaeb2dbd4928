use serde::{Deserialize, Serialize};

/// Maps text to a fixed-length vector. Implementations return L2-normalized
/// vectors of `dim()` components.
pub trait Embedder: Send + Sync {
    fn dim(&self) -> usize;
    fn max_len(&self) -> usize;
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;

    fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        self.embed_batch(&[text.to_string()])?
            .pop()
            .ok_or_else(|| anyhow::anyhow!("embedder returned no vector"))
    }
}

/// Answer span pulled out of a context, with the model's score in [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedAnswer {
    pub answer: String,
    pub score: f32,
}

/// Extractive question answering over a single context string.
pub trait Extractor: Send + Sync {
    fn answer(&self, question: &str, context: &str) -> anyhow::Result<ExtractedAnswer>;
}
