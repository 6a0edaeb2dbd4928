use std::sync::OnceLock;

use tokio::sync::watch;

use kbqa_core::types::{KnowledgeSection, SectionId};

/// Progress of the background embedding fill.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexState {
    Pending,
    Complete,
    /// The backfill stopped early; sections filled before the error keep their vectors.
    Failed(String),
}

impl IndexState {
    pub fn is_settled(&self) -> bool {
        !matches!(self, IndexState::Pending)
    }
}

/// One embedding slot per store section, indexed by `SectionId`.
///
/// Each slot transitions once from empty to filled; a second fill of the same
/// slot is a no-op and never changes the stored vector.
pub struct SemanticIndex {
    slots: Vec<OnceLock<Vec<f32>>>,
    state: watch::Sender<IndexState>,
}

impl SemanticIndex {
    pub fn new(sections: usize) -> Self {
        let (state, _) = watch::channel(IndexState::Pending);
        Self { slots: (0..sections).map(|_| OnceLock::new()).collect(), state }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn embedding(&self, id: SectionId) -> Option<&[f32]> {
        self.slots.get(id.0).and_then(|s| s.get()).map(Vec::as_slice)
    }

    /// Store `vector` for `id` unless already present. Returns whether this
    /// call filled the slot.
    pub fn fill(&self, id: SectionId, vector: Vec<f32>) -> bool {
        match self.slots.get(id.0) {
            Some(slot) => slot.set(vector).is_ok(),
            None => {
                tracing::warn!(section = id.0, "fill for section outside the index");
                false
            }
        }
    }

    pub fn filled(&self) -> usize {
        self.slots.iter().filter(|s| s.get().is_some()).count()
    }

    /// Sections of `candidates` that already carry an embedding.
    pub fn embedded<'a>(&self, candidates: &[&'a KnowledgeSection]) -> Vec<&'a KnowledgeSection> {
        candidates.iter().copied().filter(|s| self.embedding(s.id).is_some()).collect()
    }

    pub fn state(&self) -> IndexState {
        self.state.borrow().clone()
    }

    pub fn set_state(&self, state: IndexState) {
        tracing::debug!(?state, filled = self.filled(), "index state");
        self.state.send_replace(state);
    }

    pub fn subscribe(&self) -> watch::Receiver<IndexState> {
        self.state.subscribe()
    }

    /// Resolve once the index is complete or failed.
    pub async fn settled(&self) -> IndexState {
        let mut rx = self.subscribe();
        let result = match rx.wait_for(IndexState::is_settled).await {
            Ok(state) => state.clone(),
            // the sender lives in `self`, so it cannot be dropped while we wait
            Err(_) => self.state(),
        };
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_is_one_shot() {
        let index = SemanticIndex::new(2);
        assert!(index.fill(SectionId(1), vec![1.0, 0.0]));
        assert!(!index.fill(SectionId(1), vec![0.0, 1.0]));
        assert_eq!(index.embedding(SectionId(1)), Some(&[1.0, 0.0][..]));
        assert_eq!(index.embedding(SectionId(0)), None);
        assert_eq!(index.filled(), 1);
    }

    #[test]
    fn out_of_range_fill_is_ignored() {
        let index = SemanticIndex::new(1);
        assert!(!index.fill(SectionId(5), vec![1.0]));
        assert_eq!(index.filled(), 0);
    }

    #[tokio::test]
    async fn settled_resolves_after_state_change() {
        let index = std::sync::Arc::new(SemanticIndex::new(0));
        let waiter = {
            let index = index.clone();
            tokio::spawn(async move { index.settled().await })
        };
        tokio::task::yield_now().await;
        index.set_state(IndexState::Complete);
        assert_eq!(waiter.await.unwrap(), IndexState::Complete);
    }
}
