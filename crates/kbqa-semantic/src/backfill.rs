//! One-shot embedding backfill for the semantic index.
//!
//! Sections are embedded in batches on the blocking pool. Slots already
//! filled are skipped, so running the backfill twice only embeds what the
//! first run missed. The index state moves to `Complete` at the end, or to
//! `Failed` on the first embedder error.
use anyhow::{anyhow, Result};
use std::sync::Arc;
use std::time::Instant;

use kbqa_core::knowledge::KnowledgeStore;
use kbqa_core::traits::Embedder;
use kbqa_core::types::SectionId;
use tokio::task::JoinHandle;

use crate::index::{IndexState, SemanticIndex};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BackfillReport {
    pub embedded: usize,
    pub skipped: usize,
}

pub async fn backfill_index(
    store: Arc<KnowledgeStore>,
    index: Arc<SemanticIndex>,
    embedder: Arc<dyn Embedder>,
    batch_size: usize,
) -> Result<BackfillReport> {
    let started = Instant::now();
    match fill_missing(&store, &index, embedder, batch_size.max(1)).await {
        Ok(report) => {
            index.set_state(IndexState::Complete);
            tracing::info!(
                embedded = report.embedded,
                skipped = report.skipped,
                ms = started.elapsed().as_millis() as u64,
                "Embedding backfill complete"
            );
            Ok(report)
        }
        Err(e) => {
            index.set_state(IndexState::Failed(e.to_string()));
            tracing::warn!(error = %e, filled = index.filled(), "Embedding backfill failed");
            Err(e)
        }
    }
}

async fn fill_missing(
    store: &KnowledgeStore,
    index: &SemanticIndex,
    embedder: Arc<dyn Embedder>,
    batch_size: usize,
) -> Result<BackfillReport> {
    let todo: Vec<(SectionId, String)> = store
        .sections()
        .iter()
        .filter(|s| index.embedding(s.id).is_none())
        .map(|s| (s.id, s.embedding_text()))
        .collect();
    let mut report = BackfillReport { embedded: 0, skipped: store.len() - todo.len() };
    let dim = embedder.dim();

    for chunk in todo.chunks(batch_size) {
        let texts: Vec<String> = chunk.iter().map(|(_, t)| t.clone()).collect();
        let worker = embedder.clone();
        let vectors = tokio::task::spawn_blocking(move || worker.embed_batch(&texts)).await??;
        if vectors.len() != chunk.len() {
            return Err(anyhow!("embedder returned {} vectors for {} sections", vectors.len(), chunk.len()));
        }
        for ((id, _), v) in chunk.iter().zip(vectors) {
            if v.len() != dim {
                return Err(anyhow!("dim mismatch: got {} expected {}", v.len(), dim));
            }
            if index.fill(*id, v) {
                report.embedded += 1;
            } else {
                report.skipped += 1;
            }
        }
        tracing::debug!(filled = index.filled(), total = index.len(), "Backfill batch done");
    }
    Ok(report)
}

/// Run the backfill in the background. The caller may drop the handle; the
/// index state reports progress either way.
pub fn spawn_backfill(
    store: Arc<KnowledgeStore>,
    index: Arc<SemanticIndex>,
    embedder: Arc<dyn Embedder>,
    batch_size: usize,
) -> JoinHandle<Result<BackfillReport>> {
    tokio::spawn(backfill_index(store, index, embedder, batch_size))
}
