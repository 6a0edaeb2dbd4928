//! Asynchronous engine: semantic retrieval and extractive answers.
//!
//! Lifecycle is `new` → `load` → `answer`. `load` runs once; concurrent
//! callers wait on the same in-flight load and a failed load leaves the
//! engine unloaded so the next call tries again. After a successful load the
//! embedding backfill runs in the background (or on demand with
//! [`BackfillMode::Manual`]); until it completes, retrieval ranks by token
//! overlap.
use std::sync::Arc;

use tokio::sync::OnceCell;

use kbqa_core::config::{ModelSettings, Settings};
use kbqa_core::intent::classify_intent;
use kbqa_core::knowledge::KnowledgeStore;
use kbqa_core::planner::plan_search;
use kbqa_core::taxonomy::Taxonomy;
use kbqa_core::traits::{Embedder, Extractor};
use kbqa_core::types::{ChatResponse, KnowledgeSection};
use kbqa_core::{Error, Result};
use kbqa_embed::{get_default_embedder, resolve_model_dir, QaExtractor};
use kbqa_semantic::{backfill_index, spawn_backfill, BackfillReport, IndexState, SemanticIndex, SemanticRetriever};

use crate::assembler::ResponseAssembler;
use crate::synthesis::{build_context, Synthesizer};
use crate::{topic_names, warn_unknown_pages};

pub const BACKFILL_BATCH: usize = 8;

/// Produces the two models. Both calls are blocking and run on the blocking pool.
pub trait ModelLoader: Send + Sync {
    fn load_embedder(&self) -> anyhow::Result<Arc<dyn Embedder>>;
    fn load_extractor(&self) -> anyhow::Result<Arc<dyn Extractor>>;
}

/// Loads the candle models named by [`ModelSettings`].
pub struct CandleModelLoader {
    settings: ModelSettings,
}

impl CandleModelLoader {
    pub fn new(settings: ModelSettings) -> Self {
        Self { settings }
    }
}

impl ModelLoader for CandleModelLoader {
    fn load_embedder(&self) -> anyhow::Result<Arc<dyn Embedder>> {
        Ok(Arc::from(get_default_embedder(&self.settings)?))
    }

    fn load_extractor(&self) -> anyhow::Result<Arc<dyn Extractor>> {
        let dir =
            resolve_model_dir(self.settings.qa_dir.as_deref(), "APP_QA_DIR", "distilbert-base-cased-distilled-squad")?;
        Ok(Arc::new(QaExtractor::load(&dir)?))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackfillMode {
    /// Spawn the backfill as soon as the models are loaded.
    #[default]
    Background,
    /// Leave the index empty until [`SmartEngine::run_backfill`] is called.
    Manual,
}

#[derive(Clone)]
struct Models {
    embedder: Arc<dyn Embedder>,
    extractor: Arc<dyn Extractor>,
}

pub struct SmartEngine {
    store: Arc<KnowledgeStore>,
    taxonomy: Taxonomy,
    settings: Settings,
    loader: Arc<dyn ModelLoader>,
    backfill: BackfillMode,
    index: Arc<SemanticIndex>,
    models: OnceCell<Models>,
}

impl SmartEngine {
    pub fn new(store: KnowledgeStore, taxonomy: Taxonomy, settings: Settings, loader: Arc<dyn ModelLoader>) -> Self {
        warn_unknown_pages(&taxonomy, &store);
        let index = Arc::new(SemanticIndex::new(store.len()));
        Self {
            store: Arc::new(store),
            taxonomy,
            settings,
            loader,
            backfill: BackfillMode::default(),
            index,
            models: OnceCell::new(),
        }
    }

    pub fn with_backfill_mode(mut self, mode: BackfillMode) -> Self {
        self.backfill = mode;
        self
    }

    pub fn store(&self) -> &KnowledgeStore {
        &self.store
    }

    pub fn is_loaded(&self) -> bool {
        self.models.initialized()
    }

    pub fn index_state(&self) -> IndexState {
        self.index.state()
    }

    pub fn index(&self) -> &SemanticIndex {
        &self.index
    }

    /// Resolve once the background backfill has completed or failed.
    pub async fn wait_for_index(&self) -> IndexState {
        self.index.settled().await
    }

    /// Load both models, once.
    pub async fn load(&self) -> Result<()> {
        self.models().await.map(|_| ())
    }

    async fn models(&self) -> Result<&Models> {
        self.models
            .get_or_try_init(|| async {
                tracing::info!("Loading models");
                let (a, b) = (self.loader.clone(), self.loader.clone());
                let (embedder, extractor) = futures::try_join!(
                    blocking(move || a.load_embedder()),
                    blocking(move || b.load_extractor()),
                )
                .map_err(|e| {
                    tracing::warn!(error = %e, "Model load failed");
                    Error::ModelLoad(e.to_string())
                })?;
                if self.backfill == BackfillMode::Background {
                    spawn_backfill(self.store.clone(), self.index.clone(), embedder.clone(), BACKFILL_BATCH);
                }
                tracing::info!("Models loaded");
                Ok::<_, Error>(Models { embedder, extractor })
            })
            .await
    }

    /// Fill the index now, loading the models first if needed.
    pub async fn run_backfill(&self) -> Result<BackfillReport> {
        let models = self.models().await?;
        backfill_index(self.store.clone(), self.index.clone(), models.embedder.clone(), BACKFILL_BATCH)
            .await
            .map_err(|e| Error::Inference(e.to_string()))
    }

    pub async fn answer(&self, question: &str) -> Result<ChatResponse> {
        let models = self.models().await?.clone();
        let s = &self.settings;
        let mut reasoning = vec![format!("Analyzing question: \"{question}\"")];
        let topics = classify_intent(&self.taxonomy, question);
        reasoning.push(format!("Identified topics: {}", topic_names(&self.taxonomy, &topics)));

        let steps = plan_search(&self.taxonomy, &topics);
        let retrieval = SemanticRetriever::new(&self.store, &self.index, models.embedder.clone(), &s.retrieval)
            .retrieve(question, &steps)
            .await
            .map_err(|e| Error::Inference(e.to_string()))?;
        reasoning.extend(retrieval.trail);

        let assembler = ResponseAssembler::new(&s.contact, &s.synthesis, s.retrieval.empty_confidence);
        let sections: Vec<&KnowledgeSection> = self.store.resolve(&retrieval.sections).collect();
        if sections.is_empty() {
            return Ok(assembler.not_found(reasoning));
        }
        let context = build_context(&sections);
        reasoning.push(format!("Built context from {} sections", sections.len()));

        let extractor = models.extractor.clone();
        let q = question.to_string();
        let extracted =
            blocking(move || extractor.answer(&q, &context)).await.map_err(|e| Error::Inference(e.to_string()))?;
        reasoning.push(format!("Generated answer with confidence: {:.1}%", extracted.score * 100.0));

        let synthesis = Synthesizer::new(&s.synthesis).extractive(extracted, &sections);
        if synthesis.replaced {
            reasoning.push("Using full section content due to low QA confidence".to_string());
        }
        Ok(assembler.assemble(synthesis, retrieval.confidence, &sections, reasoning))
    }
}

async fn blocking<T, F>(f: F) -> anyhow::Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> anyhow::Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f).await?
}
