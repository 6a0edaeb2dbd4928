//! Model backends for the capability traits in `kbqa-core`. The sentence
//! embedder and the extractive QA model run on BERT or DistilBERT encoders;
//! a deterministic hashing embedder covers tests and development.
use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use candle_core::{Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::DTYPE;
use tokenizers::Tokenizer;

use kbqa_core::config::{expand_path, ModelSettings};
use kbqa_core::traits::Embedder;

pub mod device;
pub mod encoder;
pub mod pool;
pub mod qa;
pub mod tokenize;

pub use encoder::{load_encoder_config, Encoder, EncoderConfig};
pub use pool::masked_mean_l2;
pub use qa::{best_span, QaExtractor};

const EMBED_MAX_LEN: usize = 256;

/// Sentence encoder (e.g. all-MiniLM-L6-v2): masked mean pooling followed by
/// L2 normalization.
pub struct SentenceEmbedder {
    encoder: Encoder,
    tokenizer: Tokenizer,
    device: Device,
    dim: usize,
}

impl SentenceEmbedder {
    pub fn load(model_dir: &Path) -> Result<Self> {
        let device = device::select_device();
        tracing::info!(dir = %model_dir.display(), "Loading sentence embedder");
        let tokenizer = load_tokenizer(model_dir)?;
        let config = load_encoder_config(model_dir)?;
        let dim = config.hidden_size();
        let vb = VarBuilder::from_tensors(load_weights(model_dir, &device)?, DTYPE, &device);
        let encoder = Encoder::load(vb, &config)?;
        tracing::info!(dim, arch = config.architecture(), "Sentence embedder loaded");
        Ok(Self { encoder, tokenizer, device, dim })
    }

    pub fn embed_text(&self, text: &str) -> Result<Vec<f32>> {
        let start = Instant::now();
        let input = tokenize::tokenize_on_device(&self.tokenizer, text, EMBED_MAX_LEN, &self.device)?;
        let hidden = self.encoder.forward(&input)?;
        let pooled = masked_mean_l2(&hidden, &input.attention_mask)?;
        let emb: Vec<f32> = pooled.to_device(&Device::Cpu)?.squeeze(0)?.to_vec1()?;
        if emb.len() != self.dim {
            return Err(anyhow!("expected {} dims, model produced {}", self.dim, emb.len()));
        }
        if start.elapsed().as_millis() > 100 {
            tracing::warn!(ms = start.elapsed().as_millis() as u64, "Slow embedding");
        }
        Ok(emb)
    }
}

impl Embedder for SentenceEmbedder {
    fn dim(&self) -> usize {
        self.dim
    }

    fn max_len(&self) -> usize {
        EMBED_MAX_LEN
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed_text(t)).collect()
    }
}

/// Deterministic bag-of-tokens embedder: each whitespace token is hashed into
/// a bucket. Equal texts embed identically and shared tokens raise cosine
/// similarity, which is enough for tests and offline development.
pub struct HashingEmbedder {
    dim: usize,
}

impl HashingEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim: dim.max(1) }
    }

    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        use std::hash::{Hash, Hasher};
        use twox_hash::XxHash64;
        let mut v = vec![0f32; self.dim];
        let lower = text.to_lowercase();
        for token in lower.split(|c: char| !c.is_alphanumeric()).filter(|t| !t.is_empty()) {
            let mut hasher = XxHash64::with_seed(0);
            token.hash(&mut hasher);
            let h = hasher.finish();
            let idx = (h as usize) % self.dim;
            v[idx] += 0.5 + (((h >> 32) as u32) as f32) / (u32::MAX as f32);
        }
        let norm = (v.iter().map(|x| x * x).sum::<f32>()).sqrt().max(1e-6);
        for x in &mut v {
            *x /= norm;
        }
        v
    }
}

impl Embedder for HashingEmbedder {
    fn dim(&self) -> usize {
        self.dim
    }

    fn max_len(&self) -> usize {
        usize::MAX
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }
}

pub const FAKE_EMBEDDING_DIM: usize = 384;

fn use_fake_embeddings(settings: &ModelSettings) -> bool {
    settings.use_fake_embeddings
        || std::env::var("APP_USE_FAKE_EMBEDDINGS")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
}

/// Embedder selected by settings: the hashing embedder when fake embeddings
/// are requested, otherwise the sentence encoder from the resolved model dir.
pub fn get_default_embedder(settings: &ModelSettings) -> Result<Box<dyn Embedder>> {
    if use_fake_embeddings(settings) {
        tracing::info!("Using HashingEmbedder");
        return Ok(Box::new(HashingEmbedder::new(FAKE_EMBEDDING_DIM)));
    }
    let dir = resolve_model_dir(settings.embedder_dir.as_deref(), "APP_EMBEDDER_DIR", "all-MiniLM-L6-v2")?;
    Ok(Box::new(SentenceEmbedder::load(&dir)?))
}

/// Locate a model directory: explicit setting, then `env_var`, then
/// `../models/<name>` and `models/<name>`.
pub fn resolve_model_dir(configured: Option<&str>, env_var: &str, name: &str) -> Result<PathBuf> {
    if let Some(dir) = configured {
        let p = expand_path(dir);
        if p.exists() {
            tracing::info!("Using configured model dir: {}", p.display());
            return Ok(p);
        }
        return Err(anyhow!("Configured model directory {} does not exist", p.display()));
    }
    if let Ok(dir) = std::env::var(env_var) {
        let p = expand_path(&dir);
        if p.exists() {
            tracing::info!("Using {}: {}", env_var, p.display());
            return Ok(p);
        }
    }
    for candidate in [Path::new("../models").join(name), Path::new("models").join(name)] {
        if candidate.exists() {
            tracing::info!("Using model dir: {}", candidate.display());
            return Ok(candidate);
        }
    }
    Err(anyhow!("Could not locate model directory for {}", name))
}

pub(crate) fn load_tokenizer(model_dir: &Path) -> Result<Tokenizer> {
    let tokenizer_path = model_dir.join("tokenizer.json");
    Tokenizer::from_file(&tokenizer_path)
        .map_err(|e| anyhow!("Failed to load tokenizer from {}: {}", tokenizer_path.display(), e))
}

/// Load `model.safetensors`, or `pytorch_model.bin` when only the pickle is shipped.
pub(crate) fn load_weights(model_dir: &Path, device: &Device) -> Result<HashMap<String, Tensor>> {
    let safetensors = model_dir.join("model.safetensors");
    if safetensors.exists() {
        return Ok(candle_core::safetensors::load(&safetensors, device)?);
    }
    let pickle = model_dir.join("pytorch_model.bin");
    if pickle.exists() {
        let weights = candle_core::pickle::read_all(&pickle)?;
        return weights
            .into_iter()
            .map(|(name, t)| Ok((name, t.to_device(device)?)))
            .collect();
    }
    Err(anyhow!("No model.safetensors or pytorch_model.bin in {}", model_dir.display()))
}
