use anyhow::{anyhow, Result};
use std::path::Path;

use candle_core::Tensor;
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use candle_transformers::models::distilbert::{Config as DistilBertConfig, DistilBertModel};

use crate::tokenize::EncodedInput;

/// Encoder configuration read from a checkpoint's `config.json`.
#[derive(Debug, Clone)]
pub enum EncoderConfig {
    Bert(BertConfig),
    DistilBert(DistilBertConfig),
}

impl EncoderConfig {
    pub fn hidden_size(&self) -> usize {
        match self {
            Self::Bert(c) => c.hidden_size,
            Self::DistilBert(c) => c.dim,
        }
    }

    pub fn architecture(&self) -> &'static str {
        match self {
            Self::Bert(_) => "bert",
            Self::DistilBert(_) => "distilbert",
        }
    }
}

#[derive(serde::Deserialize)]
struct ModelType {
    model_type: Option<String>,
}

/// Parse `config.json`, dispatching on `model_type`. Anything other than
/// `distilbert` is read as a BERT config.
pub fn load_encoder_config(model_dir: &Path) -> Result<EncoderConfig> {
    let path = model_dir.join("config.json");
    let raw = std::fs::read_to_string(&path).map_err(|e| anyhow!("Failed to read {}: {}", path.display(), e))?;
    let ModelType { model_type } = serde_json::from_str(&raw)?;
    let config = match model_type.as_deref() {
        Some("distilbert") => EncoderConfig::DistilBert(serde_json::from_str(&raw)?),
        _ => EncoderConfig::Bert(serde_json::from_str(&raw)?),
    };
    Ok(config)
}

/// Transformer body shared by the sentence embedder and the QA extractor.
pub enum Encoder {
    Bert(BertModel),
    DistilBert(DistilBertModel),
}

impl Encoder {
    /// Weights may sit at the root or under the architecture prefix
    /// (`bert.`, `distilbert.`) as task checkpoints ship them.
    pub fn load(vb: VarBuilder, config: &EncoderConfig) -> Result<Self> {
        let encoder = match config {
            EncoderConfig::Bert(c) => {
                let model = BertModel::load(vb.pp("bert"), c).or_else(|_| BertModel::load(vb, c))?;
                Self::Bert(model)
            }
            // DistilBertModel falls back to the `<model_type>.` prefix itself.
            EncoderConfig::DistilBert(c) => Self::DistilBert(DistilBertModel::load(vb, c)?),
        };
        Ok(encoder)
    }

    /// Hidden states `[1, T, H]`. DistilBERT ignores `token_type_ids`.
    pub fn forward(&self, input: &EncodedInput) -> Result<Tensor> {
        let hidden = match self {
            Self::Bert(m) => m.forward(&input.input_ids, &input.token_type_ids, Some(&input.attention_mask))?,
            Self::DistilBert(m) => m.forward(&input.input_ids, &distilbert_mask(&input.attention_mask)?)?,
        };
        Ok(hidden)
    }
}

/// DistilBERT masks the positions where the mask is 1, the inverse of the
/// tokenizer's attention mask. Shaped `[B, 1, 1, T]` to broadcast over heads.
fn distilbert_mask(attention_mask: &Tensor) -> Result<Tensor> {
    let (b, t) = attention_mask.dims2()?;
    Ok(attention_mask.eq(0u32)?.reshape((b, 1, 1, t))?)
}
