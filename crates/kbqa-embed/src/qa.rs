use anyhow::{anyhow, Result};
use std::path::Path;

use candle_core::{Device, Module};
use candle_nn::{Linear, VarBuilder};
use candle_transformers::models::bert::DTYPE;
use tokenizers::Tokenizer;

use kbqa_core::traits::{ExtractedAnswer, Extractor};

use crate::encoder::{load_encoder_config, Encoder};
use crate::{device, load_tokenizer, load_weights, tokenize};

pub const QA_MAX_LEN: usize = 384;
pub const MAX_ANSWER_TOKENS: usize = 30;

/// Extractive QA over a BERT or DistilBERT encoder with a `qa_outputs`
/// span head, the layout of `BertForQuestionAnswering` and
/// `DistilBertForQuestionAnswering` checkpoints.
pub struct QaExtractor {
    encoder: Encoder,
    qa_outputs: Linear,
    tokenizer: Tokenizer,
    device: Device,
}

impl QaExtractor {
    pub fn load(model_dir: &Path) -> Result<Self> {
        let device = device::select_device();
        let tokenizer = load_tokenizer(model_dir)?;
        let config = load_encoder_config(model_dir)?;
        tracing::info!(dir = %model_dir.display(), arch = config.architecture(), "Loading QA model");
        let vb = VarBuilder::from_tensors(load_weights(model_dir, &device)?, DTYPE, &device);
        let encoder = Encoder::load(vb.clone(), &config)?;
        let qa_outputs = candle_nn::linear(config.hidden_size(), 2, vb.pp("qa_outputs"))?;
        Ok(Self { encoder, qa_outputs, tokenizer, device })
    }

    fn logits(&self, ids: &[u32], type_ids: &[u32], mask: &[u32]) -> Result<(Vec<f32>, Vec<f32>)> {
        let input = tokenize::to_tensors(ids, type_ids, mask, &self.device)?;
        let hidden = self.encoder.forward(&input)?;
        let rows: Vec<Vec<f32>> = self.qa_outputs.forward(&hidden)?.squeeze(0)?.to_device(&Device::Cpu)?.to_vec2()?;
        let start = rows.iter().map(|r| r[0]).collect();
        let end = rows.iter().map(|r| r[1]).collect();
        Ok((start, end))
    }
}

impl Extractor for QaExtractor {
    fn answer(&self, question: &str, context: &str) -> Result<ExtractedAnswer> {
        if context.trim().is_empty() {
            return Ok(ExtractedAnswer { answer: String::new(), score: 0.0 });
        }
        let enc = self.tokenizer.encode((question, context), true).map_err(|e| anyhow!("Tokenization failed: {}", e))?;
        let len = enc.get_ids().len().min(QA_MAX_LEN);
        let ids = &enc.get_ids()[..len];
        let type_ids = &enc.get_type_ids()[..len];
        let mask = &enc.get_attention_mask()[..len];
        let is_context: Vec<bool> = enc.get_sequence_ids()[..len].iter().map(|s| *s == Some(1)).collect();
        let offsets = &enc.get_offsets()[..len];

        let (start, end) = self.logits(ids, type_ids, mask)?;
        let Some((s, e, score)) = best_span(&start, &end, &is_context, MAX_ANSWER_TOKENS) else {
            return Ok(ExtractedAnswer { answer: String::new(), score: 0.0 });
        };
        let answer = context.get(offsets[s].0..offsets[e].1).unwrap_or_default().trim().to_string();
        tracing::debug!(score, tokens = e + 1 - s, "QA span selected");
        Ok(ExtractedAnswer { answer, score })
    }
}

/// Best `(start, end, probability)` span over context tokens. Start and end
/// probabilities are softmaxed over the context positions only; the span
/// score is their product, with `start <= end` and at most `max_tokens` long.
pub fn best_span(start: &[f32], end: &[f32], is_context: &[bool], max_tokens: usize) -> Option<(usize, usize, f32)> {
    let n = start.len().min(end.len()).min(is_context.len());
    let ps = context_softmax(&start[..n], &is_context[..n])?;
    let pe = context_softmax(&end[..n], &is_context[..n])?;
    let mut best: Option<(usize, usize, f32)> = None;
    for s in (0..n).filter(|&i| is_context[i]) {
        for e in (s..n.min(s + max_tokens.max(1))).filter(|&i| is_context[i]) {
            let score = ps[s] * pe[e];
            if best.map_or(true, |(_, _, b)| score > b) {
                best = Some((s, e, score));
            }
        }
    }
    best
}

fn context_softmax(logits: &[f32], is_context: &[bool]) -> Option<Vec<f32>> {
    let max = logits.iter().zip(is_context).filter(|(_, c)| **c).map(|(l, _)| *l).fold(f32::NEG_INFINITY, f32::max);
    if !max.is_finite() {
        return None;
    }
    let exp: Vec<f32> = logits.iter().zip(is_context).map(|(l, c)| if *c { (l - max).exp() } else { 0.0 }).collect();
    let total: f32 = exp.iter().sum();
    Some(exp.into_iter().map(|x| x / total).collect())
}
