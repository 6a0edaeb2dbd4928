use anyhow::{anyhow, Result};
use candle_core::{Device, Tensor};
use tokenizers::Tokenizer;

/// Model inputs for a single sequence: `(input_ids, token_type_ids, attention_mask)`, each `[1,T]`.
pub struct EncodedInput {
    pub input_ids: Tensor,
    pub token_type_ids: Tensor,
    pub attention_mask: Tensor,
}

/// Encode `text`, truncated to `max_len` tokens. No padding: batches are a
/// single sequence.
pub fn tokenize_on_device(tokenizer: &Tokenizer, text: &str, max_len: usize, device: &Device) -> Result<EncodedInput> {
    let enc = tokenizer.encode(text, true).map_err(|e| anyhow!("Tokenization failed: {}", e))?;
    let mut ids = enc.get_ids().to_vec();
    let mut type_ids = enc.get_type_ids().to_vec();
    let mut mask = enc.get_attention_mask().to_vec();
    ids.truncate(max_len);
    type_ids.truncate(max_len);
    mask.truncate(max_len);
    to_tensors(&ids, &type_ids, &mask, device)
}

pub fn to_tensors(ids: &[u32], type_ids: &[u32], mask: &[u32], device: &Device) -> Result<EncodedInput> {
    Ok(EncodedInput {
        input_ids: Tensor::new(ids, device)?.unsqueeze(0)?,
        token_type_ids: Tensor::new(type_ids, device)?.unsqueeze(0)?,
        attention_mask: Tensor::new(mask, device)?.unsqueeze(0)?,
    })
}
