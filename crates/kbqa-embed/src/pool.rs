use anyhow::Result;
use candle_core::{DType, Tensor};

/// Average of the token states the mask keeps, scaled to unit length.
/// `hidden` is `[B,T,H]` and `attention_mask` `[B,T]`; returns `[B,H]`.
pub fn masked_mean_l2(hidden: &Tensor, attention_mask: &Tensor) -> Result<Tensor> {
    let (batch, _, width) = hidden.dims3()?;
    let weights = attention_mask.to_device(hidden.device())?.to_dtype(hidden.dtype())?;
    let summed = hidden.broadcast_mul(&weights.unsqueeze(2)?)?.sum(1)?;
    let counts = weights.sum_keepdim(1)?;
    let mean = summed.broadcast_div(&counts)?;

    let eps = if hidden.dtype() == DType::F16 { 1e-6 } else { 1e-12 };
    let norm = (mean.sqr()?.sum_keepdim(1)?.sqrt()? + eps)?;
    let pooled = mean.broadcast_div(&norm)?;
    anyhow::ensure!(pooled.dims() == [batch, width], "unexpected pooled shape {:?}", pooled.dims());
    Ok(pooled)
}
