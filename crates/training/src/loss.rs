use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

/// Mean binary cross-entropy on raw logits.
///
/// Uses `max(x, 0) - x*y + ln(1 + e^{-|x|})`, which stays finite for large |x|.
pub fn bce_with_logits<B: Backend>(logits: Tensor<B, 2>, targets: Tensor<B, 2>) -> Tensor<B, 1> {
    let softplus_tail = logits.clone().abs().neg().exp().log1p();
    (logits.clone().clamp_min(0.0) - logits * targets + softplus_tail).mean()
}
