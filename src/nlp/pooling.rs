//! Attention-masked mean pooling over token hidden states.

use anyhow::{ensure, Result};
use ndarray::{Array2, ArrayView2, ArrayView3};

/// Lower bound on the token count used as divisor.
pub const MIN_TOKEN_COUNT: f32 = 1e-13;

/// Mean of `hidden[b, t, :]` over the positions where `mask[b, t]` is set.
///
/// Rows whose mask is entirely false come out as zero vectors.
pub fn masked_mean(hidden: ArrayView3<'_, f32>, mask: ArrayView2<'_, bool>) -> Result<Array2<f32>> {
    let (batch, tokens, width) = hidden.dim();
    ensure!(
        mask.dim() == (batch, tokens),
        "mask shape {:?} does not match hidden states {:?}",
        mask.dim(),
        (batch, tokens)
    );

    let mut pooled = Array2::<f32>::zeros((batch, width));
    for ((sequence, keep), mut row) in hidden
        .outer_iter()
        .zip(mask.outer_iter())
        .zip(pooled.outer_iter_mut())
    {
        let mut count = 0usize;
        for (token, _) in sequence.outer_iter().zip(keep.iter()).filter(|(_, keep)| **keep) {
            row += &token;
            count += 1;
        }
        row /= (count as f32).max(MIN_TOKEN_COUNT);
    }
    Ok(pooled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array3};

    #[test]
    fn ignores_padding_positions() {
        let hidden = array![[[1.0f32, 2.0], [3.0, 4.0], [100.0, 100.0]]];
        let mask = array![[true, true, false]];
        let pooled = masked_mean(hidden.view(), mask.view()).unwrap();
        assert_eq!(pooled, array![[2.0f32, 3.0]]);
    }

    #[test]
    fn empty_mask_yields_zero_vector() {
        let hidden = Array3::<f32>::from_elem((1, 2, 3), 5.0);
        let mask = array![[false, false]];
        let pooled = masked_mean(hidden.view(), mask.view()).unwrap();
        assert!(pooled.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn rejects_mismatched_mask() {
        let hidden = Array3::<f32>::zeros((2, 2, 2));
        let mask = array![[true, true]];
        assert!(masked_mean(hidden.view(), mask.view()).is_err());
    }
}
