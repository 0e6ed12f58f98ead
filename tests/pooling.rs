use domain_clusters::nlp::pooling::masked_mean;
use ndarray::{Array2, Array3};
use proptest::prelude::*;

const WIDTH: usize = 3;

fn padded(tokens: &[[f32; WIDTH]], pad: f32, extra: usize) -> (Array3<f32>, Array2<bool>) {
    let len = tokens.len() + extra;
    let mut hidden = Array3::<f32>::from_elem((1, len, WIDTH), pad);
    let mut mask = Array2::<bool>::from_elem((1, len), false);
    for (t, token) in tokens.iter().enumerate() {
        mask[[0, t]] = true;
        for (k, value) in token.iter().enumerate() {
            hidden[[0, t, k]] = *value;
        }
    }
    (hidden, mask)
}

proptest! {
    #[test]
    fn padding_never_changes_the_mean(
        tokens in prop::collection::vec(prop::array::uniform3(-10.0f32..10.0), 1..8),
        pad in -100.0f32..100.0,
        extra in 0usize..5,
    ) {
        let (bare_h, bare_m) = padded(&tokens, 0.0, 0);
        let (pad_h, pad_m) = padded(&tokens, pad, extra);
        let bare = masked_mean(bare_h.view(), bare_m.view()).unwrap();
        let with_pad = masked_mean(pad_h.view(), pad_m.view()).unwrap();
        for (a, b) in bare.iter().zip(with_pad.iter()) {
            prop_assert!((a - b).abs() < 1e-4);
        }
    }

    #[test]
    fn matches_arithmetic_mean(
        tokens in prop::collection::vec(prop::array::uniform3(-10.0f32..10.0), 1..8),
    ) {
        let (hidden, mask) = padded(&tokens, 7.0, 2);
        let pooled = masked_mean(hidden.view(), mask.view()).unwrap();
        for k in 0..WIDTH {
            let expected = tokens.iter().map(|t| t[k]).sum::<f32>() / tokens.len() as f32;
            prop_assert!((pooled[[0, k]] - expected).abs() < 1e-4);
        }
    }
}

#[test]
fn batch_rows_are_pooled_independently() {
    let mut hidden = Array3::<f32>::zeros((2, 2, 1));
    hidden[[0, 0, 0]] = 2.0;
    hidden[[0, 1, 0]] = 4.0;
    hidden[[1, 0, 0]] = 10.0;
    hidden[[1, 1, 0]] = -50.0;
    let mask = Array2::from_shape_vec((2, 2), vec![true, true, true, false]).unwrap();
    let pooled = masked_mean(hidden.view(), mask.view()).unwrap();
    assert_eq!(pooled[[0, 0]], 3.0);
    assert_eq!(pooled[[1, 0]], 10.0);
}
