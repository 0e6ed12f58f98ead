//! Encoder seam: anything that yields per-layer hidden states for a batch.

use std::sync::Arc;

use anyhow::Result;
use ndarray::{Array2, Array3};
use tracing::{info, warn};

use crate::{config::Settings, data::ExperimentPaths, error::PipelineError};

/// Hidden states of one layer with the attention mask used to produce them.
#[derive(Debug, Clone)]
pub struct HiddenBatch {
    /// `[batch, tokens, hidden]`, padded to the longest sequence.
    pub hidden: Array3<f32>,
    /// `[batch, tokens]`, true for real tokens.
    pub mask: Array2<bool>,
}

/// Trait for encoders exposing intermediate hidden states.
pub trait Encoder: Send + Sync {
    /// Number of transformer layers; valid layer ids are `0..=num_layers`.
    fn num_layers(&self) -> usize;

    /// Tokenize, pad and truncate `texts`, then return layer `layer`.
    fn encode(&self, texts: &[String], layer: usize) -> Result<HiddenBatch>;

    fn check_layer(&self, layer: usize) -> Result<(), PipelineError> {
        if layer > self.num_layers() {
            return Err(PipelineError::InvalidLayer {
                requested: layer,
                available: self.num_layers(),
            });
        }
        Ok(())
    }
}

pub const HASHING_HIDDEN_SIZE: usize = 64;
pub const HASHING_LAYERS: usize = 12;
const PAD_TOKEN: &str = "<pad>";

/// Model-free encoder mapping each whitespace token to a hashed vector.
///
/// Vectors depend on the token and the layer only, so identical sentences
/// always pool to identical embeddings and shared vocabulary pulls
/// sentences together. Padding positions carry a non-zero pad vector,
/// which keeps the attention mask meaningful.
#[derive(Debug, Clone)]
pub struct HashingEncoder {
    hidden_size: usize,
    num_layers: usize,
    max_length: usize,
}

impl HashingEncoder {
    pub fn new(hidden_size: usize, num_layers: usize, max_length: usize) -> Self {
        Self {
            hidden_size,
            num_layers,
            max_length,
        }
    }

    /// Deterministic vector for `token` at `layer`, components in `[-1, 1)`.
    pub fn token_vector(&self, token: &str, layer: usize) -> Vec<f32> {
        let mut state = fnv1a(token.as_bytes()) ^ (layer as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
        (0..self.hidden_size)
            .map(|_| {
                let bits = splitmix64(&mut state) >> 40;
                (bits as f32 / (1u64 << 24) as f32) * 2.0 - 1.0
            })
            .collect()
    }
}

impl Encoder for HashingEncoder {
    fn num_layers(&self) -> usize {
        self.num_layers
    }

    fn encode(&self, texts: &[String], layer: usize) -> Result<HiddenBatch> {
        self.check_layer(layer)?;
        let tokenized: Vec<Vec<&str>> = texts
            .iter()
            .map(|text| text.split_whitespace().take(self.max_length).collect())
            .collect();
        let seq_len = tokenized.iter().map(Vec::len).max().unwrap_or(0);

        let pad = self.token_vector(PAD_TOKEN, layer);
        let mut hidden = Array3::<f32>::zeros((texts.len(), seq_len, self.hidden_size));
        let mut mask = Array2::<bool>::from_elem((texts.len(), seq_len), false);
        for (i, tokens) in tokenized.iter().enumerate() {
            for j in 0..seq_len {
                let values = match tokens.get(j) {
                    Some(token) => {
                        mask[[i, j]] = true;
                        self.token_vector(token, layer)
                    }
                    None => pad.clone(),
                };
                for (k, value) in values.into_iter().enumerate() {
                    hidden[[i, j, k]] = value;
                }
            }
        }
        Ok(HiddenBatch { hidden, mask })
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0xcbf2_9ce4_8422_2325, |hash, &b| {
        (hash ^ b as u64).wrapping_mul(0x0000_0100_0000_01b3)
    })
}

fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Load the ONNX encoder when available, falling back to hashing.
pub fn load_encoder(paths: &ExperimentPaths, settings: &Settings) -> Result<Arc<dyn Encoder>> {
    let dir = paths.encoder_dir();
    if let Some(encoder) = load_onnx(&dir, settings)? {
        return Ok(encoder);
    }

    warn!(dir = %dir.display(), "no usable encoder model; using hashing encoder");
    let encoder = HashingEncoder::new(HASHING_HIDDEN_SIZE, HASHING_LAYERS, settings.max_length);
    info!(hidden = HASHING_HIDDEN_SIZE, layers = HASHING_LAYERS, "hashing encoder ready");
    Ok(Arc::new(encoder) as Arc<dyn Encoder>)
}

#[cfg(feature = "onnx")]
fn load_onnx(dir: &std::path::Path, settings: &Settings) -> Result<Option<Arc<dyn Encoder>>> {
    if !dir.join("model.onnx").exists() {
        return Ok(None);
    }
    let encoder = super::onnx::OnnxEncoder::load(dir, settings.max_length)?;
    info!(dir = %dir.display(), layers = encoder.num_layers(), "loaded onnx encoder");
    Ok(Some(Arc::new(encoder) as Arc<dyn Encoder>))
}

#[cfg(not(feature = "onnx"))]
fn load_onnx(_dir: &std::path::Path, _settings: &Settings) -> Result<Option<Arc<dyn Encoder>>> {
    Ok(None)
}
