#![cfg(feature = "onnx")]

//! ONNX Runtime encoder exporting per-layer hidden states.

use std::path::Path;

use anyhow::{anyhow, Result};
use ndarray::{Array2, CowArray, Ix3};
use ort::{tensor::OrtOwnedTensor, Environment, GraphOptimizationLevel, Session, SessionBuilder, Value};
use tokenizers::{PaddingParams, PaddingStrategy, Tokenizer, TruncationParams};

use crate::nlp::encoder::{Encoder, HiddenBatch};

const HIDDEN_STATE_PREFIX: &str = "hidden_states.";

/// Encoder exported with `output_hidden_states`, one graph output per layer.
pub struct OnnxEncoder {
    session: Session,
    tokenizer: Tokenizer,
    num_layers: usize,
}

impl OnnxEncoder {
    /// Load `model.onnx` and `tokenizer.json` from `dir`.
    pub fn load(dir: &Path, max_length: usize) -> Result<Self> {
        let environment = Environment::builder()
            .with_name("domain-clusters")
            .build()?
            .into_arc();
        let session = SessionBuilder::new(&environment)?
            .with_optimization_level(GraphOptimizationLevel::Level1)?
            .with_model_from_file(dir.join("model.onnx"))?;

        let mut tokenizer =
            Tokenizer::from_file(dir.join("tokenizer.json")).map_err(anyhow::Error::msg)?;
        tokenizer.with_padding(Some(PaddingParams {
            strategy: PaddingStrategy::BatchLongest,
            ..Default::default()
        }));
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length,
                ..Default::default()
            }))
            .map_err(anyhow::Error::msg)?;

        let exported = session
            .outputs
            .iter()
            .filter(|output| output.name.starts_with(HIDDEN_STATE_PREFIX))
            .count();
        let num_layers = exported
            .checked_sub(1)
            .ok_or_else(|| anyhow!("model exports no `{HIDDEN_STATE_PREFIX}*` outputs"))?;

        Ok(Self {
            session,
            tokenizer,
            num_layers,
        })
    }

    fn output_index(&self, layer: usize) -> Result<usize> {
        let name = format!("{HIDDEN_STATE_PREFIX}{layer}");
        self.session
            .outputs
            .iter()
            .position(|output| output.name == name)
            .ok_or_else(|| anyhow!("model has no output `{name}`"))
    }
}

impl Encoder for OnnxEncoder {
    fn num_layers(&self) -> usize {
        self.num_layers
    }

    fn encode(&self, texts: &[String], layer: usize) -> Result<HiddenBatch> {
        self.check_layer(layer)?;
        let encodings = self
            .tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(anyhow::Error::msg)?;
        let seq_len = encodings.first().map(|e| e.len()).unwrap_or(0);

        let mut ids = Array2::<i64>::zeros((encodings.len(), seq_len));
        let mut attention = Array2::<i64>::zeros((encodings.len(), seq_len));
        for (i, encoding) in encodings.iter().enumerate() {
            for (j, (&id, &keep)) in encoding
                .get_ids()
                .iter()
                .zip(encoding.get_attention_mask())
                .enumerate()
            {
                ids[[i, j]] = id as i64;
                attention[[i, j]] = keep as i64;
            }
        }

        let ids_input = CowArray::from(ids.into_dyn());
        let mask_input = CowArray::from(attention.clone().into_dyn());
        let outputs = self.session.run(vec![
            Value::from_array(self.session.allocator(), &ids_input)?,
            Value::from_array(self.session.allocator(), &mask_input)?,
        ])?;

        let selected = self.output_index(layer)?;
        let tensor: OrtOwnedTensor<f32, _> = outputs[selected].try_extract()?;
        let hidden = tensor.view().to_owned().into_dimensionality::<Ix3>()?;

        Ok(HiddenBatch {
            hidden,
            mask: attention.mapv(|keep| keep != 0),
        })
    }
}
