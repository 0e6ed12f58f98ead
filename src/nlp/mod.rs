//! Sentence and document representation extraction.

pub mod aggregate;
pub mod encoder;
#[cfg(feature = "onnx")]
pub mod onnx;
pub mod pooling;

use std::sync::Arc;

use anyhow::{ensure, Result};
use indexmap::IndexMap;
use tracing::info;

use crate::{
    data::{
        docindex,
        store::{self, EmbeddingSet},
        ExperimentPaths, Granularity, Split,
    },
    error::PipelineError,
    nlp::encoder::{Encoder, HiddenBatch},
};

/// Batches between progress log lines.
const PROGRESS_EVERY: usize = 100;

/// Encode every domain's sentences in batches and mean-pool layer `layer`.
pub fn extract_sent_reps_corpora(
    texts: &IndexMap<String, Vec<String>>,
    encoder: &dyn Encoder,
    layer: usize,
    batch_size: usize,
) -> Result<IndexMap<String, Vec<Vec<f32>>>> {
    if batch_size == 0 {
        return Err(PipelineError::InvalidBatchSize.into());
    }
    encoder.check_layer(layer)?;

    let mut encoded = IndexMap::with_capacity(texts.len());
    for (domain, sentences) in texts {
        info!(%domain, sentences = sentences.len(), "encoding domain");
        let mut vectors = Vec::with_capacity(sentences.len());
        for (step, batch) in sentences.chunks(batch_size).enumerate() {
            if step % PROGRESS_EVERY == 0 {
                info!(%domain, batch = step, "encoding progress");
            }
            let HiddenBatch { hidden, mask } = encoder.encode(batch, layer)?;
            let pooled = pooling::masked_mean(hidden.view(), mask.view())?;
            ensure!(
                pooled.nrows() == batch.len(),
                "encoder returned {} rows for a batch of {}",
                pooled.nrows(),
                batch.len()
            );
            vectors.extend(pooled.outer_iter().map(|row| row.to_vec()));
        }
        encoded.insert(domain.clone(), vectors);
    }
    Ok(encoded)
}

/// Encode each split's doc index and persist sentence vectors.
pub async fn extract_reps_sent(
    paths: &ExperimentPaths,
    domains: &[String],
    encoder: Arc<dyn Encoder>,
    layer: usize,
    batch_size: usize,
) -> Result<()> {
    for split in Split::ENCODE_ORDER {
        info!(%split, "extracting sentence representations");
        let corpus = docindex::read_doc_indexed(paths, split, domains)?;
        let texts = corpus.texts;
        let worker = Arc::clone(&encoder);
        let encoded = tokio::task::spawn_blocking(move || {
            extract_sent_reps_corpora(&texts, worker.as_ref(), layer, batch_size)
        })
        .await??;

        let mut set = EmbeddingSet::default();
        for (domain, vectors) in encoded {
            let ids = corpus.doc_ids.get(&domain).cloned().unwrap_or_default();
            set.insert(domain, ids, vectors);
        }
        store::write_embeddings(&paths.embeddings(Granularity::Sent, split), &set)?;
    }
    Ok(())
}

/// Aggregate stored sentence vectors into document vectors per split.
pub async fn extract_reps_doc(paths: &ExperimentPaths, domains: &[String]) -> Result<()> {
    for split in Split::ENCODE_ORDER {
        info!(%split, "aggregating document representations");
        let corpus = docindex::read_doc_indexed(paths, split, domains)?;
        let sentences = store::read_embeddings(&paths.embeddings(Granularity::Sent, split))?;
        let documents = aggregate::compute_doc_reps(&sentences, &corpus.doc_ids)?;
        info!(
            %split,
            sentences = sentences.len(),
            documents = documents.len(),
            "aggregated documents"
        );
        store::write_embeddings(&paths.embeddings(Granularity::Doc, split), &documents)?;
    }
    Ok(())
}
