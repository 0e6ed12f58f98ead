//! Document vectors as the mean of their sentence vectors.

use anyhow::Result;
use indexmap::IndexMap;
use ndarray::{Array1, ArrayView1};

use crate::{data::store::EmbeddingSet, error::PipelineError};

/// Average sentence vectors sharing a document id, per domain.
///
/// Documents keep the order in which their id first appears.
pub fn compute_doc_reps(
    sentences: &EmbeddingSet,
    doc_ids: &IndexMap<String, Vec<String>>,
) -> Result<EmbeddingSet> {
    if let Some(orphan) = doc_ids
        .keys()
        .find(|domain| !sentences.domains.contains_key(*domain))
    {
        return Err(PipelineError::MissingDomain(orphan.clone()).into());
    }

    let mut documents = EmbeddingSet::default();
    for (domain, rows) in &sentences.domains {
        let ids = doc_ids
            .get(domain)
            .ok_or_else(|| PipelineError::MissingDomain(domain.clone()))?;
        if ids.len() != rows.len() {
            return Err(PipelineError::Misaligned {
                domain: domain.clone(),
                vectors: rows.len(),
                ids: ids.len(),
            }
            .into());
        }

        let mut grouped: IndexMap<&str, Vec<&[f32]>> = IndexMap::new();
        for (id, vector) in ids.iter().zip(&rows.vectors) {
            grouped.entry(id.as_str()).or_default().push(vector.as_slice());
        }

        let mut doc_names = Vec::with_capacity(grouped.len());
        let mut doc_vectors = Vec::with_capacity(grouped.len());
        for (id, members) in grouped {
            doc_names.push(id.to_string());
            doc_vectors.push(mean_vector(&members)?);
        }
        documents.insert(domain.clone(), doc_names, doc_vectors);
    }
    Ok(documents)
}

fn mean_vector(members: &[&[f32]]) -> Result<Vec<f32>, PipelineError> {
    let width = members.first().map(|m| m.len()).unwrap_or(0);
    let mut sum = Array1::<f32>::zeros(width);
    for member in members {
        if member.len() != width {
            return Err(PipelineError::DimensionMismatch {
                expected: width,
                found: member.len(),
            });
        }
        sum += &ArrayView1::from(*member);
    }
    Ok((sum / members.len().max(1) as f32).to_vec())
}
