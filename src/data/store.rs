//! Parquet persistence for sentence and document embedding sets.

use std::{fs::File, path::Path};

use anyhow::{anyhow, Context, Result};
use indexmap::IndexMap;
use polars::prelude::{
    DataFrame, DataType, NamedFrom, ParquetReader, ParquetWriter, SerReader, Series,
};
use tracing::info;

use crate::error::PipelineError;

/// Ordered ids and their vectors for one domain.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DomainVectors {
    pub ids: Vec<String>,
    pub vectors: Vec<Vec<f32>>,
}

impl DomainVectors {
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }
}

/// Embeddings keyed by domain; map order is the ground-truth label order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmbeddingSet {
    pub domains: IndexMap<String, DomainVectors>,
}

impl EmbeddingSet {
    pub fn insert(&mut self, domain: impl Into<String>, ids: Vec<String>, vectors: Vec<Vec<f32>>) {
        self.domains
            .insert(domain.into(), DomainVectors { ids, vectors });
    }

    /// Total number of rows across domains.
    pub fn len(&self) -> usize {
        self.domains.values().map(DomainVectors::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Dimension of the first stored vector.
    pub fn dim(&self) -> Option<usize> {
        self.domains
            .values()
            .flat_map(|d| d.vectors.first())
            .map(Vec::len)
            .next()
    }

    /// Vectors of every domain concatenated in map order.
    pub fn iter_vectors(&self) -> impl Iterator<Item = &Vec<f32>> {
        self.domains.values().flat_map(|d| d.vectors.iter())
    }
}

/// Write an embedding set as `domain`, `id`, `vector` columns.
///
/// A domain without rows is kept as a single marker row with a null `id`
/// and an empty vector, so domain order survives the round trip.
pub fn write_embeddings(path: &Path, set: &EmbeddingSet) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut domains = Vec::with_capacity(set.len());
    let mut ids: Vec<Option<&str>> = Vec::with_capacity(set.len());
    let mut vectors = Vec::with_capacity(set.len());
    for (domain, rows) in &set.domains {
        if rows.is_empty() {
            domains.push(domain.as_str());
            ids.push(None);
            vectors.push(Series::new("".into(), Vec::<f32>::new()));
            continue;
        }
        for (id, vector) in rows.ids.iter().zip(&rows.vectors) {
            domains.push(domain.as_str());
            ids.push(Some(id.as_str()));
            vectors.push(Series::new("".into(), vector.as_slice()));
        }
    }
    let vector_series = if vectors.is_empty() {
        Series::new_empty(
            "vector".into(),
            &DataType::List(Box::new(DataType::Float32)),
        )
    } else {
        Series::new("vector".into(), vectors)
    };

    let mut df = DataFrame::new(vec![
        Series::new("domain".into(), domains),
        Series::new("id".into(), ids),
        vector_series,
    ])?;
    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    ParquetWriter::new(file).finish(&mut df)?;
    info!(path = %path.display(), rows = df.height(), "wrote embeddings");
    Ok(())
}

/// Read an embedding set written by [`write_embeddings`].
pub fn read_embeddings(path: &Path) -> Result<EmbeddingSet> {
    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let df = ParquetReader::new(file).finish()?;
    let domain_col = df.column("domain")?.str()?;
    let id_col = df.column("id")?.str()?;
    let vector_col = df.column("vector")?.list()?;

    let mut set = EmbeddingSet::default();
    let mut dim = None;
    for ((domain, id), vector) in domain_col
        .into_no_null_iter()
        .zip(id_col.into_iter())
        .zip(vector_col.into_iter())
    {
        let rows = set.domains.entry(domain.to_string()).or_default();
        let Some(id) = id else {
            continue;
        };
        let vector = vector.ok_or_else(|| anyhow!("null vector for id {id} in {}", path.display()))?;
        let values: Vec<f32> = vector.f32()?.into_no_null_iter().collect();
        match dim {
            None => dim = Some(values.len()),
            Some(expected) if expected != values.len() => {
                return Err(PipelineError::DimensionMismatch {
                    expected,
                    found: values.len(),
                }
                .into())
            }
            Some(_) => {}
        }
        rows.ids.push(id.to_string());
        rows.vectors.push(values);
    }
    info!(path = %path.display(), rows = set.len(), "loaded embeddings");
    Ok(set)
}
