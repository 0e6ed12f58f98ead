//! K-means fitting on the train split and nearest-centroid prediction.

use std::{fs::File, io::BufReader, path::Path};

use anyhow::{Context, Result};
use linfa::prelude::*;
use linfa_clustering::KMeans;
use ndarray::Array2;
use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{data::store::EmbeddingSet, error::PipelineError};

const N_RUNS: usize = 10;
const MAX_ITERATIONS: u64 = 300;
const TOLERANCE: f64 = 1e-4;

/// Fitted centroids persisted between the fit and predict stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterModel {
    pub n_clusters: usize,
    pub dim: usize,
    pub centroids: Vec<Vec<f64>>,
    /// Mean distance of training points to their centroid.
    pub inertia: f64,
}

impl ClusterModel {
    /// Lloyd k-means with k-means++ seeding, best of several restarts.
    pub fn fit(set: &EmbeddingSet, n_clusters: usize, seed: u64) -> Result<Self> {
        let rows = set.len();
        if n_clusters == 0 || rows < n_clusters {
            return Err(PipelineError::TooFewObservations {
                needed: n_clusters.max(1),
                found: rows,
            }
            .into());
        }
        let dim = set.dim().unwrap_or(0);
        let mut flat = Vec::with_capacity(rows * dim);
        for vector in set.iter_vectors() {
            if vector.len() != dim {
                return Err(PipelineError::DimensionMismatch {
                    expected: dim,
                    found: vector.len(),
                }
                .into());
            }
            flat.extend(vector.iter().map(|&v| v as f64));
        }
        let records = Array2::from_shape_vec((rows, dim), flat)?;
        let dataset = DatasetBase::from(records);

        let model = KMeans::params_with_rng(n_clusters, StdRng::seed_from_u64(seed))
            .n_runs(N_RUNS)
            .max_n_iterations(MAX_ITERATIONS)
            .tolerance(TOLERANCE)
            .fit(&dataset)?;

        let centroids = model
            .centroids()
            .outer_iter()
            .map(|row| row.to_vec())
            .collect();
        let fitted = Self {
            n_clusters,
            dim,
            centroids,
            inertia: model.inertia(),
        };
        info!(
            clusters = n_clusters,
            rows,
            dim,
            inertia = fitted.inertia,
            "fitted k-means"
        );
        Ok(fitted)
    }

    /// Index of the nearest centroid; ties go to the lowest index.
    pub fn assign(&self, vector: &[f32]) -> Result<usize, PipelineError> {
        if vector.len() != self.dim {
            return Err(PipelineError::DimensionMismatch {
                expected: self.dim,
                found: vector.len(),
            });
        }
        let mut best = (0usize, f64::INFINITY);
        for (idx, centroid) in self.centroids.iter().enumerate() {
            let dist: f64 = centroid
                .iter()
                .zip(vector)
                .map(|(c, &v)| (c - v as f64).powi(2))
                .sum();
            if dist < best.1 {
                best = (idx, dist);
            }
        }
        Ok(best.0)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
        serde_json::to_writer_pretty(file, self)?;
        info!(path = %path.display(), "saved k-means model");
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
        let model: Self = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("parse {}", path.display()))?;
        info!(path = %path.display(), clusters = model.n_clusters, "loaded k-means model");
        Ok(model)
    }
}

/// Predicted cluster and true domain index for every row, domains concatenated in order.
pub fn kmeans_predict(model: &ClusterModel, set: &EmbeddingSet) -> Result<(Vec<usize>, Vec<usize>)> {
    let mut labels_hat = Vec::with_capacity(set.len());
    let mut labels_true = Vec::with_capacity(set.len());
    for (domain_idx, rows) in set.domains.values().enumerate() {
        for vector in &rows.vectors {
            labels_hat.push(model.assign(vector)?);
            labels_true.push(domain_idx);
        }
    }
    Ok((labels_hat, labels_true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ties_resolve_to_first_centroid() {
        let model = ClusterModel {
            n_clusters: 2,
            dim: 1,
            centroids: vec![vec![-1.0], vec![1.0]],
            inertia: 0.0,
        };
        assert_eq!(model.assign(&[0.0]).unwrap(), 0);
        assert_eq!(model.assign(&[0.4]).unwrap(), 1);
        assert!(model.assign(&[0.0, 1.0]).is_err());
    }
}
