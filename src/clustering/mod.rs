//! K-means clustering of stored embeddings and domain-alignment scoring.

pub mod cramers;
pub mod kmeans;

use std::{fs::File, path::Path};

use anyhow::{Context, Result};
use polars::prelude::{CsvWriter, DataFrame, NamedFrom, SerWriter, Series};
use serde::Serialize;
use tracing::info;

use crate::data::{
    store::{self, EmbeddingSet},
    ExperimentPaths, Granularity, Split,
};

use self::{cramers::Contingency, kmeans::ClusterModel};

/// Per-split outcome of scoring cluster assignments against domains.
#[derive(Debug, Clone, Serialize)]
pub struct PredictionReport {
    pub exp: String,
    pub langpair: String,
    pub granularity: String,
    pub clusters: usize,
    pub split: String,
    pub observations: usize,
    pub cramers_v: f64,
}

/// Fit k-means on the train split and persist the model.
pub async fn fit_model(
    paths: &ExperimentPaths,
    granularity: Granularity,
    clusters: usize,
    seed: u64,
) -> Result<ClusterModel> {
    let train = store::read_embeddings(&paths.embeddings(granularity, Split::Train))?;
    let model = tokio::task::spawn_blocking(move || ClusterModel::fit(&train, clusters, seed))
        .await??;
    model.save(&paths.kmeans_model(granularity, clusters))?;
    Ok(model)
}

/// Assign clusters to every split, score them, and write label files.
pub async fn predict_class_labels(
    paths: &ExperimentPaths,
    granularity: Granularity,
    clusters: usize,
) -> Result<Vec<PredictionReport>> {
    let model = ClusterModel::load(&paths.kmeans_model(granularity, clusters))?;
    let savedir = paths.clusters_dir(granularity, clusters);
    std::fs::create_dir_all(&savedir)
        .with_context(|| format!("create {}", savedir.display()))?;

    let mut reports = Vec::new();
    for split in Split::PREDICT_ORDER {
        let set = store::read_embeddings(&paths.embeddings(granularity, split))?;
        let (labels_hat, labels_true) = kmeans::kmeans_predict(&model, &set)?;
        let table = cramers::crosstab(&labels_true, &labels_hat)?;
        let corr = cramers::cramers_corrected_stat(&table)?;

        let mut frame = contingency_frame(&table, &set)?;
        info!(%split, cramers_v = corr, "scored cluster assignments");
        println!("{split}\n###");
        println!("Corr k: {corr}");
        println!("{frame}");

        write_confusion(&savedir.join(format!("confusion_{split}.csv")), &mut frame)?;
        write_labels(paths, &savedir, &set, &labels_hat, split, granularity)?;

        let report = PredictionReport {
            exp: paths.exp().to_string(),
            langpair: paths.langpair().to_string(),
            granularity: granularity.to_string(),
            clusters,
            split: split.to_string(),
            observations: labels_hat.len(),
            cramers_v: corr,
        };
        let report_path = savedir.join(format!("report_{split}.json"));
        let report_file = File::create(&report_path)
            .with_context(|| format!("create {}", report_path.display()))?;
        serde_json::to_writer_pretty(report_file, &report)?;
        reports.push(report);
    }
    Ok(reports)
}

/// Contingency table with domain names as the row header.
pub fn contingency_frame(table: &Contingency, set: &EmbeddingSet) -> Result<DataFrame> {
    let names: Vec<String> = table
        .row_labels
        .iter()
        .map(|&label| {
            set.domains
                .get_index(label)
                .map(|(name, _)| name.clone())
                .unwrap_or_else(|| label.to_string())
        })
        .collect();
    let mut columns = vec![Series::new("domain".into(), names)];
    for (j, cluster) in table.col_labels.iter().enumerate() {
        let counts: Vec<u64> = table.counts.iter().map(|row| row[j]).collect();
        columns.push(Series::new(cluster.to_string().into(), counts));
    }
    Ok(DataFrame::new(columns)?)
}

fn write_confusion(path: &Path, frame: &mut DataFrame) -> Result<()> {
    let mut file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    CsvWriter::new(&mut file).finish(frame)?;
    Ok(())
}

/// One file per domain holding its slice of the predicted labels.
fn write_labels(
    paths: &ExperimentPaths,
    savedir: &Path,
    set: &EmbeddingSet,
    labels_hat: &[usize],
    split: Split,
    granularity: Granularity,
) -> Result<()> {
    info!(dir = %savedir.display(), %split, "saving cluster labels");
    let mut offset = 0;
    for (domain, rows) in &set.domains {
        let slice = &labels_hat[offset..offset + rows.len()];
        offset += rows.len();
        let path = savedir.join(paths.label_file_name(domain, split, granularity));
        std::fs::write(&path, render_labels(slice))
            .with_context(|| format!("write {}", path.display()))?;
    }
    Ok(())
}

/// Labels as newline-terminated integers.
pub fn render_labels(labels: &[usize]) -> String {
    labels.iter().map(|label| format!("{label}\n")).collect()
}
