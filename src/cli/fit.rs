//! CLI entry-point for fitting k-means on train embeddings.

use anyhow::Result;
use clap::Args as ClapArgs;
use tracing::{info, instrument};

use crate::{cli::CorpusArgs, clustering, config::Settings, data::Granularity};

/// Args for the `fit` sub-command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    #[command(flatten)]
    pub corpus: CorpusArgs,
    /// Cluster sentence or document vectors.
    #[arg(long, value_enum, default_value = "sent")]
    pub granularity: Granularity,
    /// Number of clusters.
    #[arg(long, default_value_t = 4)]
    pub clusters: usize,
    /// RNG seed; overrides `KMEANS_SEED`.
    #[arg(long)]
    pub seed: Option<u64>,
}

#[instrument(skip(settings))]
pub async fn run(args: Args, settings: Settings) -> Result<()> {
    let paths = args.corpus.paths(&settings);
    let seed = args.seed.unwrap_or(settings.kmeans_seed);
    let model = clustering::fit_model(&paths, args.granularity, args.clusters, seed).await?;
    info!(
        path = %paths.kmeans_model(args.granularity, args.clusters).display(),
        inertia = model.inertia,
        "k-means ready"
    );
    Ok(())
}
