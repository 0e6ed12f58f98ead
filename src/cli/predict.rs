//! CLI entry-point for cluster prediction and Cramér's V scoring.

use anyhow::Result;
use clap::Args as ClapArgs;
use tracing::{info, instrument};

use crate::{cli::CorpusArgs, clustering, config::Settings, data::Granularity};

/// Args for the `predict` sub-command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    #[command(flatten)]
    pub corpus: CorpusArgs,
    /// Cluster sentence or document vectors.
    #[arg(long, value_enum)]
    pub granularity: Granularity,
    /// Number of clusters the model was fit with.
    #[arg(long)]
    pub clusters: usize,
}

#[instrument(skip(settings))]
pub async fn run(args: Args, settings: Settings) -> Result<()> {
    let paths = args.corpus.paths(&settings);
    let reports = clustering::predict_class_labels(&paths, args.granularity, args.clusters).await?;
    for report in &reports {
        info!(split = %report.split, cramers_v = report.cramers_v, n = report.observations, "split summary");
    }
    Ok(())
}
