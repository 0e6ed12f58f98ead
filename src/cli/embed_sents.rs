//! CLI entry-point for sentence embedding extraction.

use anyhow::Result;
use clap::Args as ClapArgs;
use tracing::{info, instrument};

use crate::{cli::CorpusArgs, config::Settings, nlp};

/// Args for the `embed-sents` sub-command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    #[command(flatten)]
    pub corpus: CorpusArgs,
    /// Sentences per forward pass; overrides `BATCH_SIZE`.
    #[arg(long)]
    pub batch_size: Option<usize>,
    /// Hidden-state layer to pool; overrides `LAYER_ID`.
    #[arg(long)]
    pub layer: Option<usize>,
}

#[instrument(skip(settings))]
pub async fn run(args: Args, settings: Settings) -> Result<()> {
    let paths = args.corpus.paths(&settings);
    let domains = args.corpus.domains(&settings);
    let batch_size = args.batch_size.unwrap_or(settings.batch_size);
    let layer = args.layer.unwrap_or(settings.layer_id);

    let encoder = nlp::encoder::load_encoder(&paths, &settings)?;
    info!(?domains, batch_size, layer, "extracting sentence embeddings");
    nlp::extract_reps_sent(&paths, &domains, encoder, layer, batch_size).await
}
