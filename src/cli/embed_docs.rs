//! CLI entry-point for document embedding aggregation.

use anyhow::Result;
use clap::Args as ClapArgs;
use tracing::instrument;

use crate::{cli::CorpusArgs, config::Settings, nlp};

/// Args for the `embed-docs` sub-command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    #[command(flatten)]
    pub corpus: CorpusArgs,
}

#[instrument(skip(settings))]
pub async fn run(args: Args, settings: Settings) -> Result<()> {
    let paths = args.corpus.paths(&settings);
    nlp::extract_reps_doc(&paths, &args.corpus.domains(&settings)).await
}
