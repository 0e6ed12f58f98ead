//! Command-line interface wiring for domain-clusters.

use anyhow::Result;
use clap::{Args as ClapArgs, Parser, Subcommand};

use crate::{
    config::Settings,
    data::{Experiment, ExperimentPaths, LangPair},
};

pub mod embed_docs;
pub mod embed_sents;
pub mod fit;
pub mod predict;

/// Top-level CLI definition.
#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Embed parallel-corpus domains, cluster them, and score domain alignment",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Parse CLI arguments from the environment.
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// Dispatch the selected sub-command.
    pub async fn dispatch(self, settings: Settings) -> Result<()> {
        match self.command {
            Commands::EmbedSents(args) => embed_sents::run(args, settings).await,
            Commands::EmbedDocs(args) => embed_docs::run(args, settings).await,
            Commands::Fit(args) => fit::run(args, settings).await,
            Commands::Predict(args) => predict::run(args, settings).await,
        }
    }
}

/// Supported sub-commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Encode doc-indexed sentences and store mean-pooled vectors.
    EmbedSents(embed_sents::Args),
    /// Average stored sentence vectors into document vectors.
    EmbedDocs(embed_docs::Args),
    /// Fit k-means on the train split.
    Fit(fit::Args),
    /// Assign clusters to all splits and report Cramér's V.
    Predict(predict::Args),
}

/// Arguments shared by every stage.
#[derive(Debug, Clone, ClapArgs)]
pub struct CorpusArgs {
    /// Encoder family.
    #[arg(long, value_enum)]
    pub exp: Experiment,
    /// Language pair, e.g. `en-de`.
    #[arg(long)]
    pub langpair: LangPair,
    /// Comma separated domains; defaults to the configured list.
    #[arg(long, value_delimiter = ',')]
    pub domains: Vec<String>,
}

impl CorpusArgs {
    pub fn paths(&self, settings: &Settings) -> ExperimentPaths {
        ExperimentPaths::new(&settings.experiments_dir, self.exp, self.langpair.clone())
    }

    pub fn domains(&self, settings: &Settings) -> Vec<String> {
        settings.domains_or(&self.domains)
    }
}
