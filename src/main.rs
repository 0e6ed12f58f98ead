//! `domain-clusters` binary: embed, fit and predict stages over corpus domains.

use anyhow::Result;
use domain_clusters::{cli::Cli, config::Settings, logging};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_tracing()?;
    let settings = Settings::load()?;
    let cli = Cli::parse();

    info!(
        experiments_dir = %settings.experiments_dir.display(),
        batch_size = settings.batch_size,
        layer = settings.layer_id,
        ?cli,
        "running stage"
    );
    cli.dispatch(settings).await
}
