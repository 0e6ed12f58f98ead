//! Structured logging bootstrap using `tracing`.

use anyhow::Result;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Filter used when `RUST_LOG` is unset; the ONNX runtime is chatty at `info`.
const DEFAULT_FILTER: &str = "info,ort=warn";

/// Install the global subscriber once; later calls are no-ops.
///
/// Events go to stderr: `predict` prints the contingency tables and
/// Cramér's V on stdout, and that output stays clean for redirection.
pub fn init_tracing() -> Result<()> {
    if tracing::dispatcher::has_been_set() {
        return Ok(());
    }

    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(DEFAULT_FILTER))?;

    let stage_layer = fmt::layer()
        .with_target(true)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_file(true)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .with_filter(env_filter);

    tracing_subscriber::registry().with(stage_layer).try_init()?;
    tracing::debug!(filter = DEFAULT_FILTER, "stage logging ready on stderr");
    Ok(())
}
