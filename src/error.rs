//! Typed failures raised by pipeline stages.

use thiserror::Error;

/// Domain errors surfaced through `anyhow` at the CLI boundary.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid language pair `{0}`; expected `src-tgt`")]
    InvalidLangPair(String),
    #[error("batch size must be positive")]
    InvalidBatchSize,
    #[error("layer {requested} out of range; encoder exposes layers 0..={available}")]
    InvalidLayer { requested: usize, available: usize },
    #[error("{path}:{line}: expected `doc_id<TAB>text`")]
    MalformedIndexLine { path: String, line: usize },
    #[error("domain `{domain}` has {vectors} vectors but {ids} document ids")]
    Misaligned {
        domain: String,
        vectors: usize,
        ids: usize,
    },
    #[error("domain `{0}` is missing from one of the inputs")]
    MissingDomain(String),
    #[error("vector dimension {found} does not match expected {expected}")]
    DimensionMismatch { expected: usize, found: usize },
    #[error("need at least {needed} observations, got {found}")]
    TooFewObservations { needed: usize, found: usize },
}
