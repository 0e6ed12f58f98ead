//! Loader for tab-separated document-indexed corpora.

use std::path::Path;

use anyhow::{Context, Result};
use indexmap::IndexMap;
use tracing::info;

use crate::{
    data::{ExperimentPaths, Split},
    error::PipelineError,
};

/// Sentences and their document ids, keyed by domain in load order.
#[derive(Debug, Clone, Default)]
pub struct DocIndexedCorpus {
    pub texts: IndexMap<String, Vec<String>>,
    pub doc_ids: IndexMap<String, Vec<String>>,
}

impl DocIndexedCorpus {
    /// Total sentence count across domains.
    pub fn len(&self) -> usize {
        self.texts.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Read every domain's doc index for `split`.
pub fn read_doc_indexed(
    paths: &ExperimentPaths,
    split: Split,
    domains: &[String],
) -> Result<DocIndexedCorpus> {
    let mut corpus = DocIndexedCorpus::default();
    for domain in domains {
        let path = paths.doc_index(domain, split);
        info!(path = %path.display(), "loading doc index");
        let (ids, texts) = read_index_file(&path)?;
        corpus.doc_ids.insert(domain.clone(), ids);
        corpus.texts.insert(domain.clone(), texts);
    }
    Ok(corpus)
}

/// Parse one `doc_id<TAB>text` file into aligned id and text columns.
///
/// Blank lines are skipped.
pub fn read_index_file(path: &Path) -> Result<(Vec<String>, Vec<String>)> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .quoting(false)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("open doc index {}", path.display()))?;

    let mut ids = Vec::new();
    let mut texts = Vec::new();
    for result in reader.records() {
        let record = result.with_context(|| format!("read {}", path.display()))?;
        let fields = strip_trailing(&record);
        if fields.len() < 2 {
            let line = record.position().map(|p| p.line() as usize).unwrap_or(0);
            return Err(PipelineError::MalformedIndexLine {
                path: path.display().to_string(),
                line,
            }
            .into());
        }
        ids.push(fields[0].to_string());
        texts.push(fields[1].to_string());
    }
    Ok((ids, texts))
}

/// Fields of a record after trailing whitespace is stripped from the line.
fn strip_trailing(record: &csv::StringRecord) -> Vec<&str> {
    let mut fields: Vec<&str> = record.iter().collect();
    while let Some(last) = fields.pop() {
        let trimmed = last.trim_end();
        if !trimmed.is_empty() {
            fields.push(trimmed);
            break;
        }
    }
    fields
}
