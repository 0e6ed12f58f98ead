//! Runtime configuration utilities for domain-clusters.

use std::{env, path::PathBuf};

use serde::Deserialize;

/// Domains clustered when none are given on the command line.
pub const DEFAULT_DOMAINS: &[&str] = &["Europarl", "OpenSubtitles", "JRC-Acquis", "EMEA"];

/// Application configuration resolved from `.env` and defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Root folder holding doc indices and per-model artefacts.
    pub experiments_dir: PathBuf,
    /// Sentences per encoder forward pass.
    pub batch_size: usize,
    /// Hidden-state layer pooled into sentence vectors (0 = embeddings).
    pub layer_id: usize,
    /// Token budget per sentence before truncation.
    pub max_length: usize,
    /// Seed for k-means initialisation.
    pub kmeans_seed: u64,
    /// Ordered domain list; position is the ground-truth label.
    pub domains: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            experiments_dir: PathBuf::from("experiments"),
            batch_size: 32,
            layer_id: 8,
            max_length: 100,
            kmeans_seed: 21,
            domains: DEFAULT_DOMAINS.iter().map(|d| d.to_string()).collect(),
        }
    }
}

impl Settings {
    /// Load configuration from environment with reasonable defaults.
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();
        let experiments_dir = env::var("EXPERIMENTS_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.experiments_dir);
        let domains = env::var("DOMAINS")
            .ok()
            .map(|raw| parse_domains(&raw))
            .filter(|list| !list.is_empty())
            .unwrap_or(defaults.domains);

        Ok(Self {
            experiments_dir,
            batch_size: parse_var("BATCH_SIZE").unwrap_or(defaults.batch_size),
            layer_id: parse_var("LAYER_ID").unwrap_or(defaults.layer_id),
            max_length: parse_var("MAX_LENGTH").unwrap_or(defaults.max_length),
            kmeans_seed: parse_var("KMEANS_SEED").unwrap_or(defaults.kmeans_seed),
            domains,
        })
    }

    /// Settings rooted at an explicit experiments directory.
    pub fn with_experiments_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            experiments_dir: dir.into(),
            ..Self::default()
        }
    }

    /// Domains from the command line when given, configured ones otherwise.
    pub fn domains_or(&self, overrides: &[String]) -> Vec<String> {
        if overrides.is_empty() {
            self.domains.clone()
        } else {
            overrides.to_vec()
        }
    }
}

fn parse_var<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

fn parse_domains(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string)
        .collect()
}
