//! Corpus vocabulary, on-disk layout and loaders.

pub mod docindex;
pub mod store;

use std::{fmt, path::PathBuf, str::FromStr};

use clap::ValueEnum;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// Which family of encoder produced the representations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Experiment {
    /// Encoder of the in-house NMT model over sentencepiece input.
    Nmt,
    /// Pretrained multilingual masked language model.
    Bert,
}

impl Experiment {
    pub fn model_name(self) -> &'static str {
        match self {
            Self::Nmt => "concat60",
            Self::Bert => "xlm-roberta-base",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Nmt => "nmt",
            Self::Bert => "bert",
        }
    }

    fn index_affixes(self) -> (&'static str, &'static str) {
        match self {
            Self::Nmt => ("sp-cl-", ".both"),
            Self::Bert => ("cl-", ""),
        }
    }
}

impl fmt::Display for Experiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source/target language pair such as `en-de`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LangPair {
    pub src: String,
    pub tgt: String,
}

impl FromStr for LangPair {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        static PATTERN: Lazy<Regex> =
            Lazy::new(|| Regex::new(r"^([A-Za-z_]+)-([A-Za-z_]+)$").expect("valid regex"));
        let caps = PATTERN
            .captures(s.trim())
            .ok_or_else(|| PipelineError::InvalidLangPair(s.to_string()))?;
        Ok(Self {
            src: caps[1].to_string(),
            tgt: caps[2].to_string(),
        })
    }
}

impl fmt::Display for LangPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.src, self.tgt)
    }
}

/// Corpus partition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, ValueEnum)]
pub enum Split {
    Train,
    Dev,
    Test,
}

impl Split {
    /// Order in which the embedding stages walk the splits.
    pub const ENCODE_ORDER: [Split; 3] = [Split::Dev, Split::Test, Split::Train];
    /// Order in which prediction walks the splits.
    pub const PREDICT_ORDER: [Split; 3] = [Split::Train, Split::Dev, Split::Test];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Train => "train",
            Self::Dev => "dev",
            Self::Test => "test",
        }
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether vectors represent sentences or whole documents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Sent,
    Doc,
}

impl Granularity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sent => "sent",
            Self::Doc => "doc",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved artefact locations for one experiment and language pair.
#[derive(Clone, Debug)]
pub struct ExperimentPaths {
    root: PathBuf,
    exp: Experiment,
    langpair: LangPair,
}

impl ExperimentPaths {
    pub fn new(root: impl Into<PathBuf>, exp: Experiment, langpair: LangPair) -> Self {
        Self {
            root: root.into(),
            exp,
            langpair,
        }
    }

    pub fn exp(&self) -> Experiment {
        self.exp
    }

    pub fn langpair(&self) -> &LangPair {
        &self.langpair
    }

    /// Tab-separated `doc_id<TAB>text` file for one domain and split.
    pub fn doc_index(&self, domain: &str, split: Split) -> PathBuf {
        let (prefix, suffix) = self.exp.index_affixes();
        self.root.join("doc-indices").join(format!(
            "{prefix}{domain}.{src}-{tgt}.docs.{split}{suffix}",
            src = self.langpair.src,
            tgt = self.langpair.tgt,
        ))
    }

    pub fn model_dir(&self) -> PathBuf {
        self.root.join(format!(
            "{}_{}_{}",
            self.langpair.src,
            self.langpair.tgt,
            self.exp.model_name()
        ))
    }

    pub fn internals_dir(&self) -> PathBuf {
        self.model_dir().join("internals-docs")
    }

    pub fn encoder_dir(&self) -> PathBuf {
        self.model_dir().join("encoder")
    }

    pub fn embeddings(&self, granularity: Granularity, split: Split) -> PathBuf {
        let stem = match granularity {
            Granularity::Sent => "sent_means",
            Granularity::Doc => "doc_means",
        };
        self.internals_dir().join(format!("{stem}_{split}.parquet"))
    }

    pub fn kmeans_model(&self, granularity: Granularity, clusters: usize) -> PathBuf {
        self.internals_dir()
            .join(format!("kmeans_train_{granularity}_{clusters}.json"))
    }

    pub fn clusters_dir(&self, granularity: Granularity, clusters: usize) -> PathBuf {
        self.model_dir()
            .join("clustering_data")
            .join(format!("{clusters}_new"))
            .join(format!("{}-clusters-{granularity}", self.exp))
    }

    /// Per-domain label file name inside [`Self::clusters_dir`].
    pub fn label_file_name(&self, domain: &str, split: Split, granularity: Granularity) -> String {
        format!("{domain}.{split}.clust.{}.{granularity}", self.exp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::ValueEnum;

    fn paths(exp: Experiment) -> ExperimentPaths {
        ExperimentPaths::new("experiments", exp, "en-de".parse().unwrap())
    }

    #[test]
    fn nmt_indices_carry_sentencepiece_affixes() {
        let path = paths(Experiment::Nmt).doc_index("EMEA", Split::Dev);
        assert_eq!(
            path,
            PathBuf::from("experiments/doc-indices/sp-cl-EMEA.en-de.docs.dev.both")
        );
    }

    #[test]
    fn bert_artefacts_live_under_model_dir() {
        let p = paths(Experiment::Bert);
        assert_eq!(
            p.doc_index("Europarl", Split::Train),
            PathBuf::from("experiments/doc-indices/cl-Europarl.en-de.docs.train")
        );
        assert_eq!(
            p.kmeans_model(Granularity::Sent, 4),
            PathBuf::from("experiments/en_de_xlm-roberta-base/internals-docs/kmeans_train_sent_4.json")
        );
        assert_eq!(
            p.clusters_dir(Granularity::Doc, 4),
            PathBuf::from("experiments/en_de_xlm-roberta-base/clustering_data/4_new/bert-clusters-doc")
        );
        assert_eq!(
            p.label_file_name("EMEA", Split::Test, Granularity::Sent),
            "EMEA.test.clust.bert.sent"
        );
    }

    #[test]
    fn rejects_malformed_inputs() {
        assert!("ende".parse::<LangPair>().is_err());
        assert!("en-de-fr".parse::<LangPair>().is_err());
        assert!(Experiment::from_str("gpt", false).is_err());
        assert!(Granularity::from_str("para", false).is_err());
    }
}
