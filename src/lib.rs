//! Domain-tagged corpus embeddings, k-means clustering and domain-alignment scoring.

pub mod cli;
pub mod clustering;
pub mod config;
pub mod data;
pub mod error;
pub mod logging;
pub mod nlp;
