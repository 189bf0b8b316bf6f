//! infc: a crawler for a combinatorial crafting space
//!
//! This crate explores pairwise element combinations by asking a remote
//! combination oracle, merges every answer into a local element/recipe graph,
//! and checkpoints that graph to a JSON snapshot after each chunk of work.

pub mod config;
pub mod crawler;
pub mod graph;
pub mod oracle;
pub mod output;
pub mod state;

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for infc operations
#[derive(Debug, Error)]
pub enum InfcError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Graph error: {0}")]
    Graph(#[from] graph::GraphError),

    #[error("Oracle error: {0}")]
    Oracle(#[from] oracle::OracleError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Failed to save snapshot to {path}: {source}")]
    SnapshotWrite {
        path: PathBuf,
        source: graph::GraphError,
    },

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Worker task failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for infc operations
pub type Result<T> = std::result::Result<T, InfcError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlCommand, Coordinator, CrawlReport};
pub use graph::{Element, GraphSnapshot, GraphStore};
pub use oracle::{CombinationResult, ElementRef, OracleClient};
pub use state::{CrawlStatus, StatusSnapshot};
