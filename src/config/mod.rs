//! Configuration module for infc
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key has a default, so running without a file is valid.
//!
//! # Example
//!
//! ```no_run
//! use infc::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("infc.toml")).unwrap();
//! println!("Snapshot lives at: {}", config.output.snapshot_path);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, OracleConfig, OutputConfig, RetryConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
