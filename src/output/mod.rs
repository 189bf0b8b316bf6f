//! Output module for progress display and crawl summaries
//!
//! This module handles:
//! - The live progress bar and discovery lines
//! - Routing log output around the progress bar
//! - End-of-run summaries and graph statistics

mod progress;
pub mod stats;

pub use progress::{DiscoveryLine, ProgressReporter, ProgressWriter};
pub use stats::{print_graph_statistics, print_summary, run_headline, GraphStatistics};
