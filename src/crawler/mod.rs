//! Crawler module for pairing elements against the oracle
//!
//! This module contains the core crawling logic, including:
//! - Pair scheduling for the three crawl strategies
//! - Merging oracle answers into the graph
//! - Chunked, concurrent crawl coordination

mod coordinator;
mod merge;
mod scheduler;

pub use coordinator::{Coordinator, CrawlReport};
pub use merge::{merge_result, MergeOutcome};
pub use scheduler::{CrawlCommand, Pair, PairPlan};

use crate::config::Config;
use crate::graph::JsonFileStore;
use crate::output::ProgressReporter;
use crate::InfcError;
use std::sync::atomic::Ordering;
use std::sync::Arc;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Load the graph snapshot named in the config
/// 2. Validate the command against it
/// 3. Pair elements chunk by chunk, saving after each chunk
/// 4. Stop early on Ctrl-C once the current chunk is saved
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `command` - Which strategy to run
/// * `reporter` - Progress display for the run
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Crawl completed or was stopped cleanly
/// * `Err(InfcError)` - Crawl failed
pub async fn crawl(
    config: Config,
    command: CrawlCommand,
    reporter: ProgressReporter,
) -> Result<CrawlReport, InfcError> {
    let store = Arc::new(JsonFileStore::new(&config.output.snapshot_path));
    let coordinator = Coordinator::new(config, store, reporter.clone())?;
    let plan = coordinator.plan(&command)?;

    let stop = coordinator.stop_handle();
    let listener = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            return;
        }
        stop.store(true, Ordering::SeqCst);
        reporter.println("Stopping after the current chunk (Ctrl-C again to abort)");
        if tokio::signal::ctrl_c().await.is_ok() {
            std::process::exit(130);
        }
    });

    let result = coordinator.run_plan(plan).await;
    listener.abort();
    result
}
