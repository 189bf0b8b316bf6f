//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the chunk loop that coordinates a crawl run:
//! - Loading and validating the graph snapshot
//! - Pulling chunks of pairs from the plan
//! - Running each chunk through a bounded pool of workers
//! - Persisting the graph after every chunk
//! - Stopping between chunks when asked to

use crate::config::Config;
use crate::crawler::merge::{merge_result, MergeOutcome};
use crate::crawler::scheduler::{CrawlCommand, Pair, PairPlan};
use crate::graph::{load_graph, GraphError, GraphStore, SnapshotStore};
use crate::oracle::{CombinationResult, ElementRef, OracleClient, RetryPolicy};
use crate::output::{DiscoveryLine, ProgressReporter};
use crate::state::{CrawlStatus, StatusSnapshot};
use crate::InfcError;
use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tokio::task::JoinSet;

/// Locks a mutex, recovering the data if a worker panicked while holding it
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Outcome of a finished crawl run
#[derive(Debug, Clone)]
pub struct CrawlReport {
    pub status: StatusSnapshot,
    pub started_at: DateTime<Utc>,
    pub elapsed: Duration,
    pub chunks: u64,
    pub elements: usize,
    pub recipes: usize,
    /// The run ended early because a stop was requested
    pub interrupted: bool,
}

/// Main crawler coordinator structure
pub struct Coordinator {
    config: Arc<Config>,
    graph: Arc<Mutex<GraphStore>>,
    store: Arc<dyn SnapshotStore>,
    oracle: OracleClient,
    reporter: ProgressReporter,
    stop: Arc<AtomicBool>,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    /// * `store` - Where the graph snapshot is loaded from and saved to
    /// * `reporter` - Progress display for the run
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Snapshot loaded and oracle client ready
    /// * `Err(InfcError)` - Snapshot missing or corrupt, or client setup failed
    pub fn new(
        config: Config,
        store: Arc<dyn SnapshotStore>,
        reporter: ProgressReporter,
    ) -> Result<Self, InfcError> {
        let graph = load_graph(store.as_ref())?;
        tracing::info!(
            "Loaded {} elements and {} recipes",
            graph.len(),
            graph.recipe_count()
        );

        let oracle = OracleClient::new(&config.oracle, RetryPolicy::from(&config.retry))?;

        Ok(Self {
            config: Arc::new(config),
            graph: Arc::new(Mutex::new(graph)),
            store,
            oracle,
            reporter,
            stop: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Flag that ends the run after the chunk in flight
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        self.stop.clone()
    }

    /// Read access to the live graph
    pub fn graph(&self) -> MutexGuard<'_, GraphStore> {
        lock(&self.graph)
    }

    /// Validates `command` against the loaded graph
    pub fn plan(&self, command: &CrawlCommand) -> Result<PairPlan, InfcError> {
        PairPlan::from_command(command, &self.graph())
    }

    /// Runs `command` to completion
    pub async fn run(&self, command: &CrawlCommand) -> Result<CrawlReport, InfcError> {
        let plan = self.plan(command)?;
        self.run_plan(plan).await
    }

    /// Runs the chunk loop for an already validated plan
    ///
    /// Chunk `k + 1` is only built after chunk `k` has finished and been
    /// persisted.
    pub async fn run_plan(&self, mut plan: PairPlan) -> Result<CrawlReport, InfcError> {
        let status = Arc::new(CrawlStatus::new());
        let started_at = Utc::now();
        let start = Instant::now();
        let chunk_size = self.config.crawler.chunk_size;
        let mut chunks = 0u64;
        let mut interrupted = false;

        loop {
            if self.stop.load(Ordering::SeqCst) {
                tracing::info!("Stop requested, ending crawl after {} chunks", chunks);
                interrupted = true;
                break;
            }

            let pairs = {
                let graph = self.graph();
                let pairs = plan.next_chunk(&graph, chunk_size);
                let total = plan
                    .estimated_total(graph.len())
                    .unwrap_or_else(|| plan.emitted());
                self.reporter.set_total(total);
                pairs
            };

            let Some(pairs) = pairs else {
                break;
            };

            tracing::debug!("Dispatching chunk {} ({} pairs)", chunks + 1, pairs.len());
            self.run_chunk(pairs, &status).await?;
            self.persist()?;
            chunks += 1;
            tracing::debug!("Chunk {} persisted ({})", chunks, status.snapshot());
        }

        self.reporter.finish();

        let graph = self.graph();
        Ok(CrawlReport {
            status: status.snapshot(),
            started_at,
            elapsed: start.elapsed(),
            chunks,
            elements: graph.len(),
            recipes: graph.recipe_count(),
            interrupted,
        })
    }

    /// Runs one chunk through the worker pool and waits for all of it
    async fn run_chunk(&self, pairs: Vec<Pair>, status: &Arc<CrawlStatus>) -> Result<(), InfcError> {
        let worker_count = self.config.crawler.workers.min(pairs.len()).max(1);
        let queue = Arc::new(Mutex::new(VecDeque::from(pairs)));

        let mut workers = JoinSet::new();
        for _ in 0..worker_count {
            let worker = PairWorker {
                graph: self.graph.clone(),
                oracle: self.oracle.clone(),
                status: status.clone(),
                reporter: self.reporter.clone(),
                queue: queue.clone(),
            };
            workers.spawn(worker.drain());
        }

        while let Some(joined) = workers.join_next().await {
            joined??;
        }

        Ok(())
    }

    /// Writes the current graph to the snapshot store
    fn persist(&self) -> Result<(), InfcError> {
        let snapshot = self.graph().snapshot();
        self.store
            .save(&snapshot)
            .map_err(|source| InfcError::SnapshotWrite {
                path: self.store.path().to_path_buf(),
                source,
            })
    }
}

/// One member of the chunk's worker pool
struct PairWorker {
    graph: Arc<Mutex<GraphStore>>,
    oracle: OracleClient,
    status: Arc<CrawlStatus>,
    reporter: ProgressReporter,
    queue: Arc<Mutex<VecDeque<Pair>>>,
}

impl PairWorker {
    /// Takes pairs off the shared queue until it is empty
    async fn drain(self) -> Result<(), GraphError> {
        while let Some(pair) = self.next_pair() {
            self.process(pair).await?;
        }
        Ok(())
    }

    fn next_pair(&self) -> Option<Pair> {
        lock(&self.queue).pop_front()
    }

    /// Resolves one pair: skip if known, otherwise ask the oracle and merge
    async fn process(&self, pair: Pair) -> Result<(), GraphError> {
        let inputs = {
            let graph = lock(&self.graph);
            if graph.has_recipe(pair.first, pair.second) {
                None
            } else {
                let first = graph
                    .element(pair.first)
                    .ok_or(GraphError::UnknownIndex(pair.first))?;
                let second = graph
                    .element(pair.second)
                    .ok_or(GraphError::UnknownIndex(pair.second))?;
                Some((ElementRef::from(first), ElementRef::from(second)))
            }
        };

        let Some((first, second)) = inputs else {
            self.status.record_already_known();
            self.reporter.advance(self.status.snapshot());
            return Ok(());
        };

        match self.oracle.combine(&first, &second).await {
            Ok(result) => {
                let outcome = {
                    let mut graph = lock(&self.graph);
                    merge_result(&mut graph, &self.status, pair, &result)?
                };
                self.report(&first, &second, &result, outcome);
            }
            Err(err) => {
                self.status.record_unavailable();
                tracing::warn!("Skipping {} + {}: {}", first.text, second.text, err);
            }
        }

        self.reporter.advance(self.status.snapshot());
        Ok(())
    }

    fn report(
        &self,
        first: &ElementRef,
        second: &ElementRef,
        result: &CombinationResult,
        outcome: MergeOutcome,
    ) {
        let CombinationResult::Found {
            result_text,
            result_icon,
            is_new,
        } = result
        else {
            return;
        };

        match outcome {
            MergeOutcome::Merged {
                new_element: true, ..
            } => {
                let result = ElementRef::new(result_text.clone(), result_icon.clone());
                self.reporter.discovery(&DiscoveryLine {
                    status: self.status.snapshot(),
                    is_discovery: *is_new,
                    first,
                    second,
                    result: &result,
                });
            }
            MergeOutcome::Merged {
                new_recipe: true, ..
            } => {
                tracing::debug!(
                    "[NEW RECIPE] {} + {} = {}",
                    first.text,
                    second.text,
                    result_text
                );
            }
            _ => {}
        }
    }
}
