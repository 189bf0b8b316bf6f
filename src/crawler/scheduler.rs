//! Pair scheduling for the three crawl strategies
//!
//! This module handles:
//! - Validating a crawl command against the loaded graph
//! - Enumerating the `(first, second)` pairs each strategy covers
//! - Cutting that enumeration into chunks lazily, one chunk at a time
//!
//! Chunks are produced on demand against the live graph, so a chunk built
//! late in a run sees every element discovered by earlier chunks.

use crate::graph::GraphStore;
use crate::InfcError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A crawl requested from the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlCommand {
    /// Pair one element (or every substring match) against every element
    PairAllFor { name: String, non_sensitive: bool },

    /// Pair every `i < j` inside the half-open index range `[from, to)`
    PairFromTo { from: usize, to: usize },

    /// Pair `count` random elements, once or round after round
    RandomPair { count: usize, infinite: bool },
}

/// Two element indices in attempted order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pair {
    pub first: usize,
    pub second: usize,
}

impl Pair {
    pub fn new(first: usize, second: usize) -> Self {
        Self { first, second }
    }
}

/// Enumeration position for each strategy
#[derive(Debug)]
enum Cursor {
    TargetVsAll {
        targets: Vec<usize>,
        target: usize,
        next: usize,
    },
    Range {
        to: usize,
        i: usize,
        j: usize,
    },
    Random {
        count: usize,
        infinite: bool,
        remaining: usize,
        rng: StdRng,
    },
}

/// Lazily enumerated pairs for one crawl
#[derive(Debug)]
pub struct PairPlan {
    cursor: Cursor,
    emitted: u64,
}

impl PairPlan {
    /// Validates `command` against `graph` and prepares its enumeration
    ///
    /// # Errors
    ///
    /// `InvalidArgument` when the target is unknown, the range is empty or
    /// out of bounds, or a random crawl has nothing to sample.
    pub fn from_command(command: &CrawlCommand, graph: &GraphStore) -> Result<Self, InfcError> {
        Self::with_rng(command, graph, StdRng::from_entropy())
    }

    /// Same as `from_command` with a caller-supplied random source
    pub fn with_rng(command: &CrawlCommand, graph: &GraphStore, rng: StdRng) -> Result<Self, InfcError> {
        let cursor = match command {
            CrawlCommand::PairAllFor {
                name,
                non_sensitive,
            } => {
                let targets = if *non_sensitive {
                    graph.find_matching(name)
                } else {
                    graph
                        .find_index_by_text(name)
                        .map(|index| vec![index])
                        .unwrap_or_default()
                };
                if targets.is_empty() {
                    return Err(InfcError::InvalidArgument(format!(
                        "no element matches '{}'",
                        name
                    )));
                }
                Cursor::TargetVsAll {
                    targets,
                    target: 0,
                    next: 0,
                }
            }

            CrawlCommand::PairFromTo { from, to } => {
                if from >= to {
                    return Err(InfcError::InvalidArgument(format!(
                        "from index {} must be lower than to index {}",
                        from, to
                    )));
                }
                if *to > graph.len() {
                    return Err(InfcError::InvalidArgument(format!(
                        "to index {} is past the last element ({} elements)",
                        to,
                        graph.len()
                    )));
                }
                Cursor::Range {
                    to: *to,
                    i: *from,
                    j: from + 1,
                }
            }

            CrawlCommand::RandomPair { count, infinite } => {
                if *count == 0 {
                    return Err(InfcError::InvalidArgument(
                        "random pair count must be at least 1".to_string(),
                    ));
                }
                if graph.is_empty() {
                    return Err(InfcError::InvalidArgument(
                        "cannot sample pairs from an empty graph".to_string(),
                    ));
                }
                Cursor::Random {
                    count: *count,
                    infinite: *infinite,
                    remaining: *count,
                    rng,
                }
            }
        };

        Ok(Self { cursor, emitted: 0 })
    }

    /// Produces the next chunk of at most `chunk_size` pairs
    ///
    /// Returns `None` once the plan is exhausted. An infinite random plan is
    /// never exhausted.
    pub fn next_chunk(&mut self, graph: &GraphStore, chunk_size: usize) -> Option<Vec<Pair>> {
        let mut pairs = Vec::with_capacity(chunk_size);

        match &mut self.cursor {
            Cursor::TargetVsAll {
                targets,
                target,
                next,
            } => {
                while pairs.len() < chunk_size && *target < targets.len() {
                    if *next >= graph.len() {
                        // stay on this target until a chunk starts with
                        // nothing left to pair against it
                        if !pairs.is_empty() {
                            break;
                        }
                        *target += 1;
                        *next = 0;
                        continue;
                    }
                    pairs.push(Pair::new(targets[*target], *next));
                    *next += 1;
                }
            }

            Cursor::Range { to, i, j } => {
                while pairs.len() < chunk_size && *i < *to {
                    if *j >= *to {
                        *i += 1;
                        *j = *i + 1;
                        continue;
                    }
                    pairs.push(Pair::new(*i, *j));
                    *j += 1;
                }
            }

            Cursor::Random {
                count,
                infinite,
                remaining,
                rng,
            } => {
                if *remaining == 0 && *infinite {
                    *remaining = *count;
                }
                let n = graph.len();
                let take = (*remaining).min(chunk_size);
                for _ in 0..take {
                    pairs.push(Pair::new(rng.gen_range(0..n), rng.gen_range(0..n)));
                }
                *remaining -= take;
            }
        }

        if pairs.is_empty() {
            return None;
        }
        self.emitted += pairs.len() as u64;
        Some(pairs)
    }

    /// Expected number of pairs for the whole plan at the current graph size
    ///
    /// `None` for infinite random plans.
    pub fn estimated_total(&self, graph_len: usize) -> Option<u64> {
        match &self.cursor {
            Cursor::TargetVsAll { targets, .. } => Some((targets.len() * graph_len) as u64),
            Cursor::Range { to, .. } => {
                // emitted so far plus what the cursor has ahead of it
                Some(self.emitted + self.remaining_in_range(*to))
            }
            Cursor::Random {
                count, infinite, ..
            } => {
                if *infinite {
                    None
                } else {
                    Some(*count as u64)
                }
            }
        }
    }

    /// Pairs the range cursor has not emitted yet
    fn remaining_in_range(&self, to: usize) -> u64 {
        match &self.cursor {
            Cursor::Range { i, j, .. } if *i < to => {
                let rest_of_row = to.saturating_sub(*j) as u64;
                let rows_after = (to - *i - 1) as u64;
                rest_of_row + rows_after * rows_after.saturating_sub(1) / 2
            }
            _ => 0,
        }
    }

    /// Number of pairs handed out so far
    pub fn emitted(&self) -> u64 {
        self.emitted
    }

    /// Whether the plan never runs out of pairs
    pub fn is_unbounded(&self) -> bool {
        matches!(self.cursor, Cursor::Random { infinite: true, .. })
    }

    /// Number of distinct targets in a target-vs-all plan
    pub fn target_count(&self) -> usize {
        match &self.cursor {
            Cursor::TargetVsAll { targets, .. } => targets.len(),
            _ => 0,
        }
    }
}
