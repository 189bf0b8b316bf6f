//! Run summaries and graph statistics
//!
//! This module prints the end-of-run counters and the overview shown by the
//! `stats` command.

use crate::crawler::CrawlReport;
use crate::graph::GraphStore;
use console::style;
use std::collections::HashSet;

/// Prints the end-of-run summary to stdout
///
/// # Arguments
///
/// * `report` - The finished run
pub fn print_summary(report: &CrawlReport) {
    let status = &report.status;

    println!();
    if report.interrupted {
        println!("{}", style(run_headline(report)).yellow());
    } else {
        println!("{}", run_headline(report));
    }

    println!("Summary:");
    println!(
        "  Total combinations attempted: {}",
        style(status.total_attempted).yellow()
    );
    println!(
        "  New items found: {}",
        style(status.new_elements_found).green()
    );
    println!(
        "  New discoveries: {}",
        style(status.new_discoveries).magenta()
    );
    println!(
        "  New recipes found: {}",
        style(status.new_recipes_found).blue()
    );
    println!("  Already known (skipped): {}", status.already_known);
    if status.unavailable > 0 {
        println!(
            "  Oracle unavailable (skipped): {}",
            style(status.unavailable).red()
        );
    }
    println!(
        "  Graph now holds {} elements and {} recipes",
        report.elements, report.recipes
    );
}

/// First line of the summary: how the run ended, how long it took, when it began
pub fn run_headline(report: &CrawlReport) -> String {
    let started = report.started_at.format("%Y-%m-%d %H:%M:%S UTC");
    if report.interrupted {
        format!(
            "Stopped after {} chunks in {}ms (started {})",
            report.chunks,
            report.elapsed.as_millis(),
            started
        )
    } else {
        format!(
            "Done in {}ms! (started {})",
            report.elapsed.as_millis(),
            started
        )
    }
}

/// Overview of a stored graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphStatistics {
    pub elements: usize,
    pub recipes: usize,

    /// Recipes whose two inputs are the same element
    pub self_recipes: usize,

    /// Elements that are the result of no known recipe
    pub unreachable: usize,

    /// Elements that appear as an input of no known recipe
    pub never_combined: usize,

    /// Unordered pairs over all elements, including self-pairs
    pub possible_pairs: u64,
}

impl GraphStatistics {
    /// Computes statistics for `graph`
    pub fn from_graph(graph: &GraphStore) -> Self {
        let mut results = HashSet::new();
        let mut inputs = HashSet::new();
        let mut self_recipes = 0;

        for edge in graph.recipes() {
            results.insert(edge.result);
            inputs.insert(edge.first);
            inputs.insert(edge.second);
            if edge.first == edge.second {
                self_recipes += 1;
            }
        }

        let n = graph.len() as u64;
        Self {
            elements: graph.len(),
            recipes: graph.recipe_count(),
            self_recipes,
            unreachable: graph.len() - results.len(),
            never_combined: graph.len() - inputs.len(),
            possible_pairs: n * (n + 1) / 2,
        }
    }

    /// Share of all unordered pairs with a known recipe
    pub fn coverage(&self) -> f64 {
        if self.possible_pairs == 0 {
            0.0
        } else {
            (self.recipes as f64 / self.possible_pairs as f64) * 100.0
        }
    }
}

/// Prints graph statistics to stdout in a formatted manner
pub fn print_graph_statistics(stats: &GraphStatistics) {
    println!("=== Graph Statistics ===\n");

    println!("Overview:");
    println!("  Elements: {}", stats.elements);
    println!("  Recipes: {}", stats.recipes);
    println!("  Self-combinations: {}", stats.self_recipes);
    println!();

    println!("Coverage:");
    println!("  Possible pairs: {}", stats.possible_pairs);
    println!("  Pairs with a known recipe: {:.2}%", stats.coverage());
    println!("  Elements with no known recipe: {}", stats.unreachable);
    println!("  Elements never combined: {}", stats.never_combined);
}
