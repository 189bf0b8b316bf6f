//! infc main entry point
//!
//! This is the command-line interface for the infc crafting-space crawler.

use clap::{Parser, Subcommand};
use indicatif::{MultiProgress, ProgressDrawTarget};
use infc::config::{load_config_with_hash, validate, Config};
use infc::crawler::{crawl, CrawlCommand, PairPlan};
use infc::graph::{load_graph, JsonFileStore};
use infc::output::{
    print_graph_statistics, print_summary, GraphStatistics, ProgressReporter, ProgressWriter,
};
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// infc: a crawler for a combinatorial crafting space
///
/// infc pairs elements from a local graph snapshot, asks the combination
/// oracle what each pair makes, and saves every new element and recipe back
/// to the snapshot after each chunk.
#[derive(Parser, Debug)]
#[command(name = "infc")]
#[command(version)]
#[command(about = "A crawler for a combinatorial crafting space", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Path to TOML configuration file
    #[arg(short, long, global = true, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Graph snapshot to read and update (overrides the config)
    #[arg(short, long, global = true, value_name = "FILE")]
    snapshot: Option<PathBuf>,

    /// Concurrent oracle requests per chunk (overrides the config)
    #[arg(short, long, global = true)]
    workers: Option<usize>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate the command against the snapshot and show the plan without crawling
    #[arg(long, global = true)]
    dry_run: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Pair one element with every element in the graph
    PairAllFor {
        /// Element text to pair
        name: String,

        /// Match every element whose text contains NAME, ignoring case
        #[arg(long)]
        non_sensitive: bool,
    },

    /// Pair every element in [FROM, TO) with every later element in that range
    PairFromTo { from: usize, to: usize },

    /// Pair COUNT random elements
    RandomPair {
        count: usize,

        /// Keep drawing rounds of COUNT pairs until interrupted
        #[arg(long)]
        infinite: bool,
    },

    /// Show statistics for the snapshot and exit
    Stats,
}

impl Command {
    fn crawl_command(&self) -> Option<CrawlCommand> {
        match self {
            Command::PairAllFor {
                name,
                non_sensitive,
            } => Some(CrawlCommand::PairAllFor {
                name: name.clone(),
                non_sensitive: *non_sensitive,
            }),
            Command::PairFromTo { from, to } => Some(CrawlCommand::PairFromTo {
                from: *from,
                to: *to,
            }),
            Command::RandomPair { count, infinite } => Some(CrawlCommand::RandomPair {
                count: *count,
                infinite: *infinite,
            }),
            Command::Stats => None,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let multi = if cli.quiet {
        MultiProgress::with_draw_target(ProgressDrawTarget::hidden())
    } else {
        MultiProgress::new()
    };

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet, multi.clone());

    let config = match resolve_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e);
        }
    };

    let Some(command) = cli.command.crawl_command() else {
        return handle_stats(&config);
    };

    if cli.dry_run {
        handle_dry_run(&config, &command)?;
    } else {
        let reporter = if cli.quiet {
            ProgressReporter::hidden()
        } else {
            ProgressReporter::new(multi)
        };
        handle_crawl(config, command, reporter).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Log lines go through the progress bar's `MultiProgress` so they never
/// interleave with a bar redraw.
fn setup_logging(verbose: u8, quiet: bool, multi: MultiProgress) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("infc=info,warn"),
            1 => EnvFilter::new("infc=debug,info"),
            2 => EnvFilter::new("infc=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(ProgressWriter::new(multi))
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the config file if one was given, then applies command-line overrides
fn resolve_config(cli: &Cli) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            tracing::debug!("No configuration file given, using defaults");
            Config::default()
        }
    };

    if let Some(snapshot) = &cli.snapshot {
        config.output.snapshot_path = snapshot.display().to_string();
    }
    if let Some(workers) = cli.workers {
        config.crawler.workers = workers;
    }

    validate(&config)?;
    Ok(config)
}

/// Handles the --dry-run mode: validates the command and shows what would be crawled
fn handle_dry_run(config: &Config, command: &CrawlCommand) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== infc Dry Run ===\n");

    let store = JsonFileStore::new(&config.output.snapshot_path);
    let graph = load_graph(&store)?;
    let plan = PairPlan::from_command(command, &graph)?;

    println!("Snapshot:");
    println!("  Path: {}", config.output.snapshot_path);
    println!("  Elements: {}", graph.len());
    println!("  Recipes: {}", graph.recipe_count());

    println!("\nCrawler Configuration:");
    println!("  Chunk size: {}", config.crawler.chunk_size);
    println!("  Workers: {}", config.crawler.workers);
    println!("  Max attempts: {}", config.retry.max_attempts);
    println!(
        "  Bound network failures: {}",
        config.retry.bound_network_failures
    );

    println!("\nOracle:");
    println!("  Base URL: {}", config.oracle.base_url);
    println!("  Pair path: {}", config.oracle.pair_path);

    println!("\nPlan:");
    match command {
        CrawlCommand::PairAllFor {
            name,
            non_sensitive,
        } => {
            println!(
                "  Strategy: pair-all-for '{}'{}",
                name,
                if *non_sensitive { " (substring, any case)" } else { "" }
            );
            println!("  Matching elements: {}", plan.target_count());
        }
        CrawlCommand::PairFromTo { from, to } => {
            println!("  Strategy: pair-from-to [{}, {})", from, to);
        }
        CrawlCommand::RandomPair { count, infinite } => {
            println!(
                "  Strategy: random-pair {}{}",
                count,
                if *infinite { " (repeating)" } else { "" }
            );
        }
    }

    match plan.estimated_total(graph.len()) {
        Some(total) => {
            let chunk_size = config.crawler.chunk_size as u64;
            println!("  Pairs: {}", total);
            println!("  Chunks: {}", total.div_ceil(chunk_size));
        }
        None => println!("  Pairs: unbounded (runs until interrupted)"),
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Command is valid for this snapshot");

    Ok(())
}

/// Handles the stats command: shows statistics for the snapshot
fn handle_stats(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("Snapshot: {}\n", config.output.snapshot_path);

    let store = JsonFileStore::new(&config.output.snapshot_path);
    let graph = load_graph(&store)?;

    print_graph_statistics(&GraphStatistics::from_graph(&graph));

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(
    config: Config,
    command: CrawlCommand,
    reporter: ProgressReporter,
) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(
        "Starting crawl on {} ({} workers, chunks of {})",
        config.output.snapshot_path,
        config.crawler.workers,
        config.crawler.chunk_size
    );

    // Run the crawler
    match crawl(config, command, reporter).await {
        Ok(report) => {
            print_summary(&report);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
