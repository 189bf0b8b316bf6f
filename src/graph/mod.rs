//! Element/recipe graph and its persisted snapshot
//!
//! This module contains:
//! - The in-memory graph store with its uniqueness and dedup invariants
//! - The JSON snapshot format (`icon`/`emoji` tolerant on read)
//! - The snapshot storage trait and its JSON file backend

mod persist;
mod snapshot;
mod store;

pub use persist::{JsonFileStore, SnapshotStore};
pub use snapshot::{format_recipe_key, parse_recipe_key, ElementRecord, GraphSnapshot, RecipeRecord};
pub use store::{Element, GraphStore, PairKey, RecipeEdge};

use thiserror::Error;

/// Errors raised by the graph store and its persistence
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("Corrupt snapshot: {0}")]
    CorruptSnapshot(String),

    #[error("Element '{text}' already exists at index {index}")]
    DuplicateElement { text: String, index: usize },

    #[error("Element not found: {0}")]
    NotFound(String),

    #[error("Unknown element index: {0}")]
    UnknownIndex(usize),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for graph operations
pub type GraphResult<T> = Result<T, GraphError>;

/// Loads a snapshot from `store` and builds a validated graph
pub fn load_graph(store: &dyn SnapshotStore) -> GraphResult<GraphStore> {
    let snapshot = store.load()?;
    let graph = GraphStore::from_snapshot(snapshot)?;
    tracing::debug!(
        "Loaded {} elements and {} recipes from {}",
        graph.len(),
        graph.recipe_count(),
        store.path().display()
    );
    Ok(graph)
}
