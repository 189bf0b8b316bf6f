//! In-memory element/recipe graph
//!
//! The store is the single source of truth during a run. Elements live in an
//! append-only vector so an index, once handed out, always names the same
//! element. Recipes are keyed by the unordered pair of their inputs, which makes
//! `(a, b)` and `(b, a)` the same fact while the edge still remembers the order
//! it was first attempted in.

use crate::graph::snapshot::{ElementRecord, GraphSnapshot, RecipeRecord};
use crate::graph::GraphError;
use std::collections::{BTreeMap, HashMap};

/// A discovered element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub index: usize,
    pub text: String,
    pub icon: String,
}

/// Order-independent key for a pair of element indices
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PairKey {
    low: usize,
    high: usize,
}

impl PairKey {
    pub fn new(a: usize, b: usize) -> Self {
        if a <= b {
            Self { low: a, high: b }
        } else {
            Self { low: b, high: a }
        }
    }
}

/// A recipe edge: `first + second = result`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecipeEdge {
    pub first: usize,
    pub second: usize,
    pub result: usize,
}

/// The element/recipe graph
#[derive(Debug, Default)]
pub struct GraphStore {
    elements: Vec<Element>,
    index_by_text: HashMap<String, usize>,
    recipes: BTreeMap<PairKey, RecipeEdge>,
}

impl GraphStore {
    /// Creates an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a graph from a parsed snapshot, validating it
    ///
    /// # Errors
    ///
    /// `CorruptSnapshot` when two elements share a text or a recipe refers to
    /// an index outside the element sequence.
    pub fn from_snapshot(snapshot: GraphSnapshot) -> Result<Self, GraphError> {
        let mut store = Self::new();

        for record in snapshot.elements {
            if let Some(&existing) = store.index_by_text.get(&record.text) {
                return Err(GraphError::CorruptSnapshot(format!(
                    "element '{}' appears at index {} and {}",
                    record.text,
                    existing,
                    store.elements.len()
                )));
            }
            let index = store.elements.len();
            store.index_by_text.insert(record.text.clone(), index);
            store.elements.push(Element {
                index,
                text: record.text,
                icon: record.icon,
            });
        }

        let len = store.elements.len();
        for record in snapshot.recipes {
            for index in [record.first, record.second, record.result] {
                if index >= len {
                    return Err(GraphError::CorruptSnapshot(format!(
                        "recipe {}-{} -> {} refers to index {} but only {} elements exist",
                        record.first, record.second, record.result, index, len
                    )));
                }
            }

            let key = PairKey::new(record.first, record.second);
            if let Some(existing) = store.recipes.get(&key) {
                tracing::warn!(
                    "Duplicate recipe {}-{} ignored, keeping {}-{} -> {}",
                    record.first,
                    record.second,
                    existing.first,
                    existing.second,
                    existing.result
                );
                continue;
            }
            store.recipes.insert(
                key,
                RecipeEdge {
                    first: record.first,
                    second: record.second,
                    result: record.result,
                },
            );
        }

        Ok(store)
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Number of recipe edges
    pub fn recipe_count(&self) -> usize {
        self.recipes.len()
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn element(&self, index: usize) -> Option<&Element> {
        self.elements.get(index)
    }

    /// Iterates recipe edges in pair-key order
    pub fn recipes(&self) -> impl Iterator<Item = &RecipeEdge> {
        self.recipes.values()
    }

    /// Looks up the index of the element with exactly this text
    pub fn find_index_by_text(&self, text: &str) -> Result<usize, GraphError> {
        self.index_by_text
            .get(text)
            .copied()
            .ok_or_else(|| GraphError::NotFound(text.to_string()))
    }

    /// Indices of every element whose text contains `needle`, ignoring case
    pub fn find_matching(&self, needle: &str) -> Vec<usize> {
        let needle = needle.to_lowercase();
        self.elements
            .iter()
            .filter(|e| e.text.to_lowercase().contains(&needle))
            .map(|e| e.index)
            .collect()
    }

    /// Whether a recipe exists for the pair, in either order
    pub fn has_recipe(&self, a: usize, b: usize) -> bool {
        self.recipes.contains_key(&PairKey::new(a, b))
    }

    /// Gets the recipe for the pair, in either order
    pub fn recipe(&self, a: usize, b: usize) -> Option<&RecipeEdge> {
        self.recipes.get(&PairKey::new(a, b))
    }

    /// Appends a new element and returns its index
    ///
    /// # Errors
    ///
    /// `DuplicateElement` carrying the existing index when the text is taken.
    pub fn append_element(&mut self, text: &str, icon: &str) -> Result<usize, GraphError> {
        if let Some(&index) = self.index_by_text.get(text) {
            return Err(GraphError::DuplicateElement {
                text: text.to_string(),
                index,
            });
        }

        let index = self.elements.len();
        self.index_by_text.insert(text.to_string(), index);
        self.elements.push(Element {
            index,
            text: text.to_string(),
            icon: icon.to_string(),
        });
        Ok(index)
    }

    /// Inserts `first + second = result` unless the pair already has a recipe
    ///
    /// Returns `true` if the edge was inserted. Existing edges are never
    /// overwritten.
    pub fn add_recipe(&mut self, first: usize, second: usize, result: usize) -> Result<bool, GraphError> {
        for index in [first, second, result] {
            if index >= self.elements.len() {
                return Err(GraphError::UnknownIndex(index));
            }
        }

        let key = PairKey::new(first, second);
        if self.recipes.contains_key(&key) {
            return Ok(false);
        }

        self.recipes.insert(
            key,
            RecipeEdge {
                first,
                second,
                result,
            },
        );
        Ok(true)
    }

    /// Copies the graph into its serializable form
    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot {
            elements: self
                .elements
                .iter()
                .map(|e| ElementRecord {
                    text: e.text.clone(),
                    icon: e.icon.clone(),
                })
                .collect(),
            recipes: self
                .recipes
                .values()
                .map(|r| RecipeRecord {
                    first: r.first,
                    second: r.second,
                    result: r.result,
                })
                .collect(),
        }
    }
}
