//! On-disk snapshot format
//!
//! A snapshot is a single JSON document:
//!
//! ```json
//! {
//!   "elements": [{ "text": "Water", "icon": "💧" }, { "text": "Fire", "icon": "🔥" }],
//!   "recipes": { "0-1": 2 }
//! }
//! ```
//!
//! Older producers wrote `emoji` instead of `icon`; both are accepted on read,
//! and `icon` is always written.

use crate::graph::GraphError;
use serde::{Deserialize, Serialize};

/// One element as stored in a snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementRecord {
    pub text: String,
    #[serde(alias = "emoji")]
    pub icon: String,
}

/// One recipe as stored in a snapshot, in the order the pair was attempted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecipeRecord {
    pub first: usize,
    pub second: usize,
    pub result: usize,
}

/// Full serialized graph state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub elements: Vec<ElementRecord>,
    #[serde(with = "recipe_map")]
    pub recipes: Vec<RecipeRecord>,
}

impl GraphSnapshot {
    /// Parses a snapshot document
    ///
    /// Any structural mismatch is reported as `CorruptSnapshot`. Semantic
    /// checks (unique texts, index bounds) happen in `GraphStore::from_snapshot`.
    pub fn from_json(bytes: &[u8]) -> Result<Self, GraphError> {
        serde_json::from_slice(bytes).map_err(|e| GraphError::CorruptSnapshot(e.to_string()))
    }

    /// Serializes the snapshot as pretty-printed JSON
    pub fn to_json(&self) -> Result<Vec<u8>, GraphError> {
        Ok(serde_json::to_vec_pretty(self)?)
    }
}

/// Formats a recipe key as `"first-second"`
pub fn format_recipe_key(first: usize, second: usize) -> String {
    format!("{}-{}", first, second)
}

/// Parses a `"first-second"` recipe key
pub fn parse_recipe_key(key: &str) -> Option<(usize, usize)> {
    let (first, second) = key.split_once('-')?;
    let first = first.parse().ok()?;
    let second = second.parse().ok()?;
    Some((first, second))
}

/// Serde glue between `Vec<RecipeRecord>` and the string-keyed JSON object
mod recipe_map {
    use super::{format_recipe_key, parse_recipe_key, RecipeRecord};
    use serde::de::{self, MapAccess, Visitor};
    use serde::{Deserializer, Serializer};
    use std::fmt;

    pub fn serialize<S: Serializer>(recipes: &[RecipeRecord], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(
            recipes
                .iter()
                .map(|r| (format_recipe_key(r.first, r.second), r.result)),
        )
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<RecipeRecord>, D::Error> {
        deserializer.deserialize_map(RecipeMapVisitor)
    }

    struct RecipeMapVisitor;

    impl<'de> Visitor<'de> for RecipeMapVisitor {
        type Value = Vec<RecipeRecord>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("an object mapping \"first-second\" keys to result indices")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
            let mut recipes = Vec::with_capacity(map.size_hint().unwrap_or(0));

            while let Some((key, result)) = map.next_entry::<String, usize>()? {
                let (first, second) = parse_recipe_key(&key)
                    .ok_or_else(|| de::Error::custom(format!("invalid recipe key '{}'", key)))?;
                recipes.push(RecipeRecord {
                    first,
                    second,
                    result,
                });
            }

            Ok(recipes)
        }
    }
}
