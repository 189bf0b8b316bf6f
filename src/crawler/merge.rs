//! Merging oracle answers into the graph
//!
//! Callers hold the graph lock for the whole merge, so two in-flight requests
//! that discover the same element or the same recipe collapse into one entry:
//! the first merge appends, the second sees `DuplicateElement` or an existing
//! edge and reuses it.

use crate::crawler::scheduler::Pair;
use crate::graph::{GraphError, GraphStore};
use crate::oracle::CombinationResult;
use crate::state::CrawlStatus;

/// What a merge changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The pair combines into nothing
    Nothing,

    /// The pair combines into the element at `result`
    Merged {
        result: usize,
        new_element: bool,
        new_recipe: bool,
    },
}

/// Applies one oracle answer for `pair` to `graph`, updating `status`
pub fn merge_result(
    graph: &mut GraphStore,
    status: &CrawlStatus,
    pair: Pair,
    result: &CombinationResult,
) -> Result<MergeOutcome, GraphError> {
    status.record_attempt();

    let (text, icon, is_new) = match result {
        CombinationResult::Nothing => return Ok(MergeOutcome::Nothing),
        CombinationResult::Found {
            result_text,
            result_icon,
            is_new,
        } => (result_text, result_icon, *is_new),
    };

    if is_new {
        status.record_discovery();
    }

    let (index, new_element) = match graph.append_element(text, icon) {
        Ok(index) => {
            status.record_new_element();
            (index, true)
        }
        Err(GraphError::DuplicateElement { index, .. }) => (index, false),
        Err(e) => return Err(e),
    };

    let new_recipe = graph.add_recipe(pair.first, pair.second, index)?;
    if new_recipe {
        status.record_new_recipe();
    }

    Ok(MergeOutcome::Merged {
        result: index,
        new_element,
        new_recipe,
    })
}
