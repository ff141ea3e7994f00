//! # Bounded Reachability
//!
//! Depth-limited ancestor search from one source, run per query against a
//! graph too large to close completely.
//!
//! The result holds every node whose shortest hop distance from the source
//! is at most `max_depth` (the source is hop 0). Nodes closer than the bound
//! are expanded; nodes exactly at the bound form the boundary frontier and
//! are recorded without being expanded.
//!
//! The walk is breadth-first with a visited set that lives only for one
//! call. Each node is expanded once, at its shortest distance, so the
//! result grows monotonically with `max_depth` and cycles terminate.

use crate::error::{MatchError, Result};
use crate::graph::ParentGraph;
use serde::Serialize;
use std::collections::{BTreeSet, VecDeque};

/// Outcome of one bounded search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReachabilityResult<N: Ord> {
    /// Every node within the bound, sources included.
    pub reached: BTreeSet<N>,
    /// The bound cut at least one edge to an unseen node. When `false`,
    /// `reached` is the exact closure.
    pub truncated: bool,
}

impl<N: Ord> ReachabilityResult<N> {
    /// Whether `reached` is the complete closure.
    #[must_use]
    pub fn is_exact(&self) -> bool {
        !self.truncated
    }

    /// Whether `node` was reached.
    #[must_use]
    pub fn contains(&self, node: &N) -> bool {
        self.reached.contains(node)
    }

    /// Number of reached nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.reached.len()
    }

    /// Whether nothing was reached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reached.is_empty()
    }
}

/// Nodes within `max_depth` hops of `source`.
///
/// `max_depth` must be at least 1.
pub fn reach<N, G>(graph: &G, source: &N, max_depth: usize) -> Result<ReachabilityResult<N>>
where
    N: Ord + Clone,
    G: ParentGraph<N> + ?Sized,
{
    reach_from(graph, std::iter::once(source.clone()), max_depth)
}

/// Nodes within `max_depth` hops of any of `sources` (all at hop 0).
pub fn reach_from<N, G, I>(graph: &G, sources: I, max_depth: usize) -> Result<ReachabilityResult<N>>
where
    N: Ord + Clone,
    G: ParentGraph<N> + ?Sized,
    I: IntoIterator<Item = N>,
{
    if max_depth == 0 {
        return Err(MatchError::InvalidDepth { depth: max_depth });
    }
    Ok(walk(graph, sources, max_depth))
}

/// Breadth-first walk. A bound of 0 returns the sources and only reports
/// whether any of them has parents.
pub(crate) fn walk<N, G, I>(graph: &G, sources: I, bound: usize) -> ReachabilityResult<N>
where
    N: Ord + Clone,
    G: ParentGraph<N> + ?Sized,
    I: IntoIterator<Item = N>,
{
    let mut reached = BTreeSet::new();
    let mut queue = VecDeque::new();
    let mut frontier = Vec::new();

    for source in sources {
        if reached.insert(source.clone()) {
            queue.push_back((source, 0usize));
        }
    }

    while let Some((current, depth)) = queue.pop_front() {
        let Some(parents) = graph.parents(&current) else {
            continue;
        };

        if depth >= bound {
            frontier.push(current);
            continue;
        }

        for parent in parents {
            if reached.insert(parent.clone()) {
                queue.push_back((parent.clone(), depth.saturating_add(1)));
            }
        }
    }

    // Anything not yet reached is at least one hop past the bound.
    let truncated = frontier.iter().any(|node| {
        graph
            .parents(node)
            .is_some_and(|parents| parents.iter().any(|p| !reached.contains(p)))
    });

    if truncated {
        tracing::debug!(
            reached = reached.len(),
            bound,
            "bounded reachability truncated"
        );
    }

    ReachabilityResult { reached, truncated }
}

// =============================================================================
// TESTS
// =============================================================================
