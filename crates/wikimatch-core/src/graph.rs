//! # Graph Model
//!
//! The directed "toward ancestors" graph shared by both reachability
//! algorithms.
//!
//! Every node maps to a record whose `categories` are that node's parents.
//! A parent does not have to be a key itself: a node absent from the graph
//! simply has no parents and traversal stops there.
//!
//! All data structures use `BTreeMap`/`BTreeSet` for deterministic ordering.

use crate::error::{MatchError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

// =============================================================================
// PARENTGRAPH TRAIT
// =============================================================================

/// Read-only parent lookup, the only view the traversal code needs.
pub trait ParentGraph<N> {
    /// Direct parents of `node`, or `None` if the node is not a key.
    fn parents(&self, node: &N) -> Option<&BTreeSet<N>>;

    /// Whether `node` is a key of the graph.
    fn contains_node(&self, node: &N) -> bool {
        self.parents(node).is_some()
    }
}

// =============================================================================
// RECORDS
// =============================================================================

/// What the graph stores for one node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParentRecord<N> {
    /// External id (page id in the dump), if known.
    pub id: Option<u64>,
    /// Parents in the ancestor direction.
    pub categories: BTreeSet<N>,
}

impl<N: Ord> ParentRecord<N> {
    /// Create a record with no parents.
    #[must_use]
    pub fn new(id: Option<u64>) -> Self {
        Self {
            id,
            categories: BTreeSet::new(),
        }
    }
}

/// Input form of one node, as supplied by the loader.
///
/// Kept as a list entry rather than a map entry so duplicate definitions
/// reach the builder instead of being collapsed by the deserializer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord<N> {
    pub node: N,
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub categories: Vec<N>,
}

impl<N> NodeRecord<N> {
    /// Create a record for `node` with the given parents.
    pub fn new(node: N, categories: Vec<N>) -> Self {
        Self {
            node,
            id: None,
            categories,
        }
    }

    /// Attach an external id.
    #[must_use]
    pub fn with_id(mut self, id: u64) -> Self {
        self.id = Some(id);
        self
    }
}

/// How the builder treats a node defined more than once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Any repeat is an integrity error (canonical page titles).
    Reject,
    /// Identical repeats collapse, conflicting repeats are an integrity
    /// error (category definitions).
    AllowIdentical,
}

// =============================================================================
// DIRECTED GRAPH
// =============================================================================

/// A node -> parents graph, immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DirectedGraph<N: Ord> {
    records: BTreeMap<N, ParentRecord<N>>,
}

impl<N: Ord> Default for DirectedGraph<N> {
    fn default() -> Self {
        Self {
            records: BTreeMap::new(),
        }
    }
}

impl<N: Ord + Clone + fmt::Debug> DirectedGraph<N> {
    /// Create an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from node records, enforcing `policy` on repeats.
    pub fn from_records<I>(records: I, policy: DuplicatePolicy) -> Result<Self>
    where
        I: IntoIterator<Item = NodeRecord<N>>,
    {
        let mut graph = Self::new();
        for record in records {
            let NodeRecord {
                node,
                id,
                categories,
            } = record;
            let incoming = ParentRecord {
                id,
                categories: categories.into_iter().collect(),
            };

            match graph.records.get(&node) {
                None => {
                    graph.records.insert(node, incoming);
                }
                Some(existing) => match policy {
                    DuplicatePolicy::Reject => {
                        return Err(MatchError::data_integrity(format!(
                            "{:?} is defined more than once",
                            node
                        )));
                    }
                    DuplicatePolicy::AllowIdentical if *existing == incoming => {}
                    DuplicatePolicy::AllowIdentical => {
                        return Err(MatchError::data_integrity(format!(
                            "{:?} is defined twice with different content",
                            node
                        )));
                    }
                },
            }
        }
        Ok(graph)
    }

    /// Build a graph from `(parent, child)` pairs, e.g. an is-a edge list.
    ///
    /// Only children become keys; a root appears only as someone's parent.
    pub fn from_edges<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (N, N)>,
    {
        let mut records: BTreeMap<N, ParentRecord<N>> = BTreeMap::new();
        for (parent, child) in pairs {
            records
                .entry(child)
                .or_insert_with(|| ParentRecord::new(None))
                .categories
                .insert(parent);
        }
        Self { records }
    }

    /// Every node in the graph: keys plus every referenced parent.
    #[must_use]
    pub fn all_nodes(&self) -> BTreeSet<&N> {
        let mut nodes: BTreeSet<&N> = self.records.keys().collect();
        for record in self.records.values() {
            nodes.extend(record.categories.iter());
        }
        nodes
    }
}

impl<N: Ord> DirectedGraph<N> {
    /// The record stored for `node`.
    #[must_use]
    pub fn get(&self, node: &N) -> Option<&ParentRecord<N>> {
        self.records.get(node)
    }

    /// External id of `node`, if it is a key and has one.
    #[must_use]
    pub fn node_id(&self, node: &N) -> Option<u64> {
        self.records.get(node).and_then(|r| r.id)
    }

    /// Keys in deterministic order.
    pub fn keys(&self) -> impl Iterator<Item = &N> {
        self.records.keys()
    }

    /// `(node, record)` pairs in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = (&N, &ParentRecord<N>)> {
        self.records.iter()
    }

    /// Number of keys.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.records.len()
    }

    /// Number of parent edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.records.values().map(|r| r.categories.len()).sum()
    }

    /// Whether the graph has no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Convert back into the loader's list form.
    #[must_use]
    pub fn to_records(&self) -> Vec<NodeRecord<N>>
    where
        N: Clone,
    {
        self.records
            .iter()
            .map(|(node, record)| NodeRecord {
                node: node.clone(),
                id: record.id,
                categories: record.categories.iter().cloned().collect(),
            })
            .collect()
    }
}

impl<N: Ord> ParentGraph<N> for DirectedGraph<N> {
    fn parents(&self, node: &N) -> Option<&BTreeSet<N>> {
        self.records.get(node).map(|r| &r.categories)
    }
}

// =============================================================================
// TESTS
// =============================================================================
