//! # Ancestor Closure
//!
//! Unbounded ancestor sets for every node of a graph, computed once and kept
//! as a read-only lookup table.
//!
//! The graph may contain cycles. Strongly connected components are found
//! first with an iterative Tarjan pass (no recursion, so deep chains cannot
//! overflow the stack). Tarjan emits components sinks-first, so a single
//! sweep in emission order can close each component over the components it
//! points at, all of which are already final. Every member of a component
//! shares one stored set.

use crate::graph::{DirectedGraph, ParentGraph};
use serde::ser::{Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

// =============================================================================
// ANCESTOR SET
// =============================================================================

/// Node -> every node reachable through parent edges, the node included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AncestorSet<N: Ord> {
    /// Node -> index into `sets`.
    index: BTreeMap<N, usize>,
    /// One closure per strongly connected component.
    sets: Vec<BTreeSet<N>>,
}

impl<N: Ord> Default for AncestorSet<N> {
    fn default() -> Self {
        Self {
            index: BTreeMap::new(),
            sets: Vec::new(),
        }
    }
}

impl<N: Ord + Clone> AncestorSet<N> {
    /// Build a table from an explicit map, e.g. one loaded from disk.
    ///
    /// Each entry keeps its own set; nothing is re-derived.
    #[must_use]
    pub fn from_map(map: BTreeMap<N, BTreeSet<N>>) -> Self {
        let mut index = BTreeMap::new();
        let mut sets = Vec::with_capacity(map.len());
        for (node, set) in map {
            index.insert(node, sets.len());
            sets.push(set);
        }
        Self { index, sets }
    }

    /// Expand into a plain map with one set per node.
    #[must_use]
    pub fn to_map(&self) -> BTreeMap<N, BTreeSet<N>> {
        self.iter()
            .map(|(node, set)| (node.clone(), set.clone()))
            .collect()
    }
}

impl<N: Ord> AncestorSet<N> {
    /// Ancestors of `node`, including `node` itself.
    #[must_use]
    pub fn get(&self, node: &N) -> Option<&BTreeSet<N>> {
        self.index.get(node).and_then(|&i| self.sets.get(i))
    }

    /// Whether `ancestor` is reachable from `node`.
    #[must_use]
    pub fn contains(&self, node: &N, ancestor: &N) -> bool {
        self.get(node).is_some_and(|set| set.contains(ancestor))
    }

    /// `(node, ancestors)` pairs in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = (&N, &BTreeSet<N>)> {
        self.index
            .iter()
            .filter_map(|(node, &i)| self.sets.get(i).map(|set| (node, set)))
    }

    /// Nodes covered by the table.
    pub fn nodes(&self) -> impl Iterator<Item = &N> {
        self.index.keys()
    }

    /// Number of nodes covered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Number of distinct stored sets (one per component).
    #[must_use]
    pub fn set_count(&self) -> usize {
        self.sets.len()
    }

    /// The shared layout, for binary snapshots.
    pub(crate) fn parts(&self) -> (&BTreeMap<N, usize>, &[BTreeSet<N>]) {
        (&self.index, &self.sets)
    }

    /// Rebuild from a shared layout. `None` if an index points past `sets`.
    pub(crate) fn from_parts(index: BTreeMap<N, usize>, sets: Vec<BTreeSet<N>>) -> Option<Self> {
        if index.values().any(|&i| i >= sets.len()) {
            return None;
        }
        Some(Self { index, sets })
    }
}

impl<N: Ord + Serialize> Serialize for AncestorSet<N> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

// =============================================================================
// CLOSURE COMPUTATION
// =============================================================================

/// Computes [`AncestorSet`] tables.
pub struct AncestorClosure;

impl AncestorClosure {
    /// Ancestor sets for every node appearing anywhere in `graph`.
    ///
    /// Total over any finite graph, including self-loops and cycles.
    #[must_use]
    pub fn compute<N: Ord + Clone + fmt::Debug>(graph: &DirectedGraph<N>) -> AncestorSet<N> {
        let nodes: Vec<N> = graph.all_nodes().into_iter().cloned().collect();
        let position: BTreeMap<&N, usize> =
            nodes.iter().enumerate().map(|(i, n)| (n, i)).collect();

        let adjacency: Vec<Vec<usize>> = nodes
            .iter()
            .map(|node| {
                graph
                    .parents(node)
                    .map(|parents| {
                        parents
                            .iter()
                            .filter_map(|p| position.get(p).copied())
                            .collect()
                    })
                    .unwrap_or_default()
            })
            .collect();

        let components = tarjan_scc(&adjacency);

        let mut component_of = vec![0usize; nodes.len()];
        for (c, members) in components.iter().enumerate() {
            for &m in members {
                component_of[m] = c;
            }
        }

        // Emission order is sinks-first: every component a member points
        // outside of has a smaller index and is already closed.
        let mut sets: Vec<BTreeSet<N>> = Vec::with_capacity(components.len());
        for (c, members) in components.iter().enumerate() {
            let mut closure: BTreeSet<N> = members.iter().map(|&m| nodes[m].clone()).collect();
            let mut merged = BTreeSet::new();
            for &m in members {
                for &p in &adjacency[m] {
                    let pc = component_of[p];
                    if pc != c
                        && merged.insert(pc)
                        && let Some(parent_closure) = sets.get(pc)
                    {
                        closure.extend(parent_closure.iter().cloned());
                    }
                }
            }
            sets.push(closure);
        }

        tracing::info!(
            nodes = nodes.len(),
            components = sets.len(),
            "computed ancestor closure"
        );

        let index = nodes
            .into_iter()
            .zip(component_of)
            .collect::<BTreeMap<N, usize>>();
        AncestorSet { index, sets }
    }

    /// Ancestors of a single node, computed over the whole graph.
    ///
    /// Returns `{node}` for a node the graph does not mention.
    #[must_use]
    pub fn ancestors_of<N: Ord + Clone + fmt::Debug>(
        graph: &DirectedGraph<N>,
        node: &N,
    ) -> BTreeSet<N> {
        Self::compute(graph)
            .get(node)
            .cloned()
            .unwrap_or_else(|| BTreeSet::from([node.clone()]))
    }
}

// =============================================================================
// TARJAN SCC (ITERATIVE)
// =============================================================================

/// Strongly connected components of `adjacency`, sinks first.
///
/// Explicit call stack of `(node, next edge)` frames instead of recursion.
fn tarjan_scc(adjacency: &[Vec<usize>]) -> Vec<Vec<usize>> {
    const UNVISITED: usize = usize::MAX;

    let n = adjacency.len();
    let mut index = vec![UNVISITED; n];
    let mut lowlink = vec![0usize; n];
    let mut on_stack = vec![false; n];
    let mut stack: Vec<usize> = Vec::new();
    let mut call_stack: Vec<(usize, usize)> = Vec::new();
    let mut next_index = 0usize;
    let mut components = Vec::new();

    for start in 0..n {
        if index[start] != UNVISITED {
            continue;
        }

        index[start] = next_index;
        lowlink[start] = next_index;
        next_index += 1;
        stack.push(start);
        on_stack[start] = true;
        call_stack.push((start, 0));

        while let Some(frame) = call_stack.last_mut() {
            let v = frame.0;

            if let Some(&w) = adjacency[v].get(frame.1) {
                frame.1 += 1;

                if index[w] == UNVISITED {
                    index[w] = next_index;
                    lowlink[w] = next_index;
                    next_index += 1;
                    stack.push(w);
                    on_stack[w] = true;
                    call_stack.push((w, 0));
                } else if on_stack[w] {
                    lowlink[v] = lowlink[v].min(index[w]);
                }
                continue;
            }

            call_stack.pop();
            if let Some(&(caller, _)) = call_stack.last() {
                lowlink[caller] = lowlink[caller].min(lowlink[v]);
            }

            if lowlink[v] == index[v] {
                let mut members = Vec::new();
                while let Some(w) = stack.pop() {
                    on_stack[w] = false;
                    members.push(w);
                    if w == v {
                        break;
                    }
                }
                components.push(members);
            }
        }
    }

    components
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{DuplicatePolicy, NodeRecord};

    fn graph(edges: &[(&str, &[&str])]) -> DirectedGraph<String> {
        DirectedGraph::from_records(
            edges.iter().map(|(node, parents)| {
                NodeRecord::new(
                    node.to_string(),
                    parents.iter().map(|p| p.to_string()).collect(),
                )
            }),
            DuplicatePolicy::Reject,
        )
        .expect("valid graph")
    }

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn ancestors(table: &AncestorSet<String>, node: &str) -> BTreeSet<String> {
        table.get(&node.to_string()).cloned().unwrap_or_default()
    }

    #[test]
    fn leaf_parents_are_covered() {
        let table = AncestorClosure::compute(&graph(&[("A", &["B"])]));

        assert_eq!(table.len(), 2);
        assert_eq!(ancestors(&table, "A"), set(&["A", "B"]));
        assert_eq!(ancestors(&table, "B"), set(&["B"]));
    }

    #[test]
    fn three_cycle_shares_one_set() {
        let table = AncestorClosure::compute(&graph(&[
            ("A", &["B"]),
            ("B", &["C"]),
            ("C", &["A"]),
        ]));

        for node in ["A", "B", "C"] {
            assert_eq!(ancestors(&table, node), set(&["A", "B", "C"]));
        }
        assert_eq!(table.set_count(), 1);
    }

    #[test]
    fn cycle_with_exits_and_entry() {
        let table = AncestorClosure::compute(&graph(&[
            ("0", &["A"]),
            ("A", &["B", "D"]),
            ("B", &["C", "E"]),
            ("C", &["A"]),
        ]));

        let cycle = set(&["A", "B", "C", "D", "E"]);
        assert_eq!(ancestors(&table, "0"), set(&["0", "A", "B", "C", "D", "E"]));
        assert_eq!(ancestors(&table, "A"), cycle);
        assert_eq!(ancestors(&table, "B"), cycle);
        assert_eq!(ancestors(&table, "C"), cycle);
        assert_eq!(ancestors(&table, "D"), set(&["D"]));
        assert_eq!(ancestors(&table, "E"), set(&["E"]));
    }

    #[test]
    fn tree_with_shared_parents() {
        let table = AncestorClosure::compute(&graph(&[
            ("C1", &["B1"]),
            ("D1", &["B1", "B2"]),
            ("D2", &["B2"]),
            ("B1", &["A1"]),
            ("B2", &["A2"]),
        ]));

        assert_eq!(ancestors(&table, "C1"), set(&["C1", "B1", "A1"]));
        assert_eq!(ancestors(&table, "D1"), set(&["D1", "B1", "A1", "B2", "A2"]));
        assert_eq!(ancestors(&table, "D2"), set(&["D2", "B2", "A2"]));
        assert_eq!(ancestors(&table, "A1"), set(&["A1"]));
        assert_eq!(table.len(), 7);
    }

    #[test]
    fn self_loop_is_total() {
        let table = AncestorClosure::compute(&graph(&[("N", &["N"])]));
        assert_eq!(ancestors(&table, "N"), set(&["N"]));
    }

    #[test]
    fn every_node_contains_itself() {
        let table = AncestorClosure::compute(&graph(&[
            ("X", &["Y", "Z"]),
            ("Y", &["X"]),
            ("Lonely", &[]),
        ]));

        for (node, set) in table.iter() {
            assert!(set.contains(node), "{node} missing from its own ancestors");
        }
        assert_eq!(ancestors(&table, "Lonely"), set(&["Lonely"]));
    }

    #[test]
    fn long_chain_closes_fully() {
        let depth: u32 = 2_000;
        let chain = DirectedGraph::from_edges((0..depth).map(|i| (i + 1, i)));

        let table = AncestorClosure::compute(&chain);
        assert_eq!(
            table.get(&0).map(BTreeSet::len),
            Some(depth as usize + 1)
        );
        assert_eq!(table.get(&depth).map(BTreeSet::len), Some(1));
    }

    #[test]
    fn map_roundtrip() {
        let table = AncestorClosure::compute(&graph(&[("A", &["B"]), ("B", &["A"])]));
        let rebuilt = AncestorSet::from_map(table.to_map());

        assert_eq!(rebuilt.to_map(), table.to_map());
        assert_eq!(rebuilt.set_count(), 2);
        assert!(rebuilt.contains(&"A".to_string(), &"B".to_string()));
    }

    #[test]
    fn ancestors_of_unknown_node_is_itself() {
        let g = graph(&[("A", &["B"])]);
        assert_eq!(
            AncestorClosure::ancestors_of(&g, &"Q".to_string()),
            set(&["Q"])
        );
    }

    #[test]
    fn serializes_as_plain_map() {
        let table = AncestorClosure::compute(&graph(&[("A", &["B"])]));
        let json = serde_json::to_value(&table).expect("serialize");
        assert_eq!(json, serde_json::json!({"A": ["A", "B"], "B": ["B"]}));
    }
}
