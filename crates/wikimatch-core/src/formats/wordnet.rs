//! WordNet is-a edge lists.

use crate::error::{MatchError, Result};
use crate::graph::DirectedGraph;

/// Parse `parent child` lines into a child -> parents graph.
///
/// Blank lines are skipped. Any other line must hold exactly two
/// whitespace-separated ids.
pub fn parse_is_a(text: &str) -> Result<DirectedGraph<String>> {
    let mut pairs = Vec::new();
    for (i, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let mut fields = line.split_whitespace();
        match (fields.next(), fields.next(), fields.next()) {
            (Some(parent), Some(child), None) => {
                pairs.push((parent.to_string(), child.to_string()));
            }
            _ => {
                return Err(MatchError::parse(
                    i + 1,
                    format!("expected `parent child`, got {line:?}"),
                ));
            }
        }
    }

    let graph = DirectedGraph::from_edges(pairs);
    tracing::info!(
        children = graph.node_count(),
        edges = graph.edge_count(),
        "parsed is-a hierarchy"
    );
    Ok(graph)
}
