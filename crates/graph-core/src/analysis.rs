//! Workflow-level pattern analysis: node-type distribution, erosion-chain
//! length, disconnected-node flags, and pattern-table-informed successor
//! suggestions for a graph's terminal nodes.
//!
//! Grounded in the original `gaea2_workflow_tools.py`'s
//! `analyze_workflow_patterns` (node-type frequency, erosion-chain
//! walking, disconnected-node/missing-export suggestions, complexity
//! score) — adapted to operate on the in-memory canonical graph rather
//! than a project file on disk, since every other tool in this crate
//! already takes `(nodes, connections)` directly.

use std::collections::BTreeMap;

use crate::model::Graph;
use crate::pattern;
use crate::schema::TERMINAL_EXEMPT_NODES;

const EROSION_TYPES: &[&str] = &["Erosion", "Erosion2", "Wizard"];

#[derive(Debug, Clone)]
pub struct Suggestion {
    pub category: &'static str,
    pub severity: &'static str,
    pub message: String,
    pub node_ids: Vec<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct WorkflowAnalysis {
    pub node_type_counts: BTreeMap<String, u32>,
    pub total_connections: usize,
    pub erosion_chain_lengths: Vec<usize>,
    pub complexity_score: f64,
    pub suggestions: Vec<Suggestion>,
}

/// Follow the directed chain of erosion-family nodes starting at `start`,
/// stopping at the first successor that is not itself erosion-family.
fn erosion_chain_from(graph: &Graph, start: i64) -> Vec<i64> {
    let mut chain = vec![start];
    let mut current = start;
    loop {
        let next = graph
            .connections
            .iter()
            .filter(|c| c.from_node == current)
            .find_map(|c| {
                graph
                    .nodes
                    .iter()
                    .find(|n| n.id == c.to_node && EROSION_TYPES.contains(&n.node_type.as_str()))
                    .map(|n| n.id)
            });
        match next {
            Some(next_id) if !chain.contains(&next_id) => {
                chain.push(next_id);
                current = next_id;
            }
            _ => break,
        }
    }
    chain
}

/// Analyze a graph's node-type distribution, erosion chains, and obvious
/// workflow smells, surfacing the same suggestion categories the original
/// workflow analyzer does.
pub fn analyze_workflow(graph: &Graph) -> WorkflowAnalysis {
    let mut node_type_counts = BTreeMap::new();
    for node in &graph.nodes {
        *node_type_counts.entry(node.node_type.clone()).or_insert(0u32) += 1;
    }

    let mut suggestions = Vec::new();
    let mut erosion_chain_lengths = Vec::new();
    let mut seen_chain_starts = std::collections::HashSet::new();

    for node in &graph.nodes {
        if !EROSION_TYPES.contains(&node.node_type.as_str()) || seen_chain_starts.contains(&node.id) {
            continue;
        }
        let is_chain_head = !graph.connections.iter().any(|c| {
            c.to_node == node.id
                && graph
                    .nodes
                    .iter()
                    .any(|n| n.id == c.from_node && EROSION_TYPES.contains(&n.node_type.as_str()))
        });
        if !is_chain_head {
            continue;
        }
        let chain = erosion_chain_from(graph, node.id);
        seen_chain_starts.extend(chain.iter().copied());
        if chain.len() > 1 {
            if chain.len() > 3 {
                suggestions.push(Suggestion {
                    category: "performance",
                    severity: "high",
                    message: format!(
                        "long erosion chain detected ({} nodes); consider consolidating erosion operations",
                        chain.len()
                    ),
                    node_ids: chain.clone(),
                });
            }
            erosion_chain_lengths.push(chain.len());
        }
    }

    let connected: std::collections::HashSet<i64> = graph
        .connections
        .iter()
        .flat_map(|c| [c.from_node, c.to_node])
        .collect();
    for node in &graph.nodes {
        if !connected.contains(&node.id) && !TERMINAL_EXEMPT_NODES.contains(&node.node_type.as_str()) {
            suggestions.push(Suggestion {
                category: "workflow",
                severity: "medium",
                message: format!("disconnected node found: {} (id {})", node.node_type, node.id),
                node_ids: vec![node.id],
            });
        }
    }

    if !graph.nodes.iter().any(|n| TERMINAL_EXEMPT_NODES.contains(&n.node_type.as_str())) {
        suggestions.push(Suggestion {
            category: "workflow",
            severity: "high",
            message: "no export nodes found; add an Export node to save outputs".to_string(),
            node_ids: vec![],
        });
    }

    let primary_count = graph
        .nodes
        .iter()
        .filter(|n| matches!(n.node_type.as_str(), "Mountain" | "Ridge" | "Dunes" | "Canyon"))
        .count();
    if primary_count > 5 {
        suggestions.push(Suggestion {
            category: "complexity",
            severity: "medium",
            message: format!("{primary_count} primary terrain nodes detected; consider using Combine nodes"),
            node_ids: vec![],
        });
    }

    let rare_threshold = 5;
    for node in &graph.nodes {
        let usage = pattern::usage_frequency().get(node.node_type.as_str()).copied().unwrap_or(0);
        if usage > 0 && usage < rare_threshold {
            suggestions.push(Suggestion {
                category: "rarity",
                severity: "low",
                message: format!("{} node {} is unusual in the reference corpus", node.node_type, node.id),
                node_ids: vec![node.id],
            });
        }
    }

    let total_connections = graph.connections.len();
    let complexity_score =
        graph.nodes.len() as f64 + total_connections as f64 * 0.5 + erosion_chain_lengths.len() as f64 * 2.0;

    WorkflowAnalysis {
        node_type_counts,
        total_connections,
        erosion_chain_lengths,
        complexity_score,
        suggestions,
    }
}

/// Per-node successor suggestions for every node currently without an
/// outgoing connection — the "what would typically come next" view used
/// by the suggestion tool.
pub fn dangling_successor_suggestions(graph: &Graph, top_n: usize) -> BTreeMap<i64, Vec<&'static str>> {
    let has_outgoing: std::collections::HashSet<i64> = graph.connections.iter().map(|c| c.from_node).collect();
    graph
        .nodes
        .iter()
        .filter(|n| !has_outgoing.contains(&n.id) && !TERMINAL_EXEMPT_NODES.contains(&n.node_type.as_str()))
        .map(|n| (n.id, pattern::next_node_suggestions(&n.node_type, top_n)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Connection, Node};

    #[test]
    fn long_erosion_chain_is_flagged() {
        let graph = Graph {
            nodes: vec![
                Node::new(1, "Erosion2"),
                Node::new(2, "Erosion2"),
                Node::new(3, "Erosion2"),
                Node::new(4, "Erosion2"),
            ],
            connections: vec![Connection::new(1, 2), Connection::new(2, 3), Connection::new(3, 4)],
        };
        let analysis = analyze_workflow(&graph);
        assert!(analysis
            .suggestions
            .iter()
            .any(|s| s.category == "performance" && s.message.contains("4 nodes")));
    }

    #[test]
    fn missing_export_node_is_flagged() {
        let graph = Graph {
            nodes: vec![Node::new(1, "Mountain")],
            connections: vec![],
        };
        let analysis = analyze_workflow(&graph);
        assert!(analysis.suggestions.iter().any(|s| s.message.contains("no export nodes found")));
    }

    #[test]
    fn dangling_node_gets_successor_suggestions() {
        let graph = Graph {
            nodes: vec![Node::new(1, "Mountain")],
            connections: vec![],
        };
        let suggestions = dangling_successor_suggestions(&graph, 2);
        assert_eq!(suggestions.get(&1).map(Vec::len), Some(2));
    }
}
