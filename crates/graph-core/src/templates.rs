//! Template expansion: turning a named workflow template into a concrete
//! node+connection subgraph. Ported from the original's
//! `create_workflow_from_template`: nodes get non-sequential ids from the
//! same pool repair uses, a default edge is skipped entirely across a
//! Portal/PortalTransmit/PortalReceive node (those route out-of-band by
//! name, not by wire), and a `Combine` node fans in from its two
//! predecessors instead of taking one straight-chain edge.

use crate::model::{Connection, Graph, Node};
use crate::pattern::{self, WorkflowTemplate};
use crate::repair::next_free_id;
use crate::schema::PORTAL_NODES;

/// Expand a template into fresh nodes and connections. `start_id` is kept
/// for call-site compatibility but no longer seeds a contiguous range —
/// ids are drawn from the non-sequential pattern pool, same as repair-time
/// node insertion, so templates and repaired graphs share one id scheme.
pub fn expand_template(template: &WorkflowTemplate, start_id: i64) -> (Vec<Node>, Vec<Connection>) {
    let _ = start_id;
    let mut nodes: Vec<Node> = Vec::with_capacity(template.nodes.len());
    let mut connections = Vec::with_capacity(template.nodes.len().saturating_sub(1));

    for node_type in template.nodes {
        let scratch = Graph {
            nodes: nodes.clone(),
            connections: vec![],
        };
        let id = next_free_id(&scratch);
        nodes.push(Node::new(id, *node_type));
    }

    for i in 1..template.nodes.len() {
        let prev_type = template.nodes[i - 1];
        let current_type = template.nodes[i];
        if PORTAL_NODES.contains(&prev_type) || PORTAL_NODES.contains(&current_type) {
            continue;
        }
        let current_id = nodes[i].id;
        if current_type == "Combine" {
            connections.push(Connection {
                from_node: nodes[i - 1].id,
                to_node: current_id,
                from_port: "Out".to_string(),
                to_port: "Input2".to_string(),
            });
            if i >= 2 {
                connections.push(Connection {
                    from_node: nodes[i - 2].id,
                    to_node: current_id,
                    from_port: "Out".to_string(),
                    to_port: "In".to_string(),
                });
            }
        } else {
            connections.push(Connection::new(nodes[i - 1].id, current_id));
        }
    }

    (nodes, connections)
}

/// Expand the template matching a terrain-intent keyword, if one exists.
pub fn expand_for_terrain_type(terrain_type: &str, start_id: i64) -> Option<(Vec<Node>, Vec<Connection>)> {
    pattern::workflow_for_terrain_type(terrain_type).map(|t| expand_template(t, start_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_chain_links_each_node_to_the_next() {
        let template = pattern::workflow_for_terrain_type("mountain").unwrap();
        let (nodes, connections) = expand_template(template, 100);
        assert_eq!(nodes.len(), template.nodes.len());
        assert_eq!(connections.len(), template.nodes.len() - 1);
        for (i, c) in connections.iter().enumerate() {
            assert_eq!(c.from_node, nodes[i].id);
            assert_eq!(c.to_node, nodes[i + 1].id);
        }
    }

    #[test]
    fn node_ids_are_drawn_from_the_non_sequential_pool() {
        let template = pattern::workflow_for_terrain_type("mountain").unwrap();
        let (nodes, _) = expand_template(template, 100);
        assert!(!nodes.windows(2).all(|w| w[1].id == w[0].id + 1));
    }

    #[test]
    fn unknown_terrain_type_expands_to_nothing() {
        assert!(expand_for_terrain_type("not-a-real-intent", 1).is_none());
    }

    #[test]
    fn combine_node_fans_in_from_its_two_predecessors() {
        let template = pattern::workflow_for_terrain_type("blend").unwrap();
        let (nodes, connections) = expand_template(template, 100);
        let combine_idx = template.nodes.iter().position(|n| *n == "Combine").unwrap();
        let combine_id = nodes[combine_idx].id;
        let secondary = nodes[combine_idx - 1].id;
        let primary = nodes[combine_idx - 2].id;
        assert!(connections
            .iter()
            .any(|c| c.from_node == secondary && c.to_node == combine_id && c.to_port == "Input2"));
        assert!(connections
            .iter()
            .any(|c| c.from_node == primary && c.to_node == combine_id && c.to_port == "In"));
    }

    #[test]
    fn no_default_edge_crosses_a_portal_node() {
        let template = pattern::workflow_for_terrain_type("blend").unwrap();
        let (nodes, connections) = expand_template(template, 100);
        let transmit_idx = template.nodes.iter().position(|n| *n == "PortalTransmit").unwrap();
        let receive_idx = template.nodes.iter().position(|n| *n == "PortalReceive").unwrap();
        let erosion_id = nodes[transmit_idx - 1].id;
        let transmit_id = nodes[transmit_idx].id;
        let receive_id = nodes[receive_idx].id;
        let texture_id = nodes[receive_idx + 1].id;
        assert!(!connections.iter().any(|c| c.from_node == erosion_id && c.to_node == transmit_id));
        assert!(!connections.iter().any(|c| c.from_node == transmit_id && c.to_node == receive_id));
        assert!(!connections.iter().any(|c| c.from_node == receive_id && c.to_node == texture_id));
    }

    #[test]
    fn chain_resumes_normally_once_past_the_portal_pair() {
        let template = pattern::workflow_for_terrain_type("blend").unwrap();
        let (nodes, connections) = expand_template(template, 100);
        let last = nodes.len() - 1;
        assert!(connections
            .iter()
            .any(|c| c.from_node == nodes[last - 1].id && c.to_node == nodes[last].id));
    }
}
