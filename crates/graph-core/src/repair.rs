//! Graph repair engine: conservative normalization/pruning, and an
//! optional aggressive pass that adds missing companion nodes and
//! reconnects orphans.
//!
//! Never adds an Export node, in either mode — real terrain projects are
//! routinely saved without one, so treating its absence as something to
//! fix would contradict how the format is actually used.

use std::collections::HashSet;

use crate::model::{Connection, Graph, Node, PropertyValue};
use crate::pattern;
use crate::schema::{self, PropertyDefinition, PropertyKind, PROPERTY_LIMITED_NODES};

#[derive(Debug, Clone, Default)]
pub struct RepairReport {
    pub fixes_applied: Vec<String>,
    pub fixed_nodes: Vec<i64>,
}

impl RepairReport {
    fn note(&mut self, message: impl Into<String>) {
        self.fixes_applied.push(message.into());
    }

    fn note_node(&mut self, node_id: i64, message: impl Into<String>) {
        self.fixes_applied.push(message.into());
        if !self.fixed_nodes.contains(&node_id) {
            self.fixed_nodes.push(node_id);
        }
    }
}

/// Conservative repair: the connections and properties already present
/// are normalized, deduplicated, coerced, and pruned — nothing new is
/// added or reconnected.
pub fn repair_conservative(graph: &mut Graph) -> RepairReport {
    let mut report = RepairReport::default();
    dedupe_connections(graph, &mut report);
    coerce_and_default_properties(graph, &mut report);
    prune_property_limited_nodes(graph, &mut report);
    drop_dangling_connections(graph, &mut report);
    report
}

/// Aggressive repair: runs conservative repair first, then adds missing
/// mandatory companion nodes, connects orphans via the pattern table,
/// reorders Erosion2 ahead of Rivers, and applies performance-tuned
/// property defaults to heavy nodes. Does not insert an Export node.
pub fn repair_aggressive(graph: &mut Graph) -> RepairReport {
    let mut report = repair_conservative(graph);
    add_missing_companion_nodes(graph, &mut report);
    connect_orphans(graph, &mut report);
    reorder_erosion_before_rivers(graph, &mut report);
    apply_performance_tuning(graph, &mut report);
    report
}

fn dedupe_connections(graph: &mut Graph, report: &mut RepairReport) {
    let mut seen = HashSet::new();
    let before = graph.connections.len();
    graph.connections.retain(|c| seen.insert(c.key()));
    let removed = before - graph.connections.len();
    if removed > 0 {
        report.note(format!("removed {removed} duplicate connection(s)"));
    }
}

/// Conservative step 3: replace each existing property with the schema's
/// clamped/typed value, and fill in defaults for anything missing that has
/// one. Ported from the original's `apply_default_properties`, enriched to
/// also clamp values already present (the original only fills gaps). Skips
/// property-limited nodes entirely — those get pruned instead, not defaulted.
fn coerce_and_default_properties(graph: &mut Graph, report: &mut RepairReport) {
    for node in &mut graph.nodes {
        if PROPERTY_LIMITED_NODES.contains(&node.node_type.as_str()) {
            continue;
        }
        let mut touched = false;
        let keys: Vec<String> = node.properties.keys().cloned().collect();
        for key in &keys {
            let Some(def) = schema::property_definition_for(&node.node_type, key) else {
                continue;
            };
            let current = node.properties.get(key).cloned().unwrap();
            if let Some(fixed) = coerced_value(def, &current) {
                if fixed != current {
                    node.properties.insert(key.clone(), fixed);
                    touched = true;
                }
            }
        }
        for def in schema::applicable_property_definitions(&node.node_type) {
            if node.properties.contains_key(def.name) {
                continue;
            }
            if let Some(default) = def.default {
                node.properties.insert(def.name.to_string(), default.to_value());
                touched = true;
            }
        }
        if touched {
            report.note_node(
                node.id,
                format!("coerced/defaulted properties on {} node {}", node.node_type, node.id),
            );
        }
    }
}

/// Coerce one property value to its definition: an integral float becomes
/// an `Int` for an int-kind property, and any numeric value with a defined
/// range is clamped into it. Returns `None` for kind mismatches that aren't
/// ours to fix (the validator reports those as errors instead).
fn coerced_value(def: &PropertyDefinition, value: &PropertyValue) -> Option<PropertyValue> {
    let as_int = match (def.kind, value) {
        (PropertyKind::Int, PropertyValue::Float(f)) if f.fract() == 0.0 => Some(PropertyValue::Int(*f as i64)),
        _ => None,
    };
    let value = as_int.as_ref().unwrap_or(value);
    match def.range {
        Some((min, max)) => {
            let v = value.as_f64()?;
            let clamped = v.clamp(min, max);
            if clamped == v {
                Some(value.clone())
            } else {
                Some(match value {
                    PropertyValue::Int(_) => PropertyValue::Int(clamped as i64),
                    _ => PropertyValue::Float(clamped),
                })
            }
        }
        None => as_int,
    }
}

fn prune_property_limited_nodes(graph: &mut Graph, report: &mut RepairReport) {
    for node in &mut graph.nodes {
        if !PROPERTY_LIMITED_NODES.contains(&node.node_type.as_str()) || node.properties.len() <= 3 {
            continue;
        }
        let keep: Vec<String> = match schema::essential_properties(&node.node_type) {
            Some(essentials) => essentials.iter().map(|s| s.to_string()).collect(),
            None => node.properties.keys().take(3).cloned().collect(),
        };
        node.properties.retain(|k, _| keep.contains(k));
        report.note_node(
            node.id,
            format!(
                "limited {} node {} to {} essential properties",
                node.node_type,
                node.id,
                node.properties.len()
            ),
        );
    }
}

fn drop_dangling_connections(graph: &mut Graph, report: &mut RepairReport) {
    let ids: HashSet<i64> = graph.nodes.iter().map(|n| n.id).collect();
    let before = graph.connections.len();
    graph
        .connections
        .retain(|c| ids.contains(&c.from_node) && ids.contains(&c.to_node));
    let removed = before - graph.connections.len();
    if removed > 0 {
        report.note(format!("dropped {removed} dangling connection(s)"));
    }
}

/// Pick a non-sequential id from the fixed pattern pool, falling back to a
/// deterministic `base + n*10` once the pool is exhausted. Shared with
/// template expansion, which needs the same non-sequential id behavior.
pub(crate) fn next_free_id(graph: &Graph) -> i64 {
    const POOL: &[i64] = &[183, 668, 427, 281, 294, 949, 483, 800, 375, 245, 958, 174, 258, 975, 639, 514, 287, 490, 340];
    let used: HashSet<i64> = graph.nodes.iter().map(|n| n.id).collect();
    for &candidate in POOL {
        if !used.contains(&candidate) {
            return candidate;
        }
    }
    100 + (graph.nodes.len() as i64) * 10
}

fn add_missing_companion_nodes(graph: &mut Graph, report: &mut RepairReport) {
    let has = |g: &Graph, t: &str| g.nodes.iter().any(|n| n.node_type == t);
    let has_generator = graph.nodes.iter().any(|n| {
        matches!(
            n.node_type.as_str(),
            "Mountain" | "Canyon" | "Volcano" | "Perlin" | "Cellular" | "Island"
        )
    });

    if has_generator && !has(graph, "TextureBase") && !has(graph, "SatMap") {
        let texture_id = next_free_id(graph);
        graph.nodes.push(Node::new(texture_id, "TextureBase"));
        let satmap_id = next_free_id(graph);
        graph.nodes.push(Node::new(satmap_id, "SatMap"));
        graph.connections.push(Connection::new(texture_id, satmap_id));
        report.note(format!(
            "added missing TextureBase ({texture_id}) and SatMap ({satmap_id}) companion nodes"
        ));
    }

    if has(graph, "Rivers") && !has(graph, "Erosion2") {
        let erosion_id = next_free_id(graph);
        graph.nodes.push(Node::new(erosion_id, "Erosion2"));
        if let Some(rivers) = graph.nodes.iter().find(|n| n.node_type == "Rivers").map(|n| n.id) {
            graph.connections.push(Connection::new(erosion_id, rivers));
        }
        report.note(format!("added missing Erosion2 node ({erosion_id}) ahead of Rivers"));
    }
}

/// Auto-connect orphaned nodes using the pattern table's successor
/// suggestions, falling back to a reverse search over predecessors.
fn connect_orphans(graph: &mut Graph, report: &mut RepairReport) {
    let connected: HashSet<i64> = graph
        .connections
        .iter()
        .flat_map(|c| [c.from_node, c.to_node])
        .collect();

    let orphan_ids: Vec<(i64, String)> = graph
        .nodes
        .iter()
        .filter(|n| !schema::TERMINAL_EXEMPT_NODES.contains(&n.node_type.as_str()))
        .filter(|n| !connected.contains(&n.id))
        .map(|n| (n.id, n.node_type.clone()))
        .collect();

    for (orphan_id, orphan_type) in orphan_ids {
        let suggestions = pattern::next_node_suggestions(&orphan_type, 3);
        let forward_target = suggestions
            .iter()
            .find_map(|suggested_type| graph.nodes.iter().find(|n| &n.node_type == suggested_type).map(|n| n.id));

        if let Some(target_id) = forward_target {
            graph.connections.push(Connection::new(orphan_id, target_id));
            report.note_node(orphan_id, format!("connected orphaned node {orphan_id} to {target_id}"));
            continue;
        }

        let predecessor = graph
            .nodes
            .iter()
            .find(|n| pattern::next_node_suggestions(&n.node_type, 3).contains(&orphan_type.as_str()))
            .map(|n| n.id);

        if let Some(source_id) = predecessor {
            graph.connections.push(Connection::new(source_id, orphan_id));
            report.note_node(orphan_id, format!("connected node {source_id} to orphaned node {orphan_id}"));
        }
    }
}

fn reorder_erosion_before_rivers(graph: &mut Graph, report: &mut RepairReport) {
    let erosion_id = graph.nodes.iter().find(|n| n.node_type == "Erosion2").map(|n| n.id);
    let rivers_id = graph.nodes.iter().find(|n| n.node_type == "Rivers").map(|n| n.id);
    let (Some(erosion_id), Some(rivers_id)) = (erosion_id, rivers_id) else {
        return;
    };
    let already_ordered = graph
        .connections
        .iter()
        .any(|c| c.from_node == erosion_id && c.to_node == rivers_id);
    if already_ordered {
        return;
    }
    let reversed_exists = graph
        .connections
        .iter()
        .any(|c| c.from_node == rivers_id && c.to_node == erosion_id);
    if reversed_exists {
        graph.connections.retain(|c| !(c.from_node == rivers_id && c.to_node == erosion_id));
        graph.connections.push(Connection::new(erosion_id, rivers_id));
        report.note(format!("reordered Erosion2 ({erosion_id}) ahead of Rivers ({rivers_id})"));
    }
}

fn apply_performance_tuning(graph: &mut Graph, report: &mut RepairReport) {
    for node in &mut graph.nodes {
        if node.node_type != "Erosion2" {
            continue;
        }
        let Some(rec) = pattern::recommendation_for("Erosion2", "Duration") else {
            continue;
        };
        let needs_tuning = match node.properties.get("Duration").and_then(|v| v.as_f64()) {
            Some(d) => !(rec.min..=rec.max).contains(&d),
            None => false,
        };
        if needs_tuning {
            node.properties.insert(
                "Duration".to_string(),
                crate::model::PropertyValue::Float(rec.value_for(pattern::Preset::Balanced)),
            );
            report.note_node(node.id, format!("tuned Erosion2 node {} Duration to balanced preset", node.id));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Graph, Node, PropertyValue};

    #[test]
    fn dedupe_removes_exact_duplicate_connections() {
        let mut graph = Graph {
            nodes: vec![Node::new(1, "Mountain"), Node::new(2, "Erosion2")],
            connections: vec![Connection::new(1, 2), Connection::new(1, 2)],
        };
        let report = repair_conservative(&mut graph);
        assert_eq!(graph.connections.len(), 1);
        assert_eq!(report.fixes_applied.len(), 1);
    }

    #[test]
    fn snow_pruned_to_exactly_three_essential_properties() {
        let mut node = Node::new(1, "Snow");
        for key in ["Duration", "SnowLine", "Melt", "Extra1", "Extra2"] {
            node.properties.insert(key.to_string(), PropertyValue::Float(1.0));
        }
        let mut graph = Graph {
            nodes: vec![node],
            connections: vec![],
        };
        repair_conservative(&mut graph);
        let snow = &graph.nodes[0];
        assert_eq!(snow.properties.len(), 3);
        assert!(snow.properties.contains_key("Duration"));
        assert!(snow.properties.contains_key("SnowLine"));
        assert!(snow.properties.contains_key("Melt"));
    }

    #[test]
    fn dangling_connections_are_dropped_not_errored() {
        let mut graph = Graph {
            nodes: vec![Node::new(1, "Mountain")],
            connections: vec![Connection::new(1, 99), Connection::new(88, 1)],
        };
        repair_conservative(&mut graph);
        assert!(graph.connections.is_empty());
    }

    #[test]
    fn missing_default_property_is_filled_in() {
        let mut graph = Graph {
            nodes: vec![Node::new(1, "Mountain")],
            connections: vec![],
        };
        repair_conservative(&mut graph);
        let mountain = &graph.nodes[0];
        assert_eq!(mountain.properties.get("Style"), Some(&PropertyValue::String("Basic".to_string())));
        assert_eq!(mountain.properties.get("Bulk"), Some(&PropertyValue::String("Medium".to_string())));
    }

    #[test]
    fn out_of_range_existing_value_is_clamped() {
        let mut node = Node::new(1, "Mountain");
        node.properties.insert("Height".to_string(), PropertyValue::Float(5.0));
        let mut graph = Graph {
            nodes: vec![node],
            connections: vec![],
        };
        repair_conservative(&mut graph);
        assert_eq!(graph.nodes[0].properties.get("Height"), Some(&PropertyValue::Float(1.0)));
    }

    #[test]
    fn integral_float_is_coerced_to_int_during_repair() {
        let mut node = Node::new(1, "Mountain");
        node.properties.insert("Seed".to_string(), PropertyValue::Float(7.0));
        let mut graph = Graph {
            nodes: vec![node],
            connections: vec![],
        };
        repair_conservative(&mut graph);
        assert_eq!(graph.nodes[0].properties.get("Seed"), Some(&PropertyValue::Int(7)));
    }

    #[test]
    fn property_limited_nodes_are_pruned_not_defaulted() {
        let mut graph = Graph {
            nodes: vec![Node::new(1, "Snow")],
            connections: vec![],
        };
        repair_conservative(&mut graph);
        assert!(graph.nodes[0].properties.is_empty());
    }

    #[test]
    fn aggressive_repair_never_inserts_export_node() {
        let mut graph = Graph {
            nodes: vec![Node::new(1, "Mountain"), Node::new(2, "Erosion2")],
            connections: vec![Connection::new(1, 2)],
        };
        repair_aggressive(&mut graph);
        assert!(!graph.nodes.iter().any(|n| n.node_type == "Export"));
    }

    #[test]
    fn aggressive_repair_adds_texture_base_and_satmap_for_bare_generator() {
        let mut graph = Graph {
            nodes: vec![Node::new(1, "Mountain")],
            connections: vec![],
        };
        repair_aggressive(&mut graph);
        assert!(graph.nodes.iter().any(|n| n.node_type == "TextureBase"));
        assert!(graph.nodes.iter().any(|n| n.node_type == "SatMap"));
    }
}
