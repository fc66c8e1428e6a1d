//! Multi-pass graph validator. Every pass runs and accumulates findings —
//! no pass short-circuits another — over a `ValidationContext` built once
//! per run, mirroring the original's "build lookup structures, then run
//! batch passes over them" shape.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};

use crate::model::{Connection, Graph, Node, PropertyValue};
use crate::schema::{self, PortDirection, PropertyKind, PROPERTY_LIMITED_NODES, TERMINAL_EXEMPT_NODES};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub message: String,
    pub node_id: Option<i64>,
}

impl Finding {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            node_id: None,
        }
    }

    fn on_node(message: impl Into<String>, node_id: i64) -> Self {
        Self {
            message: message.into(),
            node_id: Some(node_id),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ValidationStats {
    pub node_count: usize,
    pub connection_count: usize,
    pub orphan_count: usize,
    pub property_cache_hits: usize,
    pub property_cache_misses: usize,
}

#[derive(Debug, Clone)]
pub struct ValidationOutput {
    pub valid: bool,
    pub errors: Vec<Finding>,
    pub warnings: Vec<Finding>,
    pub stats: ValidationStats,
}

/// Lookup structures built once per validation run, shared read-only
/// across every pass.
struct ValidationContext<'g> {
    nodes: &'g [Node],
    connections: &'g [Connection],
    node_by_id: HashMap<i64, &'g Node>,
    /// Node ids that appear on more than one node. Populated even though
    /// `node_by_id` only ever keeps the first node for such an id —
    /// `pass_structural` reports the collision itself and invalidates
    /// every connection that touches it after the first.
    duplicate_ids: HashSet<i64>,
    connections_by_source: HashMap<i64, Vec<&'g Connection>>,
    connections_by_target: HashMap<i64, Vec<&'g Connection>>,
    connected_node_ids: HashSet<i64>,
}

impl<'g> ValidationContext<'g> {
    fn build(graph: &'g Graph) -> Self {
        let mut node_by_id: HashMap<i64, &Node> = HashMap::new();
        let mut seen_ids = HashSet::new();
        let mut duplicate_ids = HashSet::new();
        for n in &graph.nodes {
            if !seen_ids.insert(n.id) {
                duplicate_ids.insert(n.id);
            }
            node_by_id.entry(n.id).or_insert(n);
        }
        let mut connections_by_source: HashMap<i64, Vec<&Connection>> = HashMap::new();
        let mut connections_by_target: HashMap<i64, Vec<&Connection>> = HashMap::new();
        let mut connected_node_ids = HashSet::new();
        for c in &graph.connections {
            connections_by_source.entry(c.from_node).or_default().push(c);
            connections_by_target.entry(c.to_node).or_default().push(c);
            connected_node_ids.insert(c.from_node);
            connected_node_ids.insert(c.to_node);
        }
        Self {
            nodes: &graph.nodes,
            connections: &graph.connections,
            node_by_id,
            duplicate_ids,
            connections_by_source,
            connections_by_target,
            connected_node_ids,
        }
    }
}

fn display_value(value: &PropertyValue) -> String {
    match value {
        PropertyValue::Int(i) => i.to_string(),
        PropertyValue::Float(f) => f.to_string(),
        PropertyValue::Bool(b) => b.to_string(),
        PropertyValue::String(s) => format!("'{s}'"),
        PropertyValue::Vec2 { x, y } => format!("({x}, {y})"),
    }
}

fn hash_properties(node: &Node) -> u64 {
    use std::collections::hash_map::DefaultHasher;
    let mut hasher = DefaultHasher::new();
    for (k, v) in &node.properties {
        k.hash(&mut hasher);
        format!("{v:?}").hash(&mut hasher);
    }
    hasher.finish()
}

/// One property-schema violation found on a node. `detail` never embeds the
/// node id — it's shared verbatim between a cache miss and a later cache hit
/// on a different node instance of the same `(type, properties)` shape, and
/// the id is spliced in fresh at each `Finding` construction site.
struct PropertyIssue {
    is_error: bool,
    detail: String,
}

/// A memoizing validator. Each instance owns its own property-check cache,
/// keyed by `(node_type, hash(properties))`, so repeated validation of
/// structurally-identical nodes across calls avoids redundant work.
pub struct Validator {
    property_cache: RefCell<HashMap<(String, u64), Vec<PropertyIssue>>>,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator {
    pub fn new() -> Self {
        Self {
            property_cache: RefCell::new(HashMap::new()),
        }
    }

    pub fn validate(&self, graph: &Graph) -> ValidationOutput {
        let ctx = ValidationContext::build(graph);
        let mut errors = Vec::new();
        let mut warnings = Vec::new();
        let mut stats = ValidationStats {
            node_count: graph.nodes.len(),
            connection_count: graph.connections.len(),
            ..Default::default()
        };

        self.pass_structural(&ctx, &mut errors);
        self.pass_type_vocabulary(&ctx, &mut errors);
        self.pass_property_check(&ctx, &mut errors, &mut warnings, &mut stats);
        self.pass_property_count_limit(&ctx, &mut errors);
        self.pass_port_compatibility(&ctx, &mut errors, &mut warnings);
        self.pass_duplicate_edges(&ctx, &mut warnings);
        self.pass_cycle_detection(&ctx, &mut errors);
        self.pass_orphan_detection(&ctx, &mut warnings, &mut stats);
        self.pass_workflow_heuristics(&ctx, &mut warnings);

        ValidationOutput {
            valid: errors.is_empty(),
            errors,
            warnings,
            stats,
        }
    }

    /// Pass 1: every connection endpoint must reference a node that exists,
    /// and every node id must be unique. If two nodes share an id, all
    /// edges touching that id after the first are invalidated.
    fn pass_structural(&self, ctx: &ValidationContext, errors: &mut Vec<Finding>) {
        for &id in &ctx.duplicate_ids {
            errors.push(Finding::on_node(format!("duplicate node id: {id}"), id));
        }

        let mut touched_duplicate_ids = HashSet::new();
        for c in ctx.connections {
            if !ctx.node_by_id.contains_key(&c.from_node) {
                errors.push(Finding::new(format!(
                    "connection references non-existent source node: {}",
                    c.from_node
                )));
            } else if ctx.duplicate_ids.contains(&c.from_node) && !touched_duplicate_ids.insert(c.from_node) {
                errors.push(Finding::new(format!(
                    "connection from node {} invalidated: node id {} is shared by multiple nodes",
                    c.from_node, c.from_node
                )));
            }
            if !ctx.node_by_id.contains_key(&c.to_node) {
                errors.push(Finding::new(format!(
                    "connection references non-existent target node: {}",
                    c.to_node
                )));
            } else if ctx.duplicate_ids.contains(&c.to_node) && !touched_duplicate_ids.insert(c.to_node) {
                errors.push(Finding::new(format!(
                    "connection to node {} invalidated: node id {} is shared by multiple nodes",
                    c.to_node, c.to_node
                )));
            }
        }
    }

    /// Pass 2: every node type must be in the catalog.
    fn pass_type_vocabulary(&self, ctx: &ValidationContext, errors: &mut Vec<Finding>) {
        let catalog = schema::node_catalog();
        for node in ctx.nodes {
            if !catalog.contains_key(node.node_type.as_str()) {
                errors.push(Finding::on_node(
                    format!("Invalid node type '{}'", node.node_type),
                    node.id,
                ));
            }
        }
    }

    /// Pass 3: per-node property schema check, memoized by
    /// `(type, hash(props))`. Drives kind coercion, enum membership, and
    /// range checks generically off `schema::property_definition_for`,
    /// grounded in the original's `validate_node_properties`: (a) kind
    /// mismatch is an error and suppresses the range check for that
    /// property; (b) an out-of-range value is a warning; (c) an enum value
    /// outside its options is an error; (d) a property with no definition
    /// anywhere is an unknown-property warning. Missing properties that
    /// have a default are left alone here — defaulting happens in repair.
    fn pass_property_check(
        &self,
        ctx: &ValidationContext,
        errors: &mut Vec<Finding>,
        warnings: &mut Vec<Finding>,
        stats: &mut ValidationStats,
    ) {
        for node in ctx.nodes {
            let key = (node.node_type.clone(), hash_properties(node));
            let mut cache = self.property_cache.borrow_mut();
            if let Some(issues) = cache.get(&key) {
                stats.property_cache_hits += 1;
                for issue in issues {
                    Self::push_issue(node.id, issue, errors, warnings);
                }
                continue;
            }
            stats.property_cache_misses += 1;
            let issues = Self::check_node_properties(node);
            for issue in &issues {
                Self::push_issue(node.id, issue, errors, warnings);
            }
            cache.insert(key, issues);
        }
    }

    fn push_issue(node_id: i64, issue: &PropertyIssue, errors: &mut Vec<Finding>, warnings: &mut Vec<Finding>) {
        let finding = Finding::on_node(issue.detail.clone(), node_id);
        if issue.is_error {
            errors.push(finding);
        } else {
            warnings.push(finding);
        }
    }

    fn check_node_properties(node: &Node) -> Vec<PropertyIssue> {
        let mut issues = Vec::new();
        for (name, value) in &node.properties {
            let Some(def) = schema::property_definition_for(&node.node_type, name) else {
                issues.push(PropertyIssue {
                    is_error: false,
                    detail: format!("unknown property '{name}' for node type {}", node.node_type),
                });
                continue;
            };
            let kind_ok = match def.kind {
                PropertyKind::Int => match value {
                    PropertyValue::Int(_) => true,
                    PropertyValue::Float(f) if f.fract() == 0.0 => true,
                    other => {
                        issues.push(PropertyIssue {
                            is_error: true,
                            detail: format!("property '{name}' should be an integer, got {}", display_value(other)),
                        });
                        false
                    }
                },
                PropertyKind::Float => {
                    if value.is_numeric() {
                        true
                    } else {
                        issues.push(PropertyIssue {
                            is_error: true,
                            detail: format!("property '{name}' should be numeric, got {}", display_value(value)),
                        });
                        false
                    }
                }
                PropertyKind::Bool => {
                    if matches!(value, PropertyValue::Bool(_)) {
                        true
                    } else {
                        issues.push(PropertyIssue {
                            is_error: true,
                            detail: format!("property '{name}' should be a boolean, got {}", display_value(value)),
                        });
                        false
                    }
                }
                PropertyKind::String => {
                    if matches!(value, PropertyValue::String(_)) {
                        true
                    } else {
                        issues.push(PropertyIssue {
                            is_error: true,
                            detail: format!("property '{name}' should be a string, got {}", display_value(value)),
                        });
                        false
                    }
                }
                PropertyKind::Enum => match (value, def.enum_options) {
                    (PropertyValue::String(s), Some(options)) if options.contains(&s.as_str()) => true,
                    _ => {
                        let options = def.enum_options.unwrap_or(&[]).join(", ");
                        issues.push(PropertyIssue {
                            is_error: true,
                            detail: format!(
                                "property '{name}' value {} not in valid options: {options}",
                                display_value(value)
                            ),
                        });
                        false
                    }
                },
            };
            if !kind_ok {
                continue;
            }
            if let Some((min, max)) = def.range {
                if let Some(v) = value.as_f64() {
                    if v < min || v > max {
                        issues.push(PropertyIssue {
                            is_error: false,
                            detail: format!("property '{name}' value {v} outside range {min}..={max}"),
                        });
                    }
                }
            }
        }
        issues
    }

    /// Pass 4: property-limited node types may carry at most 3 properties.
    fn pass_property_count_limit(&self, ctx: &ValidationContext, errors: &mut Vec<Finding>) {
        for node in ctx.nodes {
            if PROPERTY_LIMITED_NODES.contains(&node.node_type.as_str()) && node.properties.len() > 3 {
                errors.push(Finding::on_node(
                    format!(
                        "{} node {} has {} properties, must have <= 3 properties",
                        node.node_type,
                        node.id,
                        node.properties.len()
                    ),
                    node.id,
                ));
            }
        }
    }

    /// Pass 5: each named port must exist on its node type's port
    /// declarations — an unknown port name is an error. Among two known
    /// ports, a type mismatch is only advisory.
    fn pass_port_compatibility(&self, ctx: &ValidationContext, errors: &mut Vec<Finding>, warnings: &mut Vec<Finding>) {
        for c in ctx.connections {
            let (Some(from), Some(to)) = (ctx.node_by_id.get(&c.from_node), ctx.node_by_id.get(&c.to_node)) else {
                continue;
            };

            let from_ports = schema::ports_for(&from.node_type);
            let to_ports = schema::ports_for(&to.node_type);

            let from_port_exists = from_ports
                .iter()
                .any(|p| p.name == c.from_port && p.direction == PortDirection::Out);
            let to_port_exists = to_ports
                .iter()
                .any(|p| p.name == c.to_port && p.direction == PortDirection::In);

            if !from_port_exists {
                errors.push(Finding::new(format!(
                    "node {} (type {}) has no output port named '{}'",
                    c.from_node, from.node_type, c.from_port
                )));
            }
            if !to_port_exists {
                errors.push(Finding::new(format!(
                    "node {} (type {}) has no input port named '{}'",
                    c.to_node, to.node_type, c.to_port
                )));
            }
            if from_port_exists && to_port_exists && !schema::ports_compatible(&c.from_port, &c.to_port) {
                warnings.push(Finding::new(format!(
                    "unusual port pairing {}:{} -> {}:{}",
                    c.from_node, c.from_port, c.to_node, c.to_port
                )));
            }
        }
    }

    /// Pass 6: exact duplicate edges are a warning (repair dedupes them).
    fn pass_duplicate_edges(&self, ctx: &ValidationContext, warnings: &mut Vec<Finding>) {
        let mut seen = HashSet::new();
        for c in ctx.connections {
            if !seen.insert(c.key()) {
                warnings.push(Finding::new(format!(
                    "duplicate connection {} -> {}",
                    c.from_node, c.to_node
                )));
            }
        }
    }

    /// Pass 7: cycle detection via DFS with a recursion stack.
    fn pass_cycle_detection(&self, ctx: &ValidationContext, errors: &mut Vec<Finding>) {
        let mut visited = HashSet::new();
        let mut rec_stack = HashSet::new();
        let mut path = Vec::new();
        for node in ctx.nodes {
            if !visited.contains(&node.id) {
                if let Some(cycle) = Self::dfs_cycle(ctx, node.id, &mut visited, &mut rec_stack, &mut path) {
                    errors.push(Finding::new(format!(
                        "cycle detected: {}",
                        cycle
                            .iter()
                            .map(|id| id.to_string())
                            .collect::<Vec<_>>()
                            .join(" -> ")
                    )));
                }
            }
        }
    }

    fn dfs_cycle(
        ctx: &ValidationContext,
        node_id: i64,
        visited: &mut HashSet<i64>,
        rec_stack: &mut HashSet<i64>,
        path: &mut Vec<i64>,
    ) -> Option<Vec<i64>> {
        visited.insert(node_id);
        rec_stack.insert(node_id);
        path.push(node_id);

        if let Some(outgoing) = ctx.connections_by_source.get(&node_id) {
            for c in outgoing {
                let next = c.to_node;
                if rec_stack.contains(&next) {
                    let start = path.iter().position(|&id| id == next).unwrap_or(0);
                    let mut cycle: Vec<i64> = path[start..].to_vec();
                    cycle.push(next);
                    return Some(cycle);
                }
                if !visited.contains(&next) {
                    if let Some(cycle) = Self::dfs_cycle(ctx, next, visited, rec_stack, path) {
                        return Some(cycle);
                    }
                }
            }
        }

        path.pop();
        rec_stack.remove(&node_id);
        None
    }

    /// Pass 8: nodes with no connections at all, excluding terminal-exempt
    /// types, are flagged as orphans.
    fn pass_orphan_detection(&self, ctx: &ValidationContext, warnings: &mut Vec<Finding>, stats: &mut ValidationStats) {
        for node in ctx.nodes {
            if TERMINAL_EXEMPT_NODES.contains(&node.node_type.as_str()) {
                continue;
            }
            if !ctx.connected_node_ids.contains(&node.id) {
                stats.orphan_count += 1;
                warnings.push(Finding::on_node(
                    format!("{} node {} is not connected to anything", node.node_type, node.id),
                    node.id,
                ));
            }
        }
    }

    /// Pass 9: workflow-level heuristics — pattern-table-informed advice
    /// about what a realistic graph usually contains.
    fn pass_workflow_heuristics(&self, ctx: &ValidationContext, warnings: &mut Vec<Finding>) {
        let has = |t: &str| ctx.nodes.iter().any(|n| n.node_type == t);

        if has("Erosion2") && !has("TextureBase") {
            warnings.push(Finding::new("Erosion2 present but no TextureBase node found"));
        }
        let has_generator = ctx.nodes.iter().any(|n| {
            matches!(
                n.node_type.as_str(),
                "Mountain" | "Canyon" | "Volcano" | "Perlin" | "Cellular" | "Island"
            )
        });
        if has_generator && !has("SatMap") {
            warnings.push(Finding::new("terrain generator present but no SatMap node found"));
        }
        if has("Rivers") && !has("Erosion2") {
            warnings.push(Finding::new("Rivers node present without a preceding Erosion2 node"));
        }
        if !ctx.nodes.iter().any(|n| TERMINAL_EXEMPT_NODES.contains(&n.node_type.as_str())) {
            warnings.push(Finding::new("no export node found"));
        }
    }
}
