//! Canonical graph data model: nodes, connections, and the three accepted
//! connection input shapes normalized to one canonical form.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A 2D position. Non-semantic — used only by the downstream editor's canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Default for Position {
    fn default() -> Self {
        Self { x: 25000.0, y: 25000.0 }
    }
}

/// A typed property value carried on a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    String(String),
    Vec2 { x: f64, y: f64 },
}

impl PropertyValue {
    /// Best-effort read as a float, used by range checks. Integral values
    /// (including `Vec2`-free numeric kinds) coerce cleanly.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PropertyValue::Int(i) => Some(*i as f64),
            PropertyValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// True if the value is numeric (int or float).
    pub fn is_numeric(&self) -> bool {
        matches!(self, PropertyValue::Int(_) | PropertyValue::Float(_))
    }
}

/// A graph vertex. `id` is intentionally non-sequential in real payloads;
/// nothing in the model relies on ordering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: i64,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub position: Position,
    #[serde(default)]
    pub properties: BTreeMap<String, PropertyValue>,
}

impl Node {
    pub fn new(id: i64, node_type: impl Into<String>) -> Self {
        let node_type = node_type.into();
        Self {
            id,
            name: node_type.clone(),
            node_type,
            position: Position::default(),
            properties: BTreeMap::new(),
        }
    }
}

/// Canonical connection shape: `{from_node, to_node, from_port, to_port}`.
/// This is the only shape the validator and repair engine operate on;
/// every boundary format is normalized to this before anything else runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub from_node: i64,
    pub to_node: i64,
    #[serde(default = "default_out_port")]
    pub from_port: String,
    #[serde(default = "default_in_port")]
    pub to_port: String,
}

fn default_out_port() -> String {
    "Out".to_string()
}
fn default_in_port() -> String {
    "In".to_string()
}

impl Connection {
    pub fn new(from_node: i64, to_node: i64) -> Self {
        Self {
            from_node,
            to_node,
            from_port: default_out_port(),
            to_port: default_in_port(),
        }
    }

    pub fn key(&self) -> (i64, i64, &str, &str) {
        (self.from_node, self.to_node, &self.from_port, &self.to_port)
    }
}

/// The three shapes the boundary accepts before normalization. `Flat` is
/// already canonical; `Nested` mirrors a `{from: {node_id, port}, to: {...}}`
/// client convention; `Pascal` mirrors the downstream tool's own
/// `{From, To, FromPort, ToPort}` wire format.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawConnection {
    Flat(Connection),
    Nested {
        from: NestedEndpoint,
        to: NestedEndpoint,
    },
    Pascal {
        #[serde(rename = "From")]
        from: i64,
        #[serde(rename = "To")]
        to: i64,
        #[serde(rename = "FromPort", default = "default_out_port")]
        from_port: String,
        #[serde(rename = "ToPort", default = "default_in_port")]
        to_port: String,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct NestedEndpoint {
    pub node_id: i64,
    #[serde(default)]
    pub port: Option<String>,
}

/// Normalize a single boundary connection to the canonical flat shape.
/// Idempotent: normalizing an already-flat connection returns it unchanged.
pub fn normalize_connection(raw: RawConnection) -> Connection {
    match raw {
        RawConnection::Flat(c) => c,
        RawConnection::Nested { from, to } => Connection {
            from_node: from.node_id,
            to_node: to.node_id,
            from_port: from.port.unwrap_or_else(default_out_port),
            to_port: to.port.unwrap_or_else(default_in_port),
        },
        RawConnection::Pascal {
            from,
            to,
            from_port,
            to_port,
        } => Connection {
            from_node: from,
            to_node: to,
            from_port,
            to_port,
        },
    }
}

/// Normalize a full list of boundary connections.
pub fn normalize_connections(raw: Vec<RawConnection>) -> Vec<Connection> {
    raw.into_iter().map(normalize_connection).collect()
}

/// A full graph payload as accepted at the HTTP/stdio boundary (before
/// connection normalization has necessarily run).
#[derive(Debug, Clone, Deserialize)]
pub struct RawGraph {
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub connections: Vec<RawConnection>,
}

/// A fully normalized graph: canonical connections only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Graph {
    pub nodes: Vec<Node>,
    pub connections: Vec<Connection>,
}

impl From<RawGraph> for Graph {
    fn from(raw: RawGraph) -> Self {
        Self {
            nodes: raw.nodes,
            connections: normalize_connections(raw.connections),
        }
    }
}
