//! Terrain workflow graph handlers: validate, repair, and template-based
//! generation. Thin marshaling over `graph_core` — all real logic lives
//! there.

use std::sync::Arc;

use async_trait::async_trait;
use graph_core::{Graph, RawGraph, Validator};
use serde_json::{Value, json};

use crate::envelope::ToolDescriptor;
use crate::pathgate::PathSafetyGate;
use crate::runtime::registry::ToolHandler;
use crate::{Error, Result};

pub struct ValidateGraphHandler {
    validator: Arc<Validator>,
}

impl ValidateGraphHandler {
    pub fn new(validator: Arc<Validator>) -> Self {
        Self { validator }
    }
}

#[async_trait]
impl ToolHandler for ValidateGraphHandler {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "terrain_validate_graph".to_string(),
            description: "Validate a terrain workflow graph without modifying it".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "nodes": {"type": "array"},
                    "connections": {"type": "array"}
                },
                "required": ["nodes"]
            }),
        }
    }

    async fn call(&self, args: Value) -> Result<Value> {
        let raw: RawGraph = serde_json::from_value(args).map_err(Error::Json)?;
        let graph: Graph = raw.into();
        let output = self.validator.validate(&graph);
        Ok(json!({
            "success": output.valid,
            "valid": output.valid,
            "errors": output.errors.iter().map(|f| f.message.clone()).collect::<Vec<_>>(),
            "warnings": output.warnings.iter().map(|f| f.message.clone()).collect::<Vec<_>>(),
            "stats": {
                "node_count": output.stats.node_count,
                "connection_count": output.stats.connection_count,
                "orphan_count": output.stats.orphan_count,
            }
        }))
    }
}

pub struct RepairGraphHandler {
    validator: Arc<Validator>,
}

impl RepairGraphHandler {
    pub fn new(validator: Arc<Validator>) -> Self {
        Self { validator }
    }
}

#[async_trait]
impl ToolHandler for RepairGraphHandler {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "terrain_repair_graph".to_string(),
            description: "Validate and repair a terrain workflow graph, conservatively by default".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "nodes": {"type": "array"},
                    "connections": {"type": "array"},
                    "aggressive": {"type": "boolean"}
                },
                "required": ["nodes"]
            }),
        }
    }

    async fn call(&self, args: Value) -> Result<Value> {
        let aggressive = args.get("aggressive").and_then(Value::as_bool).unwrap_or(false);
        let raw: RawGraph = serde_json::from_value(args).map_err(Error::Json)?;
        let mut graph: Graph = raw.into();

        let report = if aggressive {
            graph_core::repair::repair_aggressive(&mut graph)
        } else {
            graph_core::repair::repair_conservative(&mut graph)
        };

        let output = self.validator.validate(&graph);
        Ok(json!({
            "success": output.valid,
            "valid": output.valid,
            "errors": output.errors.iter().map(|f| f.message.clone()).collect::<Vec<_>>(),
            "warnings": output.warnings.iter().map(|f| f.message.clone()).collect::<Vec<_>>(),
            "fixed_nodes": report.fixed_nodes,
            "fixes_applied": report.fixes_applied,
            "workflow": {
                "nodes": graph.nodes,
                "connections": graph.connections,
            }
        }))
    }
}

/// Assembles a complete project payload in the downstream format: either
/// from an explicit node/connection list or expanded from a named
/// template, validated, conservatively repaired, and annotated with the
/// input-port records the downstream editor expects on every node.
/// Optionally attaches a caller-supplied asset path (e.g. a heightmap or
/// texture library file referenced by a `File`/`TextureBase` node),
/// resolved through the asset sandbox.
pub struct CreateProjectHandler {
    validator: Arc<Validator>,
    asset_gate: Arc<PathSafetyGate>,
}

impl CreateProjectHandler {
    pub fn new(validator: Arc<Validator>, asset_gate: Arc<PathSafetyGate>) -> Self {
        Self { validator, asset_gate }
    }
}

#[async_trait]
impl ToolHandler for CreateProjectHandler {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "terrain_create_project".to_string(),
            description: "Assemble a validated, repaired terrain project payload from a template or an explicit graph"
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "terrain_type": {"type": "string"},
                    "nodes": {"type": "array"},
                    "connections": {"type": "array"},
                    "asset_path": {"type": "string"}
                }
            }),
        }
    }

    async fn call(&self, args: Value) -> Result<Value> {
        let mut graph = if let Some(terrain_type) = args.get("terrain_type").and_then(Value::as_str) {
            let (nodes, connections) = graph_core::templates::expand_for_terrain_type(terrain_type, 100)
                .ok_or_else(|| Error::Validation(format!("no template known for terrain type '{terrain_type}'")))?;
            Graph { nodes, connections }
        } else {
            let raw: RawGraph = serde_json::from_value(args.clone()).map_err(Error::Json)?;
            raw.into()
        };

        let report = graph_core::repair::repair_conservative(&mut graph);
        let output = self.validator.validate(&graph);

        let nodes: Vec<Value> = graph
            .nodes
            .iter()
            .map(|n| {
                let input_ports: Vec<Value> = graph_core::schema::ports_for(&n.node_type)
                    .into_iter()
                    .filter(|p| p.direction == graph_core::schema::PortDirection::In)
                    .map(|p| json!({"name": p.name}))
                    .collect();
                json!({
                    "id": n.id,
                    "type": n.node_type,
                    "name": n.name,
                    "position": n.position,
                    "properties": n.properties,
                    "ports": input_ports,
                })
            })
            .collect();

        let mut project = json!({
            "nodes": nodes,
            "connections": graph.connections,
        });

        if let Some(asset_path) = args.get("asset_path").and_then(Value::as_str) {
            let resolved = self.asset_gate.validate(asset_path)?;
            project["asset_path"] = json!(resolved.to_string_lossy());
        }

        Ok(json!({
            "success": output.valid,
            "valid": output.valid,
            "errors": output.errors.iter().map(|f| f.message.clone()).collect::<Vec<_>>(),
            "warnings": output.warnings.iter().map(|f| f.message.clone()).collect::<Vec<_>>(),
            "fixes_applied": report.fixes_applied,
            "project": project,
        }))
    }
}

pub struct CreateFromTemplateHandler;

#[async_trait]
impl ToolHandler for CreateFromTemplateHandler {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "terrain_create_from_template".to_string(),
            description: "Expand a named terrain-intent template into a node+connection subgraph".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "terrain_type": {"type": "string"},
                    "start_id": {"type": "integer"}
                },
                "required": ["terrain_type"]
            }),
        }
    }

    async fn call(&self, args: Value) -> Result<Value> {
        let terrain_type = args
            .get("terrain_type")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::Validation("missing 'terrain_type'".to_string()))?;
        let start_id = args.get("start_id").and_then(Value::as_i64).unwrap_or(100);

        let (nodes, connections) = graph_core::templates::expand_for_terrain_type(terrain_type, start_id)
            .ok_or_else(|| Error::Validation(format!("no template known for terrain type '{terrain_type}'")))?;

        Ok(json!({ "nodes": nodes, "connections": connections }))
    }
}

pub struct AnalyzeWorkflowHandler;

#[async_trait]
impl ToolHandler for AnalyzeWorkflowHandler {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "terrain_analyze_workflow".to_string(),
            description: "Analyze node-type distribution, erosion chains, and workflow smells in a graph".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "nodes": {"type": "array"},
                    "connections": {"type": "array"}
                },
                "required": ["nodes"]
            }),
        }
    }

    async fn call(&self, args: Value) -> Result<Value> {
        let raw: RawGraph = serde_json::from_value(args).map_err(Error::Json)?;
        let graph: Graph = raw.into();
        let analysis = graph_core::analysis::analyze_workflow(&graph);
        Ok(json!({
            "success": true,
            "node_type_counts": analysis.node_type_counts,
            "total_connections": analysis.total_connections,
            "erosion_chain_lengths": analysis.erosion_chain_lengths,
            "complexity_score": analysis.complexity_score,
            "suggestions": analysis.suggestions.iter().map(|s| json!({
                "type": s.category,
                "severity": s.severity,
                "message": s.message,
                "nodes": s.node_ids,
            })).collect::<Vec<_>>(),
        }))
    }
}

pub struct SuggestWorkflowHandler;

#[async_trait]
impl ToolHandler for SuggestWorkflowHandler {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "terrain_suggest_workflow".to_string(),
            description: "Suggest a named workflow template for a terrain intent, or successor node types for a graph's dangling nodes".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "terrain_type": {"type": "string"},
                    "nodes": {"type": "array"},
                    "connections": {"type": "array"}
                }
            }),
        }
    }

    async fn call(&self, args: Value) -> Result<Value> {
        if let Some(terrain_type) = args.get("terrain_type").and_then(Value::as_str) {
            return match graph_core::pattern::workflow_for_terrain_type(terrain_type) {
                Some(template) => Ok(json!({
                    "success": true,
                    "template": template.name,
                    "description": template.description,
                    "nodes": template.nodes,
                    "tags": template.tags,
                })),
                None => Ok(json!({
                    "success": false,
                    "error": format!("no template known for terrain type '{terrain_type}'"),
                })),
            };
        }

        let raw: RawGraph = serde_json::from_value(args).map_err(Error::Json)?;
        let graph: Graph = raw.into();
        let suggestions = graph_core::analysis::dangling_successor_suggestions(&graph, 3);
        Ok(json!({
            "success": true,
            "successor_suggestions": suggestions
                .into_iter()
                .map(|(id, names)| (id.to_string(), names))
                .collect::<std::collections::BTreeMap<_, _>>(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn validate_handler_flags_invalid_node_type() {
        let handler = ValidateGraphHandler::new(Arc::new(Validator::new()));
        let result = handler
            .call(json!({"nodes": [{"id": 1, "type": "InvalidNodeType"}], "connections": []}))
            .await
            .unwrap();
        assert_eq!(result["valid"], json!(false));
    }

    #[tokio::test]
    async fn repair_handler_prunes_snow_properties() {
        let handler = RepairGraphHandler::new(Arc::new(Validator::new()));
        let result = handler
            .call(json!({
                "nodes": [{
                    "id": 1,
                    "type": "Snow",
                    "properties": {"Duration": 1.0, "SnowLine": 2.0, "Melt": 3.0, "Extra1": 4.0, "Extra2": 5.0}
                }],
                "connections": []
            }))
            .await
            .unwrap();
        let props = result["workflow"]["nodes"][0]["properties"].as_object().unwrap();
        assert_eq!(props.len(), 3);
    }

    fn asset_gate() -> (tempfile::TempDir, Arc<PathSafetyGate>) {
        let dir = tempfile::tempdir().unwrap();
        let gate = Arc::new(PathSafetyGate::new(crate::pathgate::SandboxRoot::Asset, dir.path()));
        (dir, gate)
    }

    #[tokio::test]
    async fn create_project_from_template_attaches_input_port_records() {
        let (_dir, gate) = asset_gate();
        let handler = CreateProjectHandler::new(Arc::new(Validator::new()), gate);
        let result = handler.call(json!({"terrain_type": "mountain"})).await.unwrap();
        let nodes = result["project"]["nodes"].as_array().unwrap();
        assert!(!nodes.is_empty());
        let ports = nodes[0]["ports"].as_array().unwrap();
        assert!(ports.iter().any(|p| p["name"] == json!("In")));
    }

    #[tokio::test]
    async fn create_project_rejects_unknown_terrain_type() {
        let (_dir, gate) = asset_gate();
        let handler = CreateProjectHandler::new(Arc::new(Validator::new()), gate);
        let result = handler.call(json!({"terrain_type": "not-a-real-one"})).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn create_project_resolves_asset_path_through_the_asset_gate() {
        let (_dir, gate) = asset_gate();
        let handler = CreateProjectHandler::new(Arc::new(Validator::new()), gate);
        let result = handler
            .call(json!({"terrain_type": "mountain", "asset_path": "heightmaps/base.png"}))
            .await
            .unwrap();
        assert!(result["project"]["asset_path"].as_str().unwrap().contains("heightmaps"));
    }

    #[tokio::test]
    async fn create_project_rejects_asset_path_escaping_the_sandbox() {
        let (_dir, gate) = asset_gate();
        let handler = CreateProjectHandler::new(Arc::new(Validator::new()), gate);
        let result = handler
            .call(json!({"terrain_type": "mountain", "asset_path": "../../etc/passwd"}))
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn create_from_template_rejects_unknown_terrain_type() {
        let handler = CreateFromTemplateHandler;
        let result = handler.call(json!({"terrain_type": "not-a-real-one"})).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn analyze_workflow_flags_missing_export_node() {
        let handler = AnalyzeWorkflowHandler;
        let result = handler
            .call(json!({"nodes": [{"id": 1, "type": "Mountain"}], "connections": []}))
            .await
            .unwrap();
        let suggestions = result["suggestions"].as_array().unwrap();
        assert!(suggestions.iter().any(|s| s["message"].as_str().unwrap().contains("no export nodes found")));
    }

    #[tokio::test]
    async fn suggest_workflow_returns_named_template_for_known_intent() {
        let handler = SuggestWorkflowHandler;
        let result = handler.call(json!({"terrain_type": "mountain"})).await.unwrap();
        assert_eq!(result["template"], json!("realistic_mountain"));
    }

    #[tokio::test]
    async fn suggest_workflow_reports_failure_for_unknown_intent() {
        let handler = SuggestWorkflowHandler;
        let result = handler.call(json!({"terrain_type": "not-a-real-one"})).await.unwrap();
        assert_eq!(result["success"], json!(false));
    }

    #[tokio::test]
    async fn suggest_workflow_gives_successor_suggestions_for_dangling_nodes() {
        let handler = SuggestWorkflowHandler;
        let result = handler
            .call(json!({"nodes": [{"id": 1, "type": "Mountain"}], "connections": []}))
            .await
            .unwrap();
        let suggestions = result["successor_suggestions"].as_object().unwrap();
        assert!(suggestions.contains_key("1"));
    }
}
