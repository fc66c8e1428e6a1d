//! Exercises the tool registry/dispatch seam the way both transports use
//! it, plus the universal properties the envelope and path-safety gate
//! are expected to uphold.

use std::sync::Arc;

use gaea_mcp_gateway::envelope::{ToolDescriptor, ToolRequest, ToolResponse};
use gaea_mcp_gateway::pathgate::{PathSafetyGate, SandboxRoot};
use gaea_mcp_gateway::runtime::registry::{ToolHandler, ToolRegistry};
use gaea_mcp_gateway::{Error, Result};
use async_trait::async_trait;
use serde_json::{json, Value};

struct EchoHandler;

#[async_trait]
impl ToolHandler for EchoHandler {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "echo".to_string(),
            description: "echoes its input".to_string(),
            input_schema: json!({"type": "object"}),
        }
    }

    async fn call(&self, args: Value) -> Result<Value> {
        Ok(args)
    }
}

struct FailingHandler;

#[async_trait]
impl ToolHandler for FailingHandler {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "always_fails".to_string(),
            description: "always returns an error".to_string(),
            input_schema: json!({"type": "object"}),
        }
    }

    async fn call(&self, _args: Value) -> Result<Value> {
        Err(Error::Validation("deliberate failure".to_string()))
    }
}

fn registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(EchoHandler));
    registry.register(Arc::new(FailingHandler));
    registry
}

#[tokio::test]
async fn dispatch_routes_to_the_named_handler() {
    let registry = registry();
    let result = registry.dispatch("echo", json!({"x": 1})).await.unwrap();
    assert_eq!(result, json!({"x": 1}));
}

#[tokio::test]
async fn dispatch_of_unknown_tool_is_an_error_not_a_panic() {
    let registry = registry();
    let result = registry.dispatch("no_such_tool", json!({})).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn every_dispatch_outcome_maps_to_a_total_envelope() {
    let registry = registry();

    let ok = match registry.dispatch("echo", json!({"a": true})).await {
        Ok(v) => ToolResponse::ok(v),
        Err(e) => ToolResponse::err(e.to_string()),
    };
    assert!(ok.success);

    let err = match registry.dispatch("always_fails", json!({})).await {
        Ok(v) => ToolResponse::ok(v),
        Err(e) => ToolResponse::err(e.to_string()),
    };
    assert!(!err.success);
    assert!(err.error.is_some());

    let unknown = match registry.dispatch("ghost", json!({})).await {
        Ok(v) => ToolResponse::ok(v),
        Err(e) => ToolResponse::err(e.to_string()),
    };
    assert!(!unknown.success);
}

#[tokio::test]
async fn descriptors_list_every_registered_tool() {
    let registry = registry();
    let names: Vec<String> = registry.descriptors().into_iter().map(|d| d.name).collect();
    assert!(names.contains(&"echo".to_string()));
    assert!(names.contains(&"always_fails".to_string()));
    assert_eq!(names.len(), 2);
}

#[test]
fn tool_request_get_args_is_total_even_with_neither_field_set() {
    let json = json!({"tool": "echo"});
    let req: ToolRequest = serde_json::from_value(json).unwrap();
    assert_eq!(req.get_args(), json!({}));
}

#[test]
fn path_gate_accepts_a_clean_relative_path_under_its_root() {
    let dir = tempfile::tempdir().unwrap();
    let gate = PathSafetyGate::new(SandboxRoot::Output, dir.path());
    let resolved = gate.validate("renders/scene.tor").unwrap();
    assert!(resolved.starts_with(dir.path().canonicalize().unwrap()));
}

#[test]
fn path_gate_rejects_traversal_out_of_its_root() {
    let dir = tempfile::tempdir().unwrap();
    let gate = PathSafetyGate::new(SandboxRoot::Output, dir.path());
    assert!(gate.validate("../outside.tor").is_err());
}
