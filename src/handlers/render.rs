//! Subprocess-backed rendering and job-management handlers: submit a
//! render job, check its status, cancel it, or probe the external
//! renderer's installation.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::envelope::ToolDescriptor;
use crate::jobs::JobStore;
use crate::orchestrator::{ExecuteScriptRequest, SubprocessOrchestrator};
use crate::pathgate::PathSafetyGate;
use crate::runtime::registry::ToolHandler;
use crate::{Error, Result};

pub struct RenderTerrainHandler {
    orchestrator: Arc<SubprocessOrchestrator>,
    project_gate: Arc<PathSafetyGate>,
    output_gate: Arc<PathSafetyGate>,
}

impl RenderTerrainHandler {
    pub fn new(orchestrator: Arc<SubprocessOrchestrator>, project_gate: Arc<PathSafetyGate>, output_gate: Arc<PathSafetyGate>) -> Self {
        Self {
            orchestrator,
            project_gate,
            output_gate,
        }
    }
}

#[async_trait]
impl ToolHandler for RenderTerrainHandler {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "terrain_render".to_string(),
            description: "Submit a terrain project for background rendering via the external renderer".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "project_path": {"type": "string"},
                    "output_path": {"type": "string"}
                },
                "required": ["project_path", "output_path"]
            }),
        }
    }

    async fn call(&self, args: Value) -> Result<Value> {
        let project_path = args
            .get("project_path")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::Validation("missing 'project_path'".to_string()))?;
        let output_path = args
            .get("output_path")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::Validation("missing 'output_path'".to_string()))?;

        let resolved_project = self.project_gate.validate(project_path)?;
        let resolved_output = self.output_gate.validate(output_path)?;

        let job_id = self
            .orchestrator
            .execute_script(ExecuteScriptRequest {
                job_type: "terrain_render".to_string(),
                script_path: resolved_project,
                args: json!({ "project_path": project_path, "output_path": output_path }),
                expected_output_path: Some(resolved_output),
                background: true,
            })
            .await?;

        Ok(json!({ "job_id": job_id }))
    }
}

pub struct JobStatusHandler {
    job_store: Arc<JobStore>,
}

impl JobStatusHandler {
    pub fn new(job_store: Arc<JobStore>) -> Self {
        Self { job_store }
    }
}

#[async_trait]
impl ToolHandler for JobStatusHandler {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "job_status".to_string(),
            description: "Fetch the current status of a subprocess job".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {"job_id": {"type": "string"}},
                "required": ["job_id"]
            }),
        }
    }

    async fn call(&self, args: Value) -> Result<Value> {
        let job_id: Uuid = args
            .get("job_id")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::Validation("missing 'job_id'".to_string()))?
            .parse()
            .map_err(|e| Error::Validation(format!("invalid job_id: {e}")))?;
        let record = self.job_store.get(job_id)?;
        Ok(serde_json::to_value(record)?)
    }
}

pub struct JobCancelHandler {
    orchestrator: Arc<SubprocessOrchestrator>,
}

impl JobCancelHandler {
    pub fn new(orchestrator: Arc<SubprocessOrchestrator>) -> Self {
        Self { orchestrator }
    }
}

#[async_trait]
impl ToolHandler for JobCancelHandler {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "job_cancel".to_string(),
            description: "Cancel a running subprocess job".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {"job_id": {"type": "string"}},
                "required": ["job_id"]
            }),
        }
    }

    async fn call(&self, args: Value) -> Result<Value> {
        let job_id: Uuid = args
            .get("job_id")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::Validation("missing 'job_id'".to_string()))?
            .parse()
            .map_err(|e| Error::Validation(format!("invalid job_id: {e}")))?;
        self.orchestrator.kill(job_id).await?;
        Ok(json!({ "cancelled": true }))
    }
}

pub struct ValidateInstallationHandler {
    orchestrator: Arc<SubprocessOrchestrator>,
}

impl ValidateInstallationHandler {
    pub fn new(orchestrator: Arc<SubprocessOrchestrator>) -> Self {
        Self { orchestrator }
    }
}

#[async_trait]
impl ToolHandler for ValidateInstallationHandler {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "renderer_validate_installation".to_string(),
            description: "Check that the external renderer binary is present and runnable".to_string(),
            input_schema: json!({"type": "object", "properties": {}}),
        }
    }

    async fn call(&self, _args: Value) -> Result<Value> {
        let version = self.orchestrator.validate_installation().await?;
        Ok(json!({ "installed": true, "version": version }))
    }
}

