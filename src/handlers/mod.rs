//! Specialized tool handlers: thin marshaling layers over `graph_core`,
//! the job store, and the subprocess orchestrator.

pub mod ai_cli;
pub mod render;
pub mod terrain;

use std::sync::Arc;

use graph_core::Validator;

use crate::config::Config;
use crate::jobs::JobStore;
use crate::orchestrator::SubprocessOrchestrator;
use crate::pathgate::{PathSafetyGate, SandboxRoot};
use crate::runtime::registry::ToolRegistry;

/// Build the full tool registry wiring every handler to its shared
/// dependencies, following the teacher's `Gateway::new` bootstrap shape.
pub fn build_registry(config: &Config, job_store: Arc<JobStore>, orchestrator: Arc<SubprocessOrchestrator>) -> ToolRegistry {
    let validator = Arc::new(Validator::new());
    let project_gate = Arc::new(PathSafetyGate::new(SandboxRoot::Project, &config.sandbox.project_root));
    let output_gate = Arc::new(PathSafetyGate::new(SandboxRoot::Output, &config.sandbox.output_root));
    let asset_gate = Arc::new(PathSafetyGate::new(SandboxRoot::Asset, &config.sandbox.asset_root));

    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(terrain::ValidateGraphHandler::new(validator.clone())));
    registry.register(Arc::new(terrain::RepairGraphHandler::new(validator.clone())));
    registry.register(Arc::new(terrain::CreateProjectHandler::new(validator.clone(), asset_gate)));
    registry.register(Arc::new(terrain::CreateFromTemplateHandler));
    registry.register(Arc::new(terrain::AnalyzeWorkflowHandler));
    registry.register(Arc::new(terrain::SuggestWorkflowHandler));
    registry.register(Arc::new(render::RenderTerrainHandler::new(
        orchestrator.clone(),
        project_gate,
        output_gate,
    )));
    registry.register(Arc::new(render::JobStatusHandler::new(job_store.clone())));
    registry.register(Arc::new(render::JobCancelHandler::new(orchestrator.clone())));
    registry.register(Arc::new(render::ValidateInstallationHandler::new(orchestrator.clone())));
    registry.register(Arc::new(ai_cli::AiCliHandler::new(orchestrator, job_store, config.ai_cli.max_history)));
    registry
}
