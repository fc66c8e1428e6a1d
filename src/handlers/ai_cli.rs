//! AI-CLI handler: forwards a prompt to an external AI command-line tool
//! as a subprocess job, composing a bounded rolling history of prior
//! exchanges into the outbound prompt.
//!
//! No concrete transcript source was available to ground this against;
//! implemented generically as a fixed-size ring buffer of prior
//! exchanges.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Value, json};

use crate::envelope::ToolDescriptor;
use crate::jobs::{JobStatus, JobStore};
use crate::orchestrator::{ExecuteScriptRequest, SubprocessOrchestrator};
use crate::runtime::registry::ToolHandler;
use crate::{Error, Result};

/// Interval between job-store polls while awaiting synchronous completion.
const POLL_INTERVAL: Duration = Duration::from_millis(25);

#[derive(Debug, Clone)]
struct Exchange {
    prompt: String,
    response_job_id: String,
}

/// A bounded ring buffer of prior prompt/response pairs, shared behind a
/// coarse lock — the same shape the job store uses for its cache.
pub struct RollingHistory {
    max_len: usize,
    entries: Mutex<VecDeque<Exchange>>,
}

impl RollingHistory {
    pub fn new(max_len: usize) -> Self {
        Self {
            max_len: max_len.max(1),
            entries: Mutex::new(VecDeque::new()),
        }
    }

    fn push(&self, prompt: String, response_job_id: String) {
        let mut entries = self.entries.lock();
        if entries.len() >= self.max_len {
            entries.pop_front();
        }
        entries.push_back(Exchange { prompt, response_job_id });
    }

    fn compose_prompt(&self, new_prompt: &str) -> String {
        let entries = self.entries.lock();
        let mut composed = String::new();
        for (i, exchange) in entries.iter().enumerate() {
            composed.push_str(&format!("[{i}] {}\n", exchange.prompt));
        }
        composed.push_str(new_prompt);
        composed
    }
}

pub struct AiCliHandler {
    orchestrator: Arc<SubprocessOrchestrator>,
    job_store: Arc<JobStore>,
    history: Arc<RollingHistory>,
}

impl AiCliHandler {
    pub fn new(orchestrator: Arc<SubprocessOrchestrator>, job_store: Arc<JobStore>, max_history: usize) -> Self {
        Self {
            orchestrator,
            job_store,
            history: Arc::new(RollingHistory::new(max_history)),
        }
    }
}

#[async_trait]
impl ToolHandler for AiCliHandler {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "ai_cli_prompt".to_string(),
            description: "Send a prompt to the external AI CLI tool, carrying a bounded rolling history".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {"prompt": {"type": "string"}},
                "required": ["prompt"]
            }),
        }
    }

    async fn call(&self, args: Value) -> Result<Value> {
        let prompt = args
            .get("prompt")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::Validation("missing 'prompt'".to_string()))?;

        let composed = self.history.compose_prompt(prompt);

        let started = Instant::now();
        let job_id = self
            .orchestrator
            .execute_script(ExecuteScriptRequest {
                job_type: "ai_cli_prompt".to_string(),
                script_path: std::path::PathBuf::from("ai-cli-consult"),
                args: json!({ "prompt": composed }),
                expected_output_path: None,
                background: false,
            })
            .await?;

        self.history.push(prompt.to_string(), job_id.to_string());

        // `background: false` means the caller wants the finished
        // consultation back in this response, not a job id to poll later.
        let record = loop {
            let record = self.job_store.get(job_id)?;
            if record.status.is_terminal() {
                break record;
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        };
        let execution_time = started.elapsed().as_secs_f64();

        match record.status {
            JobStatus::Completed => Ok(json!({
                "status": "success",
                "response": record.stdout_tail.trim(),
                "execution_time": execution_time,
            })),
            _ => Ok(json!({
                "status": "error",
                "response": record.error.unwrap_or_else(|| "ai_cli_prompt job did not complete successfully".to_string()),
                "execution_time": execution_time,
            })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_drops_oldest_entry_once_full() {
        let history = RollingHistory::new(2);
        history.push("first".to_string(), "a".to_string());
        history.push("second".to_string(), "b".to_string());
        history.push("third".to_string(), "c".to_string());
        let composed = history.compose_prompt("fourth");
        assert!(!composed.contains("first"));
        assert!(composed.contains("second"));
        assert!(composed.contains("third"));
    }
}
