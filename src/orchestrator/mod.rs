//! Subprocess job orchestrator: semaphore-gated spawn, detached monitor
//! tasks, and graceful-then-hard kill.
//!
//! Grounded in the original `blender_executor.py`: build `argv`, acquire a
//! `Semaphore(max(1, cpu/2))`, spawn, hand wait-for-exit off to a monitor
//! task that updates the job store on completion and always cleans up
//! its bookkeeping in a `finally`-equivalent path.

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use serde_json::Value;
use tokio::process::{Child, Command};
use tokio::sync::{oneshot, Semaphore};
use uuid::Uuid;

use crate::jobs::{JobStatus, JobStore};
use crate::{Error, Result};

/// A request to execute an external script/binary as a tracked job. The
/// `args` map is serialized to a per-job temp JSON file and handed to the
/// child as the conventional `args_file` argv slot; it is unlinked once
/// the monitor observes the child exit. `expected_output_path`, if given,
/// is checked for existence on a successful exit and recorded on the job
/// record — it is never touched by cleanup.
#[derive(Debug, Clone)]
pub struct ExecuteScriptRequest {
    pub job_type: String,
    pub script_path: PathBuf,
    pub args: Value,
    pub expected_output_path: Option<PathBuf>,
    pub background: bool,
}

pub struct SubprocessOrchestrator {
    binary: PathBuf,
    job_store: Arc<JobStore>,
    semaphore: Arc<Semaphore>,
    kill_grace_period: Duration,
    /// One kill switch per in-flight job. The monitor task owns the actual
    /// `Child`; `kill()` only ever signals through the channel, so no two
    /// tasks ever need mutable access to the same `Child` at once.
    handles: Arc<DashMap<Uuid, oneshot::Sender<()>>>,
}

impl SubprocessOrchestrator {
    pub fn new(binary: PathBuf, job_store: Arc<JobStore>, max_concurrent: usize, kill_grace_period: Duration) -> Self {
        Self {
            binary,
            job_store,
            semaphore: Arc::new(Semaphore::new(max_concurrent.max(1))),
            kill_grace_period,
            handles: Arc::new(DashMap::new()),
        }
    }

    /// Acquire the concurrency gate (this blocks the caller), spawn the
    /// child synchronously, and return its job id. The spawn itself does
    /// not wait for the child to exit — that's the monitor task's job —
    /// but a missing binary fails synchronously, right here, before any
    /// job id is returned.
    pub async fn execute_script(&self, request: ExecuteScriptRequest) -> Result<Uuid> {
        let job = self.job_store.create(request.job_type.clone(), request.args.clone())?;
        let job_id = job.id;

        let permit = self.semaphore.clone().acquire_owned().await.expect("semaphore is never closed");
        tracing::debug!(%job_id, "acquired orchestrator concurrency permit");

        let args_file = self.job_store.directory().join(format!("{job_id}.args.json"));
        if let Err(e) = std::fs::write(&args_file, serde_json::to_vec_pretty(&request.args)?) {
            let _ = self
                .job_store
                .finish(job_id, JobStatus::Failed, None, None, Some(format!("failed to write args file: {e}")));
            return Err(Error::Io(e));
        }

        let mut argv: Vec<String> = Vec::new();
        if request.background {
            argv.push("--background".to_string());
        }
        argv.push(request.script_path.to_string_lossy().into_owned());
        argv.push("--".to_string());
        argv.push(args_file.to_string_lossy().into_owned());
        argv.push(job_id.to_string());

        let mut command = Command::new(&self.binary);
        command.args(&argv).stdout(Stdio::piped()).stderr(Stdio::piped()).kill_on_drop(true);

        let child = match command.spawn() {
            Ok(child) => child,
            Err(e) => {
                let _ = std::fs::remove_file(&args_file);
                let _ = self
                    .job_store
                    .finish(job_id, JobStatus::Failed, None, None, Some(format!("spawn failed: {e}")));
                return Err(Error::Subprocess(format!("binary not found or not runnable: {e}")));
            }
        };

        let (kill_tx, kill_rx) = oneshot::channel();
        self.handles.insert(job_id, kill_tx);

        let job_store = self.job_store.clone();
        let handles = self.handles.clone();
        let kill_grace_period = self.kill_grace_period;
        let expected_output_path = request.expected_output_path.clone();

        tokio::spawn(async move {
            let _permit = permit;
            Self::monitor(job_id, child, kill_rx, kill_grace_period, job_store, handles, &args_file, expected_output_path.as_deref()).await;
        });

        Ok(job_id)
    }

    /// Waits out the job's subprocess, racing its natural exit against a
    /// kill signal delivered through `kill_rx`. On a kill signal, issues a
    /// hard kill and bounds the remaining wait by `kill_grace_period`.
    async fn monitor(
        job_id: Uuid,
        mut child: Child,
        kill_rx: oneshot::Receiver<()>,
        kill_grace_period: Duration,
        job_store: Arc<JobStore>,
        handles: Arc<DashMap<Uuid, oneshot::Sender<()>>>,
        args_file: &PathBuf,
        expected_output_path: Option<&std::path::Path>,
    ) {
        let _ = job_store.update_progress(job_id, 0, Some("subprocess spawned".to_string()));

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let wait_result = tokio::select! {
            result = child.wait() => result,
            _ = kill_rx => {
                tracing::debug!(%job_id, "kill signal received, terminating subprocess");
                let _ = child.start_kill();
                match tokio::time::timeout(kill_grace_period, child.wait()).await {
                    Ok(result) => result,
                    Err(_) => Err(std::io::Error::other("subprocess did not exit within the kill grace period")),
                }
            }
        };
        handles.remove(&job_id);

        let stdout_tail = Self::drain_tail(stdout).await;
        let stderr_tail = Self::drain_tail(stderr).await;
        tracing::debug!(%job_id, stdout_len = stdout_tail.len(), stderr_len = stderr_tail.len(), "subprocess output captured");
        let _ = job_store.set_output_tails(job_id, stdout_tail.clone(), stderr_tail.clone());

        let _ = std::fs::remove_file(args_file);

        match wait_result {
            Ok(status) if status.success() => {
                let output_path = expected_output_path
                    .filter(|p| p.exists())
                    .map(|p| p.to_string_lossy().into_owned());
                let _ = job_store.finish(job_id, JobStatus::Completed, output_path, None, None);
            }
            Ok(status) => {
                let excerpt = stderr_tail.trim();
                let message = if excerpt.is_empty() {
                    format!("subprocess exited with status {status}")
                } else {
                    format!("subprocess exited with status {status}: {excerpt}")
                };
                let _ = job_store.finish(job_id, JobStatus::Failed, None, None, Some(message));
            }
            Err(e) => {
                let _ = job_store.finish(job_id, JobStatus::Failed, None, None, Some(format!("wait failed: {e}")));
            }
        }
    }

    async fn drain_tail<R>(pipe: Option<R>) -> String
    where
        R: tokio::io::AsyncRead + Unpin,
    {
        use tokio::io::AsyncReadExt;
        let Some(mut pipe) = pipe else {
            return String::new();
        };
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf).await;
        let text = String::from_utf8_lossy(&buf).into_owned();
        let tail_start = text.len().saturating_sub(4096);
        text[tail_start..].to_string()
    }

    /// Cancel a running job by signaling its monitor task, which performs
    /// the actual graceful-then-hard kill against the `Child` it owns.
    pub async fn kill(&self, job_id: Uuid) -> Result<()> {
        match self.handles.remove(&job_id) {
            Some((_, kill_tx)) => {
                let _ = kill_tx.send(());
            }
            None => return Err(Error::Subprocess(format!("no running process for job {job_id}"))),
        }
        self.job_store.cancel(job_id)
    }

    /// Probe whether the configured external binary is present and
    /// runnable, used by the installation-check tool handler.
    pub async fn validate_installation(&self) -> Result<String> {
        let output = Command::new(&self.binary)
            .arg("--version")
            .output()
            .await
            .map_err(|e| Error::Subprocess(format!("binary not runnable: {e}")))?;
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    #[must_use]
    pub fn active_job_count(&self) -> usize {
        self.handles.len()
    }

    #[must_use]
    pub fn available_permits(&self) -> usize {
        self.semaphore.available_permits()
    }

    pub fn binary_path(&self) -> &PathBuf {
        &self.binary
    }
}
