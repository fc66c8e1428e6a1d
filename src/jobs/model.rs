//! Job record types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// A job's lifecycle state. Transitions are monotonic: once `Completed`,
/// `Failed`, or `Cancelled`, a job never changes state again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl JobStatus {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed | JobStatus::Cancelled)
    }
}

/// The full on-disk/in-memory representation of one subprocess job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: Uuid,
    pub job_type: String,
    pub status: JobStatus,
    pub progress: u8,
    #[serde(default)]
    pub message: Option<String>,
    /// Verbatim copy of the inbound arguments that created this job.
    #[serde(default)]
    pub parameters: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Structured payload set on `Completed`. Distinct from `output_path`,
    /// which names a filesystem artifact; `result` carries inline data.
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub output_path: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub stdout_tail: String,
    #[serde(default)]
    pub stderr_tail: String,
}

impl JobRecord {
    pub fn new(id: Uuid, job_type: impl Into<String>, parameters: Value) -> Self {
        let now = Utc::now();
        Self {
            id,
            job_type: job_type.into(),
            status: JobStatus::Pending,
            progress: 0,
            message: None,
            parameters,
            created_at: now,
            updated_at: now,
            result: None,
            output_path: None,
            error: None,
            stdout_tail: String::new(),
            stderr_tail: String::new(),
        }
    }

    /// Apply a progress update, clamped to 0-100, optionally replacing the
    /// last human-readable progress line.
    pub fn set_progress(&mut self, progress: u8, message: Option<String>) {
        self.progress = progress.min(100);
        self.status = JobStatus::Running;
        if message.is_some() {
            self.message = message;
        }
        self.updated_at = Utc::now();
    }

    /// Transition to a terminal state. No-op if already terminal — status
    /// transitions are monotonic.
    pub fn finish(&mut self, status: JobStatus, output_path: Option<String>, result: Option<Value>, error: Option<String>) {
        if self.status.is_terminal() {
            return;
        }
        self.status = status;
        self.output_path = output_path;
        self.result = result;
        self.error = error;
        self.updated_at = Utc::now();
        if status == JobStatus::Completed {
            self.progress = 100;
        }
    }

    /// Record the captured tail of the subprocess's stdout/stderr streams.
    pub fn set_output_tails(&mut self, stdout_tail: String, stderr_tail: String) {
        self.stdout_tail = stdout_tail;
        self.stderr_tail = stderr_tail;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_clamps_to_100() {
        let mut job = JobRecord::new(Uuid::new_v4(), "render", Value::Null);
        job.set_progress(255, None);
        assert_eq!(job.progress, 100);
    }

    #[test]
    fn progress_update_replaces_message() {
        let mut job = JobRecord::new(Uuid::new_v4(), "render", Value::Null);
        job.set_progress(40, Some("halfway done".to_string()));
        assert_eq!(job.message.as_deref(), Some("halfway done"));
    }

    #[test]
    fn finish_is_monotonic_once_terminal() {
        let mut job = JobRecord::new(Uuid::new_v4(), "render", Value::Null);
        job.finish(JobStatus::Completed, Some("out.tor".to_string()), None, None);
        job.finish(JobStatus::Failed, None, None, Some("late error".to_string()));
        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.output_path.as_deref(), Some("out.tor"));
    }
}
