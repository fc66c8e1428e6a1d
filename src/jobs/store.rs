//! Persistent job store: one `<id>.job` JSON file per job, with an
//! in-memory cache behind a single coarse lock.
//!
//! Grounded in the original `job_manager.py`/`status_manager.py`: create,
//! update (clamping progress, setting failed on error), get (memory then
//! disk), list (status/type filter, newest first), cancel, cleanup of
//! terminal jobs older than a max age, plus a compatibility read of bare
//! `<id>.status` files written by an external reporter with no matching
//! `.job` file.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::Utc;
use parking_lot::Mutex;
use uuid::Uuid;

use crate::jobs::model::{JobRecord, JobStatus};
use crate::{Error, Result};

pub struct JobStore {
    directory: PathBuf,
    cache: Mutex<HashMap<Uuid, JobRecord>>,
}

impl JobStore {
    /// Open (creating if needed) a job store rooted at `directory`,
    /// rehydrating its in-memory cache from whatever `.job` files already
    /// exist on disk — this is the crash-recovery path.
    pub fn open(directory: impl Into<PathBuf>) -> Result<Self> {
        let directory = directory.into();
        std::fs::create_dir_all(&directory)?;
        let mut cache = HashMap::new();
        for entry in std::fs::read_dir(&directory)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some("job") {
                if let Ok(bytes) = std::fs::read(&path) {
                    if let Ok(record) = serde_json::from_slice::<JobRecord>(&bytes) {
                        cache.insert(record.id, record);
                    }
                }
            }
        }
        Ok(Self {
            directory,
            cache: Mutex::new(cache),
        })
    }

    fn job_path(&self, id: Uuid) -> PathBuf {
        self.directory.join(format!("{id}.job"))
    }

    fn status_path(&self, id: Uuid) -> PathBuf {
        self.directory.join(format!("{id}.status"))
    }

    fn save(&self, record: &JobRecord) -> Result<()> {
        let path = self.job_path(record.id);
        let tmp = path.with_extension("job.tmp");
        let bytes = serde_json::to_vec_pretty(record)?;
        std::fs::write(&tmp, bytes)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }

    pub fn create(&self, job_type: impl Into<String>, parameters: serde_json::Value) -> Result<JobRecord> {
        let record = JobRecord::new(Uuid::new_v4(), job_type, parameters);
        self.save(&record)?;
        self.cache.lock().insert(record.id, record.clone());
        Ok(record)
    }

    pub fn update_progress(&self, id: Uuid, progress: u8, message: Option<String>) -> Result<()> {
        let mut cache = self.cache.lock();
        let record = cache.get_mut(&id).ok_or_else(|| Error::Job(format!("unknown job: {id}")))?;
        record.set_progress(progress, message);
        self.save(record)
    }

    pub fn set_output_tails(&self, id: Uuid, stdout_tail: String, stderr_tail: String) -> Result<()> {
        let mut cache = self.cache.lock();
        let record = cache.get_mut(&id).ok_or_else(|| Error::Job(format!("unknown job: {id}")))?;
        record.set_output_tails(stdout_tail, stderr_tail);
        self.save(record)
    }

    pub fn finish(
        &self,
        id: Uuid,
        status: JobStatus,
        output_path: Option<String>,
        result: Option<serde_json::Value>,
        error: Option<String>,
    ) -> Result<()> {
        let mut cache = self.cache.lock();
        let record = cache.get_mut(&id).ok_or_else(|| Error::Job(format!("unknown job: {id}")))?;
        record.finish(status, output_path, result, error);
        self.save(record)
    }

    /// Fetch a job, checking the in-memory cache first and falling back to
    /// disk (including the bare `.status` compatibility format) on a miss.
    pub fn get(&self, id: Uuid) -> Result<JobRecord> {
        if let Some(record) = self.cache.lock().get(&id) {
            return Ok(record.clone());
        }
        let job_path = self.job_path(id);
        if job_path.exists() {
            let bytes = std::fs::read(&job_path)?;
            let record: JobRecord = serde_json::from_slice(&bytes)?;
            self.cache.lock().insert(id, record.clone());
            return Ok(record);
        }
        if let Some(record) = self.read_compat_status(id)? {
            return Ok(record);
        }
        Err(Error::Job(format!("unknown job: {id}")))
    }

    /// Compatibility read for an external subprocess that writes its own
    /// `<id>.status` file directly, with no corresponding `.job` file.
    fn read_compat_status(&self, id: Uuid) -> Result<Option<JobRecord>> {
        let status_path = self.status_path(id);
        if !status_path.exists() {
            return Ok(None);
        }
        let text = std::fs::read_to_string(&status_path)?;
        let status = match text.trim() {
            "pending" => JobStatus::Pending,
            "running" => JobStatus::Running,
            "completed" => JobStatus::Completed,
            "failed" => JobStatus::Failed,
            "cancelled" => JobStatus::Cancelled,
            _ => JobStatus::Running,
        };
        let mut record = JobRecord::new(id, "external", serde_json::Value::Null);
        record.status = status;
        if status == JobStatus::Completed {
            record.progress = 100;
        }
        Ok(Some(record))
    }

    pub fn list(&self, status_filter: Option<JobStatus>, job_type_filter: Option<&str>, limit: usize) -> Vec<JobRecord> {
        let cache = self.cache.lock();
        let mut records: Vec<JobRecord> = cache
            .values()
            .filter(|j| status_filter.is_none_or(|s| j.status == s))
            .filter(|j| job_type_filter.is_none_or(|t| j.job_type == t))
            .cloned()
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        records.truncate(if limit == 0 { records.len() } else { limit });
        records
    }

    pub fn cancel(&self, id: Uuid) -> Result<()> {
        self.finish(id, JobStatus::Cancelled, None, None, Some("cancelled by caller".to_string()))
    }

    /// Delete terminal jobs (and their `.job` file) older than `max_age`.
    /// Run periodically by the reaper task.
    pub fn cleanup_old_jobs(&self, max_age: std::time::Duration) -> Result<usize> {
        let cutoff = Utc::now() - chrono::Duration::from_std(max_age).unwrap_or(chrono::Duration::hours(24));
        let mut cache = self.cache.lock();
        let expired: Vec<Uuid> = cache
            .values()
            .filter(|j| j.status.is_terminal() && j.updated_at < cutoff)
            .map(|j| j.id)
            .collect();
        for id in &expired {
            cache.remove(id);
            let _ = std::fs::remove_file(self.job_path(*id));
            let _ = std::fs::remove_file(self.status_path(*id));
        }
        Ok(expired.len())
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_then_get_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = JobStore::open(dir.path()).unwrap();
        let created = store.create("render", serde_json::json!({"k": "v"})).unwrap();
        let fetched = store.get(created.id).unwrap();
        assert_eq!(fetched.id, created.id);
        assert_eq!(fetched.status, JobStatus::Pending);
        assert_eq!(fetched.parameters, serde_json::json!({"k": "v"}));
    }

    #[test]
    fn finish_is_monotonic_through_the_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = JobStore::open(dir.path()).unwrap();
        let job = store.create("render", serde_json::Value::Null).unwrap();
        store
            .finish(job.id, JobStatus::Completed, Some("out.tor".into()), None, None)
            .unwrap();
        store
            .finish(job.id, JobStatus::Failed, None, None, Some("too late".into()))
            .unwrap();
        let fetched = store.get(job.id).unwrap();
        assert_eq!(fetched.status, JobStatus::Completed);
    }

    #[test]
    fn rehydrates_from_disk_on_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let id = {
            let store = JobStore::open(dir.path()).unwrap();
            store.create("render", serde_json::Value::Null).unwrap().id
        };
        let reopened = JobStore::open(dir.path()).unwrap();
        assert!(reopened.get(id).is_ok());
    }

    #[test]
    fn compat_status_file_is_readable_without_job_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = JobStore::open(dir.path()).unwrap();
        let id = Uuid::new_v4();
        std::fs::write(dir.path().join(format!("{id}.status")), "completed").unwrap();
        let record = store.get(id).unwrap();
        assert_eq!(record.status, JobStatus::Completed);
    }

    #[test]
    fn cleanup_removes_old_terminal_jobs_only() {
        let dir = tempfile::tempdir().unwrap();
        let store = JobStore::open(dir.path()).unwrap();
        let job = store.create("render", serde_json::Value::Null).unwrap();
        store.finish(job.id, JobStatus::Completed, None, None, None).unwrap();
        {
            let mut cache = store.cache.lock();
            let record = cache.get_mut(&job.id).unwrap();
            record.updated_at = Utc::now() - chrono::Duration::hours(48);
        }
        let removed = store.cleanup_old_jobs(std::time::Duration::from_secs(3600)).unwrap();
        assert_eq!(removed, 1);
        assert!(store.get(job.id).is_err());
    }
}
