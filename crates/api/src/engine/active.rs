//! Table of in-flight worker invocations.
//!
//! The only state shared between concurrent dispatches. Registration checks
//! for a running job of the same kind and inserts under one write lock, so two
//! racing dispatches of one kind cannot both get in. Entries are removed by
//! [`ActiveJobGuard`] on drop, which covers error and panic paths.

use std::collections::HashMap;
use std::sync::Arc;

use oddsy_core::jobs::JobKind;
use oddsy_core::runner::OutputHandle;
use oddsy_core::types::{JobId, Timestamp};
use parking_lot::RwLock;
use serde::Serialize;

/// Bytes of stdout included in a summary.
const SUMMARY_TAIL_BYTES: usize = 2 * 1024;

/// One running invocation.
#[derive(Debug, Clone)]
pub struct ActiveJob {
    pub id: JobId,
    pub kind: JobKind,
    pub started_at: Timestamp,
    pub stdout: OutputHandle,
    pub stderr: OutputHandle,
}

/// Serializable view of an [`ActiveJob`] with its output so far.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveJobSummary {
    pub id: JobId,
    pub kind: JobKind,
    pub started_at: Timestamp,
    pub stdout_bytes: usize,
    pub stderr_bytes: usize,
    pub stdout_tail: String,
}

/// Thread-safe registry of running jobs, shared via `Arc`.
#[derive(Debug, Default)]
pub struct ActiveJobs {
    jobs: RwLock<HashMap<JobId, ActiveJob>>,
}

impl ActiveJobs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `job` unless another job of the same kind is running.
    ///
    /// On conflict returns the id of the job already running.
    pub fn try_register(self: &Arc<Self>, job: ActiveJob) -> Result<ActiveJobGuard, JobId> {
        let mut jobs = self.jobs.write();
        if let Some(running) = jobs.values().find(|j| j.kind == job.kind) {
            return Err(running.id);
        }
        let id = job.id;
        jobs.insert(id, job);
        Ok(ActiveJobGuard {
            jobs: Arc::clone(self),
            id,
        })
    }

    pub fn len(&self) -> usize {
        self.jobs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_running(&self, kind: JobKind) -> bool {
        self.jobs.read().values().any(|j| j.kind == kind)
    }

    /// Summaries of all running jobs, oldest first.
    pub async fn summaries(&self) -> Vec<ActiveJobSummary> {
        let mut jobs: Vec<ActiveJob> = self.jobs.read().values().cloned().collect();
        jobs.sort_by_key(|j| j.started_at);

        let mut summaries = Vec::with_capacity(jobs.len());
        for job in jobs {
            summaries.push(ActiveJobSummary {
                id: job.id,
                kind: job.kind,
                started_at: job.started_at,
                stdout_bytes: job.stdout.len().await,
                stderr_bytes: job.stderr.len().await,
                stdout_tail: job.stdout.tail(SUMMARY_TAIL_BYTES).await,
            });
        }
        summaries
    }

    fn remove(&self, id: JobId) {
        self.jobs.write().remove(&id);
    }
}

/// Removes its job from the table when dropped.
#[derive(Debug)]
pub struct ActiveJobGuard {
    jobs: Arc<ActiveJobs>,
    id: JobId,
}

impl Drop for ActiveJobGuard {
    fn drop(&mut self) {
        self.jobs.remove(self.id);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
