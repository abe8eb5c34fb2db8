//! In-memory task registry.
//!
//! The registry is the only shared mutable state in the pipeline. It is an
//! explicit, process-scoped object (cloned handles share one map) and is
//! never persisted; a restart forgets every task. All mutations and
//! snapshot reads happen under one lock, held only for the duration of a
//! field copy, never across an encode.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::warn;

use vsearch_models::{TaskId, TaskSnapshot, TaskStatus};

use crate::error::{PipelineError, PipelineResult};

#[derive(Debug, Clone)]
struct TaskEntry {
    status: TaskStatus,
    progress: f64,
    output_filename: Option<String>,
    error: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TaskEntry {
    fn new() -> Self {
        let now = Utc::now();
        Self {
            status: TaskStatus::InProgress,
            progress: 0.0,
            output_filename: None,
            error: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn snapshot(&self, id: &TaskId) -> TaskSnapshot {
        TaskSnapshot {
            id: id.clone(),
            status: self.status,
            progress: self.progress,
            output_filename: self.output_filename.clone(),
            error: self.error.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, Default)]
struct Inner {
    tasks: HashMap<TaskId, TaskEntry>,
    /// Output filename -> the task currently building it.
    in_flight: HashMap<String, TaskId>,
}

/// Process-wide map from task id to task state.
#[derive(Debug, Clone, Default)]
pub struct TaskRegistry {
    inner: Arc<Mutex<Inner>>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A poisoned lock only means a panic elsewhere; the map itself is
        // still coherent, every mutation below is a single field write.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Insert a fresh task in `in_progress` at 0%.
    ///
    /// Task ids must be freshly generated by the caller; reusing one is a
    /// logic error.
    pub fn create(&self, id: &TaskId) -> PipelineResult<()> {
        let mut inner = self.lock();
        if inner.tasks.contains_key(id) {
            return Err(PipelineError::TaskExists(id.clone()));
        }
        inner.tasks.insert(id.clone(), TaskEntry::new());
        Ok(())
    }

    /// Advance progress while the task is `in_progress`.
    ///
    /// Progress never moves backwards: concurrent workers report their own
    /// completion out of order, and a stale lower value must not undo a
    /// newer one. Unknown tasks are ignored.
    pub fn update_progress(&self, id: &TaskId, progress: f64) {
        let mut inner = self.lock();
        match inner.tasks.get_mut(id) {
            Some(entry) if entry.status == TaskStatus::InProgress => {
                entry.progress = entry.progress.max(progress.clamp(0.0, 100.0));
                entry.updated_at = Utc::now();
            }
            Some(_) => {}
            None => warn!(task_id = %id, "Progress update for unknown task"),
        }
    }

    /// Advance the status one step forward.
    pub fn transition(&self, id: &TaskId, next: TaskStatus) -> PipelineResult<()> {
        let mut inner = self.lock();
        let entry = inner
            .tasks
            .get_mut(id)
            .ok_or_else(|| PipelineError::UnknownTask(id.clone()))?;
        if !entry.status.can_advance_to(next) {
            return Err(PipelineError::InvalidTransition {
                from: entry.status,
                to: next,
            });
        }
        entry.status = next;
        entry.updated_at = Utc::now();
        Ok(())
    }

    /// Mark the task completed at 100%, with the output filename when at
    /// least one clip was produced.
    pub fn complete(&self, id: &TaskId, output_filename: Option<String>) -> PipelineResult<()> {
        let mut inner = self.lock();
        let entry = inner
            .tasks
            .get_mut(id)
            .ok_or_else(|| PipelineError::UnknownTask(id.clone()))?;
        if !entry.status.can_advance_to(TaskStatus::Completed) {
            return Err(PipelineError::InvalidTransition {
                from: entry.status,
                to: TaskStatus::Completed,
            });
        }
        entry.status = TaskStatus::Completed;
        entry.progress = 100.0;
        entry.output_filename = output_filename;
        entry.updated_at = Utc::now();
        Ok(())
    }

    /// Mark the task failed with a one-line error summary.
    ///
    /// A no-op when the task is unknown or already terminal.
    pub fn fail(&self, id: &TaskId, error: impl Into<String>) {
        let mut inner = self.lock();
        match inner.tasks.get_mut(id) {
            Some(entry) if !entry.status.is_terminal() => {
                entry.status = TaskStatus::Failed;
                entry.error = Some(error.into());
                entry.updated_at = Utc::now();
            }
            Some(_) => warn!(task_id = %id, "Failure reported for terminal task"),
            None => warn!(task_id = %id, "Failure reported for unknown task"),
        }
    }

    /// Immutable copy of the task's current state.
    pub fn get(&self, id: &TaskId) -> Option<TaskSnapshot> {
        let inner = self.lock();
        inner.tasks.get(id).map(|entry| entry.snapshot(id))
    }

    /// Reserve `filename` for `id`, or return the task already building it.
    ///
    /// Check and insert happen under the same lock, so two concurrent
    /// requests for one artifact coalesce onto whichever won.
    pub fn reserve_build(&self, filename: &str, id: &TaskId) -> Option<TaskId> {
        let mut inner = self.lock();
        if let Some(existing) = inner.in_flight.get(filename) {
            return Some(existing.clone());
        }
        inner.in_flight.insert(filename.to_string(), id.clone());
        None
    }

    /// Release a reservation taken by `reserve_build`.
    pub fn release_build(&self, filename: &str) {
        self.lock().in_flight.remove(filename);
    }
}
