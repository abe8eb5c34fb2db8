//! Worker-pool orchestration for clip extraction.
//!
//! Jobs fan out over a bounded pool; every job runs the codec engine in
//! its own OS process, so a crashed extraction cannot corrupt a sibling.
//! Results are collected in submission order regardless of completion
//! order, because the final concatenation must match the planner's order.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, info};

use vsearch_models::{ClipJob, TaskId};

use crate::error::{PipelineError, PipelineResult};
use crate::extractor::ClipExtractor;
use crate::registry::TaskRegistry;

/// Steps reserved past extraction: the saving phase and final completion.
/// Keeps reported progress from hitting 100% while the encode is pending.
pub const RESERVED_STEPS: usize = 2;

/// Bounded pool of concurrent extractions.
#[derive(Debug, Clone)]
pub struct WorkerPool {
    permits: usize,
}

impl WorkerPool {
    /// Create a pool running at most `permits` extractions at once.
    pub fn new(permits: usize) -> Self {
        Self {
            permits: permits.max(1),
        }
    }

    /// Pool sized to the machine's CPU count.
    pub fn per_cpu() -> Self {
        Self::new(num_cpus::get())
    }

    pub fn permits(&self) -> usize {
        self.permits
    }

    /// Run every job, returning the normalized clip paths in submission
    /// order.
    ///
    /// After each job finishes, task progress advances to
    /// `completed / (jobs + RESERVED_STEPS) * 100`. The first extraction
    /// error aborts the remaining plan: queued jobs never start, and
    /// in-flight child processes are reaped when their futures drop.
    pub async fn run(
        &self,
        extractor: &dyn ClipExtractor,
        jobs: &[ClipJob],
        work_dir: &Path,
        registry: &TaskRegistry,
        task_id: &TaskId,
    ) -> PipelineResult<Vec<PathBuf>> {
        let total_steps = jobs.len() + RESERVED_STEPS;
        let semaphore = Arc::new(Semaphore::new(self.permits));
        let completed = AtomicUsize::new(0);

        info!(
            task_id = %task_id,
            jobs = jobs.len(),
            workers = self.permits,
            "Starting extraction pool"
        );

        let clips = futures::future::try_join_all(jobs.iter().enumerate().map(|(index, job)| {
            let semaphore = Arc::clone(&semaphore);
            let completed = &completed;
            async move {
                let _permit = semaphore
                    .acquire()
                    .await
                    .map_err(|_| PipelineError::Pool("worker pool closed".to_string()))?;

                let clip = extractor.extract(job, work_dir).await?;

                let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                registry.update_progress(task_id, done as f64 / total_steps as f64 * 100.0);
                debug!(task_id = %task_id, index, span = %job.span(), "Clip extracted");

                Ok::<_, PipelineError>(clip)
            }
        }))
        .await?;

        Ok(clips)
    }
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self::per_cpu()
    }
}
