//! Pipeline error types.

use thiserror::Error;

use vsearch_models::{TaskId, TaskStatus};

pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("task already exists: {0}")]
    TaskExists(TaskId),

    #[error("unknown task: {0}")]
    UnknownTask(TaskId),

    #[error("invalid status transition: {from} -> {to}")]
    InvalidTransition { from: TaskStatus, to: TaskStatus },

    #[error("worker pool failed: {0}")]
    Pool(String),

    #[error("media error: {0}")]
    Media(#[from] vsearch_media::MediaError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
