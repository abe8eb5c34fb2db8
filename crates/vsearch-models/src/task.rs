//! Supercut task state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a supercut build task.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub String);

impl TaskId {
    /// Generate a new random task ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Build status.
///
/// Transitions only move forward: `in_progress -> saving -> completed`.
/// `failed` is terminal and reachable from either non-terminal status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Clips are being extracted
    #[default]
    InProgress,
    /// Extraction done, final encode underway
    Saving,
    /// Build finished; a filename is present unless no clips matched
    Completed,
    /// Build aborted; an error summary is attached to the task
    Failed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Saving => "saving",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
        }
    }

    /// Check if this is a terminal state (no more updates expected).
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }

    /// Whether `next` is a legal forward move from this status.
    pub fn can_advance_to(&self, next: TaskStatus) -> bool {
        match (self, next) {
            (TaskStatus::InProgress, TaskStatus::Saving) => true,
            (TaskStatus::InProgress, TaskStatus::Completed) => true,
            (TaskStatus::Saving, TaskStatus::Completed) => true,
            (status, TaskStatus::Failed) => !status.is_terminal(),
            _ => false,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Immutable copy of a task's current state, as handed to pollers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskSnapshot {
    pub id: TaskId,
    pub status: TaskStatus,
    /// Percentage in `[0, 100]`; non-decreasing for the task's lifetime.
    pub progress: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
