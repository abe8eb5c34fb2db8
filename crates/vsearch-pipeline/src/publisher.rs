//! Progress publishing: a pull-based event stream per task.
//!
//! The publisher polls the registry once per second and emits one event
//! per tick. It never errors on an unknown task id: task creation and the
//! first poll can race, so an unknown id just means "no event this tick".

use futures::Stream;
use std::time::Duration;
use tokio::time::MissedTickBehavior;

use vsearch_models::{TaskId, TaskSnapshot, TaskStatus};

use crate::registry::TaskRegistry;

/// How often the registry is polled for a task's state.
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// One observation of a task, as emitted to a streaming client.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    /// Extraction underway; payload is the percentage.
    Progress(f64),
    /// Final encode underway.
    Saving,
    /// Terminal: the artifact is ready.
    Completed { filename: String },
    /// Terminal: the build finished but nothing matched the query.
    NoClips,
    /// Terminal: the build aborted.
    Failed { error: String },
}

impl ProgressEvent {
    /// Terminal events close the stream.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ProgressEvent::Completed { .. } | ProgressEvent::NoClips | ProgressEvent::Failed { .. }
        )
    }

    /// Map a registry snapshot to the event a poller should see.
    pub fn from_snapshot(snapshot: &TaskSnapshot) -> Self {
        match snapshot.status {
            TaskStatus::InProgress => ProgressEvent::Progress(snapshot.progress),
            TaskStatus::Saving => ProgressEvent::Saving,
            TaskStatus::Completed => match &snapshot.output_filename {
                Some(filename) => ProgressEvent::Completed {
                    filename: filename.clone(),
                },
                None => ProgressEvent::NoClips,
            },
            TaskStatus::Failed => ProgressEvent::Failed {
                error: snapshot
                    .error
                    .clone()
                    .unwrap_or_else(|| "build failed".to_string()),
            },
        }
    }
}

/// Stream of progress events for one task, one per poll tick, ending with
/// the first terminal event.
pub fn progress_events(
    registry: TaskRegistry,
    task_id: TaskId,
) -> impl Stream<Item = ProgressEvent> {
    let mut interval = tokio::time::interval(POLL_INTERVAL);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    futures::stream::unfold(
        (registry, task_id, interval, false),
        |(registry, task_id, mut interval, finished)| async move {
            if finished {
                return None;
            }
            loop {
                interval.tick().await;
                if let Some(snapshot) = registry.get(&task_id) {
                    let event = ProgressEvent::from_snapshot(&snapshot);
                    let terminal = event.is_terminal();
                    return Some((event, (registry, task_id, interval, terminal)));
                }
                // Unknown task: keep polling, creation may be racing us.
            }
        },
    )
}
