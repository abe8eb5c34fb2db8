//! Server-Sent Events progress endpoint.
//!
//! Streams the pipeline's progress events to the page that requested a
//! build, one event per poll tick, closing after the terminal event.
//! Event grammar: a bare progress number, `saving`, `completed <filename>`,
//! `no_clips`, or `failed <summary>`.

use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use futures::StreamExt;
use std::convert::Infallible;
use std::time::Duration;
use tracing::debug;

use vsearch_models::TaskId;
use vsearch_pipeline::{progress_events, ProgressEvent};

use crate::state::AppState;

/// GET /api/supercuts/progress/{task_id} - SSE progress stream.
pub async fn progress_stream(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    debug!(%task_id, "New SSE client connected");

    let registry = state.pipeline.registry().clone();
    let stream = progress_events(registry, TaskId::from_string(task_id))
        .map(|event| Ok(Event::default().data(event_data(&event))));

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// Render a progress event into its wire token.
fn event_data(event: &ProgressEvent) -> String {
    match event {
        ProgressEvent::Progress(progress) => format!("{}", progress),
        ProgressEvent::Saving => "saving".to_string(),
        ProgressEvent::Completed { filename } => format!("completed {}", filename),
        ProgressEvent::NoClips => "no_clips".to_string(),
        ProgressEvent::Failed { error } => {
            format!("failed {}", error.replace(['\n', '\r'], " "))
        }
    }
}
