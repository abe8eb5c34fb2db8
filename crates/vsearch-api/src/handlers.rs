//! Request handlers for the supercut API.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use vsearch_models::{sanitise_query, SearchResults, SearchType, TaskId};
use vsearch_pipeline::{BuildRequest, StartOutcome};

use crate::error::ApiError;
use crate::state::AppState;

fn default_page() -> u32 {
    1
}

/// Body of `POST /api/supercuts`.
#[derive(Debug, Deserialize)]
pub struct SupercutRequest {
    pub query: String,
    #[serde(default)]
    pub search_type: SearchType,
    #[serde(default = "default_page")]
    pub page: u32,
    /// The executed search result this build consumes.
    #[serde(default)]
    pub results: SearchResults,
}

/// Launch a supercut build for an executed search result.
///
/// Returns `202` with the task to poll, or `200` with the filename when
/// the artifact already exists on disk.
pub async fn start_supercut(
    State(state): State<AppState>,
    Json(request): Json<SupercutRequest>,
) -> Result<Response, ApiError> {
    if sanitise_query(&request.query).trim().is_empty() {
        return Err(ApiError::InvalidRequest("query must not be empty".to_string()));
    }

    let task_id = TaskId::new();
    info!(query = %request.query, search_type = %request.search_type, page = request.page, "Supercut requested");

    let outcome = state.pipeline.start_build(
        BuildRequest {
            query: request.query,
            results: request.results,
            page: request.page.max(1),
            search_type: request.search_type,
        },
        task_id,
    )?;

    Ok(match outcome {
        StartOutcome::Started { task_id } | StartOutcome::InFlight { task_id } => (
            StatusCode::ACCEPTED,
            Json(json!({ "task_id": task_id })),
        )
            .into_response(),
        StartOutcome::AlreadyBuilt { filename } => {
            (StatusCode::OK, Json(json!({ "filename": filename }))).into_response()
        }
    })
}

/// Current status/progress/filename for a task.
pub async fn get_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<Response, ApiError> {
    let id = TaskId::from_string(&task_id);
    let snapshot = state
        .pipeline
        .registry()
        .get(&id)
        .ok_or(ApiError::TaskNotFound(task_id))?;
    Ok(Json(snapshot).into_response())
}
