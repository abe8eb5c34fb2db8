//! Router construction.

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::handlers::{get_task, start_supercut};
use crate::sse::progress_stream;
use crate::state::AppState;

/// Build the application router.
pub fn create_router(state: AppState) -> Router {
    let videos = ServeDir::new(&state.config.media_dir);

    Router::new()
        .route("/api/supercuts", post(start_supercut))
        .route("/api/supercuts/tasks/:task_id", get(get_task))
        .route("/api/supercuts/progress/:task_id", get(progress_stream))
        .nest_service("/videos", videos)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
