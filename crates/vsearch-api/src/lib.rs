//! Axum HTTP/SSE API for the supercut pipeline.

pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod sse;
pub mod state;

pub use config::ApiConfig;
pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
