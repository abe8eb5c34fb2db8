//! Application state.

use std::sync::Arc;

use vsearch_pipeline::{PipelineConfig, SupercutPipeline};

use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<SupercutPipeline>,
    pub config: ApiConfig,
}

impl AppState {
    /// Create application state from configuration.
    pub fn new(config: ApiConfig) -> Self {
        let pipeline = PipelineConfig {
            output_dir: config.media_dir.clone(),
            workers: config.workers,
            ..PipelineConfig::default()
        };
        Self {
            pipeline: Arc::new(SupercutPipeline::new(pipeline)),
            config,
        }
    }
}
