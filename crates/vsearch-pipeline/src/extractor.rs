//! Extraction seam between the orchestrator and the media layer.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use vsearch_media::MediaResult;
use vsearch_models::ClipJob;

/// Executes one clip job, producing a normalized temporary clip.
#[async_trait]
pub trait ClipExtractor: Send + Sync {
    async fn extract(&self, job: &ClipJob, work_dir: &Path) -> MediaResult<PathBuf>;
}

/// The production extractor: one `ffmpeg` child process per job.
#[derive(Debug, Default)]
pub struct FfmpegExtractor;

#[async_trait]
impl ClipExtractor for FfmpegExtractor {
    async fn extract(&self, job: &ClipJob, work_dir: &Path) -> MediaResult<PathBuf> {
        vsearch_media::extract_clip(job, work_dir).await
    }
}
