//! Assembly seam between the build driver and the media layer.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use vsearch_media::{concat_clips, generate_poster, AssembleConfig, MediaResult};

/// Concatenates normalized clips into the final artifact and renders the
/// poster still beside it.
#[async_trait]
pub trait SupercutAssembler: Send + Sync {
    async fn assemble(&self, clips: &[PathBuf], output: &Path) -> MediaResult<()>;
}

/// The production assembler: concat filter plus a poster frame at 1 s.
#[derive(Debug, Default)]
pub struct FfmpegAssembler {
    config: AssembleConfig,
}

impl FfmpegAssembler {
    pub fn new(config: AssembleConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl SupercutAssembler for FfmpegAssembler {
    async fn assemble(&self, clips: &[PathBuf], output: &Path) -> MediaResult<()> {
        concat_clips(clips, output, &self.config).await?;
        generate_poster(output, &output.with_extension("jpg")).await
    }
}
