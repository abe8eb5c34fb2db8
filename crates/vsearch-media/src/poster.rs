//! Poster still generation.

use std::path::Path;

use crate::command::{verify_output, FfmpegCommand, FfmpegRunner};
use crate::error::MediaResult;

/// Where in the video the poster frame is taken from.
pub const POSTER_TIMESTAMP: &str = "00:00:01";

/// Extract the poster frame from a finished supercut.
///
/// The frame is flattened to an opaque JPEG; any alpha from the source
/// pipeline is discarded by the pixel format conversion.
pub async fn generate_poster(
    video_path: impl AsRef<Path>,
    poster_path: impl AsRef<Path>,
) -> MediaResult<()> {
    let video_path = video_path.as_ref();
    let poster_path = poster_path.as_ref();

    let cmd = FfmpegCommand::new(poster_path)
        .seeked_input(video_path.to_string_lossy(), 1.0, 1.0)
        .single_frame()
        .pixel_format("yuvj420p");

    FfmpegRunner::new().run(&cmd).await?;
    verify_output(poster_path)?;

    Ok(())
}
