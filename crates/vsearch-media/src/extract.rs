//! Clip extraction and normalization.
//!
//! Every extracted clip is re-encoded to the same frame geometry so the
//! assembler can concatenate freely: fitted inside 1280x720 preserving
//! aspect ratio, centered over an opaque black background, square pixels,
//! 48 kHz stereo audio. Sources without an audio stream get a silent bed
//! so the concat graph sees a uniform stream layout.

use std::path::{Path, PathBuf};
use tracing::info;
use uuid::Uuid;

use vsearch_models::ClipJob;

use crate::command::{verify_output, FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};
use crate::probe::{probe_video, VideoInfo};

/// Output frame width for every normalized clip.
pub const OUTPUT_WIDTH: u32 = 1280;
/// Output frame height for every normalized clip.
pub const OUTPUT_HEIGHT: u32 = 720;
/// Audio fade-in/fade-out length in seconds.
pub const AUDIO_FADE_SECS: f64 = 0.5;
/// Audio sample rate for every normalized clip.
pub const AUDIO_SAMPLE_RATE: u32 = 48_000;

/// Extract one job into a normalized temporary clip under `work_dir`.
///
/// Fails on a missing source, an unplayable range, a decode error, or an
/// empty encode result. The returned path is owned by the caller.
pub async fn extract_clip(job: &ClipJob, work_dir: &Path) -> MediaResult<PathBuf> {
    if !job.is_playable() {
        return Err(MediaError::EmptyRange {
            start: job.start_offset,
            end: job.end_offset,
        });
    }

    let info = probe_video(&job.source_path).await?;
    let output = work_dir.join(format!("clip_{}.mp4", Uuid::new_v4()));

    info!(
        source = %job.source_path,
        span = %job.span(),
        fade = job.apply_fade,
        "Extracting clip"
    );

    let cmd = build_extract_command(job, &info, &output);
    FfmpegRunner::new().run(&cmd).await?;
    verify_output(&output)?;

    Ok(output)
}

/// Build the normalization command for one job.
///
/// Resize semantics: fit the frame inside the target box preserving aspect
/// ratio (height-constrained, then width-constrained when still too wide),
/// then pad centered on black to exactly the target resolution.
pub fn build_extract_command(job: &ClipJob, info: &VideoInfo, output: &Path) -> FfmpegCommand {
    let duration = job.duration();
    let scale = format!(
        "scale={w}:{h}:force_original_aspect_ratio=decrease:force_divisible_by=2,\
         pad={w}:{h}:(ow-iw)/2:(oh-ih)/2:color=black,setsar=1",
        w = OUTPUT_WIDTH,
        h = OUTPUT_HEIGHT
    );

    let mut cmd = FfmpegCommand::new(output)
        .seeked_input(&job.source_path, job.start_offset, duration)
        .video_filter(scale);

    if info.has_audio {
        if job.apply_fade {
            let fade_out_start = (duration - AUDIO_FADE_SECS).max(0.0);
            cmd = cmd.audio_filter(format!(
                "afade=t=in:st=0:d={fade},afade=t=out:st={start:.3}:d={fade}",
                fade = AUDIO_FADE_SECS,
                start = fade_out_start
            ));
        }
    } else {
        // Silent stereo bed; -shortest trims it to the video length.
        cmd = cmd
            .lavfi_input(
                format!(
                    "anullsrc=channel_layout=stereo:sample_rate={}",
                    AUDIO_SAMPLE_RATE
                ),
                duration,
            )
            .map("0:v")
            .map("1:a")
            .shortest();
    }

    cmd.video_codec("libx264")
        .preset("veryfast")
        .audio_codec("aac")
        .audio_rate(AUDIO_SAMPLE_RATE)
        .audio_channels(2)
}
