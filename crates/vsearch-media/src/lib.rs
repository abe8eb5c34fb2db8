//! FFmpeg CLI wrapper for the supercut pipeline.
//!
//! All media work runs in external `ffmpeg`/`ffprobe` child processes;
//! this crate builds their command lines, runs them, and checks results.

pub mod assemble;
pub mod command;
pub mod error;
pub mod extract;
pub mod poster;
pub mod probe;

pub use assemble::{build_concat_command, concat_clips, AssembleConfig};
pub use command::{check_ffmpeg, check_ffprobe, FfmpegCommand, FfmpegRunner};
pub use error::{MediaError, MediaResult};
pub use extract::{
    build_extract_command, extract_clip, AUDIO_FADE_SECS, AUDIO_SAMPLE_RATE, OUTPUT_HEIGHT,
    OUTPUT_WIDTH,
};
pub use poster::generate_poster;
pub use probe::{probe_video, VideoInfo};
