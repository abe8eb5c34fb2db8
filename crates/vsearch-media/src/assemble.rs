//! Supercut assembly: ordered concatenation of normalized clips.

use std::path::{Path, PathBuf};
use tracing::info;

use crate::command::{verify_output, FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};

/// Final-encode settings.
///
/// The platform default mirrors where the deployment actually runs:
/// VideoToolbox when a Mac GPU is available, software x264 everywhere else.
#[derive(Debug, Clone)]
pub struct AssembleConfig {
    /// Video codec for the final encode
    pub codec: String,
    /// Encoder preset (x264-style encoders only)
    pub preset: Option<String>,
}

impl Default for AssembleConfig {
    fn default() -> Self {
        if cfg!(target_os = "macos") {
            Self {
                codec: "h264_videotoolbox".to_string(),
                preset: None,
            }
        } else {
            Self {
                codec: "libx264".to_string(),
                preset: Some("veryfast".to_string()),
            }
        }
    }
}

/// Build the concatenation command for an ordered clip list.
///
/// Uses the `concat` filter rather than the stream-copy demuxer: every
/// input is decoded and re-encoded, which tolerates small per-clip encoding
/// differences at the cost of speed.
pub fn build_concat_command(
    clips: &[PathBuf],
    output: &Path,
    config: &AssembleConfig,
) -> FfmpegCommand {
    let mut cmd = FfmpegCommand::new(output);
    for clip in clips {
        cmd = cmd.input(clip.to_string_lossy());
    }

    let mut graph = String::new();
    for i in 0..clips.len() {
        graph.push_str(&format!("[{i}:v][{i}:a]"));
    }
    graph.push_str(&format!("concat=n={}:v=1:a=1[v][a]", clips.len()));

    cmd = cmd
        .filter_complex(graph)
        .map("[v]")
        .map("[a]")
        .video_codec(&config.codec);

    if let Some(preset) = &config.preset {
        cmd = cmd.preset(preset);
    }

    cmd.audio_codec("aac")
}

/// Concatenate `clips` in order into `output`.
pub async fn concat_clips(
    clips: &[PathBuf],
    output: &Path,
    config: &AssembleConfig,
) -> MediaResult<()> {
    if clips.is_empty() {
        return Err(MediaError::InvalidVideo(
            "cannot concatenate zero clips".to_string(),
        ));
    }

    if let Some(parent) = output.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    info!(
        clips = clips.len(),
        output = %output.display(),
        codec = %config.codec,
        "Concatenating clips"
    );

    let cmd = build_concat_command(clips, output, config);
    FfmpegRunner::new().run(&cmd).await?;
    verify_output(output)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn x264() -> AssembleConfig {
        AssembleConfig {
            codec: "libx264".to_string(),
            preset: Some("veryfast".to_string()),
        }
    }

    #[test]
    fn test_concat_graph_covers_every_input_in_order() {
        let clips = vec![
            PathBuf::from("a.mp4"),
            PathBuf::from("b.mp4"),
            PathBuf::from("c.mp4"),
        ];
        let args = build_concat_command(&clips, Path::new("out.mp4"), &x264()).build_args();

        let fc = args.iter().position(|a| a == "-filter_complex").unwrap();
        assert_eq!(
            args[fc + 1],
            "[0:v][0:a][1:v][1:a][2:v][2:a]concat=n=3:v=1:a=1[v][a]"
        );

        let sources: Vec<String> = args
            .iter()
            .enumerate()
            .filter(|(i, _)| *i > 0 && args[i - 1] == "-i")
            .map(|(_, a)| a.clone())
            .collect();
        assert_eq!(sources, ["a.mp4", "b.mp4", "c.mp4"]);
    }

    #[test]
    fn test_mapped_streams_and_codec() {
        let clips = vec![PathBuf::from("a.mp4")];
        let args = build_concat_command(&clips, Path::new("out.mp4"), &x264()).build_args();
        assert!(args.contains(&"[v]".to_string()));
        assert!(args.contains(&"[a]".to_string()));
        assert!(args.contains(&"libx264".to_string()));
        assert!(args.contains(&"veryfast".to_string()));
    }

    #[test]
    fn test_preset_omitted_when_unset() {
        let clips = vec![PathBuf::from("a.mp4")];
        let config = AssembleConfig {
            codec: "h264_videotoolbox".to_string(),
            preset: None,
        };
        let args = build_concat_command(&clips, Path::new("out.mp4"), &config).build_args();
        assert!(!args.contains(&"-preset".to_string()));
        assert!(args.contains(&"h264_videotoolbox".to_string()));
    }

    #[tokio::test]
    async fn test_concat_rejects_empty_list() {
        let err = concat_clips(&[], Path::new("out.mp4"), &x264())
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::InvalidVideo(_)));
    }
}
