//! FFprobe video information.

use serde::Deserialize;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

use crate::error::{MediaError, MediaResult};

/// Video file information.
#[derive(Debug, Clone)]
pub struct VideoInfo {
    /// Duration in seconds
    pub duration: f64,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Video codec
    pub codec: String,
    /// Whether the file carries an audio stream
    pub has_audio: bool,
}

/// FFprobe JSON output format.
#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: FfprobeFormat,
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: String,
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
}

/// Probe a video source for information.
///
/// `source` may be a local path or a URL FFmpeg can read.
pub async fn probe_video(source: &str) -> MediaResult<VideoInfo> {
    if !is_remote(source) && !Path::new(source).exists() {
        return Err(MediaError::FileNotFound(source.into()));
    }

    which::which("ffprobe").map_err(|_| MediaError::FfprobeNotFound)?;

    let output = Command::new("ffprobe")
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(source)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await?;

    if !output.status.success() {
        return Err(MediaError::FfprobeFailed {
            message: format!("FFprobe failed for {}", source),
            stderr: Some(String::from_utf8_lossy(&output.stderr).to_string()),
        });
    }

    let probe: FfprobeOutput = serde_json::from_slice(&output.stdout)?;

    let video_stream = probe
        .streams
        .iter()
        .find(|s| s.codec_type == "video")
        .ok_or_else(|| MediaError::InvalidVideo(format!("no video stream in {}", source)))?;

    let duration = probe
        .format
        .duration
        .as_ref()
        .and_then(|d| d.parse::<f64>().ok())
        .unwrap_or(0.0);

    let has_audio = probe.streams.iter().any(|s| s.codec_type == "audio");

    Ok(VideoInfo {
        duration,
        width: video_stream.width.unwrap_or(0),
        height: video_stream.height.unwrap_or(0),
        codec: video_stream.codec_name.clone().unwrap_or_default(),
        has_audio,
    })
}

fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_remote() {
        assert!(is_remote("https://cdn.example.org/v.mp4"));
        assert!(is_remote("http://cdn.example.org/v.mp4"));
        assert!(!is_remote("/data/videos/v.mp4"));
        assert!(!is_remote("relative/v.mp4"));
    }

    #[tokio::test]
    async fn test_probe_missing_local_file() {
        let err = probe_video("/nonexistent/video.mp4").await.unwrap_err();
        assert!(matches!(err, MediaError::FileNotFound(_)));
    }

    #[test]
    fn test_probe_output_parsing() {
        let json = r#"{
            "format": {"duration": "12.5"},
            "streams": [
                {"codec_type": "video", "codec_name": "h264", "width": 1920, "height": 1080},
                {"codec_type": "audio", "codec_name": "aac"}
            ]
        }"#;
        let probe: FfprobeOutput = serde_json::from_str(json).unwrap();
        assert_eq!(probe.streams.len(), 2);
        assert_eq!(probe.format.duration.as_deref(), Some("12.5"));
    }
}
