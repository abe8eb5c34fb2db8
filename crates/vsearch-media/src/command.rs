//! FFmpeg command builder and runner.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

use crate::error::{MediaError, MediaResult};

/// How much FFmpeg stderr to keep on failure.
const STDERR_TAIL_BYTES: usize = 2048;

#[derive(Debug, Clone)]
struct Input {
    /// Arguments placed before this input's `-i`
    args: Vec<String>,
    /// The input source (a path, URL, or lavfi graph)
    source: String,
}

/// Builder for FFmpeg commands with any number of inputs.
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    inputs: Vec<Input>,
    /// Output file path
    output: PathBuf,
    /// Output arguments (after the inputs)
    output_args: Vec<String>,
    /// Whether to overwrite output
    overwrite: bool,
    /// Log level
    log_level: String,
}

impl FfmpegCommand {
    /// Create a new FFmpeg command writing to `output`.
    pub fn new(output: impl AsRef<Path>) -> Self {
        Self {
            inputs: Vec::new(),
            output: output.as_ref().to_path_buf(),
            output_args: Vec::new(),
            overwrite: true,
            log_level: "error".to_string(),
        }
    }

    /// Add a plain input.
    pub fn input(mut self, source: impl Into<String>) -> Self {
        self.inputs.push(Input {
            args: Vec::new(),
            source: source.into(),
        });
        self
    }

    /// Add an input cut to `[start, start + duration)` via input-side seek.
    pub fn seeked_input(mut self, source: impl Into<String>, start: f64, duration: f64) -> Self {
        self.inputs.push(Input {
            args: vec![
                "-ss".to_string(),
                format!("{:.3}", start),
                "-t".to_string(),
                format!("{:.3}", duration),
            ],
            source: source.into(),
        });
        self
    }

    /// Add a synthetic lavfi input (e.g. `anullsrc=...`), bounded to `duration`.
    pub fn lavfi_input(mut self, graph: impl Into<String>, duration: f64) -> Self {
        self.inputs.push(Input {
            args: vec![
                "-f".to_string(),
                "lavfi".to_string(),
                "-t".to_string(),
                format!("{:.3}", duration),
            ],
            source: graph.into(),
        });
        self
    }

    /// Add an output argument.
    pub fn output_arg(mut self, arg: impl Into<String>) -> Self {
        self.output_args.push(arg.into());
        self
    }

    /// Add multiple output arguments.
    pub fn output_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.output_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set video filter.
    pub fn video_filter(self, filter: impl Into<String>) -> Self {
        self.output_arg("-vf").output_arg(filter)
    }

    /// Set audio filter.
    pub fn audio_filter(self, filter: impl Into<String>) -> Self {
        self.output_arg("-af").output_arg(filter)
    }

    /// Set filter complex.
    pub fn filter_complex(self, filter: impl Into<String>) -> Self {
        self.output_arg("-filter_complex").output_arg(filter)
    }

    /// Map a stream or filter label into the output.
    pub fn map(self, specifier: impl Into<String>) -> Self {
        self.output_arg("-map").output_arg(specifier)
    }

    /// Set video codec.
    pub fn video_codec(self, codec: impl Into<String>) -> Self {
        self.output_arg("-c:v").output_arg(codec)
    }

    /// Set audio codec.
    pub fn audio_codec(self, codec: impl Into<String>) -> Self {
        self.output_arg("-c:a").output_arg(codec)
    }

    /// Set preset.
    pub fn preset(self, preset: impl Into<String>) -> Self {
        self.output_arg("-preset").output_arg(preset)
    }

    /// Set audio sample rate.
    pub fn audio_rate(self, hz: u32) -> Self {
        self.output_arg("-ar").output_arg(hz.to_string())
    }

    /// Set audio channel count.
    pub fn audio_channels(self, channels: u32) -> Self {
        self.output_arg("-ac").output_arg(channels.to_string())
    }

    /// End the output at the shortest input.
    pub fn shortest(self) -> Self {
        self.output_arg("-shortest")
    }

    /// Emit a single frame.
    pub fn single_frame(self) -> Self {
        self.output_arg("-frames:v").output_arg("1")
    }

    /// Set output pixel format.
    pub fn pixel_format(self, format: impl Into<String>) -> Self {
        self.output_arg("-pix_fmt").output_arg(format)
    }

    /// Set log level.
    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Build the command arguments.
    pub fn build_args(&self) -> Vec<String> {
        let mut args = Vec::new();

        if self.overwrite {
            args.push("-y".to_string());
        }

        args.push("-v".to_string());
        args.push(self.log_level.clone());

        for input in &self.inputs {
            args.extend(input.args.clone());
            args.push("-i".to_string());
            args.push(input.source.clone());
        }

        args.extend(self.output_args.clone());
        args.push(self.output.to_string_lossy().to_string());

        args
    }
}

/// Runner for FFmpeg commands.
///
/// Each run spawns one `ffmpeg` child process; the codec engine never
/// shares an address space with sibling extractions. `kill_on_drop`
/// reaps the child if the calling future is dropped mid-encode.
#[derive(Debug, Default)]
pub struct FfmpegRunner;

impl FfmpegRunner {
    /// Create a new runner.
    pub fn new() -> Self {
        Self
    }

    /// Run an FFmpeg command to completion.
    pub async fn run(&self, cmd: &FfmpegCommand) -> MediaResult<()> {
        which::which("ffmpeg").map_err(|_| MediaError::FfmpegNotFound)?;

        let args = cmd.build_args();
        debug!("Running FFmpeg: ffmpeg {}", args.join(" "));

        let output = Command::new("ffmpeg")
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await?;

        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let tail_start = stderr.len().saturating_sub(STDERR_TAIL_BYTES);
            Err(MediaError::ffmpeg_failed(
                "FFmpeg exited with non-zero status",
                Some(stderr[tail_start..].to_string()),
                output.status.code(),
            ))
        }
    }
}

/// Check that the output file exists and is not empty.
pub(crate) fn verify_output(path: &Path) -> MediaResult<()> {
    match std::fs::metadata(path) {
        Ok(meta) if meta.len() > 0 => Ok(()),
        Ok(_) => Err(MediaError::EmptyOutput(path.to_path_buf())),
        Err(_) => Err(MediaError::EmptyOutput(path.to_path_buf())),
    }
}

/// Check if FFmpeg is available.
pub fn check_ffmpeg() -> MediaResult<PathBuf> {
    which::which("ffmpeg").map_err(|_| MediaError::FfmpegNotFound)
}

/// Check if FFprobe is available.
pub fn check_ffprobe() -> MediaResult<PathBuf> {
    which::which("ffprobe").map_err(|_| MediaError::FfprobeNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_input_args() {
        let cmd = FfmpegCommand::new("out.mp4")
            .seeked_input("in.mp4", 10.0, 30.0)
            .video_codec("libx264")
            .preset("veryfast");

        let args = cmd.build_args();
        assert_eq!(args[0], "-y");
        let ss = args.iter().position(|a| a == "-ss").unwrap();
        assert_eq!(args[ss + 1], "10.000");
        let t = args.iter().position(|a| a == "-t").unwrap();
        assert_eq!(args[t + 1], "30.000");
        assert!(args.contains(&"libx264".to_string()));
        assert_eq!(args.last().unwrap(), "out.mp4");
    }

    #[test]
    fn test_input_order_is_preserved() {
        let cmd = FfmpegCommand::new("out.mp4")
            .input("a.mp4")
            .input("b.mp4")
            .input("c.mp4");

        let args = cmd.build_args();
        let sources: Vec<String> = args
            .iter()
            .enumerate()
            .filter(|(i, _)| *i > 0 && args[i - 1] == "-i")
            .map(|(_, a)| a.clone())
            .collect();
        assert_eq!(sources, ["a.mp4", "b.mp4", "c.mp4"]);
    }

    #[test]
    fn test_lavfi_input_is_bounded() {
        let cmd = FfmpegCommand::new("out.mp4")
            .input("in.mp4")
            .lavfi_input("anullsrc=channel_layout=stereo:sample_rate=48000", 2.5);

        let args = cmd.build_args();
        let lavfi = args.iter().position(|a| a == "lavfi").unwrap();
        assert_eq!(args[lavfi - 1], "-f");
        assert_eq!(args[lavfi + 1], "-t");
        assert_eq!(args[lavfi + 2], "2.500");
    }

    #[test]
    fn test_verify_output_rejects_missing_and_empty() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.mp4");
        assert!(verify_output(&missing).is_err());

        let empty = dir.path().join("empty.mp4");
        std::fs::write(&empty, b"").unwrap();
        assert!(verify_output(&empty).is_err());

        let full = dir.path().join("full.mp4");
        std::fs::write(&full, b"data").unwrap();
        assert!(verify_output(&full).is_ok());
    }
}
