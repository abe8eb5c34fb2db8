//! Clip extraction job description.

use serde::{Deserialize, Serialize};

use crate::timecode::seconds_to_timecode;

/// One unit of extraction work: cut `[start_offset, end_offset)` out of
/// `source_path`, normalise it, optionally fading the audio in and out.
///
/// Jobs are created by the planner and consumed once by the extractor.
/// Invariant: `0 <= start_offset < end_offset`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipJob {
    pub source_path: String,
    pub start_offset: f64,
    pub end_offset: f64,
    pub apply_fade: bool,
}

impl ClipJob {
    pub fn new(
        source_path: impl Into<String>,
        start_offset: f64,
        end_offset: f64,
        apply_fade: bool,
    ) -> Self {
        Self {
            source_path: source_path.into(),
            start_offset: start_offset.max(0.0),
            end_offset,
            apply_fade,
        }
    }

    /// Length of the requested range in seconds.
    pub fn duration(&self) -> f64 {
        self.end_offset - self.start_offset
    }

    /// True when the range can actually produce footage.
    pub fn is_playable(&self) -> bool {
        self.start_offset >= 0.0 && self.end_offset > self.start_offset
    }

    /// Human-readable range, for logs.
    pub fn span(&self) -> String {
        format!(
            "{}-{}",
            seconds_to_timecode(self.start_offset),
            seconds_to_timecode(self.end_offset)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_clamps_start_at_zero() {
        let job = ClipJob::new("a.mp4", -0.3, 4.5, true);
        assert_eq!(job.start_offset, 0.0);
        assert!(job.is_playable());
        assert!((job.duration() - 4.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zero_length_range_is_not_playable() {
        let job = ClipJob::new("a.mp4", 2.0, 2.0, false);
        assert!(!job.is_playable());
    }

    #[test]
    fn test_span_formatting() {
        let job = ClipJob::new("a.mp4", 8.5, 70.0, true);
        assert_eq!(job.span(), "00:00:08-00:01:10");
    }
}
