//! Job planning: turning a search result into ordered clip jobs.

use vsearch_models::{ClassifiedFrame, ClipJob, SearchResults, SearchType};

/// Padding applied on both sides of a matched transcript segment.
const SEGMENT_PAD_SECS: f64 = 0.5;
/// Lead-in before a matched classification timestamp.
const FRAME_LEAD_SECS: f64 = 0.5;
/// Footage taken after a matched classification timestamp.
const FRAME_TAIL_SECS: f64 = 4.5;

/// Plan extraction jobs for a query over an executed search result.
///
/// Jobs are emitted in the order their segments appear in the result set
/// (hit order, then segment/prediction order); that order is also the
/// final concatenation order. Overlapping ranges are not merged. Malformed
/// or missing fields contribute no jobs; this function never fails.
pub fn plan(query: &str, results: &SearchResults, search_type: SearchType) -> Vec<ClipJob> {
    let needle = query.to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    let mut jobs = Vec::new();
    for hit in &results.hits {
        if hit.source_path.is_empty() {
            continue;
        }
        match search_type {
            SearchType::Audio => {
                for segment in &hit.transcription.segments {
                    if segment.text.to_lowercase().contains(&needle) {
                        push_playable(
                            &mut jobs,
                            ClipJob::new(
                                &hit.source_path,
                                segment.start - SEGMENT_PAD_SECS,
                                segment.end + SEGMENT_PAD_SECS,
                                true,
                            ),
                        );
                    }
                }
            }
            SearchType::Image => {
                plan_frames(&mut jobs, &hit.source_path, &hit.classification.image, &needle);
            }
            SearchType::AudioDescription => {
                plan_frames(
                    &mut jobs,
                    &hit.source_path,
                    &hit.classification.audio_description,
                    &needle,
                );
            }
        }
    }
    jobs
}

fn plan_frames(jobs: &mut Vec<ClipJob>, source: &str, frames: &[ClassifiedFrame], needle: &str) {
    for frame in frames {
        for prediction in &frame.predictions {
            if prediction.prediction.to_lowercase().contains(needle) {
                push_playable(
                    jobs,
                    ClipJob::new(
                        source,
                        frame.timestamp - FRAME_LEAD_SECS,
                        frame.timestamp + FRAME_TAIL_SECS,
                        true,
                    ),
                );
            }
        }
    }
}

fn push_playable(jobs: &mut Vec<ClipJob>, job: ClipJob) {
    if job.is_playable() {
        jobs.push(job);
    }
}
