//! Shared data models for the video search backend.
//!
//! This crate provides Serde-serializable types for:
//! - Search results at the external search boundary
//! - Clip extraction jobs
//! - Supercut task state and snapshots
//! - Deterministic output filename derivation
//! - Timecode formatting

pub mod filename;
pub mod job;
pub mod search;
pub mod task;
pub mod timecode;

// Re-export common types
pub use filename::{poster_filename, slugify, supercut_filename};
pub use job::ClipJob;
pub use search::{
    sanitise_query, Classification, ClassifiedFrame, Prediction, SearchHit, SearchResults,
    SearchType, TranscriptSegment, Transcription,
};
pub use task::{TaskId, TaskSnapshot, TaskStatus};
pub use timecode::seconds_to_timecode;
