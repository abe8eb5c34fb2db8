//! Search-result types at the boundary to the external search service.
//!
//! The pipeline consumes an already-executed search result; these types
//! mirror what that service returns. Deserialization is deliberately
//! lenient: every field defaults, because a hit that is missing a section
//! simply contributes no clips. The planner must never fail on input shape.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which index field the search ran against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SearchType {
    /// Transcript text search
    #[default]
    #[serde(rename = "audio")]
    Audio,
    /// Visual classification labels
    #[serde(rename = "image")]
    Image,
    /// Audio classification labels
    #[serde(rename = "audioDescription")]
    AudioDescription,
}

impl SearchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchType::Audio => "audio",
            SearchType::Image => "image",
            SearchType::AudioDescription => "audioDescription",
        }
    }
}

impl fmt::Display for SearchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned when parsing an unknown search type token.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown search type: {0}")]
pub struct ParseSearchTypeError(pub String);

impl FromStr for SearchType {
    type Err = ParseSearchTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "audio" => Ok(SearchType::Audio),
            "image" => Ok(SearchType::Image),
            "audioDescription" => Ok(SearchType::AudioDescription),
            other => Err(ParseSearchTypeError(other.to_string())),
        }
    }
}

/// A full search result: the ordered hits for one query page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResults {
    #[serde(default)]
    pub hits: Vec<SearchHit>,
}

impl SearchResults {
    /// True when the result carries no hits at all.
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}

/// One matched video.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchHit {
    /// Playable location of the source video.
    #[serde(default)]
    pub source_path: String,
    #[serde(default)]
    pub transcription: Transcription,
    #[serde(default)]
    pub classification: Classification,
}

/// Transcript attached to a hit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Transcription {
    #[serde(default)]
    pub segments: Vec<TranscriptSegment>,
}

/// One spoken segment with its time range.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TranscriptSegment {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub start: f64,
    #[serde(default)]
    pub end: f64,
}

/// Frame-level classification attached to a hit, split by model family.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Classification {
    /// Visual labels, one entry per sampled frame.
    #[serde(default)]
    pub image: Vec<ClassifiedFrame>,
    /// Audio-scene labels.
    #[serde(default)]
    pub audio_description: Vec<ClassifiedFrame>,
}

/// Predictions for one sampled timestamp.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassifiedFrame {
    #[serde(default)]
    pub timestamp: f64,
    #[serde(default)]
    pub predictions: Vec<Prediction>,
}

/// A single predicted label with its confidence.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Prediction {
    #[serde(default)]
    pub prediction: String,
    #[serde(default)]
    pub confidence: f64,
}

/// Normalise a raw query string before searching or slug derivation.
///
/// Lowercases and strips every character outside `a-z`, `0-9`, comma,
/// apostrophe and space.
pub fn sanitise_query(input: &str) -> String {
    input
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, ',' | '\'' | ' '))
        .collect()
}
