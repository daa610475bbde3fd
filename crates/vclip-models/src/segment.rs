//! Candidate-window models produced by the analysis worker (§4.4).

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::signals::SignalScores;
use crate::video::VideoId;

/// Unique identifier for a segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct SegmentId(pub String);

impl SegmentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SegmentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Segment lifecycle state as it moves through extraction (§3, §4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum SegmentStatus {
    /// Produced by analysis, ranked, awaiting an extraction worker.
    #[default]
    Detected,
    /// An extraction worker has claimed this segment.
    Extracting,
    /// A Clip has been produced for this segment.
    Extracted,
    /// Extraction failed permanently.
    Failed,
}

impl SegmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SegmentStatus::Detected => "detected",
            SegmentStatus::Extracting => "extracting",
            SegmentStatus::Extracted => "extracted",
            SegmentStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for SegmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A ranked candidate window selected for extraction (§3, §4.4.5-4.4.7).
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Segment {
    pub id: SegmentId,
    pub video_id: VideoId,
    pub start_time: f64,
    pub end_time: f64,
    pub status: SegmentStatus,
    /// Composite virality score in `[0, 1]` (§4.4.4).
    pub composite_score: f64,
    /// Estimated YouTube-style retention curve value, informational only.
    pub yt_retention: f64,
    pub signals: SignalScores,
    /// Human-readable explanation assembled from the reason-string table (§4.4.4).
    pub reason: String,
    #[serde(default)]
    pub has_captions: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption_style: Option<String>,
    /// Serialized styled caption track, attached once extraction renders it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption_data: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Segment {
    /// Duration in seconds.
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }

    #[allow(clippy::too_many_arguments)]
    pub fn new(
        video_id: VideoId,
        start_time: f64,
        end_time: f64,
        composite_score: f64,
        yt_retention: f64,
        signals: SignalScores,
        reason: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: SegmentId::new(),
            video_id,
            start_time,
            end_time,
            status: SegmentStatus::Detected,
            composite_score,
            yt_retention,
            signals,
            reason: reason.into(),
            has_captions: false,
            caption_style: None,
            caption_data: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores() -> SignalScores {
        SignalScores {
            audio: 0.5,
            visual: 0.5,
            speech: 0.5,
            engagement: 0.5,
        }
    }

    #[test]
    fn duration_is_end_minus_start() {
        let seg = Segment::new(VideoId::new(), 10.0, 40.0, 0.7, 0.6, scores(), "test");
        assert_eq!(seg.duration(), 30.0);
    }
}
