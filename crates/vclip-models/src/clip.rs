//! Produced vertical clip models (§3, §4.5).

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::segment::SegmentId;
use crate::video::VideoId;

/// Unique identifier for a clip.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct ClipId(pub String);

impl ClipId {
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

impl Default for ClipId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ClipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Clip lifecycle status (§3). Publishing/review stages are tracked for
/// completeness but driven by collaborators outside this pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum ClipStatus {
    #[default]
    ReadyForReview,
    Approved,
    Rejected,
    Uploading,
    Published,
}

impl ClipStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClipStatus::ReadyForReview => "ready_for_review",
            ClipStatus::Approved => "approved",
            ClipStatus::Rejected => "rejected",
            ClipStatus::Uploading => "uploading",
            ClipStatus::Published => "published",
        }
    }
}

impl fmt::Display for ClipStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A rendered 9:16 vertical clip with burned-in captions (§3).
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Clip {
    pub id: ClipId,
    /// The segment this clip was extracted from. Unique: at most one Clip
    /// per Segment (§4.5 idempotency rule).
    pub segment_id: SegmentId,
    pub video_id: VideoId,
    /// Object-store key for the rendered vertical video.
    pub storage_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_key: Option<String>,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub status: ClipStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Clip {
    pub fn new(
        segment_id: SegmentId,
        video_id: VideoId,
        storage_key: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: ClipId::new(),
            segment_id,
            video_id,
            storage_key: storage_key.into(),
            thumbnail_key: None,
            title: title.into(),
            description: None,
            tags: Vec::new(),
            status: ClipStatus::ReadyForReview,
            created_at: now,
            updated_at: now,
        }
    }
}
