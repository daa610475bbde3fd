//! Downloaded source video models.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a video.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct VideoId(pub String);

impl VideoId {
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

impl Default for VideoId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for VideoId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for VideoId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Video processing status (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum VideoStatus {
    /// Source media has been downloaded and persisted.
    #[default]
    Downloaded,
    /// Analysis has produced Segments for this video.
    Analyzed,
    /// At least one Clip has been produced.
    Processed,
}

impl VideoStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VideoStatus::Downloaded => "downloaded",
            VideoStatus::Analyzed => "analyzed",
            VideoStatus::Processed => "processed",
        }
    }
}

impl fmt::Display for VideoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Metadata salvaged from the external download utility's companion JSON.
/// Absence of the file is tolerated; all fields default.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default)]
pub struct RawSourceMetadata {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    /// Catch-all for whatever else the downloader emits; never interpreted
    /// beyond the fields above.
    #[serde(default, flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A downloaded source video (§3).
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Video {
    pub id: VideoId,
    pub user_id: String,
    /// Platform-level identifier extracted from the source URL (e.g. a
    /// YouTube video ID). Unique across Videos.
    pub external_id: String,
    pub source_url: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Duration in whole seconds.
    pub duration: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    /// Object-store key for the raw downloaded media.
    pub storage_key: String,
    pub status: VideoStatus,
    #[serde(default)]
    pub raw_metadata: RawSourceMetadata,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Video {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_id: impl Into<String>,
        external_id: impl Into<String>,
        source_url: impl Into<String>,
        title: impl Into<String>,
        duration: i64,
        storage_key: impl Into<String>,
        raw_metadata: RawSourceMetadata,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: VideoId::new(),
            user_id: user_id.into(),
            external_id: external_id.into(),
            source_url: source_url.into(),
            title: title.into(),
            description: None,
            duration,
            thumbnail_url: None,
            storage_key: storage_key.into(),
            status: VideoStatus::Downloaded,
            raw_metadata,
            created_at: now,
            updated_at: now,
        }
    }
}
