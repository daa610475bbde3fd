//! Job lifecycle models.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::video::VideoId;

/// Unique identifier for a job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Generate a new random job ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Job processing status, polled by the submitting API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Submitted, waiting for the download worker.
    #[default]
    Queued,
    /// Download worker is fetching the source media.
    Downloading,
    /// Analysis worker is scoring candidate windows.
    Analyzing,
    /// Extraction workers are cutting and uploading clips.
    Extracting,
    /// All clips produced; terminal.
    Completed,
    /// Unrecoverable failure; terminal.
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Downloading => "downloading",
            JobStatus::Analyzing => "analyzing",
            JobStatus::Extracting => "extracting",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }

    /// `completed` and `failed` are terminal; every other state may still advance.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    /// Relative ordering used to enforce monotonic advancement (§3 invariant).
    /// `Failed` is intentionally left out: any state can transition to `Failed`.
    fn rank(&self) -> Option<u8> {
        match self {
            JobStatus::Queued => Some(0),
            JobStatus::Downloading => Some(1),
            JobStatus::Analyzing => Some(2),
            JobStatus::Extracting => Some(3),
            JobStatus::Completed => Some(4),
            JobStatus::Failed => None,
        }
    }

    /// Returns true if moving from `self` to `next` respects the monotonic
    /// lifecycle invariant (any state may transition to `Failed`).
    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        if next == JobStatus::Failed {
            return true;
        }
        match (self.rank(), next.rank()) {
            (Some(a), Some(b)) => b >= a,
            _ => false,
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Options recognized on job submission (§6).
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct JobOptions {
    /// Target top-N clip count. Authoritative over the internal `topN` constant
    /// used by the analysis worker's ranking stage (see DESIGN.md open question).
    #[serde(default = "default_clip_count")]
    pub clip_count: u32,

    /// Minimum clip duration in seconds.
    #[serde(default = "default_min_duration")]
    pub min_duration: f64,

    /// Maximum clip duration in seconds.
    #[serde(default = "default_max_duration")]
    pub max_duration: f64,

    /// Whether to auto-publish after extraction. Unused by the core pipeline.
    #[serde(default)]
    pub auto_upload: bool,

    /// Whether to burn in captions during extraction.
    #[serde(default = "default_add_subtitles")]
    pub add_subtitles: bool,
}

fn default_clip_count() -> u32 {
    5
}
fn default_min_duration() -> f64 {
    15.0
}
fn default_max_duration() -> f64 {
    60.0
}
fn default_add_subtitles() -> bool {
    true
}

impl Default for JobOptions {
    fn default() -> Self {
        Self {
            clip_count: default_clip_count(),
            min_duration: default_min_duration(),
            max_duration: default_max_duration(),
            auto_upload: false,
            add_subtitles: default_add_subtitles(),
        }
    }
}

impl JobOptions {
    /// Clamp `clip_count` into `[1, 8]`: the user-facing default is 5, but the
    /// analysis worker's internal ranking stage never selects more than the
    /// hard upper bound of 8 (see DESIGN.md open question resolution).
    pub fn top_n(&self) -> usize {
        self.clip_count.clamp(1, 8) as usize
    }

    /// Clamp `min_duration` to the accepted range (>= 10s).
    pub fn min_duration_clamped(&self) -> f64 {
        self.min_duration.max(10.0)
    }

    /// Clamp `max_duration` to the accepted range (<= 180s).
    pub fn max_duration_clamped(&self) -> f64 {
        self.max_duration.min(180.0)
    }
}

/// One submission: a source URL to transform into ranked vertical clips.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Job {
    pub id: JobId,
    pub user_id: String,
    pub source_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_id: Option<VideoId>,
    pub status: JobStatus,
    /// Progress percentage in `[0, 100]`.
    pub progress: u8,
    pub current_step: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub options: JobOptions,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

/// Maximum length of a persisted error message (§7 propagation policy).
pub const ERROR_MESSAGE_MAX_LEN: usize = 200;

impl Job {
    /// Create a new job in `queued` state.
    pub fn new(user_id: impl Into<String>, source_url: impl Into<String>, options: JobOptions) -> Self {
        let now = Utc::now();
        Self {
            id: JobId::new(),
            user_id: user_id.into(),
            source_url: source_url.into(),
            video_id: None,
            status: JobStatus::Queued,
            progress: 0,
            current_step: "Queued".to_string(),
            error_message: None,
            options,
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }

    /// Truncate an error message to the propagation policy's bound.
    pub fn truncate_error(message: &str) -> String {
        if message.chars().count() <= ERROR_MESSAGE_MAX_LEN {
            message.to_string()
        } else {
            message.chars().take(ERROR_MESSAGE_MAX_LEN).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_transitions_are_monotonic_except_failed() {
        assert!(JobStatus::Queued.can_transition_to(JobStatus::Downloading));
        assert!(JobStatus::Downloading.can_transition_to(JobStatus::Analyzing));
        assert!(!JobStatus::Analyzing.can_transition_to(JobStatus::Downloading));
        assert!(JobStatus::Analyzing.can_transition_to(JobStatus::Failed));
        assert!(!JobStatus::Completed.can_transition_to(JobStatus::Analyzing));
        assert!(!JobStatus::Failed.can_transition_to(JobStatus::Queued));
    }

    #[test]
    fn top_n_clamps_into_one_through_eight() {
        let mut opts = JobOptions::default();
        opts.clip_count = 0;
        assert_eq!(opts.top_n(), 1);
        opts.clip_count = 100;
        assert_eq!(opts.top_n(), 8);
        opts.clip_count = 5;
        assert_eq!(opts.top_n(), 5);
    }

    #[test]
    fn truncate_error_respects_bound() {
        let long = "x".repeat(500);
        let truncated = Job::truncate_error(&long);
        assert_eq!(truncated.chars().count(), ERROR_MESSAGE_MAX_LEN);
    }
}
