//! Job payload types carried on the queue.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use vclip_models::{JobId, SegmentId, VideoId};

/// Download worker task: fetch source media for a job (§4.3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadTask {
    pub job_id: JobId,
    pub user_id: String,
    pub source_url: String,
    pub created_at: DateTime<Utc>,
}

impl DownloadTask {
    pub fn new(job_id: JobId, user_id: impl Into<String>, source_url: impl Into<String>) -> Self {
        Self {
            job_id,
            user_id: user_id.into(),
            source_url: source_url.into(),
            created_at: Utc::now(),
        }
    }

    /// One in-flight download per job; re-enqueuing the same job is a no-op.
    pub fn idempotency_key(&self) -> String {
        format!("download:{}", self.job_id)
    }
}

/// Analysis worker task: score candidate windows for a downloaded video (§4.4).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisTask {
    pub job_id: JobId,
    pub video_id: VideoId,
    pub created_at: DateTime<Utc>,
}

impl AnalysisTask {
    pub fn new(job_id: JobId, video_id: VideoId) -> Self {
        Self {
            job_id,
            video_id,
            created_at: Utc::now(),
        }
    }

    pub fn idempotency_key(&self) -> String {
        format!("analysis:{}", self.video_id)
    }
}

/// Extraction worker task: cut, caption, and upload one ranked segment (§4.5).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionTask {
    pub job_id: JobId,
    pub video_id: VideoId,
    pub segment_id: SegmentId,
    pub start_time: f64,
    pub end_time: f64,
    pub created_at: DateTime<Utc>,
}

impl ExtractionTask {
    pub fn new(job_id: JobId, video_id: VideoId, segment_id: SegmentId, start_time: f64, end_time: f64) -> Self {
        Self {
            job_id,
            video_id,
            segment_id,
            start_time,
            end_time,
            created_at: Utc::now(),
        }
    }

    /// One clip per segment; re-enqueuing the same segment is a no-op.
    pub fn idempotency_key(&self) -> String {
        format!("extraction:{}", self.segment_id)
    }
}

/// Tagged union of every task the queue carries, dispatched by queue name.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QueueJob {
    Download(DownloadTask),
    Analysis(AnalysisTask),
    Extraction(ExtractionTask),
}

impl QueueJob {
    pub fn job_id(&self) -> &JobId {
        match self {
            QueueJob::Download(t) => &t.job_id,
            QueueJob::Analysis(t) => &t.job_id,
            QueueJob::Extraction(t) => &t.job_id,
        }
    }

    pub fn idempotency_key(&self) -> String {
        match self {
            QueueJob::Download(t) => t.idempotency_key(),
            QueueJob::Analysis(t) => t.idempotency_key(),
            QueueJob::Extraction(t) => t.idempotency_key(),
        }
    }

    pub fn queue_name(&self) -> QueueName {
        match self {
            QueueJob::Download(_) => QueueName::Download,
            QueueJob::Analysis(_) => QueueName::Analysis,
            QueueJob::Extraction(_) => QueueName::Extraction,
        }
    }
}

/// The four named queues (§4.1). `Upload` is declared but never produced by
/// this pipeline; it is kept as the stable contract surface for a future
/// publishing collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueueName {
    Download,
    Analysis,
    Extraction,
    Upload,
}

impl QueueName {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueueName::Download => "download",
            QueueName::Analysis => "analysis",
            QueueName::Extraction => "extraction",
            QueueName::Upload => "upload",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_job_round_trips_through_json() {
        let task = DownloadTask::new(JobId::new(), "user-1", "https://youtube.com/watch?v=abc");
        let job = QueueJob::Download(task);
        let payload = serde_json::to_string(&job).unwrap();
        let parsed: QueueJob = serde_json::from_str(&payload).unwrap();
        assert_eq!(parsed.job_id(), job.job_id());
        assert_eq!(parsed.queue_name(), job.queue_name());
    }
}
