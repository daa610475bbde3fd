//! Repository for job records.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::info;

use vclip_models::{Job, JobId, JobStatus, VideoId};

use crate::error::{StoreError, StoreResult};

#[derive(sqlx::FromRow)]
struct JobRow {
    id: String,
    user_id: String,
    source_url: String,
    video_id: Option<String>,
    status: String,
    progress: i16,
    current_step: String,
    error_message: Option<String>,
    options: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

fn status_from_str(s: &str) -> StoreResult<JobStatus> {
    match s {
        "queued" => Ok(JobStatus::Queued),
        "downloading" => Ok(JobStatus::Downloading),
        "analyzing" => Ok(JobStatus::Analyzing),
        "extracting" => Ok(JobStatus::Extracting),
        "completed" => Ok(JobStatus::Completed),
        "failed" => Ok(JobStatus::Failed),
        other => Err(StoreError::InvalidTransition(format!("unknown job status: {other}"))),
    }
}

fn row_to_job(row: JobRow) -> StoreResult<Job> {
    Ok(Job {
        id: JobId::from_string(row.id),
        user_id: row.user_id,
        source_url: row.source_url,
        video_id: row.video_id.map(VideoId::from_string),
        status: status_from_str(&row.status)?,
        progress: row.progress as u8,
        current_step: row.current_step,
        error_message: row.error_message,
        options: serde_json::from_value(row.options)?,
        created_at: row.created_at,
        updated_at: row.updated_at,
        completed_at: row.completed_at,
    })
}

/// Repository for job lifecycle records.
pub struct JobRepository {
    pool: PgPool,
}

impl JobRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, job: &Job) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO jobs (id, user_id, source_url, video_id, status, progress, current_step,
                error_message, options, created_at, updated_at, completed_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
        )
        .bind(job.id.as_str())
        .bind(&job.user_id)
        .bind(&job.source_url)
        .bind(job.video_id.as_ref().map(|v| v.as_str()))
        .bind(job.status.as_str())
        .bind(job.progress as i16)
        .bind(&job.current_step)
        .bind(&job.error_message)
        .bind(serde_json::to_value(&job.options)?)
        .bind(job.created_at)
        .bind(job.updated_at)
        .bind(job.completed_at)
        .execute(&self.pool)
        .await?;

        info!(job_id = %job.id, "created job record");
        Ok(())
    }

    pub async fn get(&self, job_id: &JobId) -> StoreResult<Option<Job>> {
        let row: Option<JobRow> = sqlx::query_as("SELECT * FROM jobs WHERE id = $1")
            .bind(job_id.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row.map(row_to_job).transpose()
    }

    /// Update status, progress, and current step together (the common
    /// per-stage progress update).
    pub async fn update_progress(
        &self,
        job_id: &JobId,
        status: JobStatus,
        progress: u8,
        current_step: impl Into<String>,
    ) -> StoreResult<()> {
        sqlx::query(
            "UPDATE jobs SET status = $1, progress = $2, current_step = $3, updated_at = $4
             WHERE id = $5",
        )
        .bind(status.as_str())
        .bind(progress as i16)
        .bind(current_step.into())
        .bind(Utc::now())
        .bind(job_id.as_str())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn set_video_id(&self, job_id: &JobId, video_id: &VideoId) -> StoreResult<()> {
        sqlx::query("UPDATE jobs SET video_id = $1, updated_at = $2 WHERE id = $3")
            .bind(video_id.as_str())
            .bind(Utc::now())
            .bind(job_id.as_str())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn mark_completed(&self, job_id: &JobId) -> StoreResult<()> {
        let now = Utc::now();
        sqlx::query(
            "UPDATE jobs SET status = $1, progress = 100, current_step = 'Completed',
                updated_at = $2, completed_at = $3 WHERE id = $4",
        )
        .bind(JobStatus::Completed.as_str())
        .bind(now)
        .bind(now)
        .bind(job_id.as_str())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Mark failed, truncating the error message to the propagation bound.
    pub async fn mark_failed(&self, job_id: &JobId, error: &str) -> StoreResult<()> {
        let truncated = Job::truncate_error(error);
        sqlx::query(
            "UPDATE jobs SET status = $1, error_message = $2, updated_at = $3 WHERE id = $4",
        )
        .bind(JobStatus::Failed.as_str())
        .bind(truncated)
        .bind(Utc::now())
        .bind(job_id.as_str())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vclip_models::JobOptions;

    fn sample_row() -> JobRow {
        JobRow {
            id: "job-1".to_string(),
            user_id: "user-1".to_string(),
            source_url: "https://youtube.com/watch?v=abc".to_string(),
            video_id: None,
            status: "downloading".to_string(),
            progress: 10,
            current_step: "Starting download".to_string(),
            error_message: None,
            options: serde_json::to_value(JobOptions::default()).unwrap(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            completed_at: None,
        }
    }

    #[test]
    fn status_from_str_accepts_every_named_status() {
        for s in ["queued", "downloading", "analyzing", "extracting", "completed", "failed"] {
            assert!(status_from_str(s).is_ok(), "expected {s} to parse");
        }
    }

    #[test]
    fn status_from_str_rejects_unknown_status() {
        assert!(status_from_str("bogus").is_err());
    }

    #[test]
    fn row_to_job_parses_status_and_options() {
        let job = row_to_job(sample_row()).unwrap();
        assert_eq!(job.status, JobStatus::Downloading);
        assert_eq!(job.progress, 10);
        assert_eq!(job.options.clip_count, 5);
    }

    #[test]
    fn row_to_job_rejects_unknown_status() {
        let mut row = sample_row();
        row.status = "bogus".to_string();
        assert!(row_to_job(row).is_err());
    }
}
