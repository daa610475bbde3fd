//! Repository for downloaded source video records.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::info;

use vclip_models::{RawSourceMetadata, Video, VideoId, VideoStatus};

use crate::error::{StoreError, StoreResult};

#[derive(sqlx::FromRow)]
struct VideoRow {
    id: String,
    user_id: String,
    external_id: String,
    source_url: String,
    title: String,
    description: Option<String>,
    duration: i64,
    thumbnail_url: Option<String>,
    storage_key: String,
    status: String,
    raw_metadata: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn status_from_str(s: &str) -> StoreResult<VideoStatus> {
    match s {
        "downloaded" => Ok(VideoStatus::Downloaded),
        "analyzed" => Ok(VideoStatus::Analyzed),
        "processed" => Ok(VideoStatus::Processed),
        other => Err(StoreError::InvalidTransition(format!("unknown video status: {other}"))),
    }
}

fn row_to_video(row: VideoRow) -> StoreResult<Video> {
    Ok(Video {
        id: VideoId::from_string(row.id),
        user_id: row.user_id,
        external_id: row.external_id,
        source_url: row.source_url,
        title: row.title,
        description: row.description,
        duration: row.duration,
        thumbnail_url: row.thumbnail_url,
        storage_key: row.storage_key,
        status: status_from_str(&row.status)?,
        raw_metadata: serde_json::from_value(row.raw_metadata).unwrap_or_else(|_| RawSourceMetadata::default()),
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

/// Repository for Video records. The download worker's idempotency
/// guarantee (re-running a job for the same source does not duplicate the
/// downloaded video) is implemented here as an upsert keyed on `external_id`.
pub struct VideoRepository {
    pool: PgPool,
}

impl VideoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, video_id: &VideoId) -> StoreResult<Option<Video>> {
        let row: Option<VideoRow> = sqlx::query_as("SELECT * FROM videos WHERE id = $1")
            .bind(video_id.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row.map(row_to_video).transpose()
    }

    pub async fn get_by_external_id(&self, external_id: &str) -> StoreResult<Option<Video>> {
        let row: Option<VideoRow> = sqlx::query_as("SELECT * FROM videos WHERE external_id = $1")
            .bind(external_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(row_to_video).transpose()
    }

    /// Insert the video, or return the pre-existing record if one already
    /// exists for this `external_id` (download-worker idempotency, §4.3).
    pub async fn upsert(&self, video: &Video) -> StoreResult<Video> {
        if let Some(existing) = self.get_by_external_id(&video.external_id).await? {
            info!(video_id = %existing.id, external_id = %video.external_id, "video already downloaded, reusing");
            return Ok(existing);
        }

        let result = sqlx::query(
            "INSERT INTO videos (id, user_id, external_id, source_url, title, description, duration,
                thumbnail_url, storage_key, status, raw_metadata, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
             ON CONFLICT (external_id) DO NOTHING",
        )
        .bind(video.id.as_str())
        .bind(&video.user_id)
        .bind(&video.external_id)
        .bind(&video.source_url)
        .bind(&video.title)
        .bind(&video.description)
        .bind(video.duration)
        .bind(&video.thumbnail_url)
        .bind(&video.storage_key)
        .bind(video.status.as_str())
        .bind(serde_json::to_value(&video.raw_metadata)?)
        .bind(video.created_at)
        .bind(video.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            // Lost a race with a concurrent insert; fetch the winner.
            return self
                .get_by_external_id(&video.external_id)
                .await?
                .ok_or_else(|| StoreError::not_found(format!("video external_id={}", video.external_id)));
        }

        Ok(video.clone())
    }

    pub async fn update_status(&self, video_id: &VideoId, status: VideoStatus) -> StoreResult<()> {
        sqlx::query("UPDATE videos SET status = $1, updated_at = $2 WHERE id = $3")
            .bind(status.as_str())
            .bind(Utc::now())
            .bind(video_id.as_str())
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_row() -> VideoRow {
        VideoRow {
            id: "video-1".to_string(),
            user_id: "user-1".to_string(),
            external_id: "abc123".to_string(),
            source_url: "https://youtube.com/watch?v=abc123".to_string(),
            title: "Test Video".to_string(),
            description: None,
            duration: 120,
            thumbnail_url: None,
            storage_key: "raw-videos/abc123/video.mp4".to_string(),
            status: "downloaded".to_string(),
            raw_metadata: serde_json::to_value(RawSourceMetadata::default()).unwrap(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn status_from_str_accepts_every_named_status() {
        for s in ["downloaded", "analyzed", "processed"] {
            assert!(status_from_str(s).is_ok(), "expected {s} to parse");
        }
    }

    #[test]
    fn status_from_str_rejects_unknown_status() {
        assert!(status_from_str("bogus").is_err());
    }

    #[test]
    fn row_to_video_parses_status() {
        let video = row_to_video(sample_row()).unwrap();
        assert_eq!(video.status, VideoStatus::Downloaded);
        assert_eq!(video.external_id, "abc123");
    }

    #[test]
    fn row_to_video_falls_back_to_default_metadata_on_bad_json() {
        let mut row = sample_row();
        row.raw_metadata = serde_json::json!("not an object");
        let video = row_to_video(row).unwrap();
        assert_eq!(video.raw_metadata.title, None);
    }
}
