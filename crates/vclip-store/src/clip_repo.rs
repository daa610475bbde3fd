//! Repository for produced clip records.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::info;

use vclip_models::{Clip, ClipId, ClipStatus, SegmentId, VideoId};

use crate::error::{StoreError, StoreResult};

#[derive(sqlx::FromRow)]
struct ClipRow {
    id: String,
    segment_id: String,
    video_id: String,
    storage_key: String,
    thumbnail_key: Option<String>,
    title: String,
    description: Option<String>,
    tags: serde_json::Value,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn status_from_str(s: &str) -> StoreResult<ClipStatus> {
    match s {
        "ready_for_review" => Ok(ClipStatus::ReadyForReview),
        "approved" => Ok(ClipStatus::Approved),
        "rejected" => Ok(ClipStatus::Rejected),
        "uploading" => Ok(ClipStatus::Uploading),
        "published" => Ok(ClipStatus::Published),
        other => Err(StoreError::InvalidTransition(format!("unknown clip status: {other}"))),
    }
}

fn row_to_clip(row: ClipRow) -> StoreResult<Clip> {
    Ok(Clip {
        id: ClipId::from_string(row.id),
        segment_id: SegmentId::from_string(row.segment_id),
        video_id: VideoId::from_string(row.video_id),
        storage_key: row.storage_key,
        thumbnail_key: row.thumbnail_key,
        title: row.title,
        description: row.description,
        tags: serde_json::from_value(row.tags).unwrap_or_default(),
        status: status_from_str(&row.status)?,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

/// Repository for Clip records. `segment_id` carries a unique constraint, so
/// a duplicate extraction attempt for the same segment surfaces as a unique
/// violation that callers treat as an idempotent success (§4.5 idempotency
/// rule: at most one Clip per Segment).
pub struct ClipRepository {
    pool: PgPool,
}

impl ClipRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, clip: &Clip) -> StoreResult<()> {
        let result = sqlx::query(
            "INSERT INTO clips (id, segment_id, video_id, storage_key, thumbnail_key, title,
                description, tags, status, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
        )
        .bind(clip.id.as_str())
        .bind(clip.segment_id.as_str())
        .bind(clip.video_id.as_str())
        .bind(&clip.storage_key)
        .bind(&clip.thumbnail_key)
        .bind(&clip.title)
        .bind(&clip.description)
        .bind(serde_json::to_value(&clip.tags)?)
        .bind(clip.status.as_str())
        .bind(clip.created_at)
        .bind(clip.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => {
                info!(clip_id = %clip.id, segment_id = %clip.segment_id, "created clip record");
                Ok(())
            }
            Err(e) => {
                let store_err: StoreError = e.into();
                if store_err.is_unique_violation() {
                    info!(segment_id = %clip.segment_id, "clip already exists for segment, treating as success");
                    Ok(())
                } else {
                    Err(store_err)
                }
            }
        }
    }

    pub async fn get_by_segment(&self, segment_id: &SegmentId) -> StoreResult<Option<Clip>> {
        let row: Option<ClipRow> = sqlx::query_as("SELECT * FROM clips WHERE segment_id = $1")
            .bind(segment_id.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row.map(row_to_clip).transpose()
    }

    pub async fn list_for_video(&self, video_id: &VideoId) -> StoreResult<Vec<Clip>> {
        let rows: Vec<ClipRow> =
            sqlx::query_as("SELECT * FROM clips WHERE video_id = $1 ORDER BY created_at ASC")
                .bind(video_id.as_str())
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter().map(row_to_clip).collect()
    }

    /// Count of clips for a video, used by the extraction worker's
    /// job-completion aggregation (§4.5 step 9).
    pub async fn count_clips(&self, video_id: &VideoId) -> StoreResult<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM clips WHERE video_id = $1")
            .bind(video_id.as_str())
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_row() -> ClipRow {
        ClipRow {
            id: "clip-1".to_string(),
            segment_id: "segment-1".to_string(),
            video_id: "video-1".to_string(),
            storage_key: "processed-shorts/video-1/clip-1.mp4".to_string(),
            thumbnail_key: Some("processed-shorts/video-1/clip-1.jpg".to_string()),
            title: "Test Clip".to_string(),
            description: None,
            tags: serde_json::to_value(Vec::<String>::new()).unwrap(),
            status: "ready_for_review".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn status_from_str_accepts_every_named_status() {
        for s in ["ready_for_review", "approved", "rejected", "uploading", "published"] {
            assert!(status_from_str(s).is_ok(), "expected {s} to parse");
        }
    }

    #[test]
    fn status_from_str_rejects_unknown_status() {
        assert!(status_from_str("bogus").is_err());
    }

    #[test]
    fn row_to_clip_parses_status_and_thumbnail() {
        let clip = row_to_clip(sample_row()).unwrap();
        assert_eq!(clip.status, ClipStatus::ReadyForReview);
        assert_eq!(clip.thumbnail_key.as_deref(), Some("processed-shorts/video-1/clip-1.jpg"));
    }

    #[test]
    fn row_to_clip_rejects_unknown_status() {
        let mut row = sample_row();
        row.status = "bogus".to_string();
        assert!(row_to_clip(row).is_err());
    }
}
