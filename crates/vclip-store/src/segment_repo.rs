//! Repository for analysis-produced segment records.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use vclip_models::{Segment, SegmentId, SegmentStatus, SignalScores, VideoId};

use crate::error::{StoreError, StoreResult};

#[derive(sqlx::FromRow)]
struct SegmentRow {
    id: String,
    video_id: String,
    start_time: f64,
    end_time: f64,
    status: String,
    composite_score: f64,
    yt_retention: f64,
    signals: serde_json::Value,
    reason: String,
    has_captions: bool,
    caption_style: Option<String>,
    caption_data: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn status_from_str(s: &str) -> StoreResult<SegmentStatus> {
    match s {
        "detected" => Ok(SegmentStatus::Detected),
        "extracting" => Ok(SegmentStatus::Extracting),
        "extracted" => Ok(SegmentStatus::Extracted),
        "failed" => Ok(SegmentStatus::Failed),
        other => Err(StoreError::InvalidTransition(format!("unknown segment status: {other}"))),
    }
}

fn row_to_segment(row: SegmentRow) -> StoreResult<Segment> {
    let signals: SignalScores = serde_json::from_value(row.signals)?;
    Ok(Segment {
        id: SegmentId::from_string(row.id),
        video_id: VideoId::from_string(row.video_id),
        start_time: row.start_time,
        end_time: row.end_time,
        status: status_from_str(&row.status)?,
        composite_score: row.composite_score,
        yt_retention: row.yt_retention,
        signals,
        reason: row.reason,
        has_captions: row.has_captions,
        caption_style: row.caption_style,
        caption_data: row.caption_data,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

/// Repository for Segment records.
pub struct SegmentRepository {
    pool: PgPool,
}

impl SegmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Persist all ranked segments for a video in one transaction (§4.4.7
    /// fan-out contract: either every selected window is persisted, or none
    /// are, so the extraction queue never sees a partial set).
    pub async fn insert_batch(&self, segments: &[Segment]) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;

        for seg in segments {
            sqlx::query(
                "INSERT INTO segments (id, video_id, start_time, end_time, status, composite_score,
                    yt_retention, signals, reason, has_captions, caption_style, caption_data,
                    created_at, updated_at)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)",
            )
            .bind(seg.id.as_str())
            .bind(seg.video_id.as_str())
            .bind(seg.start_time)
            .bind(seg.end_time)
            .bind(seg.status.as_str())
            .bind(seg.composite_score)
            .bind(seg.yt_retention)
            .bind(serde_json::to_value(&seg.signals)?)
            .bind(&seg.reason)
            .bind(seg.has_captions)
            .bind(&seg.caption_style)
            .bind(&seg.caption_data)
            .bind(seg.created_at)
            .bind(seg.updated_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    pub async fn get(&self, segment_id: &SegmentId) -> StoreResult<Option<Segment>> {
        let row: Option<SegmentRow> = sqlx::query_as("SELECT * FROM segments WHERE id = $1")
            .bind(segment_id.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row.map(row_to_segment).transpose()
    }

    pub async fn list_for_video(&self, video_id: &VideoId) -> StoreResult<Vec<Segment>> {
        let rows: Vec<SegmentRow> =
            sqlx::query_as("SELECT * FROM segments WHERE video_id = $1 ORDER BY composite_score DESC")
                .bind(video_id.as_str())
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter().map(row_to_segment).collect()
    }

    pub async fn update_status(&self, segment_id: &SegmentId, status: SegmentStatus) -> StoreResult<()> {
        sqlx::query("UPDATE segments SET status = $1, updated_at = $2 WHERE id = $3")
            .bind(status.as_str())
            .bind(Utc::now())
            .bind(segment_id.as_str())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn attach_captions(
        &self,
        segment_id: &SegmentId,
        caption_style: &str,
        caption_data: &str,
    ) -> StoreResult<()> {
        sqlx::query(
            "UPDATE segments SET has_captions = TRUE, caption_style = $1, caption_data = $2,
                updated_at = $3 WHERE id = $4",
        )
        .bind(caption_style)
        .bind(caption_data)
        .bind(Utc::now())
        .bind(segment_id.as_str())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Count of segments for a video, used by the extraction worker's
    /// job-completion aggregation (§4.5 step 9).
    pub async fn count_segments(&self, video_id: &VideoId) -> StoreResult<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM segments WHERE video_id = $1")
            .bind(video_id.as_str())
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }

    pub async fn count_with_status(&self, video_id: &VideoId, status: SegmentStatus) -> StoreResult<i64> {
        let count: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM segments WHERE video_id = $1 AND status = $2")
                .bind(video_id.as_str())
                .bind(status.as_str())
                .fetch_one(&self.pool)
                .await?;

        Ok(count.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_row() -> SegmentRow {
        let signals = SignalScores { audio: 0.5, visual: 0.6, speech: 0.7, engagement: 0.8 };
        SegmentRow {
            id: "segment-1".to_string(),
            video_id: "video-1".to_string(),
            start_time: 10.0,
            end_time: 40.0,
            status: "detected".to_string(),
            composite_score: 0.75,
            yt_retention: 0.6,
            signals: serde_json::to_value(signals).unwrap(),
            reason: "strong hook".to_string(),
            has_captions: false,
            caption_style: None,
            caption_data: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn status_from_str_accepts_every_named_status() {
        for s in ["detected", "extracting", "extracted", "failed"] {
            assert!(status_from_str(s).is_ok(), "expected {s} to parse");
        }
    }

    #[test]
    fn status_from_str_rejects_unknown_status() {
        assert!(status_from_str("bogus").is_err());
    }

    #[test]
    fn row_to_segment_parses_status_and_signals() {
        let segment = row_to_segment(sample_row()).unwrap();
        assert_eq!(segment.status, SegmentStatus::Detected);
        assert_eq!(segment.signals.engagement, 0.8);
        assert_eq!(segment.duration(), 30.0);
    }

    #[test]
    fn row_to_segment_rejects_unknown_status() {
        let mut row = sample_row();
        row.status = "bogus".to_string();
        assert!(row_to_segment(row).is_err());
    }
}
