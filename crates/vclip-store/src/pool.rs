//! Connection pool bootstrap.
//!
//! Schema is created with `CREATE TABLE IF NOT EXISTS` at startup rather than
//! through a migration runner; the store has no evolving-schema story to
//! support yet.

use sqlx::postgres::{PgPoolOptions, PgPool};

use crate::config::StoreConfig;
use crate::error::StoreResult;

pub async fn init_pool(config: &StoreConfig) -> StoreResult<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await?;

    bootstrap_schema(&pool).await?;

    Ok(pool)
}

async fn bootstrap_schema(pool: &PgPool) -> StoreResult<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS jobs (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            source_url TEXT NOT NULL,
            video_id TEXT,
            status TEXT NOT NULL,
            progress SMALLINT NOT NULL DEFAULT 0,
            current_step TEXT NOT NULL DEFAULT '',
            error_message TEXT,
            options JSONB NOT NULL,
            created_at TIMESTAMPTZ NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL,
            completed_at TIMESTAMPTZ
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS videos (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            external_id TEXT NOT NULL UNIQUE,
            source_url TEXT NOT NULL,
            title TEXT NOT NULL,
            description TEXT,
            duration BIGINT NOT NULL,
            thumbnail_url TEXT,
            storage_key TEXT NOT NULL,
            status TEXT NOT NULL,
            raw_metadata JSONB NOT NULL DEFAULT '{}',
            created_at TIMESTAMPTZ NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS segments (
            id TEXT PRIMARY KEY,
            video_id TEXT NOT NULL,
            start_time DOUBLE PRECISION NOT NULL,
            end_time DOUBLE PRECISION NOT NULL,
            status TEXT NOT NULL,
            composite_score DOUBLE PRECISION NOT NULL,
            yt_retention DOUBLE PRECISION NOT NULL,
            signals JSONB NOT NULL,
            reason TEXT NOT NULL DEFAULT '',
            has_captions BOOLEAN NOT NULL DEFAULT FALSE,
            caption_style TEXT,
            caption_data TEXT,
            created_at TIMESTAMPTZ NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL
        )",
    )
    .execute(pool)
    .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS segments_video_id_idx ON segments (video_id)")
        .execute(pool)
        .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS clips (
            id TEXT PRIMARY KEY,
            segment_id TEXT NOT NULL UNIQUE,
            video_id TEXT NOT NULL,
            storage_key TEXT NOT NULL,
            thumbnail_key TEXT,
            title TEXT NOT NULL,
            description TEXT,
            tags JSONB NOT NULL DEFAULT '[]',
            status TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL
        )",
    )
    .execute(pool)
    .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS clips_video_id_idx ON clips (video_id)")
        .execute(pool)
        .await?;

    Ok(())
}
