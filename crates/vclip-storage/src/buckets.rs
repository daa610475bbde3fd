//! The three named buckets clips move through (§3, §4 worker contracts).

use std::env;

use crate::client::{ObjectStoreClient, ObjectStoreConfig};
use crate::error::StorageResult;

/// Raw downloaded source video, staged for the analysis worker.
pub const RAW_VIDEOS_BUCKET_ENV: &str = "RAW_VIDEOS_BUCKET";
pub const RAW_VIDEOS_BUCKET_DEFAULT: &str = "raw-videos";

/// Clip thumbnails.
pub const THUMBNAILS_BUCKET_ENV: &str = "THUMBNAILS_BUCKET";
pub const THUMBNAILS_BUCKET_DEFAULT: &str = "thumbnails";

/// Finished, captioned vertical clips.
pub const PROCESSED_SHORTS_BUCKET_ENV: &str = "PROCESSED_SHORTS_BUCKET";
pub const PROCESSED_SHORTS_BUCKET_DEFAULT: &str = "processed-shorts";

fn bucket_name(env_var: &str, default: &str) -> String {
    env::var(env_var).unwrap_or_else(|_| default.to_string())
}

/// One `ObjectStoreClient` per named bucket, sharing connection config.
pub struct ObjectStores {
    pub raw_videos: ObjectStoreClient,
    pub thumbnails: ObjectStoreClient,
    pub processed_shorts: ObjectStoreClient,
}

impl ObjectStores {
    pub async fn from_env() -> StorageResult<Self> {
        let config = ObjectStoreConfig::from_env()?;
        Self::new(&config).await
    }

    pub async fn new(config: &ObjectStoreConfig) -> StorageResult<Self> {
        Ok(Self {
            raw_videos: ObjectStoreClient::new(config, bucket_name(RAW_VIDEOS_BUCKET_ENV, RAW_VIDEOS_BUCKET_DEFAULT)).await?,
            thumbnails: ObjectStoreClient::new(config, bucket_name(THUMBNAILS_BUCKET_ENV, THUMBNAILS_BUCKET_DEFAULT)).await?,
            processed_shorts: ObjectStoreClient::new(config, bucket_name(PROCESSED_SHORTS_BUCKET_ENV, PROCESSED_SHORTS_BUCKET_DEFAULT))
                .await?,
        })
    }
}
