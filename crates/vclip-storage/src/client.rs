//! Object store client implementation (S3-compatible, path-style addressing).

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::{Builder, Region};
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::error::{StorageError, StorageResult};

/// Part size for multipart uploads (§6 object store contract).
const MULTIPART_PART_SIZE: usize = 10 * 1024 * 1024;
/// Maximum number of parts uploaded concurrently.
const MULTIPART_CONCURRENCY: usize = 3;
/// Below this size, a plain `put_object` is used instead of a multipart upload.
const MULTIPART_THRESHOLD: u64 = MULTIPART_PART_SIZE as u64;

/// Connection configuration, shared across every named bucket.
#[derive(Debug, Clone)]
pub struct ObjectStoreConfig {
    pub endpoint_url: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub region: String,
}

impl ObjectStoreConfig {
    pub fn from_env() -> StorageResult<Self> {
        Ok(Self {
            endpoint_url: std::env::var("OBJECT_STORE_ENDPOINT_URL")
                .map_err(|_| StorageError::config_error("OBJECT_STORE_ENDPOINT_URL not set"))?,
            access_key_id: std::env::var("OBJECT_STORE_ACCESS_KEY_ID")
                .map_err(|_| StorageError::config_error("OBJECT_STORE_ACCESS_KEY_ID not set"))?,
            secret_access_key: std::env::var("OBJECT_STORE_SECRET_ACCESS_KEY")
                .map_err(|_| StorageError::config_error("OBJECT_STORE_SECRET_ACCESS_KEY not set"))?,
            region: std::env::var("OBJECT_STORE_REGION").unwrap_or_else(|_| "auto".to_string()),
        })
    }
}

/// S3-compatible object storage client, scoped to a single bucket.
#[derive(Clone)]
pub struct ObjectStoreClient {
    client: Client,
    bucket: String,
}

impl ObjectStoreClient {
    /// Build a client against `bucket` using shared connection settings.
    pub async fn new(config: &ObjectStoreConfig, bucket: impl Into<String>) -> StorageResult<Self> {
        let credentials = Credentials::new(&config.access_key_id, &config.secret_access_key, None, None, "vclip");

        let sdk_config = Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .endpoint_url(&config.endpoint_url)
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();

        Ok(Self {
            client: Client::from_conf(sdk_config),
            bucket: bucket.into(),
        })
    }

    pub async fn upload_file(&self, path: impl AsRef<Path>, key: &str, content_type: &str) -> StorageResult<()> {
        let path = path.as_ref();
        debug!("uploading {} to {}", path.display(), key);

        let body = ByteStream::from_path(path).await.map_err(|e| StorageError::upload_failed(e.to_string()))?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(body)
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| StorageError::upload_failed(e.to_string()))?;

        info!("uploaded {} to {}", path.display(), key);
        Ok(())
    }

    /// Upload a file, using a multipart upload (10 MiB parts, concurrency 3)
    /// once the file is large enough to warrant one.
    pub async fn upload_file_multipart(&self, path: impl AsRef<Path>, key: &str, content_type: &str) -> StorageResult<()> {
        let path = path.as_ref();
        let size = tokio::fs::metadata(path).await.map_err(|e| StorageError::upload_failed(e.to_string()))?.len();

        if size < MULTIPART_THRESHOLD {
            return self.upload_file(path, key, content_type).await;
        }

        debug!("starting multipart upload of {} ({} bytes) to {}", path.display(), size, key);

        let create = self
            .client
            .create_multipart_upload()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| StorageError::upload_failed(e.to_string()))?;

        let upload_id = create.upload_id().ok_or_else(|| StorageError::upload_failed("missing upload id"))?.to_string();

        match self.upload_parts(path, key, &upload_id, size).await {
            Ok(parts) => {
                self.client
                    .complete_multipart_upload()
                    .bucket(&self.bucket)
                    .key(key)
                    .upload_id(&upload_id)
                    .multipart_upload(aws_sdk_s3::types::CompletedMultipartUpload::builder().set_parts(Some(parts)).build())
                    .send()
                    .await
                    .map_err(|e| StorageError::upload_failed(e.to_string()))?;

                info!("completed multipart upload of {} to {}", path.display(), key);
                Ok(())
            }
            Err(e) => {
                warn!("multipart upload of {} to {} failed, aborting: {}", path.display(), key, e);
                let _ = self.client.abort_multipart_upload().bucket(&self.bucket).key(key).upload_id(&upload_id).send().await;
                Err(e)
            }
        }
    }

    async fn upload_parts(
        &self,
        path: &Path,
        key: &str,
        upload_id: &str,
        size: u64,
    ) -> StorageResult<Vec<aws_sdk_s3::types::CompletedPart>> {
        let part_count = size.div_ceil(MULTIPART_PART_SIZE as u64) as i32;
        let semaphore = Arc::new(Semaphore::new(MULTIPART_CONCURRENCY));
        let mut handles = Vec::with_capacity(part_count as usize);

        for part_number in 1..=part_count {
            let permit = semaphore.clone().acquire_owned().await.expect("semaphore not closed");
            let offset = (part_number as u64 - 1) * MULTIPART_PART_SIZE as u64;
            let len = std::cmp::min(MULTIPART_PART_SIZE as u64, size - offset);

            let client = self.client.clone();
            let bucket = self.bucket.clone();
            let key = key.to_string();
            let upload_id = upload_id.to_string();
            let path = path.to_path_buf();

            handles.push(tokio::spawn(async move {
                let _permit = permit;
                let mut file = tokio::fs::File::open(&path).await.map_err(|e| StorageError::upload_failed(e.to_string()))?;
                file.seek(std::io::SeekFrom::Start(offset)).await.map_err(|e| StorageError::upload_failed(e.to_string()))?;

                let mut buf = vec![0u8; len as usize];
                file.read_exact(&mut buf).await.map_err(|e| StorageError::upload_failed(e.to_string()))?;

                let response = client
                    .upload_part()
                    .bucket(&bucket)
                    .key(&key)
                    .upload_id(&upload_id)
                    .part_number(part_number)
                    .body(ByteStream::from(buf))
                    .send()
                    .await
                    .map_err(|e| StorageError::upload_failed(e.to_string()))?;

                let e_tag = response.e_tag().ok_or_else(|| StorageError::upload_failed("missing ETag on part"))?.to_string();

                Ok::<_, StorageError>(
                    aws_sdk_s3::types::CompletedPart::builder().e_tag(e_tag).part_number(part_number).build(),
                )
            }));
        }

        let mut parts = Vec::with_capacity(handles.len());
        for handle in handles {
            let part = handle.await.map_err(|e| StorageError::upload_failed(e.to_string()))??;
            parts.push(part);
        }
        parts.sort_by_key(|p| p.part_number().unwrap_or(0));
        Ok(parts)
    }

    pub async fn upload_bytes(&self, data: Vec<u8>, key: &str, content_type: &str) -> StorageResult<()> {
        debug!("uploading {} bytes to {}", data.len(), key);

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(data))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| StorageError::upload_failed(e.to_string()))?;

        Ok(())
    }

    pub async fn download_bytes(&self, key: &str) -> StorageResult<Vec<u8>> {
        debug!("downloading {}", key);

        let response = self.client.get_object().bucket(&self.bucket).key(key).send().await.map_err(|e| {
            if e.to_string().contains("NoSuchKey") {
                StorageError::not_found(key)
            } else {
                StorageError::DownloadFailed(e.to_string())
            }
        })?;

        let bytes = response
            .body
            .collect()
            .await
            .map_err(|e| StorageError::DownloadFailed(e.to_string()))?
            .into_bytes()
            .to_vec();

        Ok(bytes)
    }

    pub async fn download_file(&self, key: &str, path: impl AsRef<Path>) -> StorageResult<()> {
        let path = path.as_ref();
        debug!("downloading {} to {}", key, path.display());

        let bytes = self.download_bytes(key).await?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::DownloadFailed(format!("failed to create directory: {e}")))?;
        }

        tokio::fs::write(path, bytes)
            .await
            .map_err(|e| StorageError::DownloadFailed(format!("failed to write file: {e}")))?;

        info!("downloaded {} to {}", key, path.display());
        Ok(())
    }

    pub async fn presign_get(&self, key: &str, expires_in: Duration) -> StorageResult<String> {
        let presign_config = PresigningConfig::expires_in(expires_in).map_err(|e| StorageError::PresignFailed(e.to_string()))?;

        let presigned = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presign_config)
            .await
            .map_err(|e| StorageError::PresignFailed(e.to_string()))?;

        Ok(presigned.uri().to_string())
    }

    pub async fn delete_object(&self, key: &str) -> StorageResult<()> {
        debug!("deleting {}", key);

        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StorageError::delete_failed(e.to_string()))?;

        Ok(())
    }

    pub async fn exists(&self, key: &str) -> StorageResult<bool> {
        match self.client.head_object().bucket(&self.bucket).key(key).send().await {
            Ok(_) => Ok(true),
            Err(e) => {
                if e.to_string().contains("NotFound") || e.to_string().contains("NoSuchKey") {
                    Ok(false)
                } else {
                    Err(StorageError::AwsSdk(e.to_string()))
                }
            }
        }
    }

    pub async fn check_connectivity(&self) -> StorageResult<()> {
        self.client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .map_err(|e| StorageError::AwsSdk(format!("object store connectivity check failed: {e}")))?;
        Ok(())
    }
}
