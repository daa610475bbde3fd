//! Job queue using Redis Streams, generalized to the pipeline's four named
//! queues (download, analysis, extraction, upload).

use std::collections::HashMap;
use std::time::Duration;

use redis::AsyncCommands;
use tracing::{debug, info, warn};

use crate::error::{QueueError, QueueResult};
use crate::job::{QueueJob, QueueName};

/// Per-queue policy: stream/group/dlq naming and retry backoff.
#[derive(Debug, Clone)]
pub struct QueueConfig {
    pub stream_name: String,
    pub consumer_group: String,
    /// Capped list key for failures that exhausted retries (§4.1).
    pub dlq_failures_key: String,
    /// Capped list key for terminal successes, retained for inspection.
    pub dlq_completions_key: String,
    pub max_retries: u32,
    pub backoff_base: Duration,
    pub max_backoff: Duration,
    pub visibility_timeout: Duration,
}

/// Bound on the dead-letter ring's failures list (§4.1).
pub const DLQ_FAILURES_CAP: isize = 200;
/// Bound on the dead-letter ring's completions list (§4.1).
pub const DLQ_COMPLETIONS_CAP: isize = 100;

impl QueueConfig {
    pub fn for_queue(name: QueueName, max_retries: u32, backoff_base: Duration) -> Self {
        let prefix = format!("vclip:{}", name.as_str());
        Self {
            stream_name: format!("{prefix}:stream"),
            consumer_group: format!("{prefix}:workers"),
            dlq_failures_key: format!("{prefix}:dlq:failures"),
            dlq_completions_key: format!("{prefix}:dlq:completions"),
            max_retries,
            backoff_base,
            max_backoff: Duration::from_secs(300),
            visibility_timeout: Duration::from_secs(600),
        }
    }

    /// Exponential backoff with full jitter: `rand(0, base * 2^attempt)`,
    /// capped at `max_backoff`.
    pub fn backoff_for_attempt(&self, attempt: u32) -> Duration {
        use rand::Rng;

        let exp = self.backoff_base.saturating_mul(2u32.saturating_pow(attempt));
        let capped = exp.min(self.max_backoff);
        let jittered_ms = rand::rng().random_range(0..=capped.as_millis().max(1) as u64);
        Duration::from_millis(jittered_ms)
    }
}

/// Default retry/backoff policy per named queue, per §4.3-§4.5.
fn default_config(name: QueueName) -> QueueConfig {
    match name {
        QueueName::Download => QueueConfig::for_queue(name, 3, Duration::from_secs(2)),
        QueueName::Analysis => QueueConfig::for_queue(name, 3, Duration::from_secs(2)),
        QueueName::Extraction => QueueConfig::for_queue(name, 3, Duration::from_secs(2)),
        QueueName::Upload => QueueConfig::for_queue(name, 3, Duration::from_secs(2)),
    }
}

/// Durable job queue: one Redis Stream + consumer group per named queue,
/// sharing a single connection client.
pub struct JobQueue {
    client: redis::Client,
    configs: HashMap<&'static str, QueueConfig>,
}

impl JobQueue {
    pub fn new(redis_url: &str) -> QueueResult<Self> {
        let client = redis::Client::open(redis_url)?;
        let configs = [
            QueueName::Download,
            QueueName::Analysis,
            QueueName::Extraction,
            QueueName::Upload,
        ]
        .into_iter()
        .map(|name| (name.as_str(), default_config(name)))
        .collect();

        Ok(Self { client, configs })
    }

    pub fn from_env() -> QueueResult<Self> {
        let redis_url = std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());
        Self::new(&redis_url)
    }

    fn config(&self, name: QueueName) -> &QueueConfig {
        self.configs.get(name.as_str()).expect("every QueueName has a default config")
    }

    /// Create the consumer group for every named queue (ignores BUSYGROUP).
    pub async fn init(&self) -> QueueResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        for config in self.configs.values() {
            let result: Result<(), redis::RedisError> = redis::cmd("XGROUP")
                .arg("CREATE")
                .arg(&config.stream_name)
                .arg(&config.consumer_group)
                .arg("$")
                .arg("MKSTREAM")
                .query_async(&mut conn)
                .await;

            match result {
                Ok(_) => info!(stream = %config.stream_name, "created consumer group"),
                Err(e) if e.to_string().contains("BUSYGROUP") => {
                    debug!(stream = %config.stream_name, "consumer group already exists");
                }
                Err(e) => return Err(QueueError::Redis(e)),
            }
        }

        Ok(())
    }

    /// Enqueue a job onto its named queue, deduplicated on idempotency key
    /// for one hour.
    pub async fn enqueue(&self, job: QueueJob) -> QueueResult<String> {
        let config = self.config(job.queue_name());
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let payload = serde_json::to_string(&job)?;
        let idempotency_key = job.idempotency_key();
        let dedup_key = format!("vclip:dedup:{idempotency_key}");

        let exists: bool = conn.exists(&dedup_key).await?;
        if exists {
            warn!(key = %idempotency_key, "duplicate job rejected");
            return Err(QueueError::enqueue_failed("duplicate job"));
        }

        let message_id: String = redis::cmd("XADD")
            .arg(&config.stream_name)
            .arg("*")
            .arg("job")
            .arg(&payload)
            .arg("key")
            .arg(&idempotency_key)
            .query_async(&mut conn)
            .await?;

        conn.set_ex::<_, _, ()>(&dedup_key, "1", 3600).await?;

        info!(job_id = %job.job_id(), message_id = %message_id, queue = job.queue_name().as_str(), "enqueued job");
        Ok(message_id)
    }

    pub async fn clear_dedup(&self, job: &QueueJob) -> QueueResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let dedup_key = format!("vclip:dedup:{}", job.idempotency_key());
        conn.del::<_, ()>(&dedup_key).await?;
        Ok(())
    }

    /// Acknowledge (remove) a processed message from its named queue.
    pub async fn ack(&self, name: QueueName, message_id: &str) -> QueueResult<()> {
        let config = self.config(name);
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        redis::cmd("XACK")
            .arg(&config.stream_name)
            .arg(&config.consumer_group)
            .arg(message_id)
            .query_async::<()>(&mut conn)
            .await?;

        redis::cmd("XDEL")
            .arg(&config.stream_name)
            .arg(message_id)
            .query_async::<()>(&mut conn)
            .await?;

        debug!(message_id = %message_id, queue = name.as_str(), "acknowledged job");
        Ok(())
    }

    /// Record a terminal success in the completions ring, capped at
    /// [`DLQ_COMPLETIONS_CAP`] entries (oldest dropped).
    pub async fn record_completion(&self, name: QueueName, job: &QueueJob) -> QueueResult<()> {
        let config = self.config(name);
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let payload = serde_json::to_string(job)?;

        conn.lpush::<_, _, ()>(&config.dlq_completions_key, &payload).await?;
        conn.ltrim::<_, ()>(&config.dlq_completions_key, 0, DLQ_COMPLETIONS_CAP - 1).await?;
        Ok(())
    }

    /// Move a job to the dead-letter ring after retries are exhausted,
    /// capped at [`DLQ_FAILURES_CAP`] entries (oldest dropped), then ack the
    /// original message so it leaves the pending entries list.
    pub async fn dlq(&self, name: QueueName, message_id: &str, job: &QueueJob, error: &str) -> QueueResult<()> {
        let config = self.config(name);
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let record = serde_json::json!({
            "job": job,
            "error": error,
            "original_id": message_id,
        });
        let payload = serde_json::to_string(&record)?;

        conn.lpush::<_, _, ()>(&config.dlq_failures_key, &payload).await?;
        conn.ltrim::<_, ()>(&config.dlq_failures_key, 0, DLQ_FAILURES_CAP - 1).await?;

        self.ack(name, message_id).await?;
        self.clear_dedup(job).await?;

        warn!(job_id = %job.job_id(), queue = name.as_str(), error = %error, "moved job to dead-letter ring");
        Ok(())
    }

    pub async fn len(&self, name: QueueName) -> QueueResult<u64> {
        let config = self.config(name);
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let len: u64 = conn.xlen(&config.stream_name).await?;
        Ok(len)
    }

    pub async fn dlq_len(&self, name: QueueName) -> QueueResult<u64> {
        let config = self.config(name);
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let len: u64 = conn.llen(&config.dlq_failures_key).await?;
        Ok(len)
    }

    /// Reserve up to `count` new jobs for `consumer_name` from a named queue.
    pub async fn consume(
        &self,
        name: QueueName,
        consumer_name: &str,
        block_ms: u64,
        count: usize,
    ) -> QueueResult<Vec<(String, QueueJob)>> {
        let config = self.config(name);
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let result: redis::streams::StreamReadReply = redis::cmd("XREADGROUP")
            .arg("GROUP")
            .arg(&config.consumer_group)
            .arg(consumer_name)
            .arg("COUNT")
            .arg(count)
            .arg("BLOCK")
            .arg(block_ms)
            .arg("STREAMS")
            .arg(&config.stream_name)
            .arg(">")
            .query_async(&mut conn)
            .await?;

        let mut jobs = Vec::new();
        for stream_key in result.keys {
            for entry in stream_key.ids {
                let message_id = entry.id.clone();
                if let Some(redis::Value::BulkString(payload)) = entry.map.get("job") {
                    let payload_str = String::from_utf8_lossy(payload);
                    match serde_json::from_str::<QueueJob>(&payload_str) {
                        Ok(job) => jobs.push((message_id, job)),
                        Err(e) => {
                            warn!(error = %e, "failed to parse job payload");
                            self.ack(name, &message_id).await.ok();
                        }
                    }
                }
            }
        }

        Ok(jobs)
    }

    /// Reclaim jobs idle longer than `min_idle_ms`, handling crashed workers.
    pub async fn claim_pending(
        &self,
        name: QueueName,
        consumer_name: &str,
        min_idle_ms: u64,
        count: usize,
    ) -> QueueResult<Vec<(String, QueueJob)>> {
        let config = self.config(name);
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let pending_count: usize = redis::cmd("XPENDING")
            .arg(&config.stream_name)
            .arg(&config.consumer_group)
            .query_async(&mut conn)
            .await
            .map(|reply: redis::streams::StreamPendingReply| reply.count())
            .unwrap_or(0);

        if pending_count == 0 {
            return Ok(Vec::new());
        }

        let pending_details: Vec<Vec<redis::Value>> = redis::cmd("XPENDING")
            .arg(&config.stream_name)
            .arg(&config.consumer_group)
            .arg("-")
            .arg("+")
            .arg(count)
            .query_async(&mut conn)
            .await?;

        let mut message_ids_to_claim = Vec::new();
        for detail in pending_details {
            if detail.len() >= 4 {
                if let (Some(redis::Value::BulkString(id_bytes)), Some(redis::Value::Int(idle_ms))) =
                    (detail.first(), detail.get(2))
                {
                    let idle_ms = *idle_ms as u64;
                    if idle_ms >= min_idle_ms {
                        if let Ok(id) = String::from_utf8(id_bytes.clone()) {
                            message_ids_to_claim.push(id);
                        }
                    }
                }
            }
        }

        if message_ids_to_claim.is_empty() {
            return Ok(Vec::new());
        }

        let mut cmd = redis::cmd("XCLAIM");
        cmd.arg(&config.stream_name)
            .arg(&config.consumer_group)
            .arg(consumer_name)
            .arg(min_idle_ms);
        for msg_id in &message_ids_to_claim {
            cmd.arg(msg_id);
        }

        let claimed_messages: Vec<Vec<redis::Value>> = cmd.query_async(&mut conn).await?;

        let mut jobs = Vec::new();
        for message in claimed_messages {
            if message.len() >= 2 {
                if let (Some(redis::Value::BulkString(id_bytes)), Some(redis::Value::Array(fields))) =
                    (message.first(), message.get(1))
                {
                    if let Ok(message_id) = String::from_utf8(id_bytes.clone()) {
                        let mut job_payload: Option<String> = None;
                        let mut i = 0;
                        while i + 1 < fields.len() {
                            if let (
                                Some(redis::Value::BulkString(field_bytes)),
                                Some(redis::Value::BulkString(value_bytes)),
                            ) = (fields.get(i), fields.get(i + 1))
                            {
                                if let (Ok(field), Ok(value)) =
                                    (String::from_utf8(field_bytes.clone()), String::from_utf8(value_bytes.clone()))
                                {
                                    if field == "job" {
                                        job_payload = Some(value);
                                        break;
                                    }
                                }
                            }
                            i += 2;
                        }

                        if let Some(payload) = job_payload {
                            match serde_json::from_str::<QueueJob>(&payload) {
                                Ok(job) => {
                                    info!(job_id = %job.job_id(), "claimed pending job");
                                    jobs.push((message_id, job));
                                }
                                Err(e) => {
                                    warn!(error = %e, "failed to parse claimed job payload");
                                    self.ack(name, &message_id).await.ok();
                                }
                            }
                        }
                    }
                }
            }
        }

        Ok(jobs)
    }

    pub async fn get_retry_count(&self, message_id: &str) -> QueueResult<u32> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let key = format!("vclip:retry:{message_id}");
        let count: Option<u32> = conn.get(&key).await?;
        Ok(count.unwrap_or(0))
    }

    pub async fn increment_retry(&self, message_id: &str) -> QueueResult<u32> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let key = format!("vclip:retry:{message_id}");
        let count: u32 = conn.incr(&key, 1).await?;
        conn.expire::<_, ()>(&key, 86400).await?;
        Ok(count)
    }

    pub fn max_retries(&self, name: QueueName) -> u32 {
        self.config(name).max_retries
    }

    pub fn backoff_for_attempt(&self, name: QueueName, attempt: u32) -> Duration {
        self.config(name).backoff_for_attempt(attempt)
    }

    /// Reset a still-processing job's idle timer so it is not reclaimed
    /// mid-flight by [`JobQueue::claim_pending`].
    pub async fn refresh_visibility(&self, name: QueueName, consumer_name: &str, message_id: &str) -> QueueResult<()> {
        let config = self.config(name);
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let _res: redis::Value = redis::cmd("XCLAIM")
            .arg(&config.stream_name)
            .arg(&config.consumer_group)
            .arg(consumer_name)
            .arg(0)
            .arg(message_id)
            .arg("JUSTID")
            .query_async(&mut conn)
            .await?;

        Ok(())
    }
}
