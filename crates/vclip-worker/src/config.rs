//! Per-stage worker configuration (§5 Concurrency & Resource Model).
//!
//! Each stage binary loads its own slice of this config plus the shared
//! client configs (`StoreConfig`, `JobQueue::from_env`, `ObjectStoreConfig`,
//! `TranscribeConfig`) that each leaf crate already knows how to read from
//! the environment.

use std::env;
use std::num::NonZeroU32;
use std::time::Duration;

use crate::error::{WorkerError, WorkerResult};

fn env_u32(key: &str, default: u32) -> u32 {
    env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_u64(key: &str, default: u64) -> u64 {
    env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_path(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Fields shared by every stage binary.
#[derive(Debug, Clone)]
pub struct CommonConfig {
    /// Base directory under which each task creates its own temp subdirectory.
    pub work_dir: String,
    /// Bound on the drain window when a stage receives SIGTERM/SIGINT.
    pub shutdown_timeout: Duration,
    /// Minimum idle time before a pending message is eligible for XCLAIM.
    pub claim_min_idle: Duration,
    /// How often the consumer polls for abandoned pending messages.
    pub claim_interval: Duration,
}

impl CommonConfig {
    pub fn from_env() -> Self {
        Self {
            work_dir: env_path("WORKER_WORK_DIR", "/tmp/vclip"),
            shutdown_timeout: Duration::from_secs(env_u64("WORKER_SHUTDOWN_TIMEOUT_SECS", 30)),
            claim_min_idle: Duration::from_secs(env_u64("WORKER_CLAIM_MIN_IDLE_SECS", 300)),
            claim_interval: Duration::from_secs(env_u64("WORKER_CLAIM_INTERVAL_SECS", 30)),
        }
    }
}

/// Download Worker config (§4.3). Default concurrency 2.
#[derive(Debug, Clone)]
pub struct DownloadWorkerConfig {
    pub common: CommonConfig,
    pub concurrency: usize,
    pub download_timeout: Duration,
    pub max_retries: u32,
    pub backoff_base: Duration,
}

impl DownloadWorkerConfig {
    pub fn from_env() -> Self {
        Self {
            common: CommonConfig::from_env(),
            concurrency: env_u32("DW_CONCURRENCY", 2) as usize,
            download_timeout: Duration::from_secs(env_u64("DW_DOWNLOAD_TIMEOUT_SECS", 600)),
            max_retries: env_u32("DW_MAX_RETRIES", 3),
            backoff_base: Duration::from_secs(env_u64("DW_BACKOFF_BASE_SECS", 2)),
        }
    }
}

/// Analysis Worker config (§4.4). Default concurrency 1, rate <= 1/s.
#[derive(Debug, Clone)]
pub struct AnalysisWorkerConfig {
    pub common: CommonConfig,
    pub concurrency: usize,
    pub rate_per_second: NonZeroU32,
    pub top_n_cap: usize,
    pub max_retries: u32,
    pub backoff_base: Duration,
}

impl AnalysisWorkerConfig {
    pub fn from_env() -> WorkerResult<Self> {
        let rate = env_u32("AW_RATE_PER_SECOND", 1);
        Ok(Self {
            common: CommonConfig::from_env(),
            concurrency: env_u32("AW_CONCURRENCY", 1) as usize,
            rate_per_second: NonZeroU32::new(rate).ok_or_else(|| WorkerError::config("AW_RATE_PER_SECOND must be > 0"))?,
            top_n_cap: env_u32("AW_TOP_N_CAP", 8) as usize,
            max_retries: env_u32("AW_MAX_RETRIES", 3),
            backoff_base: Duration::from_secs(env_u64("AW_BACKOFF_BASE_SECS", 4)),
        })
    }
}

/// Extraction Worker config (§4.5). Default concurrency 2, rate <= 5/s.
#[derive(Debug, Clone)]
pub struct ExtractionWorkerConfig {
    pub common: CommonConfig,
    pub concurrency: usize,
    pub rate_per_second: NonZeroU32,
    pub extraction_timeout: Duration,
    pub max_retries: u32,
    pub backoff_base: Duration,
}

impl ExtractionWorkerConfig {
    pub fn from_env() -> WorkerResult<Self> {
        let rate = env_u32("EW_RATE_PER_SECOND", 5);
        Ok(Self {
            common: CommonConfig::from_env(),
            concurrency: env_u32("EW_CONCURRENCY", 2) as usize,
            rate_per_second: NonZeroU32::new(rate).ok_or_else(|| WorkerError::config("EW_RATE_PER_SECOND must be > 0"))?,
            extraction_timeout: Duration::from_secs(env_u64("EW_EXTRACTION_TIMEOUT_SECS", 300)),
            max_retries: env_u32("EW_MAX_RETRIES", 3),
            backoff_base: Duration::from_secs(env_u64("EW_BACKOFF_BASE_SECS", 4)),
        })
    }
}
