//! Redis Streams job queue for the clip pipeline.
//!
//! This crate provides:
//! - Job enqueueing via Redis Streams, one stream per named queue
//! - Worker consumption with retry/backoff and a bounded dead-letter ring
//! - Crash recovery via `XPENDING`/`XCLAIM`

pub mod error;
pub mod job;
pub mod queue;

pub use error::{QueueError, QueueResult};
pub use job::{AnalysisTask, DownloadTask, ExtractionTask, QueueJob, QueueName};
pub use queue::{JobQueue, QueueConfig, DLQ_COMPLETIONS_CAP, DLQ_FAILURES_CAP};
