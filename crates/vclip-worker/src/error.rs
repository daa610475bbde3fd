//! Worker error taxonomy (§7 Error Handling Design).
//!
//! Every stage worker funnels its failures through [`WorkerError`], which
//! classifies each leaf-crate error into one of the taxonomy buckets so the
//! executor can decide whether to retry, degrade gracefully, or fail the
//! owning row outright.

use thiserror::Error;

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    /// URL unparseable, non-positive duration, or similar caller-supplied
    /// defect. Not retried.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Missing Video/Segment referenced by a task. Terminal, not retried.
    #[error("data integrity violation: {0}")]
    DataIntegrity(String),

    /// A subprocess or HTTP call exceeded its bound. Treated the same as
    /// `external_tool_failure` for retry purposes.
    #[error("operation timed out: {0}")]
    Timeout(String),

    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Store(#[from] vclip_store::StoreError),

    #[error(transparent)]
    Queue(#[from] vclip_queue::QueueError),

    #[error(transparent)]
    Storage(#[from] vclip_storage::StorageError),

    #[error(transparent)]
    Media(#[from] vclip_media::MediaError),

    #[error(transparent)]
    Download(#[from] vclip_download::DownloadError),

    #[error(transparent)]
    Transcribe(#[from] vclip_transcribe::TranscribeError),

    #[error(transparent)]
    Analysis(#[from] vclip_analysis::AnalysisError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl WorkerError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn data_integrity(msg: impl Into<String>) -> Self {
        Self::DataIntegrity(msg.into())
    }

    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// `invalid_input` and `data_integrity` are never retried; every other
    /// variant is handed to the QB's retry/backoff policy up to its max
    /// attempts.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, WorkerError::InvalidInput(_) | WorkerError::DataIntegrity(_))
    }

    /// `transcription_failure` degrades gracefully rather than failing the
    /// owning row: callers should catch this specifically, skip captions,
    /// and continue extraction.
    pub fn is_transcription_failure(&self) -> bool {
        matches!(self, WorkerError::Transcribe(_))
    }

    /// `signal_failure`: a per-signal analyzer failed. The caller already
    /// substitutes the neutral fallback signal before this ever surfaces as
    /// an error (see `vclip_analysis::compute_*_signal`), so this only fires
    /// for analyzer plumbing that has no fallback path (e.g. transcription
    /// acquisition feeding speech signal computation).
    pub fn is_signal_failure(&self) -> bool {
        matches!(self, WorkerError::Analysis(_))
    }

    /// Truncate an error's display string to the 200-char bound applied to
    /// `Job.error_message` / `Segment` failure rows (§7 propagation policy).
    pub fn truncated_message(&self) -> String {
        vclip_models::Job::truncate_error(&self.to_string())
    }
}
