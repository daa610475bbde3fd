//! Download-utility error types.

use thiserror::Error;

pub type DownloadResult<T> = Result<T, DownloadError>;

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("download utility not found in PATH")]
    UtilityNotFound,

    #[error("invalid source URL: {0}")]
    InvalidUrl(String),

    #[error("download utility failed: {message}")]
    UtilityFailed { message: String, stderr: Option<String> },

    #[error("download utility produced no output file")]
    MissingOutput,

    #[error("download timed out after {0}s")]
    Timeout(u64),

    #[error("captured output exceeded the maximum size of {0} bytes")]
    OutputTooLarge(u64),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl DownloadError {
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DownloadError::UtilityFailed { .. } | DownloadError::Timeout(_) | DownloadError::Io(_)
        )
    }
}
