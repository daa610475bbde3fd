//! Error types for the analysis worker's core.

use thiserror::Error;

pub type AnalysisResult<T> = Result<T, AnalysisError>;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("signal computation failed: {0}")]
    SignalFailure(String),

    #[error("media error: {0}")]
    Media(#[from] vclip_media::MediaError),
}
