//! Error types for the transcription client.

use thiserror::Error;

pub type TranscribeResult<T> = Result<T, TranscribeError>;

/// Errors that can occur while talking to the transcription endpoint.
///
/// Every variant here maps to the `transcription_failure` taxonomy entry:
/// the caller is expected to catch this, skip captions, and continue.
#[derive(Debug, Error)]
pub enum TranscribeError {
    #[error("transcription endpoint not configured")]
    NotConfigured,

    #[error("transcription request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("transcription endpoint returned status {status}: {body}")]
    BadStatus { status: u16, body: String },

    #[error("transcription response had no usable words or text")]
    EmptyResponse,

    #[error("failed to read audio file: {0}")]
    Io(#[from] std::io::Error),

    #[error("audio extraction failed: {0}")]
    AudioExtraction(#[from] vclip_media::MediaError),
}
