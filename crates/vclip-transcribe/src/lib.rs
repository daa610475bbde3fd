//! Speech-to-text client: audio extraction, the transcription endpoint HTTP
//! contract, and the word-acquisition fallback used by the caption pipeline.

pub mod audio;
pub mod client;
pub mod distribute;
pub mod error;
pub mod response;

pub use audio::extract_audio;
pub use client::{TranscribeClient, TranscribeConfig};
pub use distribute::acquire_words;
pub use error::{TranscribeError, TranscribeResult};
pub use response::{TranscriptionResponse, WordTimestamp};
