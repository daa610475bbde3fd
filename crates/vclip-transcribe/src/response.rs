//! Transcription endpoint response shape (§4.6, §6).

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct TranscriptionResponse {
    pub text: String,
    #[serde(default)]
    pub duration: f64,
    #[serde(default)]
    pub words: Option<Vec<WordTimestamp>>,
    #[serde(default)]
    pub segments: Option<Vec<serde_json::Value>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WordTimestamp {
    pub word: String,
    pub start: f64,
    pub end: f64,
    #[serde(default)]
    pub confidence: Option<f64>,
}
