//! HTTP client for the external speech-to-text endpoint.

use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::Client;
use tracing::{debug, warn};

use crate::error::{TranscribeError, TranscribeResult};
use crate::response::TranscriptionResponse;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Clone)]
pub struct TranscribeConfig {
    pub endpoint_url: Option<String>,
    pub api_key: Option<String>,
    pub model: String,
}

impl TranscribeConfig {
    pub fn from_env() -> Self {
        Self {
            endpoint_url: std::env::var("TRANSCRIPTION_ENDPOINT_URL").ok(),
            api_key: std::env::var("TRANSCRIPTION_API_KEY").ok(),
            model: std::env::var("TRANSCRIPTION_MODEL").unwrap_or_else(|_| "whisper-1".to_string()),
        }
    }

    /// Whether a transcription endpoint is configured at all (§4.5 step 4:
    /// captions only run "if... a transcription endpoint is configured").
    pub fn is_enabled(&self) -> bool {
        self.endpoint_url.is_some()
    }
}

pub struct TranscribeClient {
    http: Client,
    config: TranscribeConfig,
}

impl TranscribeClient {
    pub fn new(config: TranscribeConfig) -> Self {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build().expect("reqwest client build");
        Self { http, config }
    }

    /// Submit `audio_bytes` (mono MP3) for word-timestamped transcription.
    pub async fn transcribe(&self, audio_bytes: Vec<u8>, filename: &str) -> TranscribeResult<TranscriptionResponse> {
        let endpoint = self.config.endpoint_url.as_deref().ok_or(TranscribeError::NotConfigured)?;

        let part = Part::bytes(audio_bytes).file_name(filename.to_string()).mime_str("audio/mpeg").expect("static mime type");

        let form = Form::new()
            .part("file", part)
            .text("model", self.config.model.clone())
            .text("response_format", "verbose_json")
            .text("timestamp_granularities[]", "word")
            .text("language", "en")
            .text("temperature", "0");

        debug!(endpoint, "submitting transcription request");

        let mut request = self.http.post(endpoint).multipart(form);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%status, "transcription endpoint returned an error");
            return Err(TranscribeError::BadStatus {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: TranscriptionResponse = response.json().await?;

        if parsed.text.trim().is_empty() && parsed.words.as_ref().map(|w| w.is_empty()).unwrap_or(true) {
            return Err(TranscribeError::EmptyResponse);
        }

        Ok(parsed)
    }
}
