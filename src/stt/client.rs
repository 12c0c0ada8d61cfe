//! Remote speech-to-text collaborator.
//!
//! The service is a black box behind the [`SpeechRecognizer`] trait. The
//! bundled implementation speaks the OpenAI-style transcription endpoint:
//! multipart POST of a WAV payload, JSON `{"text": ...}` back.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::error::{PipelineError, Result};

/// What the recognizer made of one audio payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Recognition {
    /// Recognized speech; may be empty.
    Text(String),
    /// The service understood the stream but found no recognizable speech.
    NoSpeech,
}

/// Request or service failure while recognizing one payload.
#[derive(Debug, Error)]
pub enum RecognizeError {
    #[error("request timed out")]
    Timeout,

    #[error("request failed: {0}")]
    Transport(String),

    #[error("service returned {status}: {body}")]
    Http { status: u16, body: String },

    #[error("malformed service response: {0}")]
    Malformed(String),
}

/// Speech-to-text collaborator. `audio_wav` is a complete WAV payload; the
/// sample format travels in its header.
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    async fn recognize(&self, audio_wav: Vec<u8>)
        -> std::result::Result<Recognition, RecognizeError>;

    /// Recognizer name for logging.
    fn name(&self) -> &str;
}

/// Configuration for the remote transcription endpoint.
#[derive(Debug, Clone)]
pub struct RecognizerConfig {
    /// Full endpoint URL, e.g. `http://localhost:8000/v1/audio/transcriptions`.
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<String>,
    /// Per-request ceiling; the service has no latency bound of its own.
    pub timeout: Duration,
}

pub struct HttpRecognizer {
    config: RecognizerConfig,
    client: reqwest::Client,
}

impl HttpRecognizer {
    pub fn new(config: RecognizerConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PipelineError::invalid_configuration(format!("cannot build HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }
}

#[async_trait]
impl SpeechRecognizer for HttpRecognizer {
    async fn recognize(
        &self,
        audio_wav: Vec<u8>,
    ) -> std::result::Result<Recognition, RecognizeError> {
        let part = reqwest::multipart::Part::bytes(audio_wav)
            .file_name("segment.wav")
            .mime_str("audio/wav")
            .map_err(|e| RecognizeError::Transport(e.to_string()))?;

        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("model", self.config.model.clone());

        let mut request = self.client.post(&self.config.endpoint).multipart(form);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                RecognizeError::Timeout
            } else {
                RecognizeError::Transport(e.to_string())
            }
        })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(RecognizeError::Http { status, body });
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| RecognizeError::Malformed(e.to_string()))?;

        // The endpoint has no explicit "no speech" signal; a missing or
        // blank text field is treated as one.
        let text = json.get("text").and_then(|v| v.as_str()).unwrap_or("");

        debug!("Recognizer returned {} byte(s) of text", text.len());

        if text.trim().is_empty() {
            Ok(Recognition::NoSpeech)
        } else {
            Ok(Recognition::Text(text.to_string()))
        }
    }

    fn name(&self) -> &str {
        "http"
    }
}
