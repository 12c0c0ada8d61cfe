//! Per-segment transcription with partial-failure tolerance.

use serde::Serialize;
use std::fs;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{info, warn};

use super::client::{Recognition, SpeechRecognizer};
use crate::audio::Segment;

/// Result of one segment's transcription attempt.
///
/// `Inaudible` and `ServiceError` are sentinels, not errors: one bad segment
/// never aborts the job. They render as visible placeholders in the
/// transcript.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TranscriptionOutcome {
    Recognized(String),
    Inaudible,
    ServiceError { message: String },
}

/// An outcome tagged with the segment it belongs to, so results can be
/// reassembled in order even if transcription is ever parallelized.
#[derive(Debug, Clone, Serialize)]
pub struct SegmentResult {
    pub index: usize,
    pub start_seconds: f64,
    pub end_seconds: f64,
    pub outcome: TranscriptionOutcome,
}

/// Drives the speech-to-text collaborator for one segment at a time.
pub struct TranscriptionCoordinator {
    recognizer: Arc<dyn SpeechRecognizer>,
    request_timeout: Duration,
}

impl TranscriptionCoordinator {
    pub fn new(recognizer: Arc<dyn SpeechRecognizer>, request_timeout: Duration) -> Self {
        Self {
            recognizer,
            request_timeout,
        }
    }

    /// Transcribe one segment. Infallible by contract: every call produces
    /// an outcome. The segment's backing file is deleted afterward whether
    /// or not recognition succeeded, so processed slices never accumulate.
    pub async fn transcribe(&self, segment: &Segment) -> SegmentResult {
        let outcome = self.attempt(segment).await;

        match &outcome {
            TranscriptionOutcome::Recognized(text) => info!(
                "Segment {} transcribed ({} chars)",
                segment.index,
                text.len()
            ),
            TranscriptionOutcome::Inaudible => {
                info!("Segment {} contained no recognizable speech", segment.index)
            }
            TranscriptionOutcome::ServiceError { message } => warn!(
                "Segment {} transcription failed: {}",
                segment.index, message
            ),
        }

        match fs::remove_file(&segment.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(
                "Failed to remove segment {}: {}",
                segment.path.display(),
                e
            ),
        }

        SegmentResult {
            index: segment.index,
            start_seconds: segment.start_seconds,
            end_seconds: segment.end_seconds,
            outcome,
        }
    }

    async fn attempt(&self, segment: &Segment) -> TranscriptionOutcome {
        let audio = match fs::read(&segment.path) {
            Ok(bytes) => bytes,
            Err(e) => {
                return TranscriptionOutcome::ServiceError {
                    message: format!("cannot read segment payload: {}", e),
                }
            }
        };

        match timeout(self.request_timeout, self.recognizer.recognize(audio)).await {
            Ok(Ok(Recognition::Text(text))) => TranscriptionOutcome::Recognized(text),
            Ok(Ok(Recognition::NoSpeech)) => TranscriptionOutcome::Inaudible,
            Ok(Err(e)) => TranscriptionOutcome::ServiceError {
                message: e.to_string(),
            },
            Err(_) => TranscriptionOutcome::ServiceError {
                message: format!(
                    "no response from {} within {:?}",
                    self.recognizer.name(),
                    self.request_timeout
                ),
            },
        }
    }
}
