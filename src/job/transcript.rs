use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::stt::TranscriptionOutcome;

/// Rendered in place of a segment with no recognizable speech.
pub const INAUDIBLE_PLACEHOLDER: &str = "[inaudible]";

/// Rendered in place of a segment whose transcription request failed.
pub const FAILED_PLACEHOLDER: &str = "[transcription failed]";

/// One segment's contribution to the transcript
#[derive(Debug, Clone, Serialize)]
pub struct TranscriptPiece {
    pub index: usize,
    pub text: String,
    pub recorded_at: DateTime<Utc>,
}

/// Append-only transcript assembled while the job runs.
///
/// Pieces arrive strictly in segment order; the snapshot taken after segment
/// `i` contains exactly the text for segments `0..=i` and nothing beyond.
#[derive(Debug, Default)]
pub struct Transcript {
    pieces: Vec<TranscriptPiece>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record segment `index`'s outcome, rendering sentinels as visible
    /// placeholder text.
    pub fn push(&mut self, index: usize, outcome: &TranscriptionOutcome) {
        debug_assert_eq!(index, self.pieces.len(), "outcomes must arrive in segment order");

        let text = match outcome {
            TranscriptionOutcome::Recognized(text) => text.clone(),
            TranscriptionOutcome::Inaudible => INAUDIBLE_PLACEHOLDER.to_string(),
            TranscriptionOutcome::ServiceError { .. } => FAILED_PLACEHOLDER.to_string(),
        };

        self.pieces.push(TranscriptPiece {
            index,
            text,
            recorded_at: Utc::now(),
        });
    }

    /// Immutable snapshot of everything recorded so far.
    pub fn snapshot(&self) -> String {
        self.pieces
            .iter()
            .map(|p| p.text.as_str())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn pieces(&self) -> &[TranscriptPiece] {
        &self.pieces
    }

    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }
}
