//! Speech-to-text: the remote recognizer collaborator and the per-segment
//! coordinator that classifies its outcomes.

pub mod client;
pub mod coordinator;

pub use client::{HttpRecognizer, Recognition, RecognizeError, RecognizerConfig, SpeechRecognizer};
pub use coordinator::{SegmentResult, TranscriptionCoordinator, TranscriptionOutcome};
