pub mod audio;
pub mod config;
pub mod error;
pub mod job;
pub mod memory;
pub mod stt;
pub mod workspace;

pub use audio::{
    AudioArtifact, AudioExtractor, DecodedAudio, MediaDecoder, Segment, Segmenter,
    SymphoniaDecoder,
};
pub use config::Config;
pub use error::PipelineError;
pub use job::{
    Job, JobConfig, JobEvent, JobHandle, JobOutcome, PipelineRunner, Stage, Transcript,
    TranscriptPiece, FAILED_PLACEHOLDER, INAUDIBLE_PLACEHOLDER,
};
pub use memory::{MemoryGuard, MemoryProbe, ProcessMemoryProbe};
pub use stt::{
    HttpRecognizer, Recognition, RecognizeError, RecognizerConfig, SegmentResult,
    SpeechRecognizer, TranscriptionCoordinator, TranscriptionOutcome,
};
pub use workspace::Workspace;
