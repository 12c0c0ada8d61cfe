//! Error types for the transcription pipeline.

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Stage-level failures. Any of these aborts the whole job.
///
/// Per-segment recognition failures are not errors; they are recorded as
/// [`crate::stt::TranscriptionOutcome`] sentinels and the job advances.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
pub enum PipelineError {
    #[error("source file not found: {path}")]
    SourceNotFound { path: PathBuf },

    #[error("failed to decode {path}: {message}")]
    Decode { path: PathBuf, message: String },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("failed to produce segment {index}: {message}")]
    Segmentation { index: usize, message: String },

    #[error("memory ceiling exceeded: {used_bytes} bytes resident, ceiling {ceiling_bytes}")]
    MemoryExceeded { used_bytes: u64, ceiling_bytes: u64 },
}

impl PipelineError {
    pub fn decode(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::Decode {
            path: path.into(),
            message: message.to_string(),
        }
    }

    pub fn invalid_configuration(message: impl ToString) -> Self {
        Self::InvalidConfiguration {
            message: message.to_string(),
        }
    }

    pub fn segmentation(index: usize, message: impl ToString) -> Self {
        Self::Segmentation {
            index,
            message: message.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
