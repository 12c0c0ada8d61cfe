use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{PipelineError, Result};

/// Configuration for a transcription job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobConfig {
    /// Input video (or audio) file to transcribe
    pub source: PathBuf,

    /// Target duration of each audio segment
    /// Default: 600 seconds (10 minutes)
    pub segment_duration: Duration,

    /// Resident-memory ceiling for the whole job, in bytes
    /// Default: 1 GiB
    pub memory_ceiling_bytes: u64,

    /// Directory under which the job's temporary workspace is created
    pub workspace_root: PathBuf,

    /// Ceiling on each speech-to-text request
    pub request_timeout: Duration,
}

impl JobConfig {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            segment_duration: Duration::from_secs(600),
            memory_ceiling_bytes: 1024 * 1024 * 1024, // 1 GiB
            workspace_root: PathBuf::from("./temp"),
            request_timeout: Duration::from_secs(60),
        }
    }

    /// Reject unusable settings before any resource is acquired.
    pub fn validate(&self) -> Result<()> {
        if self.segment_duration.is_zero() {
            return Err(PipelineError::invalid_configuration(
                "segment duration must be positive",
            ));
        }

        if self.memory_ceiling_bytes == 0 {
            return Err(PipelineError::invalid_configuration(
                "memory ceiling must be positive",
            ));
        }

        if self.workspace_root.as_os_str().is_empty() {
            return Err(PipelineError::invalid_configuration(
                "workspace root must not be empty",
            ));
        }

        if self.request_timeout.is_zero() {
            return Err(PipelineError::invalid_configuration(
                "request timeout must be positive",
            ));
        }

        Ok(())
    }
}
