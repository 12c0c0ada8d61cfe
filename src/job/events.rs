use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::PipelineError;
use crate::stt::SegmentResult;

/// Pipeline stage, in forward order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Stage {
    Extracting,
    Segmenting,
    Transcribing,
}

/// How a job ended. Reported exactly once, after workspace cleanup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum JobOutcome {
    /// All segments processed; the transcript may contain placeholders for
    /// segments that failed individually.
    Completed { transcript: String },
    /// A stage-level failure stopped the job. Terminal and irreversible;
    /// retrying means starting a new job.
    Aborted { error: PipelineError },
    /// The caller requested cancellation between segments.
    Cancelled,
}

impl JobOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            JobOutcome::Completed { .. } => "completed",
            JobOutcome::Aborted { .. } => "aborted",
            JobOutcome::Cancelled => "cancelled",
        }
    }
}

/// Ordered progress events published while a job runs.
///
/// Consumers see `Started`, then stage changes and per-segment completions
/// in segment order, then exactly one `Finished`. Transcript snapshots only
/// ever grow; a later snapshot never un-says an earlier segment's text.
#[derive(Debug, Clone, Serialize)]
pub enum JobEvent {
    Started {
        job_id: Uuid,
        started_at: DateTime<Utc>,
    },
    StageChanged {
        stage: Stage,
    },
    SegmentCompleted {
        result: SegmentResult,
        segment_count: usize,
        /// Snapshot of the transcript including this segment.
        transcript: String,
    },
    Finished {
        outcome: JobOutcome,
    },
}
