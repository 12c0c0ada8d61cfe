use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::config::JobConfig;
use super::events::{JobEvent, JobOutcome, Stage};
use super::transcript::Transcript;
use crate::audio::{AudioExtractor, MediaDecoder, Segmenter};
use crate::error::Result;
use crate::memory::{MemoryGuard, MemoryProbe, ProcessMemoryProbe};
use crate::stt::{SpeechRecognizer, TranscriptionCoordinator};
use crate::workspace::Workspace;

/// One transcription request. Owns the configuration, a fresh job id, and
/// the cancellation flag shared with any [`JobHandle`]s.
#[derive(Debug)]
pub struct Job {
    id: Uuid,
    config: JobConfig,
    cancelled: Arc<AtomicBool>,
}

impl Job {
    /// Validates the configuration; a job that cannot run is never created.
    pub fn new(config: JobConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            id: Uuid::new_v4(),
            config,
            cancelled: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn config(&self) -> &JobConfig {
        &self.config
    }

    /// Handle for requesting cancellation from another task.
    pub fn handle(&self) -> JobHandle {
        JobHandle {
            cancelled: Arc::clone(&self.cancelled),
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Cloneable cancellation handle. Cancellation is cooperative: the pipeline
/// notices it between segments, stops issuing work, and cleans up.
#[derive(Clone)]
pub struct JobHandle {
    cancelled: Arc<AtomicBool>,
}

impl JobHandle {
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Drives a job through extract -> segment -> transcribe, publishing ordered
/// progress events and guaranteeing workspace cleanup on every exit path.
pub struct PipelineRunner {
    decoder: Arc<dyn MediaDecoder>,
    recognizer: Arc<dyn SpeechRecognizer>,
    memory_probe: Arc<dyn MemoryProbe>,
}

impl PipelineRunner {
    pub fn new(decoder: Arc<dyn MediaDecoder>, recognizer: Arc<dyn SpeechRecognizer>) -> Self {
        Self {
            decoder,
            recognizer,
            memory_probe: Arc::new(ProcessMemoryProbe::new()),
        }
    }

    /// Replace the resident-memory probe. Tests use this to force a trip.
    pub fn with_memory_probe(mut self, probe: Arc<dyn MemoryProbe>) -> Self {
        self.memory_probe = probe;
        self
    }

    /// Run one job to its terminal state.
    ///
    /// Always removes the workspace and emits exactly one terminal event
    /// before returning, whatever path the job took. The returned outcome
    /// matches the terminal event's.
    pub async fn run(&self, job: Job, events: mpsc::Sender<JobEvent>) -> JobOutcome {
        let started_at = Utc::now();

        info!("Starting transcription job {} for {}", job.id, job.config.source.display());

        Self::emit(
            &events,
            JobEvent::Started {
                job_id: job.id,
                started_at,
            },
        )
        .await;

        let outcome = match Workspace::open(&job.config.workspace_root) {
            Ok(workspace) => {
                let outcome = self.execute(&job, &workspace, &events).await;
                workspace.close();
                outcome
            }
            Err(e) => JobOutcome::Aborted { error: e },
        };

        Self::emit(
            &events,
            JobEvent::Finished {
                outcome: outcome.clone(),
            },
        )
        .await;

        let elapsed = Utc::now().signed_duration_since(started_at);
        info!(
            "Job {} {} after {:.1}s",
            job.id,
            outcome.label(),
            elapsed.num_milliseconds() as f64 / 1000.0
        );

        outcome
    }

    async fn execute(
        &self,
        job: &Job,
        workspace: &Workspace,
        events: &mpsc::Sender<JobEvent>,
    ) -> JobOutcome {
        Self::emit(events, JobEvent::StageChanged { stage: Stage::Extracting }).await;

        let extractor = AudioExtractor::new(Arc::clone(&self.decoder));
        let artifact = match extractor.extract(&job.config.source, workspace) {
            Ok(artifact) => artifact,
            Err(e) => return JobOutcome::Aborted { error: e },
        };

        let guard = MemoryGuard::with_probe(
            Arc::clone(&self.memory_probe),
            job.config.memory_ceiling_bytes,
        );
        if let Err(e) = guard.check() {
            return JobOutcome::Aborted { error: e };
        }

        Self::emit(events, JobEvent::StageChanged { stage: Stage::Segmenting }).await;

        let mut segmenter =
            match Segmenter::open(&artifact, job.config.segment_duration, workspace, &guard) {
                Ok(segmenter) => segmenter,
                Err(e) => return JobOutcome::Aborted { error: e },
            };

        let segment_count = segmenter.segment_count();
        let mut transcript = Transcript::new();

        if segment_count == 0 {
            info!("Job {}: empty audio track, nothing to transcribe", job.id);
            segmenter.finish();
            return JobOutcome::Completed {
                transcript: transcript.snapshot(),
            };
        }

        Self::emit(events, JobEvent::StageChanged { stage: Stage::Transcribing }).await;

        let coordinator = TranscriptionCoordinator::new(
            Arc::clone(&self.recognizer),
            job.config.request_timeout,
        );

        loop {
            if job.is_cancelled() {
                info!("Job {} cancelled after {} segment(s)", job.id, transcript.len());
                return JobOutcome::Cancelled;
            }

            // Carving is lazy: the next slice is written only now, so at
            // most one unprocessed segment exists on disk.
            let segment = match segmenter.next() {
                Some(Ok(segment)) => segment,
                Some(Err(e)) => return JobOutcome::Aborted { error: e },
                None => break,
            };

            let result = coordinator.transcribe(&segment).await;
            transcript.push(result.index, &result.outcome);

            debug!(
                "Job {}: segment {}/{} done",
                job.id,
                result.index + 1,
                segment_count
            );

            Self::emit(
                events,
                JobEvent::SegmentCompleted {
                    result,
                    segment_count,
                    transcript: transcript.snapshot(),
                },
            )
            .await;
        }

        segmenter.finish();

        JobOutcome::Completed {
            transcript: transcript.snapshot(),
        }
    }

    /// Events are advisory; a consumer that went away never stalls the job.
    async fn emit(events: &mpsc::Sender<JobEvent>, event: JobEvent) {
        if events.send(event).await.is_err() {
            warn!("Event consumer dropped, continuing without progress reporting");
        }
    }
}
