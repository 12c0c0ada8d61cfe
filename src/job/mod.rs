//! Job orchestration
//!
//! This module provides the per-request pipeline driver:
//! - `JobConfig` / `Job`: one validated transcription request
//! - `PipelineRunner`: extract -> segment -> transcribe state machine
//! - `JobEvent`: the ordered progress stream consumed by the caller
//! - `Transcript`: append-only assembly of per-segment outcomes

mod config;
mod events;
mod runner;
mod transcript;

pub use config::JobConfig;
pub use events::{JobEvent, JobOutcome, Stage};
pub use runner::{Job, JobHandle, PipelineRunner};
pub use transcript::{Transcript, TranscriptPiece, FAILED_PLACEHOLDER, INAUDIBLE_PLACEHOLDER};
