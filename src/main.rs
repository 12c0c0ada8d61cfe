use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{info, warn};

use transcribo::{
    Config, HttpRecognizer, Job, JobEvent, JobOutcome, PipelineRunner, SymphoniaDecoder,
    TranscriptionOutcome, FAILED_PLACEHOLDER, INAUDIBLE_PLACEHOLDER,
};

/// Video to text transcription
#[derive(Parser, Debug)]
#[command(name = "transcribo", version)]
struct Args {
    /// Video or audio file to transcribe
    source: PathBuf,

    /// Configuration file (see config/transcribo.toml)
    #[arg(short, long)]
    config: Option<String>,

    /// Override segment duration, in seconds
    #[arg(long)]
    segment_duration: Option<u64>,

    /// Override memory ceiling, in MiB
    #[arg(long)]
    memory_ceiling: Option<u64>,

    /// Override workspace root directory
    #[arg(long)]
    workspace: Option<PathBuf>,

    /// Emit progress events as JSON lines
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => {
            Config::load(path).with_context(|| format!("failed to load config from {}", path))?
        }
        None => Config::default(),
    };

    let mut job_config = config.job_config(&args.source);
    if let Some(secs) = args.segment_duration {
        job_config.segment_duration = Duration::from_secs(secs);
    }
    if let Some(mib) = args.memory_ceiling {
        job_config.memory_ceiling_bytes = mib * 1024 * 1024;
    }
    if let Some(root) = args.workspace {
        job_config.workspace_root = root;
    }

    let recognizer = HttpRecognizer::new(config.recognizer_config())?;
    let runner = PipelineRunner::new(Arc::new(SymphoniaDecoder), Arc::new(recognizer));

    let job = Job::new(job_config)?;
    let handle = job.handle();

    // Ctrl-C requests cooperative cancellation; the pipeline stops between
    // segments and cleans up its workspace.
    tokio::spawn({
        let handle = handle.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Cancellation requested, stopping after the current segment");
                handle.cancel();
            }
        }
    });

    let (tx, mut rx) = mpsc::channel(64);
    let runner_task = tokio::spawn(async move { runner.run(job, tx).await });

    while let Some(event) = rx.recv().await {
        if args.json {
            println!("{}", serde_json::to_string(&event)?);
            continue;
        }

        match event {
            JobEvent::Started { job_id, .. } => info!("Job {} started", job_id),
            JobEvent::StageChanged { stage } => info!("Stage: {:?}", stage),
            JobEvent::SegmentCompleted {
                result,
                segment_count,
                ..
            } => {
                let text = match &result.outcome {
                    TranscriptionOutcome::Recognized(text) => text.as_str(),
                    TranscriptionOutcome::Inaudible => INAUDIBLE_PLACEHOLDER,
                    TranscriptionOutcome::ServiceError { .. } => FAILED_PLACEHOLDER,
                };
                info!(
                    "Segment {}/{} [{:.0}s - {:.0}s]",
                    result.index + 1,
                    segment_count,
                    result.start_seconds,
                    result.end_seconds
                );
                println!("{}", text);
            }
            JobEvent::Finished { .. } => {}
        }
    }

    match runner_task.await? {
        JobOutcome::Completed { transcript } => {
            if !args.json {
                println!("\n--- transcript ---\n{}", transcript);
            }
            Ok(())
        }
        JobOutcome::Aborted { error } => Err(error.into()),
        JobOutcome::Cancelled => {
            info!("Job cancelled");
            Ok(())
        }
    }
}
