use hound::WavReader;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{PipelineError, Result};

/// A file-backed decoded audio track: mono 16-bit PCM WAV with a known
/// duration. Produced by the extractor, consumed by the segmenter.
#[derive(Debug, Clone)]
pub struct AudioArtifact {
    pub path: PathBuf,
    pub sample_rate: u32,
    pub channels: u16,
    /// Samples per channel.
    pub total_frames: u64,
}

impl AudioArtifact {
    /// Read artifact metadata from the WAV header without touching the
    /// sample data.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let reader = WavReader::open(path)
            .map_err(|e| PipelineError::decode(path, format!("not a readable WAV file: {}", e)))?;

        let spec = reader.spec();
        let total_frames = u64::from(reader.duration());

        let artifact = Self {
            path: path.to_path_buf(),
            sample_rate: spec.sample_rate,
            channels: spec.channels,
            total_frames,
        };

        info!(
            "Audio artifact: {:.1}s, {}Hz, {} channel(s), {} frames",
            artifact.duration_seconds(),
            artifact.sample_rate,
            artifact.channels,
            artifact.total_frames
        );

        Ok(artifact)
    }

    pub fn duration_seconds(&self) -> f64 {
        self.total_frames as f64 / f64::from(self.sample_rate)
    }
}
