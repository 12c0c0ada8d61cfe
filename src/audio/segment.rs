//! Splits an audio artifact into ordered, fixed-duration WAV segments.
//!
//! Segments are carved lazily, one per iterator step, so at most one
//! unprocessed slice exists on disk at a time and the source is streamed
//! rather than loaded whole. The memory guard is consulted before every
//! carve.

use hound::{WavReader, WavWriter};
use std::fs::{self, File};
use std::io::BufReader;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

use super::file::AudioArtifact;
use crate::error::{PipelineError, Result};
use crate::memory::MemoryGuard;
use crate::workspace::Workspace;

/// One ordered slice of the audio artifact, backed by its own WAV file.
#[derive(Debug, Clone)]
pub struct Segment {
    /// 0-based position; defines transcription order.
    pub index: usize,
    pub path: PathBuf,
    pub start_seconds: f64,
    /// Clamped to the artifact duration for the final segment.
    pub end_seconds: f64,
    /// Samples per channel in this slice.
    pub frames: u64,
    pub sample_rate: u32,
}

pub struct Segmenter<'a> {
    reader: WavReader<BufReader<File>>,
    spec: hound::WavSpec,
    source_path: PathBuf,
    output_dir: PathBuf,
    guard: &'a MemoryGuard,
    total_frames: u64,
    frames_per_segment: u64,
    segment_count: usize,
    next_index: usize,
}

impl std::fmt::Debug for Segmenter<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Segmenter")
            .field("spec", &self.spec)
            .field("source_path", &self.source_path)
            .field("output_dir", &self.output_dir)
            .field("total_frames", &self.total_frames)
            .field("frames_per_segment", &self.frames_per_segment)
            .field("segment_count", &self.segment_count)
            .field("next_index", &self.next_index)
            .finish_non_exhaustive()
    }
}

impl<'a> Segmenter<'a> {
    /// Plan the split of `artifact` into `ceil(duration / segment_duration)`
    /// slices written under `workspace`.
    ///
    /// Fails with `InvalidConfiguration` unless `segment_duration` is a
    /// positive duration.
    pub fn open(
        artifact: &AudioArtifact,
        segment_duration: Duration,
        workspace: &Workspace,
        guard: &'a MemoryGuard,
    ) -> Result<Self> {
        if segment_duration.is_zero() {
            return Err(PipelineError::invalid_configuration(
                "segment duration must be positive",
            ));
        }

        let frames_per_segment =
            (segment_duration.as_secs_f64() * f64::from(artifact.sample_rate)).round() as u64;
        if frames_per_segment == 0 {
            return Err(PipelineError::invalid_configuration(format!(
                "segment duration {:?} is shorter than one sample at {}Hz",
                segment_duration, artifact.sample_rate
            )));
        }

        let reader = WavReader::open(&artifact.path)
            .map_err(|e| PipelineError::segmentation(0, format!("cannot open audio artifact: {}", e)))?;
        let spec = reader.spec();
        let total_frames = u64::from(reader.duration());

        let segment_count = total_frames.div_ceil(frames_per_segment) as usize;

        info!(
            "Segmenting {:.1}s of audio into {} segment(s) of up to {:.0}s",
            artifact.duration_seconds(),
            segment_count,
            segment_duration.as_secs_f64()
        );

        Ok(Self {
            reader,
            spec,
            source_path: artifact.path.clone(),
            output_dir: workspace.dir().to_path_buf(),
            guard,
            total_frames,
            frames_per_segment,
            segment_count,
            next_index: 0,
        })
    }

    /// Number of segments this split will produce.
    pub fn segment_count(&self) -> usize {
        self.segment_count
    }

    /// Delete the exhausted source artifact. Best-effort; the workspace
    /// sweep covers anything left behind.
    pub fn finish(self) {
        let Self {
            reader,
            source_path,
            ..
        } = self;
        drop(reader);

        match fs::remove_file(&source_path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(
                "Failed to remove audio artifact {}: {}",
                source_path.display(),
                e
            ),
        }
    }

    fn carve_next(&mut self) -> Result<Segment> {
        self.guard.check()?;

        let index = self.next_index;
        let start_frame = index as u64 * self.frames_per_segment;
        let end_frame = (start_frame + self.frames_per_segment).min(self.total_frames);
        let frames = end_frame - start_frame;
        let samples = frames * u64::from(self.spec.channels);

        let path = self.output_dir.join(format!("segment-{:03}.wav", index));

        let mut writer = WavWriter::create(&path, self.spec)
            .map_err(|e| PipelineError::segmentation(index, format!("cannot create segment file: {}", e)))?;

        let mut written: u64 = 0;
        for sample in self.reader.samples::<i16>().take(samples as usize) {
            let sample = sample
                .map_err(|e| PipelineError::segmentation(index, format!("cannot read source samples: {}", e)))?;
            writer
                .write_sample(sample)
                .map_err(|e| PipelineError::segmentation(index, format!("cannot write segment file: {}", e)))?;
            written += 1;
        }

        if written != samples {
            return Err(PipelineError::segmentation(
                index,
                format!("source ended early: expected {} samples, read {}", samples, written),
            ));
        }

        writer
            .finalize()
            .map_err(|e| PipelineError::segmentation(index, format!("cannot finalize segment file: {}", e)))?;

        self.next_index += 1;

        Ok(Segment {
            index,
            path,
            start_seconds: start_frame as f64 / f64::from(self.spec.sample_rate),
            end_seconds: end_frame as f64 / f64::from(self.spec.sample_rate),
            frames,
            sample_rate: self.spec.sample_rate,
        })
    }
}

impl Iterator for Segmenter<'_> {
    type Item = Result<Segment>;

    /// Yields segments strictly in index order. The first error ends the
    /// split; no further segments are produced after a failed carve.
    fn next(&mut self) -> Option<Self::Item> {
        if self.next_index >= self.segment_count {
            return None;
        }

        match self.carve_next() {
            Ok(segment) => Some(Ok(segment)),
            Err(e) => {
                self.next_index = self.segment_count;
                Some(Err(e))
            }
        }
    }
}
