// Integration tests for audio segmentation
//
// These verify the partition law: splitting a D-second artifact with
// segment duration S yields ceil(D/S) segments with contiguous indices
// that cover [0, D) exactly, no gaps, no overlaps.

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use transcribo::{
    AudioArtifact, MemoryGuard, MemoryProbe, PipelineError, Segment, Segmenter, Workspace,
};

const SAMPLE_RATE: u32 = 16_000;

struct FixedProbe(u64);

impl MemoryProbe for FixedProbe {
    fn resident_bytes(&self) -> u64 {
        self.0
    }
}

fn relaxed_guard() -> MemoryGuard {
    MemoryGuard::with_probe(Arc::new(FixedProbe(0)), 1024 * 1024 * 1024)
}

fn write_fixture(path: &Path, seconds: f64) -> Result<AudioArtifact> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec)?;
    let frames = (seconds * f64::from(SAMPLE_RATE)).round() as u64;
    for i in 0..frames {
        writer.write_sample((i % 100) as i16 - 50)?;
    }
    writer.finalize()?;

    Ok(AudioArtifact::open(path)?)
}

fn collect_segments(segmenter: Segmenter<'_>) -> Result<Vec<Segment>> {
    let mut segments = Vec::new();
    for step in segmenter {
        segments.push(step?);
    }
    Ok(segments)
}

#[test]
fn test_150s_audio_with_60s_segments_yields_three() -> Result<()> {
    let root = TempDir::new()?;
    let workspace = Workspace::open(root.path())?;
    let artifact = write_fixture(&root.path().join("audio.wav"), 150.0)?;
    let guard = relaxed_guard();

    let segmenter = Segmenter::open(&artifact, Duration::from_secs(60), &workspace, &guard)?;
    assert_eq!(segmenter.segment_count(), 3);

    let segments = collect_segments(segmenter)?;

    assert_eq!(segments.len(), 3);
    let spans: Vec<(f64, f64)> = segments.iter().map(|s| (s.start_seconds, s.end_seconds)).collect();
    assert_eq!(spans, vec![(0.0, 60.0), (60.0, 120.0), (120.0, 150.0)]);

    Ok(())
}

#[test]
fn test_indices_are_contiguous_and_ordered() -> Result<()> {
    let root = TempDir::new()?;
    let workspace = Workspace::open(root.path())?;
    let artifact = write_fixture(&root.path().join("audio.wav"), 5.0)?;
    let guard = relaxed_guard();

    let segmenter = Segmenter::open(&artifact, Duration::from_secs(2), &workspace, &guard)?;
    let segments = collect_segments(segmenter)?;

    assert_eq!(segments.len(), 3);
    for (expected, segment) in segments.iter().enumerate() {
        assert_eq!(segment.index, expected);
    }

    Ok(())
}

#[test]
fn test_segments_partition_the_artifact_exactly() -> Result<()> {
    let root = TempDir::new()?;
    let workspace = Workspace::open(root.path())?;
    let artifact = write_fixture(&root.path().join("audio.wav"), 5.0)?;
    let guard = relaxed_guard();

    let segmenter = Segmenter::open(&artifact, Duration::from_secs(2), &workspace, &guard)?;
    let segments = collect_segments(segmenter)?;

    // No gaps, no overlaps: each segment starts where the previous ended.
    let mut cursor = 0.0;
    for segment in &segments {
        assert!((segment.start_seconds - cursor).abs() < f64::EPSILON);
        cursor = segment.end_seconds;
    }
    assert!((cursor - artifact.duration_seconds()).abs() < f64::EPSILON);

    // Frame counts cover the source exactly.
    let total: u64 = segments.iter().map(|s| s.frames).sum();
    assert_eq!(total, artifact.total_frames);

    // Each backing file holds exactly its segment's frames.
    for segment in &segments {
        let reader = hound::WavReader::open(&segment.path)?;
        assert_eq!(u64::from(reader.duration()), segment.frames);
        assert_eq!(reader.spec().sample_rate, SAMPLE_RATE);
    }

    Ok(())
}

#[test]
fn test_segment_payload_matches_source_range() -> Result<()> {
    let root = TempDir::new()?;
    let workspace = Workspace::open(root.path())?;
    let artifact = write_fixture(&root.path().join("audio.wav"), 3.0)?;
    let guard = relaxed_guard();

    let segmenter = Segmenter::open(&artifact, Duration::from_secs(1), &workspace, &guard)?;
    let segments = collect_segments(segmenter)?;

    // Second segment starts at frame 16_000 of the (i % 100) - 50 ramp.
    let mut reader = hound::WavReader::open(&segments[1].path)?;
    let first: i16 = reader.samples::<i16>().next().unwrap()?;
    assert_eq!(first, (16_000 % 100) as i16 - 50);

    Ok(())
}

#[test]
fn test_even_division_has_no_empty_trailing_segment() -> Result<()> {
    let root = TempDir::new()?;
    let workspace = Workspace::open(root.path())?;
    let artifact = write_fixture(&root.path().join("audio.wav"), 4.0)?;
    let guard = relaxed_guard();

    let segmenter = Segmenter::open(&artifact, Duration::from_secs(2), &workspace, &guard)?;
    assert_eq!(segmenter.segment_count(), 2, "4s / 2s is exactly 2 segments");

    let segments = collect_segments(segmenter)?;
    assert_eq!(segments.len(), 2);
    assert!(segments.iter().all(|s| s.frames > 0));

    Ok(())
}

#[test]
fn test_zero_duration_audio_yields_no_segments() -> Result<()> {
    let root = TempDir::new()?;
    let workspace = Workspace::open(root.path())?;
    let artifact = write_fixture(&root.path().join("audio.wav"), 0.0)?;
    let guard = relaxed_guard();

    let mut segmenter = Segmenter::open(&artifact, Duration::from_secs(60), &workspace, &guard)?;

    assert_eq!(segmenter.segment_count(), 0);
    assert!(segmenter.next().is_none());

    Ok(())
}

#[test]
fn test_zero_segment_duration_is_rejected() -> Result<()> {
    let root = TempDir::new()?;
    let workspace = Workspace::open(root.path())?;
    let artifact = write_fixture(&root.path().join("audio.wav"), 2.0)?;
    let guard = relaxed_guard();

    let err = Segmenter::open(&artifact, Duration::ZERO, &workspace, &guard).unwrap_err();

    assert!(matches!(err, PipelineError::InvalidConfiguration { .. }), "got {:?}", err);

    Ok(())
}

#[test]
fn test_memory_trip_aborts_the_split() -> Result<()> {
    let root = TempDir::new()?;
    let workspace = Workspace::open(root.path())?;
    let artifact = write_fixture(&root.path().join("audio.wav"), 5.0)?;

    // Probe reports more than the ceiling on every check.
    let guard = MemoryGuard::with_probe(Arc::new(FixedProbe(2_000_000)), 1_000_000);

    let mut segmenter = Segmenter::open(&artifact, Duration::from_secs(2), &workspace, &guard)?;

    match segmenter.next() {
        Some(Err(PipelineError::MemoryExceeded { used_bytes, ceiling_bytes })) => {
            assert_eq!(used_bytes, 2_000_000);
            assert_eq!(ceiling_bytes, 1_000_000);
        }
        other => panic!("expected MemoryExceeded, got {:?}", other.map(|r| r.map(|s| s.index))),
    }

    // A failed split never resumes.
    assert!(segmenter.next().is_none());

    Ok(())
}

#[test]
fn test_finish_removes_the_source_artifact() -> Result<()> {
    let root = TempDir::new()?;
    let workspace = Workspace::open(root.path())?;
    let artifact = write_fixture(&root.path().join("audio.wav"), 2.0)?;
    let guard = relaxed_guard();

    let mut segmenter = Segmenter::open(&artifact, Duration::from_secs(1), &workspace, &guard)?;
    while let Some(step) = segmenter.next() {
        step?;
    }
    segmenter.finish();

    assert!(!artifact.path.exists(), "source artifact should be deleted after the split");

    Ok(())
}
