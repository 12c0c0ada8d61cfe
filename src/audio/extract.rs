//! Audio track extraction from video/audio containers.
//!
//! The decoder is an external collaborator behind the [`MediaDecoder`] trait;
//! the bundled implementation drives symphonia. Whatever the container, the
//! output is one mono 16-bit PCM WAV artifact in the job workspace.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{info, warn};
use uuid::Uuid;

use super::file::AudioArtifact;
use crate::error::{PipelineError, Result};
use crate::workspace::Workspace;

/// Recognizers work best at or below this rate; higher-rate sources are
/// decimated toward it.
const TARGET_SAMPLE_RATE: u32 = 16_000;

/// What a decoder produced at the output path.
#[derive(Debug, Clone, Copy)]
pub struct DecodedAudio {
    pub sample_rate: u32,
    /// Mono samples written.
    pub frames: u64,
}

/// External media decoder collaborator.
///
/// Implementations decode the default audio track of `input` and write it to
/// `output` as mono 16-bit PCM WAV. All decoder resources must be released
/// by the time the call returns.
pub trait MediaDecoder: Send + Sync {
    fn decode(&self, input: &Path, output: &Path) -> Result<DecodedAudio>;

    /// Decoder name for logging.
    fn name(&self) -> &str;
}

/// Symphonia-backed decoder: probes the container, decodes the first real
/// audio track, downmixes to mono, and decimates toward 16 kHz.
#[derive(Debug, Default)]
pub struct SymphoniaDecoder;

impl SymphoniaDecoder {
    fn open_output(output: &Path, sample_rate: u32) -> Result<hound::WavWriter<std::io::BufWriter<File>>> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        hound::WavWriter::create(output, spec)
            .map_err(|e| PipelineError::decode(output, format!("cannot create audio artifact: {}", e)))
    }
}

impl MediaDecoder for SymphoniaDecoder {
    fn decode(&self, input: &Path, output: &Path) -> Result<DecodedAudio> {
        let source = File::open(input).map_err(|e| PipelineError::decode(input, e))?;
        let stream = MediaSourceStream::new(Box::new(source), Default::default());

        let mut hint = Hint::new();
        if let Some(ext) = input.extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                stream,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| PipelineError::decode(input, format!("unsupported container: {}", e)))?;

        let mut format = probed.format;

        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| PipelineError::decode(input, "no audio track in container"))?;
        let track_id = track.id;

        let mut decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| PipelineError::decode(input, format!("unsupported codec: {}", e)))?;

        let mut writer: Option<hound::WavWriter<_>> = None;
        let mut sample_buf: Option<SampleBuffer<i16>> = None;
        let mut channels: usize = 1;
        let mut step: u64 = 1;
        let mut out_rate = TARGET_SAMPLE_RATE;
        let mut frame_pos: u64 = 0;
        let mut frames_written: u64 = 0;

        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                // End of stream.
                Err(SymphoniaError::IoError(e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    break
                }
                Err(SymphoniaError::ResetRequired) => break,
                Err(e) => return Err(PipelineError::decode(input, e)),
            };

            if packet.track_id() != track_id {
                continue;
            }

            let decoded = match decoder.decode(&packet) {
                Ok(decoded) => decoded,
                // A malformed packet is not fatal; skip it.
                Err(SymphoniaError::DecodeError(e)) => {
                    warn!("Skipping malformed packet in {}: {}", input.display(), e);
                    continue;
                }
                Err(e) => return Err(PipelineError::decode(input, e)),
            };

            if sample_buf.is_none() {
                let spec = *decoded.spec();
                channels = spec.channels.count().max(1);
                // Integer decimation only; sources at or below the target
                // rate pass through untouched.
                step = u64::from((spec.rate / TARGET_SAMPLE_RATE).max(1));
                out_rate = spec.rate / step as u32;
                sample_buf = Some(SampleBuffer::<i16>::new(decoded.capacity() as u64, spec));
                writer = Some(Self::open_output(output, out_rate)?);
            }

            let (Some(buf), Some(out)) = (sample_buf.as_mut(), writer.as_mut()) else {
                continue;
            };
            buf.copy_interleaved_ref(decoded);

            for frame in buf.samples().chunks(channels) {
                let keep = frame_pos % step == 0;
                frame_pos += 1;
                if !keep {
                    continue;
                }

                let sum: i64 = frame.iter().map(|&s| i64::from(s)).sum();
                let mono = (sum / frame.len() as i64) as i16;

                out.write_sample(mono)
                    .map_err(|e| PipelineError::decode(output, format!("cannot write audio artifact: {}", e)))?;
                frames_written += 1;
            }
        }

        // A track with no decodable frames still yields a valid empty artifact.
        let writer = match writer {
            Some(writer) => writer,
            None => Self::open_output(output, out_rate)?,
        };
        writer
            .finalize()
            .map_err(|e| PipelineError::decode(output, format!("cannot finalize audio artifact: {}", e)))?;

        Ok(DecodedAudio {
            sample_rate: out_rate,
            frames: frames_written,
        })
    }

    fn name(&self) -> &str {
        "symphonia"
    }
}

/// Pulls the audio track out of an input file into a fresh workspace
/// artifact.
pub struct AudioExtractor {
    decoder: Arc<dyn MediaDecoder>,
}

impl AudioExtractor {
    pub fn new(decoder: Arc<dyn MediaDecoder>) -> Self {
        Self { decoder }
    }

    /// Decode `source` into a new mono WAV artifact inside `workspace`.
    ///
    /// Writes exactly one new file on success. Fails with `SourceNotFound`
    /// when the path does not resolve to a readable file, `Decode` for any
    /// decoder failure.
    pub fn extract(&self, source: &Path, workspace: &Workspace) -> Result<AudioArtifact> {
        if !source.is_file() {
            return Err(PipelineError::SourceNotFound {
                path: source.to_path_buf(),
            });
        }

        let output = workspace.artifact_path(format!("audio-{}.wav", Uuid::new_v4()));

        info!(
            "Extracting audio from {} via {}",
            source.display(),
            self.decoder.name()
        );

        let decoded = self.decoder.decode(source, &output)?;

        let artifact = AudioArtifact {
            path: output,
            sample_rate: decoded.sample_rate,
            channels: 1,
            total_frames: decoded.frames,
        };

        info!(
            "Audio extracted: {:.1}s at {}Hz -> {}",
            artifact.duration_seconds(),
            artifact.sample_rate,
            artifact.path.display()
        );

        Ok(artifact)
    }
}
