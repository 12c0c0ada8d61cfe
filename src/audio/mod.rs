pub mod extract;
pub mod file;
pub mod segment;

pub use extract::{AudioExtractor, DecodedAudio, MediaDecoder, SymphoniaDecoder};
pub use file::AudioArtifact;
pub use segment::{Segment, Segmenter};
