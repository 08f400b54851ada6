use std::path::Path;

use super::transcript::Transcript;
use super::transcript_error::TranscriptError;

/// Domain interface for loading a speaker-turn transcript.
pub trait TranscriptReader: Send {
    fn read(&self, path: &Path) -> Result<Transcript, TranscriptError>;
}
