use std::path::Path;

use super::audio_error::AudioError;

/// Measures the length of a sound file in seconds, rounded to milliseconds.
pub trait DurationProbe: Send + Sync {
    fn duration(&self, audio: &Path) -> Result<f64, AudioError>;
}
