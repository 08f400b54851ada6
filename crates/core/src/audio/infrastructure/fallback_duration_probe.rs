use std::path::Path;

use crate::audio::domain::audio_error::AudioError;
use crate::audio::domain::duration_probe::DurationProbe;

/// Tries `primary`, and asks `fallback` when it fails.
pub struct FallbackDurationProbe {
    primary: Box<dyn DurationProbe>,
    fallback: Box<dyn DurationProbe>,
}

impl FallbackDurationProbe {
    pub fn new(primary: Box<dyn DurationProbe>, fallback: Box<dyn DurationProbe>) -> Self {
        Self { primary, fallback }
    }
}

impl DurationProbe for FallbackDurationProbe {
    fn duration(&self, audio: &Path) -> Result<f64, AudioError> {
        match self.primary.duration(audio) {
            Ok(seconds) => Ok(seconds),
            Err(e) => {
                log::info!("{e}; trying fallback duration probe");
                self.fallback.duration(audio)
            }
        }
    }
}
