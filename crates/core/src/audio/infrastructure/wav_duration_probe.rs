use std::path::Path;

use hound::WavReader;

use crate::audio::domain::audio_error::AudioError;
use crate::audio::domain::duration_probe::DurationProbe;
use crate::shared::time::round_ms;

/// Reads the duration straight from a RIFF/WAVE header.
#[derive(Debug, Default)]
pub struct WavDurationProbe;

impl WavDurationProbe {
    pub fn new() -> Self {
        Self
    }
}

impl DurationProbe for WavDurationProbe {
    fn duration(&self, audio: &Path) -> Result<f64, AudioError> {
        let unreadable = |reason: String| AudioError::Unreadable {
            path: audio.to_path_buf(),
            reason,
        };
        let reader = WavReader::open(audio).map_err(|e| unreadable(e.to_string()))?;
        let spec = reader.spec();
        if spec.sample_rate == 0 {
            return Err(unreadable("sample rate is zero".to_string()));
        }
        let frames = reader.duration();
        let seconds = round_ms(f64::from(frames) / f64::from(spec.sample_rate));
        log::debug!(
            "{}: {frames} frames at {} Hz, {seconds:.3}s",
            audio.display(),
            spec.sample_rate
        );
        Ok(seconds)
    }
}
