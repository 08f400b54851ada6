pub mod fallback_duration_probe;
pub mod praat_duration_probe;
pub mod wav_duration_probe;
